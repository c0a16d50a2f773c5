use crate::{frame::Frame, Vec3d};

/// Lane-wise select. Returns `if_true` for active lanes and `if_false` otherwise.
#[inline]
pub fn select<T>(mask: bool, if_true: T, if_false: T) -> T {
    if mask {
        if_true
    } else {
        if_false
    }
}

/// Returns true if the two local directions lie strictly on different sides of the surface
#[inline]
pub fn opposite_hemispheres(wi: Vec3d, wo: Vec3d) -> bool {
    Frame::cos_theta(wi) * Frame::cos_theta(wo) < 0.0
}

/// Indents every line but the first by `amount` spaces
pub fn indent(text: &str, amount: usize) -> String {
    let padding = " ".repeat(amount);
    text.replace('\n', &format!("\n{padding}"))
}
