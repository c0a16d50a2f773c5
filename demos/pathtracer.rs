// A simple forward pathtracer that renders a few translucent spheres in front of a sky.
// Every sphere uses the diffuse transmitter, one of them with a checkerboard texture loaded
// from a json scene fragment. It's just to demonstrate how to use this library.
use std::f64::consts::PI;

use difftrans::{
    difftrans::DiffuseTransmitter, loader, Bsdf, BsdfContext, RgbD, SurfaceInteraction, Vec2d,
    Vec3d,
};

#[derive(Copy, Clone)]
struct Sphere {
    center: Vec3d,
    radius: f64,
}

#[derive(Copy, Clone)]
struct Ray {
    origin: Vec3d,
    direction: Vec3d,
}

#[derive(Copy, Clone)]
struct HitRecord {
    t: f64, // hit distance
    pos: Vec3d,
    normal: Vec3d,
}

impl Sphere {
    fn hit(&self, ray: Ray, ray_tmin: f64, ray_tmax: f64) -> Option<HitRecord> {
        let oc = ray.origin - self.center;
        let a = ray.direction.length_squared();
        let half_b = Vec3d::dot(oc, ray.direction);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = half_b * half_b - a * c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrtd = f64::sqrt(discriminant);

        // Find the nearest root that lies in the acceptable range.
        let mut root = (-half_b - sqrtd) / a;
        if root <= ray_tmin || ray_tmax <= root {
            root = (-half_b + sqrtd) / a;
            if root <= ray_tmin || ray_tmax <= root {
                return None;
            }
        }

        let pos = ray.origin + ray.direction * root;
        Some(HitRecord {
            t: root,
            pos,
            normal: (pos - self.center) / self.radius,
        })
    }
}

struct World {
    spheres: Vec<Sphere>,
    materials: Vec<Box<dyn Bsdf>>,
}

enum WorldHit<'t> {
    Surface {
        material: &'t dyn Bsdf,
        si: SurfaceInteraction,
    },
    Background {
        color: RgbD,
    },
}

fn sphere_uv(normal: Vec3d) -> Vec2d {
    let phi = normal.y.atan2(normal.x) + PI;
    let theta = normal.z.clamp(-1.0, 1.0).acos();
    Vec2d::new(phi / (2.0 * PI), theta / PI)
}

impl World {
    fn find_hit(&self, ray: Ray, ray_tmin: f64, ray_tmax: f64) -> WorldHit {
        let mut hit = None;
        let mut closest_so_far = ray_tmax;
        let mut hit_id = usize::MAX;

        for (id, sphere) in self.spheres.iter().enumerate() {
            if let Some(current_hit) = sphere.hit(ray, ray_tmin, closest_so_far) {
                hit = Some(current_hit);
                closest_so_far = current_hit.t;
                hit_id = id;
            }
        }

        if let Some(hit) = hit {
            WorldHit::Surface {
                material: self.materials[hit_id].as_ref(),
                si: SurfaceInteraction::new(
                    hit.pos,
                    sphere_uv(hit.normal),
                    hit.normal,
                    -ray.direction,
                ),
            }
        } else {
            let unit_direction = ray.direction.normalize();
            let a = 0.5 * (unit_direction.z + 1.0);
            WorldHit::Background {
                color: (1.0 - a) * RgbD::new(1.0, 0.9, 0.7) + a * RgbD::new(0.5, 0.7, 1.0),
            }
        }
    }
}

fn random_walk(world: &World, mut ray: Ray, rd: &mut fastrand::Rng) -> RgbD {
    let ctx = BsdfContext::default();
    let mut factor = RgbD::ONE;

    for depth in 0..50 {
        match world.find_hit(ray, 1e-5, f64::MAX) {
            WorldHit::Surface { material, si } => {
                let (bs, weight) =
                    material.sample(&ctx, &si, rd.f64(), Vec2d::new(rd.f64(), rd.f64()), true);
                if bs.pdf <= 0.0 {
                    return RgbD::ZERO;
                }

                // russian roulette: always do 5 bounces, after that terminate the path with a
                // probability depending on how much light the surface lets through
                let rr_probab = if depth > 5 {
                    material
                        .eval_diffuse_reflectance(&si, true)
                        .max_element()
                        .clamp(0.05, 1.0)
                } else {
                    1.0
                };
                if rr_probab <= rd.f64() {
                    return RgbD::ZERO;
                }
                factor *= weight / rr_probab;

                ray = Ray {
                    origin: si.p,
                    direction: si.to_world(bs.wo).normalize(),
                };
            }
            WorldHit::Background { color } => return factor * color,
        }
    }
    RgbD::ZERO
}

fn save_image(path: &std::path::Path, buffer: &[u8], width: u32, height: u32) {
    let file = std::fs::File::create(path).unwrap();
    let mut writer = std::io::BufWriter::new(file);

    let mut encoder = png::Encoder::new(&mut writer, width, height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_source_gamma(png::ScaledFloat::new(1.0 / 2.2));
    let mut writer = encoder.write_header().unwrap();

    writer.write_image_data(buffer).unwrap();
}

fn main() {
    env_logger::init();

    let textured = loader::load_bsdf(&serde_json::json!({
        "type": "difftrans",
        "transmittance": {
            "type": "checkerboard",
            "color0": [0.9, 0.8, 0.2],
            "color1": [0.2, 0.6, 0.3],
            "scale": 8.0
        }
    }))
    .unwrap();
    log::info!("textured sphere uses {textured}");

    let world = World {
        spheres: vec![
            Sphere {
                center: Vec3d::new(0.6, 0.0, 0.5),
                radius: 0.5,
            },
            Sphere {
                center: Vec3d::new(-0.6, 0.3, 0.4),
                radius: 0.4,
            },
            Sphere {
                center: Vec3d::new(0.0, -1.2, 0.25),
                radius: 0.25,
            },
        ],
        materials: vec![
            Box::new(DiffuseTransmitter::constant(RgbD::new(0.2, 0.25, 0.7))),
            textured,
            Box::new(DiffuseTransmitter::default()),
        ],
    };
    let image_size = (640, 360);
    let num_samples = 32;

    let cam_center = Vec3d::new(0.0, -5.0, 1.0);
    let cam_target = Vec3d::new(0.0, 0.0, 0.5);
    let forward = (cam_target - cam_center).normalize();
    let up = Vec3d::Z;
    let right = forward.cross(up).normalize() * 2.0 * image_size.0 as f64 / image_size.1 as f64;
    let up = -right.cross(forward).normalize() * 2.0;

    let mut image: Vec<u8> = vec![0; 3 * image_size.0 * image_size.1];

    let focal_length = 8.0;
    let forward = forward * focal_length;

    let mut rd = fastrand::Rng::new();

    for y in 0..image_size.1 {
        for x in 0..image_size.0 {
            let mut color = RgbD::ZERO;
            for _ in 0..num_samples {
                let uv_x = (x as f64 + rd.f64()) / image_size.0 as f64;
                let uv_y = (y as f64 + rd.f64()) / image_size.1 as f64;

                let cam_x = uv_x * 2.0 - 1.0;
                let cam_y = uv_y * 2.0 - 1.0;

                let ray = Ray {
                    origin: cam_center,
                    direction: (forward + right * cam_x + up * cam_y).normalize(),
                };

                color += random_walk(&world, ray, &mut rd);
            }
            color /= num_samples as f64;

            let pixel = (y * image_size.0 + x) * 3;
            for (i, c) in color.to_array().into_iter().enumerate() {
                image[pixel + i] = (c.powf(1.0 / 2.2) * 255.0).clamp(0.0, 255.0).floor() as u8;
            }
        }
        log::debug!("row {y} of {} rows finished", image_size.1);
    }

    save_image(
        std::path::Path::new("image.png"),
        &image,
        image_size.0 as u32,
        image_size.1 as u32,
    );
    log::info!("wrote image.png");
}
