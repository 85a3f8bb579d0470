//! Cubemap to equirectangular reprojection.
//!
//! Produces a 2:1 panorama parametrized by longitude (x) and latitude (y)
//! from six axis-aligned cube faces, using nearest-neighbour sampling.

use springmap_common::Raster;

use crate::texture::CubeMap;

/// Faces that are stored upside down relative to the projection math and
/// must be flipped vertically before sampling.
///
/// NOTE: this set ({+X, -X, +Z, -Z}) is empirical, validated against the
/// skyboxes shipped in real Spring map archives. Content from other
/// pipelines may instead need the {+Y, -Y} pair flipped; if a panorama
/// comes out with mirrored poles, this constant is the knob to revisit.
const FLIPPED_FACES: [usize; 4] = [0, 1, 4, 5];

/// Pick the cube face and face-plane coordinates for a direction vector.
///
/// Returns `(face, uc, vc)` with `uc`/`vc` in [-1, 1]. The face is chosen
/// by the largest absolute component of the direction.
fn face_coords(x: f64, y: f64, z: f64) -> (usize, f64, f64) {
    let (ax, ay, az) = (x.abs(), y.abs(), z.abs());

    if ax >= ay && ax >= az {
        if x > 0.0 {
            (0, -z / ax, y / ax)
        } else {
            (1, z / ax, y / ax)
        }
    } else if ay >= az {
        if y > 0.0 {
            (2, x / ay, z / ay)
        } else {
            (3, x / ay, -z / ay)
        }
    } else if z > 0.0 {
        (4, x / az, y / az)
    } else {
        (5, -x / az, y / az)
    }
}

/// Reproject a cubemap into an equirectangular panorama of the given width.
///
/// The output height is `width / 2`. Each output pixel maps longitude
/// `theta = (x / W) * 2pi` and latitude `phi = (y / H) * pi` to the unit
/// direction `(-sin(phi) * sin(theta), cos(phi), -sin(phi) * cos(theta))`
/// and samples the dominant face nearest-neighbour.
pub fn equirectangular(cube: &CubeMap, width: u32) -> Raster {
    let height = width / 2;
    let side = cube.side();

    let mut faces: Vec<Raster> = (0..6).map(|i| cube.face(i).clone()).collect();
    for &i in &FLIPPED_FACES {
        faces[i].flip_vertical();
    }

    let mut out = Raster::zeroed(width, height);
    for y in 0..height {
        let phi = (y as f64 / height as f64) * std::f64::consts::PI;
        let (sin_phi, cos_phi) = phi.sin_cos();

        for x in 0..width {
            let theta = (x as f64 / width as f64) * std::f64::consts::TAU;
            let (sin_theta, cos_theta) = theta.sin_cos();

            let dx = -sin_phi * sin_theta;
            let dy = cos_phi;
            let dz = -sin_phi * cos_theta;

            let (face, uc, vc) = face_coords(dx, dy, dz);
            let u = 0.5 * (uc + 1.0);
            let v = 0.5 * (vc + 1.0);

            let px = ((u * side as f64) as u32).min(side - 1);
            let py = ((v * side as f64) as u32).min(side - 1);

            out.put_pixel(x, y, faces[face].pixel(px, py));
        }
    }

    out
}
