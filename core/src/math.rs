// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vector aliases and the Quake axis conventions.
//!
//! All geometry in the workspace is single precision, matching the on-disk
//! formats. The axis helpers encode Quake's coordinate conventions:
//! X forward, Y left (so "right" is +Y in texture-space terms), Z up.

use nalgebra as na;

pub type Vec2 = na::Vector2<f32>;
pub type Vec3 = na::Vector3<f32>;
pub type Vec4 = na::Vector4<f32>;

/// Quake up axis (+Z).
#[inline]
pub fn up_vec() -> Vec3 {
    Vec3::z()
}

/// Quake right axis (+Y).
#[inline]
pub fn right_vec() -> Vec3 {
    Vec3::y()
}

/// Quake forward axis (+X).
#[inline]
pub fn forward_vec() -> Vec3 {
    Vec3::x()
}

/// Euclidean distance between two points.
#[inline]
pub fn dist3(a: &Vec3, b: &Vec3) -> f32 {
    (b - a).norm()
}

/// Quake space to OpenGL space: `(x, y, z) -> (x, z, -y)`.
#[inline]
pub fn to_opengl(v: &Vec3) -> Vec3 {
    Vec3::new(v.x, v.z, -v.y)
}

/// Center of an axis-aligned bounding box.
#[inline]
pub fn center_from_bbox(min: &Vec3, max: &Vec3) -> Vec3 {
    (min + max) * 0.5
}
