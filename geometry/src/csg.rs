// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Constructive solid geometry over an entity's brush set, and the
//! mesh-repair passes that follow it.
//!
//! The order weld -> T-junction -> collinear -> triangulate is fixed:
//! the collinear pass's cross-of-unit-tangents threshold is what keeps
//! it from deleting the vertices the T-junction pass just inserted.

use quake_lite_core::math::{self, Vec2, Vec3};
use quake_lite_core::surface::Vertex;

use crate::entity::SolidEntity;
use crate::face::{interpolate, Face, CMP_EPSILON};

/// Position weld tolerance across clipped brushes.
pub const WELD_EPSILON: f32 = 5.0e-3;
/// Distance within which a vertex counts as lying on a foreign edge.
pub const EDGE_EPSILON: f32 = 5.0e-2;
/// Dedup threshold for the unique-position set of the T-junction pass.
pub const TJUNCTION_MERGE_EPSILON: f32 = 1.0e-3;
/// Convexity slack for the ear test.
const EAR_EPSILON: f32 = 1.0e-4;

impl SolidEntity {
    /// Pairwise brush subtraction: every solid brush is clipped against
    /// every other solid, intersecting brush so hidden inter-brush faces
    /// vanish. The brush with the lower authored index keeps coplanar
    /// walls.
    ///
    /// Runs the weld / T-junction / collinear / ear-clip passes when at
    /// least one brush survives. Re-running is idempotent: clipping
    /// always starts from the original brushes.
    pub fn csg_union(&mut self) {
        self.clipped_brushes.clear();
        self.clipped_face_count = 0;
        self.was_clipped = false;

        if let Some(first) = self.brushes.first() {
            self.min = first.min;
            self.max = first.max;
        }

        for i in 0..self.brushes.len() {
            // non-solid brushes (CLIP/SKIP/NODRAW) are exported as-is
            if self.brushes[i].is_nonsolid() {
                let brush = self.brushes[i].clone();
                brush.grow_bbox(&mut self.min, &mut self.max);
                self.clipped_brushes.push(brush);
                continue;
            }

            let mut work = self.brushes[i].clone();
            for j in 0..self.brushes.len() {
                if i == j {
                    continue;
                }
                let other = &self.brushes[j];
                if other.faces.is_empty() || other.is_nonsolid() {
                    continue;
                }
                if !self.brushes[i].intersects(other) {
                    continue;
                }
                if self.brushes[i].is_block_volume() || other.is_block_volume() {
                    continue;
                }

                let keep_on_plane = i < j;
                let clipped = work.clip_to_brush(other, keep_on_plane);
                work.faces = clipped;
            }

            if !work.faces.is_empty() {
                work.index_face_vertices();
                work.grow_bbox(&mut self.min, &mut self.max);
                self.clipped_face_count +=
                    self.brushes[i].faces.len() as i64 - work.faces.len() as i64;
                self.clipped_brushes.push(work);
            }
        }

        self.center = math::center_from_bbox(&self.min, &self.max);

        if !self.brushes.is_empty() && !self.clipped_brushes.is_empty() {
            self.was_clipped = true;
            self.weld_vertices();
            self.fix_t_junctions();
            self.remove_collinear_vertices();
            self.triangulate_faces();
            self.recompute_bounds();
            log::debug!(
                "csg: {} brushes -> {} clipped, {} faces removed",
                self.brushes.len(),
                self.clipped_brushes.len(),
                self.clipped_face_count
            );
        }
    }

    /// Snaps nearly coincident vertex positions together across all faces
    /// of all clipped brushes. Only positions are welded; the other
    /// attributes are preserved. Idempotent.
    pub fn weld_vertices(&mut self) {
        let brushes = self.working_brushes_mut();

        let mut handles: Vec<(usize, usize, usize)> = Vec::new();
        let mut points: Vec<Vec3> = Vec::new();
        for (bi, brush) in brushes.iter().enumerate() {
            for (fi, face) in brush.faces.iter().enumerate() {
                for (vi, v) in face.vertices().iter().enumerate() {
                    handles.push((bi, fi, vi));
                    points.push(v.point);
                }
            }
        }

        // x-sorted sweep: only vertices within the weld window in x can
        // be candidates
        let mut order: Vec<usize> = (0..points.len()).collect();
        order.sort_by(|&a, &b| points[a].x.total_cmp(&points[b].x));

        for i in 0..order.len() {
            for j in (i + 1)..order.len() {
                let (pi, pj) = (order[i], order[j]);
                if points[pj].x - points[pi].x > WELD_EPSILON {
                    break;
                }
                if math::dist3(&points[pi], &points[pj]) < WELD_EPSILON {
                    points[pj] = points[pi];
                }
            }
        }

        for (n, (bi, fi, vi)) in handles.into_iter().enumerate() {
            brushes[bi].faces[fi].vertices_mut()[vi].point = points[n];
        }
    }

    /// Inserts, into every edge, the unique world positions that lie on
    /// that edge strictly between its endpoints. Attributes of inserted
    /// vertices are interpolated along the edge; positions are taken
    /// exactly. Removes the pixel cracks T-junctions cause.
    pub fn fix_t_junctions(&mut self) {
        let brushes = self.working_brushes_mut();

        let mut unique: Vec<Vec3> = Vec::new();
        for brush in brushes.iter() {
            for face in &brush.faces {
                for v in face.vertices() {
                    unique.push(v.point);
                }
            }
        }
        unique.sort_by(|a, b| {
            a.x.total_cmp(&b.x)
                .then(a.y.total_cmp(&b.y))
                .then(a.z.total_cmp(&b.z))
        });
        unique.dedup_by(|a, b| math::dist3(a, b) < TJUNCTION_MERGE_EPSILON);

        for brush in brushes.iter_mut() {
            let mut modified = false;
            for face in &mut brush.faces {
                if face.vertices().len() < 3 {
                    continue;
                }
                let old = face.vertices().to_vec();
                let count = old.len();
                let mut new_verts: Vec<Vertex> = Vec::with_capacity(count);

                for i in 0..count {
                    let v1 = &old[i];
                    let v2 = &old[(i + 1) % count];
                    new_verts.push(v1.clone());

                    let dir = v2.point - v1.point;
                    let len = dir.norm();
                    if len < EDGE_EPSILON {
                        continue;
                    }
                    let dir_norm = dir / len;

                    let min_x = v1.point.x.min(v2.point.x) - EDGE_EPSILON;
                    let max_x = v1.point.x.max(v2.point.x) + EDGE_EPSILON;
                    let start = unique.partition_point(|p| p.x < min_x);

                    let mut splits: Vec<Vec3> = Vec::new();
                    for p in &unique[start..] {
                        if p.x > max_x {
                            break;
                        }
                        if math::dist3(p, &v1.point) < EDGE_EPSILON
                            || math::dist3(p, &v2.point) < EDGE_EPSILON
                        {
                            continue;
                        }
                        let t = (p - v1.point).dot(&dir_norm);
                        if t > EDGE_EPSILON && t < len - EDGE_EPSILON {
                            let closest = v1.point + dir_norm * t;
                            if math::dist3(&closest, p) < EDGE_EPSILON {
                                splits.push(*p);
                            }
                        }
                    }
                    if splits.is_empty() {
                        continue;
                    }

                    splits.sort_by(|a, b| {
                        math::dist3(a, &v1.point).total_cmp(&math::dist3(b, &v1.point))
                    });

                    for split_point in splits {
                        if let Some(last) = new_verts.last() {
                            if math::dist3(&last.point, &split_point) < TJUNCTION_MERGE_EPSILON {
                                continue;
                            }
                        }
                        let t = (split_point - v1.point).norm() / len;
                        let mut split_vert = interpolate(v1, v2, t);
                        split_vert.point = split_point;
                        new_verts.push(split_vert);
                        modified = true;
                    }
                }
                *face.vertices_mut() = new_verts;
            }
            if modified {
                brush.index_face_vertices();
            }
        }
    }

    /// Deletes vertices whose incident edges are collinear (cross product
    /// of unit tangents under the determinant tolerance), repeating until
    /// stable. Faces left with fewer than three vertices are dropped.
    pub fn remove_collinear_vertices(&mut self) {
        let brushes = self.working_brushes_mut();
        for brush in brushes.iter_mut() {
            for face in &mut brush.faces {
                let verts = face.vertices_mut();
                if verts.len() < 3 {
                    continue;
                }
                let mut changed = true;
                while changed && verts.len() >= 3 {
                    changed = false;
                    for i in 0..verts.len() {
                        let prev = (i + verts.len() - 1) % verts.len();
                        let next = (i + 1) % verts.len();

                        let p = verts[prev].point;
                        let c = verts[i].point;
                        let n = verts[next].point;

                        let e1 = c - p;
                        let e2 = n - c;

                        if e1.norm() < CMP_EPSILON || e2.norm() < CMP_EPSILON {
                            verts.remove(i);
                            changed = true;
                            break;
                        }
                        if e1.normalize().cross(&e2.normalize()).norm() < CMP_EPSILON {
                            verts.remove(i);
                            changed = true;
                            break;
                        }
                    }
                }
            }
            brush.faces.retain(|f| f.vertices().len() >= 3);
            brush.index_face_vertices();
        }
    }

    /// Ear-clipping triangulation of every face with more than three
    /// vertices. Each emitted triangle is a fresh face with three
    /// vertices and indices `{0, 1, 2}`.
    pub fn triangulate_faces(&mut self) {
        let brushes = self.working_brushes_mut();
        for brush in brushes.iter_mut() {
            let mut new_faces: Vec<Face> = Vec::with_capacity(brush.faces.len() * 2);

            for face in &brush.faces {
                if face.vertices().len() <= 3 {
                    new_faces.push(face.clone());
                    continue;
                }
                triangulate_face(face, &mut new_faces);
            }

            brush.faces = new_faces;
        }
    }
}

/// 2D projection that drops the dominant axis of the face normal.
fn project_axis(normal: &Vec3) -> usize {
    let nx = normal.x.abs();
    let ny = normal.y.abs();
    let nz = normal.z.abs();
    if ny > nx && ny > nz {
        1
    } else if nz > nx && nz > ny {
        2
    } else {
        0
    }
}

#[inline]
fn project(point: &Vec3, axis: usize) -> Vec2 {
    match axis {
        0 => Vec2::new(point.y, point.z),
        1 => Vec2::new(point.x, point.z),
        _ => Vec2::new(point.x, point.y),
    }
}

/// Half-plane sign test; boundary counts as inside.
fn point_in_triangle(p: &Vec2, a: &Vec2, b: &Vec2, c: &Vec2) -> bool {
    let sign =
        |p1: &Vec2, p2: &Vec2, p3: &Vec2| (p1.x - p3.x) * (p2.y - p3.y) - (p2.x - p3.x) * (p1.y - p3.y);
    let d1 = sign(p, a, b);
    let d2 = sign(p, b, c);
    let d3 = sign(p, c, a);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

fn emit_triangle(face: &Face, a: &Vertex, b: &Vertex, c: &Vertex, out: &mut Vec<Face>) {
    let mut tri = face.clone();
    let verts = tri.vertices_mut();
    verts.clear();
    verts.push(a.clone());
    verts.push(b.clone());
    verts.push(c.clone());
    tri.indices = vec![0, 1, 2];
    tri.update_normals();
    out.push(tri);
}

fn triangulate_face(face: &Face, out: &mut Vec<Face>) {
    let verts = face.vertices();
    let normal = face.plane_normal();
    let axis = project_axis(&normal);

    let mut indices: Vec<usize> = (0..verts.len()).collect();
    let mut count = indices.len();
    // hard cap so degenerate polygons cannot spin forever
    let mut limit = count as i32 * 2;

    while count > 2 {
        limit -= 1;
        if limit < 0 {
            break;
        }

        let mut ear_found = false;
        for i in 0..count {
            let idx_prev = (i + count - 1) % count;
            let idx_next = (i + 1) % count;

            let vp = &verts[indices[idx_prev]];
            let vc = &verts[indices[i]];
            let vn = &verts[indices[idx_next]];

            let edge_a = vc.point - vp.point;
            let edge_b = vn.point - vc.point;
            if edge_a.cross(&edge_b).dot(&normal) <= -EAR_EPSILON {
                continue; // reflex corner
            }

            let p2 = project(&vp.point, axis);
            let c2 = project(&vc.point, axis);
            let n2 = project(&vn.point, axis);

            let mut contains = false;
            for (k, &vi) in indices.iter().enumerate().take(count) {
                if k == idx_prev || k == i || k == idx_next {
                    continue;
                }
                if point_in_triangle(&project(&verts[vi].point, axis), &p2, &c2, &n2) {
                    contains = true;
                    break;
                }
            }
            if contains {
                continue;
            }

            emit_triangle(face, vp, vc, vn, out);
            indices.remove(i);
            count -= 1;
            ear_found = true;
            break;
        }

        if !ear_found {
            // degenerate polygon: fan the remainder as a last resort
            log::warn!(
                "ear clipping found no ear in a {}-gon, emitting fan",
                count
            );
            for i in 1..count - 1 {
                emit_triangle(
                    face,
                    &verts[indices[0]],
                    &verts[indices[i]],
                    &verts[indices[i + 1]],
                    out,
                );
            }
            break;
        }
    }
}
