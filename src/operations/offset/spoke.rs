use crate::error::Result;
use crate::geometry::{PointId, PointStore};
use crate::math::intersect_2d::point_at;
use crate::math::polygon_2d::{interior_angle, is_reflex_turn, segment_direction};
use crate::math::{Point3, Vector3, SENTINEL_SPEED, TOLERANCE};

/// A ray anchored at a boundary vertex, tracking that vertex's position as
/// the wavefront advances.
///
/// The spoke grows along the interior angle bisector at its vertex. Its
/// speed is `1/sin(a/2)` for interior angle `a`, which makes the
/// perpendicular distance from the spoke's tip to either adjacent edge grow
/// at unit rate. Each spoke belongs to exactly one face of one offset
/// generation, addressed by `(face, index)`.
#[derive(Debug, Clone)]
pub struct Spoke {
    /// Id of the vertex the spoke grows from.
    pub origin: PointId,
    /// Normalized growth direction.
    pub dir: Vector3,
    /// Growth rate; positive and finite, clamped to [`SENTINEL_SPEED`]
    /// at degenerate angles.
    pub speed: f64,
    /// True when the boundary turn at the origin is locally concave.
    pub is_reflex: bool,
    /// Index of the containing face within the generation.
    pub face: usize,
    /// Index of this spoke within its face.
    pub index: usize,
}

impl Spoke {
    /// Builds the spoke at vertex `v` with boundary neighbors `prev` and
    /// `next`, in traversal order. Works unchanged for CCW boundary cycles
    /// and CW hole cycles: the stored orientation makes hole spokes grow
    /// out of the hole, into the region.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::ZeroLengthSegment` when either adjacent edge
    /// is degenerate.
    pub fn new(
        v: PointId,
        prev: PointId,
        next: PointId,
        face: usize,
        index: usize,
        store: &PointStore,
    ) -> Result<Self> {
        let vp = store.pos(v);
        let prevp = store.pos(prev);
        let nextp = store.pos(next);
        let uin = segment_direction(&prevp, &vp)?;
        let uout = segment_direction(&vp, &nextp)?;
        let avg = Vector3::new(0.5 * (uin.x + uout.x), 0.5 * (uin.y + uout.y), 0.0);
        let len = avg.norm();
        let dir = if len < TOLERANCE {
            // Folded-back cusp: the bisector degenerates; fall back to the
            // reversed incoming direction, paired with the sentinel speed.
            Vector3::new(-uin.x, -uin.y, 0.0)
        } else {
            Vector3::new(-avg.y / len, avg.x / len, 0.0)
        };
        let is_reflex = is_reflex_turn(&prevp, &vp, &nextp);
        let half = interior_angle(&prevp, &vp, &nextp) / 2.0;
        let sin_half = half.sin();
        let speed = if sin_half.abs() < TOLERANCE {
            SENTINEL_SPEED
        } else {
            1.0 / sin_half
        };
        Ok(Self {
            origin: v,
            dir,
            speed,
            is_reflex,
            face,
            index,
        })
    }

    /// Position of the spoke's tip at time `t`.
    #[must_use]
    pub fn end_point(&self, t: f64, store: &PointStore) -> Point3 {
        point_at(&store.pos(self.origin), &self.motion(), t)
    }

    /// Tip velocity: direction scaled by speed.
    #[must_use]
    pub fn motion(&self) -> Vector3 {
        self.dir * self.speed
    }
}
