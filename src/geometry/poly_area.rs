use super::points::{PointId, PointStore};
use crate::math::polygon_2d::signed_area_2d;
use crate::math::Point3;

/// Opaque per-area fill attribute (rgb), carried through to emitted faces.
pub type Color = [f64; 3];

/// A polygonal area: a CCW outer boundary plus zero or more CW holes,
/// all referencing one shared [`PointStore`].
///
/// Produced by upstream parsing or by the containment classifier, consumed
/// once by the offset builder; never mutated after offsetting starts.
#[derive(Debug, Clone)]
pub struct PolyArea {
    /// Outer boundary vertex ids, counter-clockwise.
    pub boundary: Vec<PointId>,
    /// Hole boundaries, each clockwise.
    pub holes: Vec<Vec<PointId>>,
    /// Fill attribute.
    pub color: Color,
}

impl PolyArea {
    /// Creates an area from a boundary assumed to already be CCW.
    #[must_use]
    pub fn new(boundary: Vec<PointId>, color: Color) -> Self {
        Self {
            boundary,
            holes: Vec::new(),
            color,
        }
    }

    /// Creates an area from a simple cycle, reversing it if needed so the
    /// boundary is CCW.
    #[must_use]
    pub fn from_cycle(mut cycle: Vec<PointId>, color: Color, store: &PointStore) -> Self {
        let coords: Vec<Point3> = cycle.iter().map(|&id| store.pos(id)).collect();
        if signed_area_2d(&coords) < 0.0 {
            cycle.reverse();
        }
        Self::new(cycle, color)
    }

    /// Attaches another area's boundary as a hole of this one, reversing
    /// its CCW cycle to the CW orientation holes carry.
    pub fn add_hole(&mut self, other: &PolyArea) {
        let mut hole = other.boundary.clone();
        hole.reverse();
        self.holes.push(hole);
    }

    /// Boundary coordinates in order.
    #[must_use]
    pub fn boundary_coords(&self, store: &PointStore) -> Vec<Point3> {
        self.boundary.iter().map(|&id| store.pos(id)).collect()
    }

    /// Signed area of the outer boundary (positive for CCW).
    #[must_use]
    pub fn signed_area(&self, store: &PointStore) -> f64 {
        signed_area_2d(&self.boundary_coords(store))
    }
}
