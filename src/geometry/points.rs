use std::collections::HashMap;

use crate::math::{Point3, DIST_TOLERANCE};

/// Stable index of a point in a [`PointStore`]. Ids are sequential,
/// append-only, and never reused.
pub type PointId = usize;

/// Append-only table of coordinates with duplicate merging.
///
/// Points are quantized to a grid of cell size [`DIST_TOLERANCE`]; adding a
/// point probes the 3×3 neighborhood of its (x, y) cell (with exact
/// quantized z) and returns the existing id when a neighbor is occupied.
/// All polygon boundaries, holes, and offset wavefronts of one region share
/// a single store and reference it by id.
#[derive(Debug, Default, Clone)]
pub struct PointStore {
    positions: Vec<Point3>,
    lookup: HashMap<(i64, i64, i64), PointId>,
}

impl PointStore {
    /// Creates a new, empty point store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of points in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true when the store holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn quantize(p: &Point3) -> (i64, i64, i64) {
        (
            (p.x / DIST_TOLERANCE).round() as i64,
            (p.y / DIST_TOLERANCE).round() as i64,
            (p.z / DIST_TOLERANCE).round() as i64,
        )
    }

    /// Adds a point, returning the id of an existing point within
    /// [`DIST_TOLERANCE`] if one is already stored.
    pub fn add_point(&mut self, p: Point3) -> PointId {
        let (qx, qy, qz) = Self::quantize(&p);
        for i in -1..=1 {
            for j in -1..=1 {
                if let Some(&id) = self.lookup.get(&(qx + i, qy + j, qz)) {
                    return id;
                }
            }
        }
        let id = self.positions.len();
        self.positions.push(p);
        self.lookup.insert((qx, qy, qz), id);
        id
    }

    /// Coordinates of the point with the given id.
    ///
    /// Ids must come from this store; a foreign id is a logic error.
    #[must_use]
    pub fn pos(&self, id: PointId) -> Point3 {
        self.positions[id]
    }

    /// Assigns the z coordinate of an existing point.
    ///
    /// The quantized lookup keeps the point's original key: height
    /// assignment is a post-processing step, done only after all 2D
    /// table growth has finished.
    pub fn set_z(&mut self, id: PointId, z: f64) {
        self.positions[id].z = z;
    }

    /// Iterates over `(id, position)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (PointId, &Point3)> + '_ {
        self.positions.iter().enumerate()
    }
}
