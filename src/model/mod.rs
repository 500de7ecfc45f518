//! Walks a finished offset chain and emits the sloped bevel faces plus the
//! remaining flat interior, ready for external quadrangulation and export.

use crate::error::{EmitError, Result};
use crate::geometry::{Color, PointId, PointStore, PolyArea};
use crate::math::Point3;
use crate::operations::classify::CombineAreas;
use crate::operations::offset::{face_at_spoke_ends, OffsetChain};

/// A generic face model: n-gon faces over the shared point table, with a
/// parallel per-face color attribute.
#[derive(Debug, Default)]
pub struct Model {
    /// Faces, each a CCW cyclic sequence of point ids.
    pub faces: Vec<Vec<PointId>>,
    /// Per-face fill attribute, parallel to `faces`.
    pub colors: Vec<Color>,
}

impl Model {
    /// Creates an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a face with its color.
    pub fn add_face(&mut self, face: Vec<PointId>, color: Color) {
        self.faces.push(face);
        self.colors.push(color);
    }

    /// Axis-aligned bounding box over all face vertices, or `None` for an
    /// empty model.
    #[must_use]
    pub fn bounds(&self, store: &PointStore) -> Option<(Point3, Point3)> {
        let mut min: Option<Point3> = None;
        let mut max: Option<Point3> = None;
        for face in &self.faces {
            for &id in face {
                let p = store.pos(id);
                min = Some(min.map_or(p, |m| {
                    Point3::new(m.x.min(p.x), m.y.min(p.y), m.z.min(p.z))
                }));
                max = Some(max.map_or(p, |m| {
                    Point3::new(m.x.max(p.x), m.y.max(p.y), m.z.max(p.z))
                }));
            }
        }
        min.zip(max)
    }
}

/// Output of the bevel emitter.
#[derive(Debug)]
pub struct Bevel {
    /// Sloped quad/triangle faces connecting successive wavefront rims.
    pub model: Model,
    /// The un-beveled flat interior, as polygons-with-holes, for
    /// downstream capping or extrusion.
    pub flat: Vec<PolyArea>,
}

/// Emits beveled geometry from an offset chain.
///
/// For every edge of every face of every generation, a quad connects the
/// lower outer rim to the upper inner rim, degenerating to a triangle
/// where the two inner endpoints converge. Heights are offset time scaled
/// by `vertical_speed`, assigned to the shared table post-hoc.
#[derive(Debug)]
pub struct BevelBuilder {
    vertical_speed: f64,
}

impl BevelBuilder {
    /// Creates an emitter with the given height-per-unit-offset scaling.
    #[must_use]
    pub fn new(vertical_speed: f64) -> Self {
        Self { vertical_speed }
    }

    /// Walks the chain and emits the bevel.
    ///
    /// The walk uses an explicit stack, not recursion: highly reflex
    /// polygons produce deep chains. All 2D derivation (including the flat
    /// interior recovery and its nesting classification) happens before
    /// any height is written to the table, so point deduplication stays
    /// consistent.
    ///
    /// # Errors
    ///
    /// Returns `EmitError::InvalidInput` for a non-finite vertical speed,
    /// and propagates chain lookup and classification errors.
    pub fn execute(
        &self,
        chain: &OffsetChain,
        color: Color,
        store: &mut PointStore,
    ) -> Result<Bevel> {
        if !self.vertical_speed.is_finite() {
            return Err(
                EmitError::InvalidInput("vertical speed must be finite".to_owned()).into(),
            );
        }
        let mut model = Model::new();
        let mut heights: Vec<(PointId, f64)> = Vec::new();
        let mut flat_cycles: Vec<Vec<PointId>> = Vec::new();

        let mut stack = vec![chain.root()];
        while let Some(gid) = stack.pop() {
            let gen = chain.generation(gid)?;
            let dt = gen.endtime;
            let z_outer = gen.start_time * self.vertical_speed;
            let z_inner = (gen.start_time + dt) * self.vertical_speed;

            for face in &gen.faces {
                let n = face.len();
                // Unmerged per-spoke endpoints, so every outer edge pairs
                // with its advanced counterpart.
                let ends: Vec<PointId> = face
                    .iter()
                    .map(|s| {
                        let p = s.end_point(dt, store);
                        store.add_point(p)
                    })
                    .collect();
                for (s, &e) in face.iter().zip(&ends) {
                    heights.push((s.origin, z_outer));
                    heights.push((e, z_inner));
                }
                for i in 0..n {
                    let j = (i + 1) % n;
                    let (o_i, o_j) = (face[i].origin, face[j].origin);
                    let (e_i, e_j) = (ends[i], ends[j]);
                    if e_i == e_j {
                        if e_i == o_i || e_i == o_j {
                            continue;
                        }
                        model.add_face(vec![o_i, o_j, e_i], color);
                    } else {
                        model.add_face(vec![o_i, o_j, e_j, e_i], color);
                    }
                }
            }

            if gen.children.is_empty() {
                for face in &gen.faces {
                    let cycle = face_at_spoke_ends(face, dt, store);
                    if cycle.len() >= 3 {
                        flat_cycles.push(cycle);
                    }
                }
            } else {
                stack.extend(gen.children.iter().copied());
            }
        }

        let flat = if flat_cycles.is_empty() {
            Vec::new()
        } else {
            let simple: Vec<PolyArea> = flat_cycles
                .into_iter()
                .map(|c| PolyArea::from_cycle(c, color, store))
                .collect();
            CombineAreas::new(simple).execute(store)?.areas
        };

        for &(id, z) in &heights {
            store.set_z(id, z);
        }
        Ok(Bevel { model, flat })
    }
}
