//! Containment classification: groups a flat list of simple polygons into
//! boundary/hole nestings before offsetting can run on them.

use crate::error::{ClassifyError, Result};
use crate::geometry::{PointStore, PolyArea};
use crate::math::polygon_2d::{point_in_polygon, PointLocation};
use crate::math::{Point3, TOLERANCE};

/// How many of one polygon's vertices landed strictly inside / exactly on
/// another polygon's boundary.
#[derive(Debug, Clone, Copy, Default)]
pub struct PairClassification {
    pub inside: usize,
    pub on: usize,
}

/// Dense N×N matrix of vertex classifications; `cell(i, j)` counts
/// polygon j's vertices against polygon i's boundary.
#[derive(Debug)]
pub struct ContainmentMatrix {
    n: usize,
    cells: Vec<PairClassification>,
}

impl ContainmentMatrix {
    /// Classifies every ordered pair of areas once.
    #[must_use]
    pub fn build(areas: &[PolyArea], store: &PointStore) -> Self {
        let n = areas.len();
        let coords: Vec<Vec<Point3>> = areas.iter().map(|a| a.boundary_coords(store)).collect();
        let mut cells = vec![PairClassification::default(); n * n];
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                cells[i * n + j] = classify_pair(&coords[i], &coords[j]);
            }
        }
        Self { n, cells }
    }

    /// Classification of polygon j's vertices against polygon i.
    #[must_use]
    pub fn cell(&self, i: usize, j: usize) -> PairClassification {
        self.cells[i * self.n + j]
    }
}

/// Counts how many vertices of `inner` are strictly inside / on the
/// boundary of `outer` (holes ignored).
#[must_use]
pub fn classify_pair(outer: &[Point3], inner: &[Point3]) -> PairClassification {
    let mut result = PairClassification::default();
    for v in inner {
        match point_in_polygon(v, outer) {
            PointLocation::Inside => result.inside += 1,
            PointLocation::OnBoundary => result.on += 1,
            PointLocation::Outside => {}
        }
    }
    result
}

/// Fraction of a polygon's vertices that must land strictly inside another
/// before the former counts as contained.
const CONTAINMENT_FRACTION: f64 = 0.55;

/// Decides whether polygon i contains polygon j.
///
/// True iff at least one vertex of j is strictly inside i, not all of j's
/// vertices lie exactly on i's boundary, and the inside fraction reaches
/// [`CONTAINMENT_FRACTION`]. When the symmetric test also passes (mutual
/// containment from near-duplicate or overlapping input), the polygon with
/// the larger area magnitude is the container; at exactly equal magnitudes
/// the lower index wins, keeping the relation antisymmetric.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn contains(
    i: usize,
    j: usize,
    areas: &[f64],
    lens: &[usize],
    matrix: &ContainmentMatrix,
) -> bool {
    if i == j || lens[i] == 0 || lens[j] == 0 {
        return false;
    }
    let ji = matrix.cell(i, j);
    if ji.inside == 0
        || ji.on == lens[j]
        || (ji.inside as f64) / (lens[j] as f64) < CONTAINMENT_FRACTION
    {
        return false;
    }
    let ij = matrix.cell(j, i);
    if (ij.inside as f64) / (lens[i] as f64) > CONTAINMENT_FRACTION {
        let ai = areas[i].abs();
        let aj = areas[j].abs();
        if (ai - aj).abs() <= TOLERANCE {
            i < j
        } else {
            ai > aj
        }
    } else {
        true
    }
}

/// Result of a nesting pass: areas with holes attached, plus the indices of
/// any input polygons that could not be assigned (malformed input).
#[derive(Debug)]
pub struct Nesting {
    pub areas: Vec<PolyArea>,
    pub unassigned: Vec<usize>,
}

/// Groups simple polygons (no holes yet) into polygons-with-holes.
///
/// Every input polygon appears in the output exactly once, either as an
/// outer boundary or as a hole of one. Input boundaries are expected CCW;
/// attached holes come out CW.
#[derive(Debug)]
pub struct CombineAreas {
    areas: Vec<PolyArea>,
}

impl CombineAreas {
    /// Creates a new combine operation over the given simple areas.
    #[must_use]
    pub fn new(areas: Vec<PolyArea>) -> Self {
        Self { areas }
    }

    /// Executes the nesting resolution.
    ///
    /// A round that assigns nothing signals malformed (typically
    /// self-intersecting) input; the leftover indices are reported in
    /// [`Nesting::unassigned`] and logged, never looped on.
    ///
    /// # Errors
    ///
    /// Returns `ClassifyError::InvalidInput` if any input area already
    /// carries holes.
    pub fn execute(&self, store: &PointStore) -> Result<Nesting> {
        if self.areas.iter().any(|a| !a.holes.is_empty()) {
            return Err(ClassifyError::InvalidInput(
                "combine input must be simple polygons without holes".to_owned(),
            )
            .into());
        }
        let n = self.areas.len();
        let matrix = ContainmentMatrix::build(&self.areas, store);
        let areas: Vec<f64> = self.areas.iter().map(|a| a.signed_area(store)).collect();
        let lens: Vec<usize> = self.areas.iter().map(|a| a.boundary.len()).collect();

        let mut cont = vec![false; n * n];
        for i in 0..n {
            for j in 0..n {
                cont[i * n + j] = contains(i, j, &areas, &lens, &matrix);
            }
        }

        let (assignments, unassigned) = assign_rounds(n, &cont);
        if !unassigned.is_empty() {
            tracing::warn!(
                ?unassigned,
                "nesting made no progress; input is malformed or self-intersecting"
            );
        }

        let mut out = Vec::with_capacity(assignments.len());
        for (boundary, holes) in assignments {
            let mut pa = self.areas[boundary].clone();
            for j in holes {
                pa.add_hole(&self.areas[j]);
            }
            out.push(pa);
        }
        Ok(Nesting {
            areas: out,
            unassigned,
        })
    }
}

/// Repeated assignment rounds over a containment relation.
///
/// Each round assigns every still-unassigned polygon not contained by any
/// other unassigned polygon as a boundary, together with its direct holes
/// (contained with no unassigned polygon strictly between). Holes of holes
/// surface as boundaries in later rounds. Stops after n rounds or the
/// first round that makes no progress.
fn assign_rounds(n: usize, cont: &[bool]) -> (Vec<(usize, Vec<usize>)>, Vec<usize>) {
    let mut assigned = vec![false; n];
    let mut out = Vec::new();
    let mut remaining = n;

    for _ in 0..n {
        if remaining == 0 {
            break;
        }
        let before = remaining;
        for i in 0..n {
            if assigned[i] || !is_boundary(i, n, cont, &assigned) {
                continue;
            }
            assigned[i] = true;
            remaining -= 1;
            let holes = direct_holes(i, n, cont, &mut assigned);
            remaining -= holes.len();
            out.push((i, holes));
        }
        if remaining == before {
            break;
        }
    }

    let unassigned = (0..n).filter(|&i| !assigned[i]).collect();
    (out, unassigned)
}

/// True when no unassigned polygon other than i contains i.
fn is_boundary(i: usize, n: usize, cont: &[bool], assigned: &[bool]) -> bool {
    (0..n).all(|j| j == i || assigned[j] || !cont[j * n + i])
}

/// Unassigned polygons directly inside boundary i (nesting depth exactly
/// one); marks them assigned.
fn direct_holes(i: usize, n: usize, cont: &[bool], assigned: &mut [bool]) -> Vec<usize> {
    let mut holes = Vec::new();
    for j in 0..n {
        if assigned[j] || !cont[i * n + j] {
            continue;
        }
        let directly = (0..n)
            .all(|k| k == j || assigned[k] || !(cont[i * n + k] && cont[k * n + j]));
        if directly {
            holes.push(j);
            assigned[j] = true;
        }
    }
    holes
}
