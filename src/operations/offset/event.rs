use super::spoke::Spoke;
use crate::geometry::PointStore;
use crate::math::intersect_2d::{line_line_intersect_2d, point_at, spoke_edge_intersect};
use crate::math::{Point3, HORIZON, TOLERANCE};

/// Kind of a predicted wavefront collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Two adjacent spokes in one face converge to a single new vertex.
    Vertex,
    /// A reflex spoke's tip reaches a non-adjacent advancing edge.
    Edge,
}

/// A predicted future collision between wavefront elements.
///
/// Events are transient: computed, compared, and discarded within one
/// simulation step. Spokes are referenced by their `(face, index)`
/// coordinates inside the generation being scanned.
#[derive(Debug, Clone)]
pub struct OffsetEvent {
    pub kind: EventKind,
    /// Time of the collision, relative to the start of its generation.
    pub time: f64,
    /// Predicted intersection point.
    pub vertex: Point3,
    /// Face of the initiating spoke.
    pub face: usize,
    /// Index of the initiating spoke within its face.
    pub spoke: usize,
    /// Face of the partner spoke.
    pub other_face: usize,
    /// For a vertex event, the converging neighbor; for an edge event, the
    /// spoke whose outgoing advancing edge is struck.
    pub other_spoke: usize,
}

/// Predicts the convergence of two adjacent spokes.
///
/// Returns `None` when the rays are parallel or collinear, or when the
/// intersection lies backward along either ray. The event time is the
/// *later* of the two arrival times: the new vertex exists only once both
/// converging edges have actually arrived.
#[must_use]
pub fn vertex_event(spoke: &Spoke, other: &Spoke, store: &PointStore) -> Option<OffsetEvent> {
    let a = store.pos(spoke.origin);
    let c = store.pos(other.origin);
    let (si, ti) = line_line_intersect_2d(&a, &spoke.dir, &c, &other.dir)?;
    if si < 0.0 || ti < 0.0 {
        return None;
    }
    let vertex = point_at(&a, &spoke.dir, si);
    let time = (si / spoke.speed).max(ti / other.speed);
    Some(OffsetEvent {
        kind: EventKind::Vertex,
        time,
        vertex,
        face: spoke.face,
        spoke: spoke.index,
        other_face: other.face,
        other_spoke: other.index,
    })
}

/// Predicts a reflex spoke's tip striking another spoke's advancing edge.
///
/// The advancing edge is the boundary edge from `other` to its successor in
/// its own face, moving at unit perpendicular speed while its endpoints
/// ride their spokes. Degenerate or singular configurations simply produce
/// no event.
#[must_use]
pub fn edge_event(
    spoke: &Spoke,
    other: &Spoke,
    faces: &[Vec<Spoke>],
    store: &PointStore,
) -> Option<OffsetEvent> {
    let other_face = &faces[other.face];
    let next = &other_face[(other.index + 1) % other_face.len()];
    let o = store.pos(spoke.origin);
    let oo = store.pos(other.origin);
    let oonext = store.pos(next.origin);
    let (t, _w) = spoke_edge_intersect(
        &o,
        &spoke.motion(),
        &oo,
        &other.motion(),
        &oonext,
        &next.motion(),
    )?;
    let vertex = point_at(&o, &spoke.motion(), t);
    Some(OffsetEvent {
        kind: EventKind::Edge,
        time: t,
        vertex,
        face: spoke.face,
        spoke: spoke.index,
        other_face: other.face,
        other_spoke: other.index,
    })
}

/// Finds the next events for one spoke: the single vertex event against its
/// face-successor (the predecessor pair is covered when that spoke is
/// scanned), and, for reflex spokes only, edge events against every other
/// spoke's advancing edge across all faces.
///
/// Returns the minimum event time plus every vertex/edge event within
/// [`TOLERANCE`] of it; simultaneous events must be resolved together.
/// When the spoke has no event at all, the returned time is [`HORIZON`]
/// and both lists are empty.
#[must_use]
pub fn next_spoke_events(
    faces: &[Vec<Spoke>],
    face_idx: usize,
    index: usize,
    store: &PointStore,
) -> (f64, Vec<OffsetEvent>, Vec<OffsetEvent>) {
    let face = &faces[face_idx];
    let nf = face.len();
    let spoke = &face[index];
    let mut best_t = HORIZON;
    let mut vertex_events = Vec::new();
    let mut edge_events: Vec<OffsetEvent> = Vec::new();

    let next = &face[(index + 1) % nf];
    if let Some(ev) = vertex_event(spoke, next, store) {
        best_t = ev.time;
        vertex_events.push(ev);
    }

    if spoke.is_reflex {
        let prev_index = (index + nf - 1) % nf;
        for (fi, f) in faces.iter().enumerate() {
            for (oi, other) in f.iter().enumerate() {
                if fi == face_idx && (oi == index || oi == prev_index) {
                    continue;
                }
                let Some(ev) = edge_event(spoke, other, faces, store) else {
                    continue;
                };
                if ev.time < best_t - TOLERANCE {
                    vertex_events.clear();
                    edge_events.clear();
                    best_t = ev.time;
                }
                if (ev.time - best_t).abs() < TOLERANCE
                    && !edge_events
                        .iter()
                        .any(|e| e.other_face == ev.other_face && e.other_spoke == ev.other_spoke)
                {
                    edge_events.push(ev);
                }
            }
        }
    }

    (best_t, vertex_events, edge_events)
}
