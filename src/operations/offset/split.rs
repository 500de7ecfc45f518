use super::event::OffsetEvent;
use super::generation::merge_consecutive;
use super::spoke::Spoke;
use crate::geometry::{PointId, PointStore};

/// Splits a face in two at an edge event.
///
/// With the splitting spoke at index `si` and the struck advancing edge
/// running from index `pi` to its successor `qi`, the splitting tip has
/// reached a point X on that edge at the event horizon. Pinching the
/// advanced cycle at X partitions the remaining vertices by which arc of
/// the original cycle they lie on:
///
/// - one face takes X followed by the endpoints of spokes `qi .. si-1`,
/// - the other takes X followed by the endpoints of spokes `si+1 .. pi`
///
/// (indices cyclic; X is the single shared collision vertex). Both cycles
/// keep the parent's orientation, their union covers exactly the advanced
/// parent face, and each is cleaned with the same consecutive-coincidence
/// merging the plain advance uses. Operating in spoke-index space, before
/// any merging, keeps the index bookkeeping exact.
#[must_use]
pub fn split_face(
    face: &[Spoke],
    ev: &OffsetEvent,
    t: f64,
    store: &mut PointStore,
) -> (Vec<PointId>, Vec<PointId>) {
    let n = face.len();
    let si = ev.spoke;
    let pi = ev.other_spoke;
    let qi = (pi + 1) % n;
    let x = store.add_point(ev.vertex);

    let mut first = vec![x];
    let mut i = qi;
    while i != si {
        let p = face[i].end_point(t, store);
        first.push(store.add_point(p));
        i = (i + 1) % n;
    }

    let mut second = vec![x];
    let mut i = (si + 1) % n;
    loop {
        let p = face[i].end_point(t, store);
        second.push(store.add_point(p));
        if i == pi {
            break;
        }
        i = (i + 1) % n;
    }

    (merge_consecutive(first), merge_consecutive(second))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::math::polygon_2d::signed_area_2d;
    use crate::math::Point3;
    use crate::operations::offset::{face_at_spoke_ends, next_spoke_events};
    use approx::assert_relative_eq;

    fn store_from(pts: &[(f64, f64)]) -> PointStore {
        let mut store = PointStore::new();
        for &(x, y) in pts {
            store.add_point(Point3::new(x, y, 0.0));
        }
        store
    }

    fn face_spokes(cycle: &[usize], store: &PointStore) -> Result<Vec<Spoke>> {
        let n = cycle.len();
        (0..n)
            .map(|i| {
                Spoke::new(
                    cycle[i],
                    cycle[(i + n - 1) % n],
                    cycle[(i + 1) % n],
                    0,
                    i,
                    store,
                )
            })
            .collect()
    }

    fn coords(ids: &[PointId], store: &PointStore) -> Vec<Point3> {
        ids.iter().map(|&id| store.pos(id)).collect()
    }

    #[test]
    fn notch_split_yields_two_ccw_triangles() {
        let mut store = store_from(&[
            (0.0, 0.0),
            (0.5, 0.25),
            (1.0, 0.0),
            (1.0, 1.0),
            (0.0, 1.0),
        ]);
        let faces = vec![face_spokes(&[0, 1, 2, 3, 4], &store).unwrap()];
        let (t, _, ee) = next_spoke_events(&faces, 0, 1, &store);
        let ev = &ee[0];

        let (first, second) = split_face(&faces[0], ev, t, &mut store);
        assert_eq!(first.len(), 3);
        assert_eq!(second.len(), 3);
        let a1 = signed_area_2d(&coords(&first, &store));
        let a2 = signed_area_2d(&coords(&second, &store));
        assert!(a1 > 0.0, "first half must stay CCW");
        assert!(a2 > 0.0, "second half must stay CCW");

        let advanced = face_at_spoke_ends(&faces[0], t, &mut store);
        let total = signed_area_2d(&coords(&advanced, &store));
        assert_relative_eq!(a1 + a2, total, max_relative = 1e-9);
    }

    #[test]
    fn split_halves_share_only_the_collision_vertex() {
        let mut store = store_from(&[
            (0.0, 0.0),
            (0.5, 0.25),
            (1.0, 0.0),
            (1.0, 1.0),
            (0.0, 1.0),
        ]);
        let faces = vec![face_spokes(&[0, 1, 2, 3, 4], &store).unwrap()];
        let (t, _, ee) = next_spoke_events(&faces, 0, 1, &store);
        let ev = &ee[0];

        let (first, second) = split_face(&faces[0], ev, t, &mut store);
        let shared: Vec<PointId> = first
            .iter()
            .filter(|id| second.contains(id))
            .copied()
            .collect();
        assert_eq!(shared.len(), 1);
        let x = store.pos(shared[0]);
        assert_relative_eq!(x.x, ev.vertex.x, epsilon = 1e-12);
        assert_relative_eq!(x.y, ev.vertex.y, epsilon = 1e-12);
    }
}
