use super::{Point3, Vector3, TOLERANCE};

/// Parametric 2D line-line intersection.
///
/// Given lines `p1 + t * d1` and `p2 + u * d2`, returns `(t, u)` if not
/// parallel. With normalized directions the parameters are distances.
#[must_use]
pub fn line_line_intersect_2d(
    p1: &Point3,
    d1: &Vector3,
    p2: &Point3,
    d2: &Vector3,
) -> Option<(f64, f64)> {
    let cross = d1.x * d2.y - d1.y * d2.x;
    if cross.abs() < TOLERANCE {
        return None;
    }
    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;
    let t = (dx * d2.y - dy * d2.x) / cross;
    let u = (dx * d1.y - dy * d1.x) / cross;
    Some((t, u))
}

/// Linear interpolation: `origin + dir * t`.
#[must_use]
pub fn point_at(origin: &Point3, dir: &Vector3, t: f64) -> Point3 {
    Point3::new(origin.x + dir.x * t, origin.y + dir.y * t, origin.z)
}

/// Intersects a moving spoke tip with an advancing wavefront edge.
///
/// The tip is at `o + motion * t`; the edge runs through `oo + oo_motion * t`
/// with direction `p = normalize(oonext - oo)`, its far end at
/// `oonext + oonext_motion * t`. Solves
///
/// ```text
/// o + motion * t = oo + oo_motion * t + p * w
/// ```
///
/// for `(t, w)` and additionally derives `ww`, the distance of the hit from
/// the far end measured along `-p`. Returns `None` when the system is
/// singular, when the hit lies backward along the tip's path (`t < 0`), or
/// when the hit falls outside the edge as judged from *either* end
/// (`w < 0` or `ww < 0` — both ends must agree the hit lies between them).
#[must_use]
pub fn spoke_edge_intersect(
    o: &Point3,
    motion: &Vector3,
    oo: &Point3,
    oo_motion: &Vector3,
    oonext: &Point3,
    oonext_motion: &Vector3,
) -> Option<(f64, f64)> {
    let px = oonext.x - oo.x;
    let py = oonext.y - oo.y;
    let plen = (px * px + py * py).sqrt();
    if plen < TOLERANCE {
        return None;
    }
    let c = px / plen;
    let f = py / plen;

    // a = b*t + c*w, d = e*t + f*w
    let a = o.x - oo.x;
    let d = o.y - oo.y;
    let b = oo_motion.x - motion.x;
    let e = oo_motion.y - motion.y;
    let det = b * f - c * e;
    if det.abs() < TOLERANCE {
        return None;
    }
    let t = (a * f - c * d) / det;
    let w = (b * d - a * e) / det;
    if t < 0.0 || w < 0.0 {
        return None;
    }

    // Distance from the far end, measured against -p.
    let aa = o.x - oonext.x;
    let dd = o.y - oonext.y;
    let bb = oonext_motion.x - motion.x;
    let ee = oonext_motion.y - motion.y;
    let ww = if c.abs() > TOLERANCE {
        (aa - bb * t) / -c
    } else if f.abs() > TOLERANCE {
        (dd - ee * t) / -f
    } else {
        return None;
    };
    if ww < 0.0 {
        return None;
    }
    Some((t, w))
}
