use super::{Point3, Vector3, TOLERANCE};
use crate::error::{GeometryError, Result};

/// Location of a point relative to a polygon boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointLocation {
    Inside,
    OnBoundary,
    Outside,
}

/// Computes the signed area of a polygon in the XY plane (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area_2d(points: &[Point3]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Classifies a point against a CCW polygon in the XY plane.
///
/// Crossing test after Haines (Graphics Gems IV `ptinpoly`). A point
/// coinciding with a polygon vertex reports [`PointLocation::OnBoundary`];
/// points on the interior of an edge are resolved by the crossing parity.
#[must_use]
pub fn point_in_polygon(v: &Point3, polygon: &[Point3]) -> PointLocation {
    let n = polygon.len();
    if n == 0 {
        return PointLocation::Outside;
    }
    let (xv, yv) = (v.x, v.y);
    let (mut x0, mut y0) = (polygon[n - 1].x, polygon[n - 1].y);
    if (x0 - xv).abs() < TOLERANCE && (y0 - yv).abs() < TOLERANCE {
        return PointLocation::OnBoundary;
    }
    let mut yflag0 = y0 > yv;
    let mut inside = false;
    for p in polygon {
        let (x1, y1) = (p.x, p.y);
        if (x1 - xv).abs() < TOLERANCE && (y1 - yv).abs() < TOLERANCE {
            return PointLocation::OnBoundary;
        }
        let yflag1 = y1 > yv;
        if yflag0 != yflag1 {
            let xflag0 = x0 > xv;
            let xflag1 = x1 > xv;
            if xflag0 == xflag1 {
                if xflag0 {
                    inside = !inside;
                }
            } else {
                let z = x1 - (y1 - yv) * (x0 - x1) / (y0 - y1);
                if z >= xv {
                    inside = !inside;
                }
            }
        }
        x0 = x1;
        y0 = y1;
        yflag0 = yflag1;
    }
    if inside {
        PointLocation::Inside
    } else {
        PointLocation::Outside
    }
}

/// Returns true when the boundary turn at `v` (coming from `prev`, leaving
/// toward `next`) is clockwise, i.e. the vertex is reflex on a CCW boundary.
#[must_use]
pub fn is_reflex_turn(prev: &Point3, v: &Point3, next: &Point3) -> bool {
    let ux = v.x - prev.x;
    let uy = v.y - prev.y;
    let wx = next.x - v.x;
    let wy = next.y - v.y;
    ux * wy - uy * wx < -TOLERANCE
}

/// Interior angle at `v` formed by (prev, v, next), in radians `[0, π]`.
#[must_use]
pub fn interior_angle(prev: &Point3, v: &Point3, next: &Point3) -> f64 {
    let a = Vector3::new(prev.x - v.x, prev.y - v.y, 0.0);
    let b = Vector3::new(next.x - v.x, next.y - v.y, 0.0);
    let na = a.norm();
    let nb = b.norm();
    if na < TOLERANCE || nb < TOLERANCE {
        return 0.0;
    }
    let cos = (a.dot(&b) / (na * nb)).clamp(-1.0, 1.0);
    cos.acos()
}

/// Computes the normalized direction from point `a` to point `b`.
///
/// # Errors
///
/// Returns `GeometryError::ZeroLengthSegment` if the segment has zero length.
pub fn segment_direction(a: &Point3, b: &Point3) -> Result<Vector3> {
    let d = b - a;
    let len = (d.x * d.x + d.y * d.y).sqrt();
    if len < TOLERANCE {
        return Err(GeometryError::ZeroLengthSegment {
            x0: a.x,
            y0: a.y,
            x1: b.x,
            y1: b.y,
        }
        .into());
    }
    Ok(Vector3::new(d.x / len, d.y / len, 0.0))
}
