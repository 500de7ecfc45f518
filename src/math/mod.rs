pub mod intersect_2d;
pub mod polygon_2d;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons
/// (parallelism, event-time banding, forward-parameter tests).
pub const TOLERANCE: f64 = 1e-7;

/// Distance below which two coordinates count as the same point.
/// Governs point-table deduplication and vertex merging.
pub const DIST_TOLERANCE: f64 = 1e-3;

/// Sentinel spoke speed substituted when the interior half-angle sine
/// falls below [`TOLERANCE`], keeping speeds finite at 0°/180° angles.
pub const SENTINEL_SPEED: f64 = 1e7;

/// Time a generation ends at when no event ever occurs.
pub const HORIZON: f64 = 1e8;
