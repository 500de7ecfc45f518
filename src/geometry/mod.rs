pub mod points;
pub mod poly_area;

pub use points::{PointId, PointStore};
pub use poly_area::{Color, PolyArea};
