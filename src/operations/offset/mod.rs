//! The polygon offset / wavefront engine: simulates all boundary edges of a
//! region moving inward at unit perpendicular speed and records the sequence
//! of topologically-changing faces over time.

mod event;
mod generation;
mod spoke;
mod split;

pub use event::{edge_event, next_spoke_events, vertex_event, EventKind, OffsetEvent};
pub use generation::{face_at_spoke_ends, Generation, GenerationId, OffsetBuilder, OffsetChain};
pub use split::split_face;
pub use spoke::Spoke;
