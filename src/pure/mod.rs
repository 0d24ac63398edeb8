//! Pure state and geometry: everything in here is directly testable without
//! talking to an X server.
pub mod geometry;
pub mod hints;

pub use geometry::{Point, Rect};
pub use hints::SizeHints;
