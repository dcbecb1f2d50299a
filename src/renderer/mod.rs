//! Path rendering
//!
//! The node ring becomes a closed cubic curve, serialized as SVG path data
//! and handed to a [`RenderSink`].

pub mod curve;
pub mod sink;

pub use curve::{ClosedCurve, CubicSegment, catmull_rom_closed};
pub use sink::{PathRecorder, RenderSink};
