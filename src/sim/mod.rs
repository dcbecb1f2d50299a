//! Membrane simulation
//!
//! Pure and host-independent:
//! - Explicit `SimContext`, passed by `&mut`
//! - Idle phases seeded per node index
//! - No rendering or platform dependencies

pub mod geometry;
pub mod idle;
pub mod pointer;
pub mod sampler;
pub mod state;
pub mod tick;

pub use geometry::OffsetLimits;
pub use pointer::{pointer_down, pointer_enter, pointer_leave, pointer_move, pointer_up};
pub use sampler::{CornerRadii, CornerRadius, parse_corner_radius, sample_boundary};
pub use state::{BoundaryState, Layout, Node, PointerState, SimContext};
pub use tick::{StepStats, step};
