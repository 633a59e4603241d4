//! # Frame Timing
//!
//! Deferred work expressed in elapsed time units and dispatched
//! synchronously by the frame loop. There is no global timer heap:
//! each owner keeps its own `TaskList` and its own transitions.

mod schedule;
mod transition;

pub use schedule::{ScheduledTask, TaskList};
pub use transition::{Interpolator, Transition, TransitionKind, TransitionStep};
