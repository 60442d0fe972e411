//! Animation scheduling: named animations evaluated as pure functions of
//! elapsed time, once per frame, on the render thread.
//!
//! # Invariants
//! - Elapsed time is measured from one baseline clock reading, never by
//!   summing frame deltas, so it cannot drift and never decreases.
//! - Animations run in registration order; registering twice runs twice.
//! - A scheduler must be initialized before it can register or update;
//!   the type system enforces this (`AnimationScheduler` → `RunningScheduler`).

mod clock;
mod scheduler;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use scheduler::{AnimatedValue, AnimationHandle, AnimationScheduler, RunningScheduler};

pub fn crate_info() -> &'static str {
    "glint-anim v0.1.0"
}
