//! Round lifecycle rules: the phase gate and deadline sweep planning

mod gate;
mod sweep;

pub use gate::{ensure_action, ensure_submission};
pub use sweep::{is_held, plan as plan_sweep, SweepDecision};
