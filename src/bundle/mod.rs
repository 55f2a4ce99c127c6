//! Bundle resolution and target planning.

mod resolve;
mod target;

pub use resolve::{MAX_DEPTH, resolve_bundle};
pub use target::{BuildTarget, Plan, plan_targets};
