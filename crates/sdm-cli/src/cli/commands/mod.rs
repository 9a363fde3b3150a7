//! CLI command handlers. Each command is in its own file.

mod completions;
mod get;
mod plan;

pub use completions::{run_completions, run_man};
pub use get::run_get;
pub use plan::run_plan;

#[cfg(test)]
pub(crate) use get::resolve_target;
