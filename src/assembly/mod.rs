pub mod field_map;
pub mod orchestrator;

pub use orchestrator::{assemble, AssemblyOutcome};
