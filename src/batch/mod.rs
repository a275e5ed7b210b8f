pub mod governor;
pub mod input;
pub mod runner;

pub use governor::{ConsecutiveCounter, FailureGovernor, GovernorConfig, GovernorState};
pub use input::{collect_input_files, load_items, parse_item};
pub use runner::{BatchRunner, RunnerConfig};
