pub mod logging;
pub mod output;
pub mod progress;
pub mod types;
pub mod utils;

pub use logging::*;
pub use output::{output_path_for, write_results, OutputFormat, OutputRecord, RecordStatus};
pub use progress::{create_count_progress_bar, create_hidden_progress_bar};
pub use types::*;
pub use utils::*;
