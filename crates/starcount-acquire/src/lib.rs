pub mod error;
pub mod fetch;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod resolve;

pub use error::{FetchError, PipelineError};
pub use pipeline::{run, PipelineConfig, RunSummary};
