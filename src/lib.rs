pub mod api;
pub mod config;
pub mod deploy;
pub mod events;
pub mod metrics;
pub mod pipeline;
pub mod probe;
pub mod suite;

pub use crate::config::Config;
pub use crate::pipeline::{Pipeline, PipelineError};
