//! worksim-sink — Submission sink integrations.
//!
//! Implements the `SubmissionSink` trait for a JSON-over-HTTP backend and a
//! local results directory, and loads the `worksim.toml` configuration.

pub mod config;
pub mod error;
pub mod file;
pub mod http;
pub mod mock;

pub use config::{create_sink, load_config, load_config_from, SinkConfig, WorksimConfig};
pub use error::SinkError;
pub use file::FileSink;
pub use http::HttpSink;
pub use mock::MockSink;
