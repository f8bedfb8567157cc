pub mod config;
pub mod errors;
pub mod http;
pub mod pipeline;

pub use config::Config;
pub use errors::WaniAnkiError;
pub use pipeline::{
    run,
    ExportSummary,
};
