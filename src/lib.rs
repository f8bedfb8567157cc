pub mod anki;
pub mod core;
pub mod persistence;
pub mod wanikani;

pub use crate::core::{
    run,
    Config,
    ExportSummary,
    WaniAnkiError,
};
