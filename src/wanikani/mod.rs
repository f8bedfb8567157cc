pub mod api;
pub mod audio;
pub mod rate_limit;
pub mod types;

pub use api::{
    export_level,
    WaniKaniClient,
};
pub use types::{
    Subject,
    User,
};
