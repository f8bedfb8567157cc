pub mod card;
pub mod model;
pub mod package;
pub mod schema;

pub use card::{
    build_cards,
    Card,
};
pub use model::{
    audio_model,
    wanikani_deck,
    Deck,
    Model,
};
pub use package::Package;
