//! Adapters layer (Hexagonal Architecture)

mod event_publisher;
mod validator_directory;

pub use event_publisher::*;
pub use validator_directory::*;
