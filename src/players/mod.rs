//! The player resource: model, service, and HTTP handlers.

pub mod handlers;
mod model;
mod service;

pub use model::Player;
pub use service::{PlayerService, ServiceError};
