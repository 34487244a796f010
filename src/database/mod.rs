//! Player persistence — the repository trait consumed by the service layer
//! and an in-memory implementation.
//!
//! Repository calls are synchronous and fail fast; "not found" is reported as
//! [`RepositoryError::NotFound`], distinct from every other failure.

use thiserror::Error;

use crate::players::Player;

mod memory;

pub use memory::MemoryRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,

    #[error("record with id {0} already exists")]
    Duplicate(i64),

    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Synchronous CRUD over Player records keyed by `id`.
pub trait PlayerRepository: Send + Sync {
    /// Every stored player, ordered by id.
    fn find_all(&self) -> Result<Vec<Player>, RepositoryError>;

    fn find_by_id(&self, id: i64) -> Result<Player, RepositoryError>;

    fn find_by_squad_number(&self, squad_number: i32) -> Result<Player, RepositoryError>;

    /// Stores a new record; fails with [`RepositoryError::Duplicate`] if the id is taken.
    fn insert(&self, player: &Player) -> Result<(), RepositoryError>;

    /// Upsert: overwrites the record with `player.id`, creating it if absent.
    fn replace(&self, player: &Player) -> Result<(), RepositoryError>;

    fn remove(&self, id: i64) -> Result<(), RepositoryError>;
}
