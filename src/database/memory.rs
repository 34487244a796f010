use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{PlayerRepository, RepositoryError};
use crate::players::Player;

/// Squad loaded when no seed file is configured.
pub const DEFAULT_SEED: &str = include_str!("../../data/players.json");

/// In-process [`PlayerRepository`] holding rows in id order.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    rows: RwLock<BTreeMap<i64, Player>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a repository from `players`. A later duplicate id replaces an earlier one.
    pub fn from_players(players: impl IntoIterator<Item = Player>) -> Self {
        let rows = players.into_iter().map(|p| (p.id, p)).collect();
        Self {
            rows: RwLock::new(rows),
        }
    }

    /// Builds a repository from a JSON array of players.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let players: Vec<Player> = serde_json::from_str(json)?;
        Ok(Self::from_players(players))
    }

    /// Builds a repository holding the bundled squad.
    pub fn seeded() -> Result<Self, serde_json::Error> {
        Self::from_json(DEFAULT_SEED)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<i64, Player>>, RepositoryError> {
        self.rows
            .read()
            .map_err(|_| RepositoryError::Unavailable("lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<i64, Player>>, RepositoryError> {
        self.rows
            .write()
            .map_err(|_| RepositoryError::Unavailable("lock poisoned".into()))
    }
}

impl PlayerRepository for MemoryRepository {
    fn find_all(&self) -> Result<Vec<Player>, RepositoryError> {
        Ok(self.read()?.values().cloned().collect())
    }

    fn find_by_id(&self, id: i64) -> Result<Player, RepositoryError> {
        self.read()?
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    fn find_by_squad_number(&self, squad_number: i32) -> Result<Player, RepositoryError> {
        self.read()?
            .values()
            .find(|p| p.squad_number == squad_number)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    fn insert(&self, player: &Player) -> Result<(), RepositoryError> {
        let mut rows = self.write()?;
        if rows.contains_key(&player.id) {
            return Err(RepositoryError::Duplicate(player.id));
        }
        rows.insert(player.id, player.clone());
        Ok(())
    }

    fn replace(&self, player: &Player) -> Result<(), RepositoryError> {
        self.write()?.insert(player.id, player.clone());
        Ok(())
    }

    fn remove(&self, id: i64) -> Result<(), RepositoryError> {
        self.write()?
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}
