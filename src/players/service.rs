use std::sync::Arc;

use thiserror::Error;

use super::Player;
use crate::StatusCode;
use crate::database::{PlayerRepository, RepositoryError};

/// Failures surfaced by [`PlayerService`], one per HTTP status.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("player {0} already exists")]
    Conflict(i64),

    #[error("player not found")]
    NotFound,

    #[error("repository failure: {0}")]
    Internal(#[source] RepositoryError),
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BadRequest,
            Self::Conflict(_) => StatusCode::Conflict,
            Self::NotFound => StatusCode::NotFound,
            Self::Internal(_) => StatusCode::InternalServerError,
        }
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound,
            other => Self::Internal(other),
        }
    }
}

/// Player use cases over a shared repository.
///
/// Writes check for existence first: `create` refuses a taken id, and
/// `update`/`delete` refuse an absent one. `replace` on the repository is an
/// upsert, so without the check an update of a missing id would create it.
#[derive(Clone)]
pub struct PlayerService {
    repository: Arc<dyn PlayerRepository>,
}

impl PlayerService {
    pub fn new(repository: Arc<dyn PlayerRepository>) -> Self {
        Self { repository }
    }

    pub fn create(&self, player: &Player) -> Result<(), ServiceError> {
        match self.repository.find_by_id(player.id) {
            Ok(_) => return Err(ServiceError::Conflict(player.id)),
            Err(RepositoryError::NotFound) => {}
            Err(e) => return Err(ServiceError::Internal(e)),
        }
        self.repository.insert(player).map_err(ServiceError::Internal)
    }

    pub fn retrieve_all(&self) -> Result<Vec<Player>, ServiceError> {
        Ok(self.repository.find_all()?)
    }

    pub fn retrieve_by_id(&self, id: i64) -> Result<Player, ServiceError> {
        Ok(self.repository.find_by_id(id)?)
    }

    pub fn retrieve_by_squad_number(&self, squad_number: i32) -> Result<Player, ServiceError> {
        Ok(self.repository.find_by_squad_number(squad_number)?)
    }

    /// Fully replaces the player stored under `id`.
    pub fn update(&self, id: i64, player: &Player) -> Result<(), ServiceError> {
        self.repository.find_by_id(id)?;
        if player.id != id {
            return Err(ServiceError::BadRequest(format!(
                "payload id {} does not match path id {id}",
                player.id
            )));
        }
        self.repository.replace(player).map_err(ServiceError::Internal)
    }

    pub fn delete(&self, id: i64) -> Result<(), ServiceError> {
        self.repository.find_by_id(id)?;
        self.repository.remove(id).map_err(ServiceError::Internal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryRepository;

    fn service() -> PlayerService {
        PlayerService::new(Arc::new(MemoryRepository::seeded().unwrap()))
    }

    fn newcomer() -> Player {
        Player {
            id: 19,
            first_name: "Leandro".into(),
            middle_name: "Daniel".into(),
            last_name: "Paredes".into(),
            date_of_birth: "1994-06-29T00:00:00.000Z".into(),
            squad_number: 5,
            position: "Defensive Midfield".into(),
            abbr_position: "DM".into(),
            team: "AS Roma".into(),
            league: "Serie A".into(),
            starting11: false,
        }
    }

    /// Repository that fails every call with `Unavailable`.
    struct DownRepository;

    impl PlayerRepository for DownRepository {
        fn find_all(&self) -> Result<Vec<Player>, RepositoryError> {
            Err(RepositoryError::Unavailable("down".into()))
        }
        fn find_by_id(&self, _id: i64) -> Result<Player, RepositoryError> {
            Err(RepositoryError::Unavailable("down".into()))
        }
        fn find_by_squad_number(&self, _n: i32) -> Result<Player, RepositoryError> {
            Err(RepositoryError::Unavailable("down".into()))
        }
        fn insert(&self, _player: &Player) -> Result<(), RepositoryError> {
            Err(RepositoryError::Unavailable("down".into()))
        }
        fn replace(&self, _player: &Player) -> Result<(), RepositoryError> {
            Err(RepositoryError::Unavailable("down".into()))
        }
        fn remove(&self, _id: i64) -> Result<(), RepositoryError> {
            Err(RepositoryError::Unavailable("down".into()))
        }
    }

    #[test]
    fn create_then_retrieve() {
        let svc = service();
        svc.create(&newcomer()).unwrap();
        assert_eq!(svc.retrieve_by_id(19).unwrap().last_name, "Paredes");
        assert_eq!(svc.retrieve_by_squad_number(5).unwrap().id, 19);
    }

    #[test]
    fn create_existing_is_conflict() {
        let svc = service();
        let mut existing = newcomer();
        existing.id = 1;
        let err = svc.create(&existing).unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(1)));
        assert_eq!(err.status(), StatusCode::Conflict);
    }

    #[test]
    fn retrieve_all_empty_is_ok() {
        let svc = PlayerService::new(Arc::new(MemoryRepository::new()));
        assert!(svc.retrieve_all().unwrap().is_empty());
    }

    #[test]
    fn update_missing_is_not_found_not_upsert() {
        let svc = service();
        let err = svc.update(19, &newcomer()).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound));
        assert!(matches!(svc.retrieve_by_id(19), Err(ServiceError::NotFound)));
    }

    #[test]
    fn update_id_mismatch_is_bad_request() {
        let svc = service();
        let err = svc.update(1, &newcomer()).unwrap_err();
        assert_eq!(err.status(), StatusCode::BadRequest);
    }

    #[test]
    fn update_replaces_every_field() {
        let svc = service();
        let mut replacement = newcomer();
        replacement.id = 1;
        svc.update(1, &replacement).unwrap();
        assert_eq!(svc.retrieve_by_id(1).unwrap(), replacement);
    }

    #[test]
    fn delete_then_absent() {
        let svc = service();
        svc.delete(1).unwrap();
        assert!(matches!(svc.retrieve_by_id(1), Err(ServiceError::NotFound)));
        assert!(matches!(svc.delete(1), Err(ServiceError::NotFound)));
    }

    #[test]
    fn repository_failures_are_internal() {
        let svc = PlayerService::new(Arc::new(DownRepository));
        assert_eq!(svc.retrieve_all().unwrap_err().status(), StatusCode::InternalServerError);
        assert_eq!(svc.retrieve_by_id(1).unwrap_err().status(), StatusCode::InternalServerError);
        assert_eq!(svc.create(&newcomer()).unwrap_err().status(), StatusCode::InternalServerError);
        assert_eq!(svc.delete(1).unwrap_err().status(), StatusCode::InternalServerError);
    }
}
