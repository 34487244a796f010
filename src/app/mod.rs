//! Route table — wires the player handlers, the response cache, and the
//! request logger into a [`Router`].
//!
//! | Method | Path                                  | Cache role                      |
//! |--------|---------------------------------------|---------------------------------|
//! | GET    | `/players`                            | read-through                    |
//! | GET    | `/players/:id`                        | read-through                    |
//! | GET    | `/players/squadnumber/:squadnumber`   | read-through                    |
//! | POST   | `/players`                            | evicts collection               |
//! | PUT    | `/players/:id`                        | evicts collection + `:id`       |
//! | DELETE | `/players/:id`                        | evicts collection + `:id`       |
//! | GET    | `/health`                             | none                            |
//!
//! Trailing-slash aliases reach the same routes and cache keys through
//! [`crate::http::path::normalize`].

use std::sync::Arc;

use crate::cache::ResponseCache;
use crate::context::Context;
use crate::middleware::{LoggerMiddleware, from_middleware};
use crate::players::{PlayerService, handlers};
use crate::router::IntoHandler;
use crate::{Response, Router};

pub const PLAYERS: &str = "/players";
pub const PLAYER_BY_ID: &str = "/players/:id";
pub const PLAYER_BY_SQUAD_NUMBER: &str = "/players/squadnumber/:squadnumber";
pub const HEALTH: &str = "/health";

/// Every key a player write may evict. Templates whose parameters the write
/// route does not capture are skipped.
const PLAYER_KEYS: [&str; 3] = [PLAYERS, PLAYER_BY_ID, PLAYER_BY_SQUAD_NUMBER];

type PlayerHandler = fn(&PlayerService, Context) -> Response;

// Adapts a synchronous service-backed handler to the router's async handler shape.
fn bind(service: &PlayerService, handler: PlayerHandler) -> impl IntoHandler {
    let service = service.clone();
    move |ctx: Context| {
        let service = service.clone();
        async move { handler(&service, ctx) }
    }
}

/// Builds the API router over `service`, caching reads in `cache`.
pub fn router(service: &PlayerService, cache: &ResponseCache) -> Router {
    let mut router = Router::new();
    router.middleware(from_middleware(Arc::new(LoggerMiddleware)));

    router.get(HEALTH, |ctx: Context| async move { handlers::health(ctx) });

    router
        .get(PLAYERS, bind(service, handlers::retrieve_all))
        .layer(cache.read_through());
    router
        .get(PLAYER_BY_SQUAD_NUMBER, bind(service, handlers::retrieve_by_squad_number))
        .layer(cache.read_through());
    router
        .get(PLAYER_BY_ID, bind(service, handlers::retrieve_by_id))
        .layer(cache.read_through());

    router
        .post(PLAYERS, bind(service, handlers::create))
        .layer(cache.invalidate(&PLAYER_KEYS));
    router
        .put(PLAYER_BY_ID, bind(service, handlers::update))
        .layer(cache.invalidate(&PLAYER_KEYS));
    router
        .delete(PLAYER_BY_ID, bind(service, handlers::delete))
        .layer(cache.invalidate(&PLAYER_KEYS));

    router
}
