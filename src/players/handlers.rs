//! HTTP handlers for the player resource.
//!
//! Each handler validates the request shape, calls [`PlayerService`], and maps
//! the outcome to a status code. Numeric path parameters must be spelled
//! canonically (`/players/1`, not `/players/01`); anything else is a 400.
//! Failures carry no body; clients tell them apart by status alone.

use tracing::error;

use super::{Player, PlayerService, ServiceError};
use crate::context::Context;
use crate::{Response, StatusCode};

fn failure(err: ServiceError) -> Response {
    if let ServiceError::Internal(source) = &err {
        error!(error = %source, "player repository failure");
    }
    Response::new(err.status())
}

/// `GET /players`
pub fn retrieve_all(service: &PlayerService, _ctx: Context) -> Response {
    match service.retrieve_all() {
        Ok(players) => Response::json(StatusCode::Ok, &players),
        Err(e) => failure(e),
    }
}

/// `GET /players/:id`
pub fn retrieve_by_id(service: &PlayerService, ctx: Context) -> Response {
    let Some(id) = ctx.canonical_param::<i64>("id") else {
        return Response::new(StatusCode::BadRequest);
    };
    match service.retrieve_by_id(id) {
        Ok(player) => Response::json(StatusCode::Ok, &player),
        Err(e) => failure(e),
    }
}

/// `GET /players/squadnumber/:squadnumber`
pub fn retrieve_by_squad_number(service: &PlayerService, ctx: Context) -> Response {
    let Some(squad_number) = ctx.canonical_param::<i32>("squadnumber") else {
        return Response::new(StatusCode::BadRequest);
    };
    match service.retrieve_by_squad_number(squad_number) {
        Ok(player) => Response::json(StatusCode::Ok, &player),
        Err(e) => failure(e),
    }
}

/// `POST /players`
pub fn create(service: &PlayerService, ctx: Context) -> Response {
    let Ok(player) = ctx.json::<Player>() else {
        return Response::new(StatusCode::BadRequest);
    };
    match service.create(&player) {
        Ok(()) => Response::new(StatusCode::Created),
        Err(e) => failure(e),
    }
}

/// `PUT /players/:id`
pub fn update(service: &PlayerService, ctx: Context) -> Response {
    let Some(id) = ctx.canonical_param::<i64>("id") else {
        return Response::new(StatusCode::BadRequest);
    };
    let Ok(player) = ctx.json::<Player>() else {
        return Response::new(StatusCode::BadRequest);
    };
    match service.update(id, &player) {
        Ok(()) => Response::new(StatusCode::NoContent),
        Err(e) => failure(e),
    }
}

/// `DELETE /players/:id`
pub fn delete(service: &PlayerService, ctx: Context) -> Response {
    let Some(id) = ctx.canonical_param::<i64>("id") else {
        return Response::new(StatusCode::BadRequest);
    };
    match service.delete(id) {
        Ok(()) => Response::new(StatusCode::NoContent),
        Err(e) => failure(e),
    }
}

/// `GET /health`
pub fn health(_ctx: Context) -> Response {
    Response::json(StatusCode::Ok, &serde_json::json!({ "status": "ok" }))
}
