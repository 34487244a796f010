//! # players-api
//!
//! A Player REST API served by an async HTTP/1.1 server, with a read-through
//! response cache that is invalidated by writes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use players_api::cache::{MemoryStore, ResponseCache, DEFAULT_TTL};
//! use players_api::database::MemoryRepository;
//! use players_api::players::PlayerService;
//! use players_api::server::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = PlayerService::new(Arc::new(MemoryRepository::seeded()?));
//!     let cache = ResponseCache::new(Arc::new(MemoryStore::new()), DEFAULT_TTL);
//!     let router = players_api::app::router(&service, &cache);
//!
//!     let server = Server::bind("127.0.0.1:9000").await?;
//!     server.serve(router, std::future::pending()).await?;
//!     Ok(())
//! }
//! ```

// ── HTTP stack ────────────────────────────────────────────────────────────────
pub mod context;
pub mod http;
pub mod middleware;
pub mod router;
pub mod server;

// ── Player API ────────────────────────────────────────────────────────────────
pub mod app;
pub mod cache;
pub mod config;
pub mod database;
pub mod players;

// ── Convenience re-exports ────────────────────────────────────────────────────
pub use http::{Headers, Method, Request, Response, StatusCode};
pub use router::Router;
pub use server::{Server, ServerError};
