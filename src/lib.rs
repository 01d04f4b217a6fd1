/// flashsync: flashcards with spaced repetition and multi-device sync
///
/// This library holds everything except the two binaries: the local card
/// store, the fixed-interval scheduler, last-writer-wins reconciliation, the
/// sync coordinator, backups, and the document store served by
/// `flashsync-server`.
///
/// ### Modules
///
/// - `repo`: The local store (cards, settings, statistics) and server tables
/// - `scheduler`: Due cards and review intervals
/// - `reconcile`: Merging local and remote card collections
/// - `deck`: The in-memory collection and the store it mirrors
/// - `sync`: Push-then-pull synchronization
/// - `backup`: JSON and CSV import and export, automatic backups
/// - `remote`, `identity`: The remote replica and identity provider seams
///
/// ### Web API
///
/// `create_app` serves the remote replica over HTTP:
///
/// - `POST /accounts`: Sign up
/// - `POST /sessions`: Sign in
/// - `GET /users/{user_id}`: Read a user's document
/// - `PUT /users/{user_id}`: Replace a user's document
/// - `PATCH /users/{user_id}`: Merge-write a user's document

/// Database connection module
pub mod db;

/// Data models module
pub mod models;

/// Repository module for database operations
pub mod repo;

/// Database schema module
pub mod schema;

pub mod backup;
pub mod config;
pub mod deck;
pub mod dto;
pub mod errors;
pub mod handlers;
pub mod identity;
pub mod logging;
pub mod reconcile;
pub mod remote;
pub mod scheduler;
pub mod sync;
pub mod task;

#[cfg(test)]
mod test_utils;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use handlers::*;

/// Creates the document store router
///
/// ### Arguments
///
/// * `pool` - A pool over a database with the server migrations applied
///
/// ### Returns
///
/// An Axum Router configured with all routes and the database pool as state
pub fn create_app(pool: Arc<db::DbPool>) -> Router {
    Router::new()
        .route("/accounts", post(sign_up_handler))
        .route("/sessions", post(sign_in_handler))
        .route(
            "/users/{user_id}",
            get(get_document_handler)
                .put(put_document_handler)
                .patch(patch_document_handler),
        )
        .layer(CorsLayer::permissive())
        .with_state(pool)
}
