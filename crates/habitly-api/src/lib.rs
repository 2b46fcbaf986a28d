//! JSON REST API for Habitly.
//!
//! Exposes an axum [`Router`] backed by any [`HabitStore`]. Every `/api`
//! route authenticates with HTTP Basic credentials before touching data.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = habitly_api::router(AppState::new(Arc::new(store)));
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod error;
pub mod habits;

use std::sync::Arc;

use axum::{Router, routing::get};
use habitly_core::store::HabitStore;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub store: Arc<S>,
}

impl<S> AppState<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

/// Build the full application router for `state`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: HabitStore + 'static,
{
  Router::new()
    .route("/healthz", get(healthz))
    .route("/api/habits", get(habits::list::<S>).post(habits::create::<S>))
    .route("/api/habits/today", get(habits::today::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

async fn healthz() -> &'static str { "ok" }
