pub mod dto;
pub mod handlers;
#[cfg(test)]
pub(crate) mod memory;
pub mod repo;
pub mod repo_types;
mod services;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::user_routes()
}
