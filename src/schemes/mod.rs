use crate::state::AppState;
use axum::Router;

mod dto;
pub mod handlers;
pub mod repo;
pub mod sync;

pub fn router() -> Router<AppState> {
    handlers::scheme_routes()
}
