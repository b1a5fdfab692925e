use axum::{routing::get, Router};

use crate::{controller::liveness::alive, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(alive))
}
