use axum::extract::State;

use crate::state::AppState;

pub const ALIVE_RESPONSE: &str = "✅ Bot is alive!";

/// GET / - Liveness probe
///
/// Records a keep-alive block in the alert log and confirms the process is up. Hosting
/// platforms poll this to keep the bot from being idled.
///
/// # Returns
/// - `200 OK`: Plain-text confirmation
pub async fn alive(State(state): State<AppState>) -> &'static str {
    state.alert_sink.keep_alive().await;

    ALIVE_RESPONSE
}
