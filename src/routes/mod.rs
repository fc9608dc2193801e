use axum::Router;
use reqwest::Client;

use crate::Config;

mod dashboard;
mod health;
mod readings;

// ---

pub fn router(client: Client, config: Config) -> Router {
    // ---
    Router::new()
        .merge(readings::router())
        .merge(dashboard::router())
        .merge(health::router())
        .with_state((client, config))
}
