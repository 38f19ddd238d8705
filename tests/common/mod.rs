use std::sync::{Arc, Once};

use leadconsole_ui::config::ConsoleConfig;
use leadconsole_ui::repository::{ConsoleRepository, StaticRepository};
use leadconsole_ui::routes;
use leadconsole_ui::state::ConsoleState;
use rocket::local::asynchronous::Client;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Initialize tracing once for integration tests.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_test_writer())
            .with(filter)
            .try_init();
    });
}

/// JSON API over fixture data. Pollers are never started up front; the first
/// read of a polled resource starts its feed and waits for that poll.
pub async fn api_client() -> Client {
    init_tracing();
    let repo: Arc<dyn ConsoleRepository> = Arc::new(StaticRepository::new());
    let state = ConsoleState::new(repo, &ConsoleConfig::default());
    let rocket = rocket::build().manage(state).mount("/api", routes::api_routes());
    Client::tracked(rocket).await.expect("valid rocket instance")
}

/// The full console (pages, templates, API) over fixture data.
pub async fn console_client() -> Client {
    init_tracing();
    let repo: Arc<dyn ConsoleRepository> = Arc::new(StaticRepository::new());
    let state = ConsoleState::new(repo, &ConsoleConfig::default());
    Client::tracked(leadconsole_ui::rocket(state)).await.expect("valid rocket instance")
}
