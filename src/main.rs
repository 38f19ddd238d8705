use rocket::launch;
use tracing::error;

use leadconsole_ui::config::ConsoleConfig;
use leadconsole_ui::logging;
use leadconsole_ui::state::ConsoleState;

#[launch]
fn rocket() -> _ {
    let config = match ConsoleConfig::discover() {
        Ok(config) => config,
        Err(e) => {
            logging::init("info");
            error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };
    logging::init(&config.logging.level);

    let state = match ConsoleState::from_config(&config) {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "Failed to initialise data source");
            std::process::exit(1);
        }
    };

    leadconsole_ui::rocket(state)
}
