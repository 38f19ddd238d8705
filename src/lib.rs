//! Lead generation console: derived views over the backend API.

pub mod aggregate;
pub mod categories;
pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod fixtures;
pub mod forms;
pub mod logging;
pub mod models;
pub mod poller;
pub mod rank;
pub mod repository;
pub mod routes;
pub mod state;
pub mod stats;
pub mod views;

use rocket::fairing::AdHoc;
use rocket::fs::{relative, FileServer};
use rocket::{Build, Rocket};
use rocket_dyn_templates::Template;

use crate::state::ConsoleState;

/// Assemble the console: pages, JSON API, static assets and the live feeds.
pub fn rocket(state: ConsoleState) -> Rocket<Build> {
    rocket::build()
        .manage(state)
        .attach(Template::fairing())
        .attach(AdHoc::on_liftoff("Live feeds", |rocket| {
            Box::pin(async move {
                if let Some(state) = rocket.state::<ConsoleState>() {
                    state.feeds.start_all();
                }
            })
        }))
        .attach(AdHoc::on_shutdown("Stop live feeds", |rocket| {
            Box::pin(async move {
                if let Some(state) = rocket.state::<ConsoleState>() {
                    state.feeds.stop_all().await;
                }
            })
        }))
        .mount("/", routes::index_routes())
        .mount("/api", routes::api_routes())
        .mount("/static", FileServer::from(relative!("static")))
}
