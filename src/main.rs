//! # Restodactyl - restaurants of the `sample_restaurants` dataset, by neighborhood
//!
//! Serves (or prints, via subcommands) a report attributing every restaurant to
//! the neighborhood polygon containing it, alongside a few exploratory queries
//! against the cluster.
//!
//! ## Environment Variables
//!
//! See [`config`]. A `.env` file in the working directory is loaded first.
//! `RUST_LOG` controls log verbosity (default `info`).

use rocket::{Build, Rocket, catchers, http::Method, routes};
use rocket_cors::{AllowedOrigins, CorsOptions};
use rocket_db_pools::Database;
use tracing_subscriber::EnvFilter;

use crate::{config::ConnectionSettings, db::RestoData};

pub mod cli;
pub mod config;
pub mod db;
pub mod errors;
pub mod geometry;
pub mod handlers;
pub mod locator;
pub mod models;
pub mod queries;
pub mod report;
pub mod schema;

/// Builds the Rocket instance for `settings`.
///
/// The pool URL is injected into the figment here, so the server never looks
/// the connection string up on its own.
pub fn rocket(settings: ConnectionSettings) -> Result<Rocket<Build>, rocket_cors::Error> {
    let cors = CorsOptions::default()
        .allowed_origins(AllowedOrigins::all())
        .allowed_methods(
            vec![Method::Get, Method::Options]
                .into_iter()
                .map(From::from)
                .collect(),
        )
        .allow_credentials(false)
        .to_cors()?;

    let figment = rocket::Config::figment().merge((
        format!("databases.{}.url", db::POOL_NAME),
        settings.connection_string(),
    ));

    Ok(rocket::custom(figment)
        .manage(settings)
        .attach(RestoData::init())
        .attach(cors)
        .register(
            "/",
            catchers![
                handlers::catch404,
                handlers::catch500,
                handlers::catch503,
                handlers::catch504
            ],
        )
        .mount("/", routes![handlers::index])
        .mount("/neighborhoods", handlers::neighborhoods::routes())
        .mount("/restaurants", handlers::restaurants::routes())
        .mount("/cluster", handlers::cluster::routes()))
}

#[rocket::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    dotenvy::dotenv().ok();

    let matches = cli::cli().get_matches();
    let settings = ConnectionSettings::from_env()?;
    tracing::info!(?settings, "settings resolved");

    match matches.subcommand() {
        None | Some(("serve", _)) => {
            let _ = rocket(settings)?.launch().await?;
        }
        Some(subcommand) => cli::handle_cli(subcommand, &settings).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rocket_mounts_every_route_group() {
        let rocket = rocket(ConnectionSettings::from_url("mongodb://localhost:27017")).unwrap();

        let uris: Vec<String> = rocket.routes().map(|r| r.uri.to_string()).collect();

        for expected in [
            "/",
            "/neighborhoods/report",
            "/restaurants/schema?<sample>",
            "/cluster/check-health",
        ] {
            assert!(uris.iter().any(|u| u == expected), "{expected} in {uris:?}");
        }
    }

    #[test]
    fn test_pool_url_comes_from_settings() {
        let settings = ConnectionSettings::from_url("mongodb://db.internal:27017");
        let rocket = rocket(settings).unwrap();

        let url: String = rocket
            .figment()
            .extract_inner(&format!("databases.{}.url", db::POOL_NAME))
            .unwrap();

        assert_eq!(url, "mongodb://db.internal:27017");
    }
}
