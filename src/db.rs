//! # Database connection module
//!
//! This module provides the MongoDB connection pool used by the HTTP handlers,
//! plus a standalone client for the one-shot CLI commands.
//!
//! ## Configuration
//!
//! The pool reads `databases.restodata.url` from Rocket's figment. `main` fills
//! it in from [`ConnectionSettings`], so no `Rocket.toml` entry is needed.
//!
//! ## Usage
//!
//! Handlers take a `Connection<RestoData>` guard, which derefs to a `Client`.

use rocket_db_pools::{
    Database,
    mongodb::{Client, options::ClientOptions},
};

use crate::config::ConnectionSettings;
use crate::errors::AtlasError;

pub const POOL_NAME: &str = "restodata";

/// MongoDB connection pool, managed by Rocket.
#[derive(Database)]
#[database("restodata")]
pub struct RestoData(Client);

/// Connects outside of Rocket, for CLI commands.
pub async fn connect(settings: &ConnectionSettings) -> Result<Client, AtlasError> {
    tracing::info!(endpoint = %settings.redacted(), "connecting to MongoDB");

    let mut client_options = ClientOptions::parse(settings.connection_string()).await?;
    client_options.app_name = Some("restodactyl".to_string());
    client_options.connect_timeout = Some(settings.query_timeout);
    client_options.server_selection_timeout = Some(settings.query_timeout);

    Ok(Client::with_options(client_options)?)
}
