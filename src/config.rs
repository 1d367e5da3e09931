//! # Connection settings
//!
//! Settings are resolved once at startup and passed explicitly to the server and
//! the CLI. Nothing below reads the environment after [`ConnectionSettings::from_env`].
//!
//! ## Environment Variables
//!
//! - `MONGODB_URL` or `DATABASE_URL`: full MongoDB connection string
//! - otherwise `MONGODB_CONNECTION_TEMPLATE`, `MONGODB_UID` and `MONGODB_PWD`,
//!   assembled as `mongodb+srv://<uid>:<pwd>@<template>`
//! - `RESTODACTYL_DATABASE`: database name (default `sample_restaurants`)
//! - `RESTODACTYL_RESTAURANTS`: restaurant collection (default `restaurants`)
//! - `RESTODACTYL_NEIGHBORHOODS`: neighborhood collection (default `neighborhoods`)
//! - `RESTODACTYL_QUERY_TIMEOUT_SECS`: per-query timeout (default `30`)

use std::fmt;
use std::time::Duration;

use crate::errors::AtlasError;

pub const DEFAULT_DATABASE: &str = "sample_restaurants";
pub const DEFAULT_RESTAURANTS: &str = "restaurants";
pub const DEFAULT_NEIGHBORHOODS: &str = "neighborhoods";
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, PartialEq, Eq)]
enum Endpoint {
    Url(String),
    Atlas {
        template: String,
        uid: String,
        pwd: String,
    },
}

#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    endpoint: Endpoint,
    pub database: String,
    pub restaurants: String,
    pub neighborhoods: String,
    pub query_timeout: Duration,
}

impl ConnectionSettings {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            endpoint: Endpoint::Url(url.into()),
            database: DEFAULT_DATABASE.to_string(),
            restaurants: DEFAULT_RESTAURANTS.to_string(),
            neighborhoods: DEFAULT_NEIGHBORHOODS.to_string(),
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    pub fn from_env() -> Result<Self, AtlasError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings through `lookup`, treating empty values as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AtlasError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let endpoint = match get("MONGODB_URL").or_else(|| get("DATABASE_URL")) {
            Some(url) => Endpoint::Url(url),
            None => Endpoint::Atlas {
                template: get("MONGODB_CONNECTION_TEMPLATE")
                    .ok_or(AtlasError::MissingSetting("MONGODB_CONNECTION_TEMPLATE"))?,
                uid: get("MONGODB_UID").ok_or(AtlasError::MissingSetting("MONGODB_UID"))?,
                pwd: get("MONGODB_PWD").ok_or(AtlasError::MissingSetting("MONGODB_PWD"))?,
            },
        };

        let query_timeout = match get("RESTODACTYL_QUERY_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(AtlasError::InvalidSetting {
                        key: "RESTODACTYL_QUERY_TIMEOUT_SECS",
                        value: raw,
                    });
                }
            },
            None => DEFAULT_QUERY_TIMEOUT,
        };

        Ok(Self {
            endpoint,
            database: get("RESTODACTYL_DATABASE").unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            restaurants: get("RESTODACTYL_RESTAURANTS")
                .unwrap_or_else(|| DEFAULT_RESTAURANTS.to_string()),
            neighborhoods: get("RESTODACTYL_NEIGHBORHOODS")
                .unwrap_or_else(|| DEFAULT_NEIGHBORHOODS.to_string()),
            query_timeout,
        })
    }

    pub fn connection_string(&self) -> String {
        match &self.endpoint {
            Endpoint::Url(url) => url.clone(),
            Endpoint::Atlas { template, uid, pwd } => {
                format!("mongodb+srv://{uid}:{pwd}@{template}")
            }
        }
    }

    /// The connection string with any password replaced, safe to log.
    pub fn redacted(&self) -> String {
        match &self.endpoint {
            Endpoint::Url(url) => redact_url(url),
            Endpoint::Atlas { template, uid, .. } => {
                format!("mongodb+srv://{uid}:****@{template}")
            }
        }
    }
}

fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let Some((credentials, host)) = rest.rsplit_once('@') else {
        return url.to_string();
    };

    match credentials.split_once(':') {
        Some((user, _)) => format!("{scheme}://{user}:****@{host}"),
        None => url.to_string(),
    }
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("endpoint", &self.redacted())
            .field("database", &self.database)
            .field("restaurants", &self.restaurants)
            .field("neighborhoods", &self.neighborhoods)
            .field("query_timeout", &self.query_timeout)
            .finish()
    }
}
