use rocket::Request;
use rocket::http::Status;
use rocket::response::{self, Responder, Response};
use rocket_db_pools::mongodb;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AtlasError {
    #[error("Missing setting `{0}`")]
    MissingSetting(&'static str),
    #[error("Invalid value `{value}` for setting `{key}`")]
    InvalidSetting { key: &'static str, value: String },
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),
    #[error("{operation} timed out after {}s", .limit.as_secs())]
    Timeout {
        operation: &'static str,
        limit: Duration,
    },
    #[error("Unexpected document shape: {0}")]
    Decode(String),
    #[error("Coordinate ({lon}, {lat}) is out of range")]
    InvalidCoordinate { lon: f64, lat: f64 },
}

impl AtlasError {
    pub fn status(&self) -> Status {
        match self {
            AtlasError::MissingSetting(_) | AtlasError::InvalidSetting { .. } => {
                Status::InternalServerError
            }
            AtlasError::Database(_) => Status::ServiceUnavailable,
            AtlasError::Timeout { .. } => Status::GatewayTimeout,
            AtlasError::Decode(_) => Status::InternalServerError,
            AtlasError::InvalidCoordinate { .. } => Status::BadRequest,
        }
    }
}

impl<'r> Responder<'r, 'static> for AtlasError {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();

        // Database details stay in the log, not in the response.
        let message = match &self {
            AtlasError::Database(e) => {
                tracing::error!(error = %e, "database request failed");
                "Database unavailable".to_string()
            }
            AtlasError::MissingSetting(_) | AtlasError::InvalidSetting { .. } => {
                tracing::error!(error = %self, "server misconfigured");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "error": message,
            "status": status.code
        })
        .to_string();

        Response::build()
            .status(status)
            .header(rocket::http::ContentType::JSON)
            .sized_body(body.len(), std::io::Cursor::new(body))
            .ok()
    }
}
