//! # HTTP handlers
//!
//! Route groups are mounted by `main`:
//!
//! - `/neighborhoods`: attribution report and single-point lookup
//! - `/restaurants`: cuisine listing and inferred form schema
//! - `/cluster`: databases, server version and health

use rocket::{Request, catch, get, http::Status, serde::json::Json};
use serde_json::{Value, json};

pub mod cluster;
pub mod neighborhoods;
pub mod restaurants;

#[get("/")]
pub fn index() -> &'static str {
    "restodactyl: restaurants of the sample_restaurants dataset, attributed to neighborhoods. \
     See /neighborhoods/report, /restaurants/cuisine/<cuisine> and /cluster/databases."
}

fn error_body(status: Status, message: &str) -> Json<Value> {
    Json(json!({
        "error": message,
        "status": status.code
    }))
}

#[catch(404)]
pub fn catch404(req: &Request) -> Json<Value> {
    error_body(Status::NotFound, &format!("No route for {}", req.uri()))
}

#[catch(500)]
pub fn catch500() -> Json<Value> {
    error_body(Status::InternalServerError, "Internal server error")
}

#[catch(503)]
pub fn catch503() -> Json<Value> {
    error_body(Status::ServiceUnavailable, "Database unavailable")
}

#[catch(504)]
pub fn catch504() -> Json<Value> {
    error_body(Status::GatewayTimeout, "Database query timed out")
}
