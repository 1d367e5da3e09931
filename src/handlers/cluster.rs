use {
    crate::{
        config::ConnectionSettings, db::RestoData, errors::AtlasError, models::DatabaseSummary,
        queries,
    },
    rocket::{Route, State, get, routes as rocket_routes, serde::json::Json},
    rocket_db_pools::Connection,
    serde::{Deserialize, Serialize},
};

#[derive(Serialize, Deserialize, Clone, Default, Debug, PartialEq)]
pub struct CollectionStatus {
    pub restaurants: bool,
    pub neighborhoods: bool,
}

#[derive(Serialize, Deserialize, Clone, Default, Debug, PartialEq)]
pub struct HealthStatus {
    pub db_status: String,
    pub database: String,
    pub collections_status: CollectionStatus,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ServerVersion {
    pub version: String,
}

fn health_from(settings: &ConnectionSettings, collections: Option<&[String]>) -> HealthStatus {
    let mut health = HealthStatus {
        database: settings.database.clone(),
        ..HealthStatus::default()
    };

    match collections {
        Some(collections) => {
            health.db_status = "database online!".to_string();
            health.collections_status = CollectionStatus {
                restaurants: collections.contains(&settings.restaurants),
                neighborhoods: collections.contains(&settings.neighborhoods),
            };
        }
        None => health.db_status = "database offline :(".to_string(),
    }

    health
}

#[get("/check-health")]
pub async fn health(
    db: Connection<RestoData>,
    settings: &State<ConnectionSettings>,
) -> Json<HealthStatus> {
    let collections = match queries::collection_names(&db, settings).await {
        Ok(collections) => Some(collections),
        Err(e) => {
            tracing::warn!(error = %e, "health check could not list collections");
            None
        }
    };

    Json(health_from(settings, collections.as_deref()))
}

#[get("/databases")]
pub async fn get_databases(
    db: Connection<RestoData>,
    settings: &State<ConnectionSettings>,
) -> Result<Json<Vec<DatabaseSummary>>, AtlasError> {
    Ok(Json(queries::databases(&db, settings).await?))
}

#[get("/version")]
pub async fn get_version(
    db: Connection<RestoData>,
    settings: &State<ConnectionSettings>,
) -> Result<Json<ServerVersion>, AtlasError> {
    let version = queries::server_version(&db, settings).await?;
    Ok(Json(ServerVersion { version }))
}

pub fn routes() -> Vec<Route> {
    rocket_routes![health, get_databases, get_version]
}
