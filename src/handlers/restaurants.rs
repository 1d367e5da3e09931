use {
    crate::{
        config::ConnectionSettings, db::RestoData, errors::AtlasError, models::CuisineListing,
        queries, schema::FormSchema,
    },
    rocket::{Route, State, get, routes, serde::json::Json},
    rocket_db_pools::Connection,
};

pub const DEFAULT_SAMPLE: i64 = 100;
pub const MAX_SAMPLE: i64 = 5_000;

/// Sample sizes below one fall back to the default; large ones are capped.
fn sample_size(requested: Option<i64>) -> i64 {
    match requested {
        Some(n) if n >= 1 => n.min(MAX_SAMPLE),
        _ => DEFAULT_SAMPLE,
    }
}

#[get("/cuisine/<cuisine>")]
pub async fn get_by_cuisine(
    db: Connection<RestoData>,
    settings: &State<ConnectionSettings>,
    cuisine: &str,
) -> Result<Json<Vec<CuisineListing>>, AtlasError> {
    let listings = queries::restaurants_by_cuisine(&db, settings, cuisine).await?;
    Ok(Json(listings))
}

#[get("/schema?<sample>")]
pub async fn get_schema(
    db: Connection<RestoData>,
    settings: &State<ConnectionSettings>,
    sample: Option<i64>,
) -> Result<Json<FormSchema>, AtlasError> {
    let schema = queries::restaurant_schema(&db, settings, sample_size(sample)).await?;
    Ok(Json(schema))
}

pub fn routes() -> Vec<Route> {
    routes![get_by_cuisine, get_schema]
}
