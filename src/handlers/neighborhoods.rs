use {
    crate::{
        config::ConnectionSettings, db::RestoData, errors::AtlasError, queries,
        report::NeighborhoodReport,
    },
    rocket::{
        Route, State, get, routes,
        serde::{Serialize, json::Json},
    },
    rocket_db_pools::Connection,
};

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct LocatedPoint {
    lon: f64,
    lat: f64,
    neighborhood: String,
}

#[get("/report")]
pub async fn get_report(
    db: Connection<RestoData>,
    settings: &State<ConnectionSettings>,
) -> Result<Json<NeighborhoodReport>, AtlasError> {
    let report = queries::neighborhood_report(&db, settings).await?;
    Ok(Json(report))
}

/// 404 when no neighborhood contains the point.
#[get("/locate?<lon>&<lat>")]
pub async fn locate(
    db: Connection<RestoData>,
    settings: &State<ConnectionSettings>,
    lon: f64,
    lat: f64,
) -> Result<Option<Json<LocatedPoint>>, AtlasError> {
    let neighborhood = queries::locate_point(&db, settings, lon, lat).await?;

    Ok(neighborhood.map(|neighborhood| {
        Json(LocatedPoint {
            lon,
            lat,
            neighborhood,
        })
    }))
}

pub fn routes() -> Vec<Route> {
    routes![get_report, locate]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_registration() {
        let routes = routes();

        assert_eq!(routes.len(), 2);

        let route_names: Vec<&str> = routes
            .iter()
            .map(|r| r.name.as_deref().unwrap_or(""))
            .collect();

        assert!(route_names.contains(&"get_report"));
        assert!(route_names.contains(&"locate"));
    }
}
