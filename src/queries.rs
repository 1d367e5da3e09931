//! # Cluster queries
//!
//! Every read the service performs against MongoDB. Each call is bounded by
//! the configured query timeout. The neighborhood report is the only place
//! where the geometry core meets the database; skip reasons are logged here
//! so the core stays free of output.

use {
    crate::{
        config::ConnectionSettings,
        errors::AtlasError,
        geometry::NeighborhoodIndex,
        locator,
        models::{CuisineListing, DatabaseSummary, NeighborhoodRecord, Restaurant, Screened},
        report::NeighborhoodReport,
        schema::{FormSchema, infer_schema},
    },
    geo::Point,
    mongodb::bson::{Document, doc},
    rocket::futures::TryStreamExt,
    rocket_db_pools::mongodb::{
        Client, Cursor,
        options::{AggregateOptions, FindOptions},
    },
    std::future::Future,
};

async fn bounded<T, F>(
    settings: &ConnectionSettings,
    operation: &'static str,
    future: F,
) -> Result<T, AtlasError>
where
    F: Future<Output = Result<T, AtlasError>>,
{
    tokio::time::timeout(settings.query_timeout, future)
        .await
        .map_err(|_| AtlasError::Timeout {
            operation,
            limit: settings.query_timeout,
        })?
}

async fn drain(mut cursor: Cursor<Document>) -> Result<Vec<Document>, AtlasError> {
    let mut documents = Vec::new();
    while let Some(doc) = cursor.try_next().await? {
        documents.push(doc);
    }
    Ok(documents)
}

async fn list_databases(client: &Client) -> Result<Vec<DatabaseSummary>, AtlasError> {
    let mut summaries = Vec::new();

    for name in client.list_database_names(None, None).await? {
        let mut collections = client.database(&name).list_collection_names(None).await?;
        collections.sort();
        summaries.push(DatabaseSummary { name, collections });
    }

    Ok(summaries)
}

pub async fn databases(
    client: &Client,
    settings: &ConnectionSettings,
) -> Result<Vec<DatabaseSummary>, AtlasError> {
    bounded(settings, "database listing", list_databases(client)).await
}

pub async fn server_version(
    client: &Client,
    settings: &ConnectionSettings,
) -> Result<String, AtlasError> {
    bounded(settings, "buildInfo", async {
        let info = client
            .database(&settings.database)
            .run_command(doc! { "buildInfo": 1 }, None)
            .await?;

        info.get_str("version")
            .map(str::to_owned)
            .map_err(|_| AtlasError::Decode("buildInfo reply has no version".to_string()))
    })
    .await
}

pub async fn collection_names(
    client: &Client,
    settings: &ConnectionSettings,
) -> Result<Vec<String>, AtlasError> {
    bounded(settings, "collection listing", async {
        let names = client
            .database(&settings.database)
            .list_collection_names(None)
            .await?;
        Ok::<_, AtlasError>(names)
    })
    .await
}

/// Restaurants of one cuisine, sorted by name, projected to the listing fields.
pub fn cuisine_pipeline(cuisine: &str) -> Vec<Document> {
    vec![
        doc! { "$match": { "cuisine": cuisine } },
        doc! { "$sort": { "name": 1 } },
        doc! {
            "$project": {
                "_id": 0,
                "name": 1,
                "address.zipcode": 1,
                "borough": 1,
                "cuisine": 1
            }
        },
    ]
}

pub async fn restaurants_by_cuisine(
    client: &Client,
    settings: &ConnectionSettings,
    cuisine: &str,
) -> Result<Vec<CuisineListing>, AtlasError> {
    bounded(settings, "cuisine aggregation", async {
        let options = AggregateOptions::builder().allow_disk_use(true).build();
        let cursor = client
            .database(&settings.database)
            .collection::<Document>(&settings.restaurants)
            .aggregate(cuisine_pipeline(cuisine), options)
            .await?;

        let documents = drain(cursor).await?;
        let listings: Vec<CuisineListing> =
            documents.iter().map(CuisineListing::from_document).collect();
        Ok::<_, AtlasError>(listings)
    })
    .await
}

pub async fn sample_restaurants(
    client: &Client,
    settings: &ConnectionSettings,
    limit: i64,
) -> Result<Vec<Document>, AtlasError> {
    bounded(settings, "restaurant sample", async {
        let options = FindOptions::builder().limit(limit).build();
        let cursor = client
            .database(&settings.database)
            .collection::<Document>(&settings.restaurants)
            .find(doc! {}, options)
            .await?;

        drain(cursor).await
    })
    .await
}

pub async fn restaurant_schema(
    client: &Client,
    settings: &ConnectionSettings,
    sample: i64,
) -> Result<FormSchema, AtlasError> {
    let documents = sample_restaurants(client, settings, sample).await?;
    Ok(infer_schema(&documents))
}

pub async fn load_neighborhoods(
    client: &Client,
    settings: &ConnectionSettings,
) -> Result<Vec<NeighborhoodRecord>, AtlasError> {
    bounded(settings, "neighborhood load", async {
        let options = FindOptions::builder()
            .projection(doc! { "_id": 0, "name": 1, "geometry": 1 })
            .build();
        let cursor = client
            .database(&settings.database)
            .collection::<Document>(&settings.neighborhoods)
            .find(doc! {}, options)
            .await?;

        let documents = drain(cursor).await?;
        let records: Vec<NeighborhoodRecord> = documents
            .iter()
            .map(NeighborhoodRecord::from_document)
            .collect();
        Ok::<_, AtlasError>(records)
    })
    .await
}

pub async fn load_restaurants(
    client: &Client,
    settings: &ConnectionSettings,
) -> Result<Vec<Restaurant>, AtlasError> {
    bounded(settings, "restaurant scan", async {
        let options = FindOptions::builder()
            .projection(doc! { "_id": 0, "name": 1, "cuisine": 1, "address.coord": 1 })
            .build();
        let cursor = client
            .database(&settings.database)
            .collection::<Document>(&settings.restaurants)
            .find(doc! {}, options)
            .await?;

        let documents = drain(cursor).await?;
        let restaurants: Vec<Restaurant> =
            documents.iter().map(Restaurant::from_document).collect();
        Ok::<_, AtlasError>(restaurants)
    })
    .await
}

pub async fn neighborhood_index(
    client: &Client,
    settings: &ConnectionSettings,
) -> Result<NeighborhoodIndex, AtlasError> {
    let index = NeighborhoodIndex::build(load_neighborhoods(client, settings).await?);

    for reason in index.skipped() {
        tracing::warn!(?reason, "neighborhood skipped");
    }
    tracing::info!(
        loaded = index.len(),
        skipped = index.skipped().len(),
        "neighborhood index built"
    );

    Ok(index)
}

pub async fn neighborhood_report(
    client: &Client,
    settings: &ConnectionSettings,
) -> Result<NeighborhoodReport, AtlasError> {
    let index = neighborhood_index(client, settings).await?;
    let restaurants = load_restaurants(client, settings).await?;

    let screened = locator::locate_all(restaurants, &index).inspect(|item| {
        if let Screened::Skipped(reason) = item {
            tracing::debug!(?reason, "restaurant skipped");
        }
    });
    let report = NeighborhoodReport::from_screened(&index, screened);

    tracing::info!(
        neighborhoods = report.neighborhoods.len(),
        attributed = report.attributed,
        skipped = report.skipped.total(),
        malformed_coordinates = report.skipped.malformed_coordinates,
        unattributed = report.skipped.unattributed,
        "neighborhood report assembled"
    );

    Ok(report)
}

pub async fn locate_point(
    client: &Client,
    settings: &ConnectionSettings,
    lon: f64,
    lat: f64,
) -> Result<Option<String>, AtlasError> {
    if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
        return Err(AtlasError::InvalidCoordinate { lon, lat });
    }

    let index = neighborhood_index(client, settings).await?;
    Ok(index.locate(Point::new(lon, lat)).map(str::to_owned))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cuisine_pipeline_shape() {
        let pipeline = cuisine_pipeline("American");

        assert_eq!(pipeline.len(), 3);
        assert_eq!(
            pipeline[0],
            doc! { "$match": { "cuisine": "American" } }
        );
        assert_eq!(pipeline[1], doc! { "$sort": { "name": 1 } });

        let projection = pipeline[2].get_document("$project").unwrap();
        assert_eq!(projection.get_i32("_id").unwrap(), 0);
        for field in ["name", "address.zipcode", "borough", "cuisine"] {
            assert_eq!(projection.get_i32(field).unwrap(), 1, "{field}");
        }
    }

    #[test]
    fn test_cuisine_is_matched_literally() {
        let pipeline = cuisine_pipeline("Café/Bistro");

        assert_eq!(
            pipeline[0]
                .get_document("$match")
                .unwrap()
                .get_str("cuisine")
                .unwrap(),
            "Café/Bistro"
        );
    }

    #[tokio::test]
    async fn test_bounded_reports_timeout() {
        let mut settings = ConnectionSettings::from_url("mongodb://localhost");
        settings.query_timeout = std::time::Duration::from_millis(10);

        let result: Result<(), AtlasError> = bounded(&settings, "slow read", async {
            tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        assert!(matches!(
            result,
            Err(AtlasError::Timeout {
                operation: "slow read",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_bounded_passes_results_through() {
        let settings = ConnectionSettings::from_url("mongodb://localhost");

        let result = bounded(&settings, "fast read", async { Ok(7) }).await;

        assert_eq!(result.unwrap(), 7);
    }
}
