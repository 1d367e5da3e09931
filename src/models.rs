use {
    geo::Geometry,
    mongodb::bson::{Bson, Document},
    serde::{Deserialize, Serialize},
};

/// A neighborhood as read from the document source, before validation.
#[derive(Debug, Clone, Default)]
pub struct NeighborhoodRecord {
    pub name: Option<String>,
    pub boundary: Option<Geometry<f64>>,
}

/// A restaurant as read from the document source. `coordinate` is kept as the
/// raw stored value so the locator can tell absent from malformed.
#[derive(Debug, Clone, Default)]
pub struct Restaurant {
    pub name: String,
    pub cuisine: String,
    pub coordinate: Option<Bson>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(crate = "rocket::serde")]
pub struct RestaurantSummary {
    pub name: String,
    pub cuisine: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located {
    pub neighborhood: String,
    pub restaurant: RestaurantSummary,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(crate = "rocket::serde", rename_all = "snake_case")]
pub enum NeighborhoodProblem {
    MissingName,
    MissingBoundary,
    NotPolygonal,
    EmptyBoundary,
}

/// Why a record was left out of the attribution.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(crate = "rocket::serde", tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    MalformedNeighborhood {
        name: Option<String>,
        problem: NeighborhoodProblem,
    },
    MalformedCoordinate {
        restaurant: String,
    },
    Unattributed {
        restaurant: String,
    },
}

/// A pipeline item that either survived screening or was dropped with a reason.
#[derive(Debug, Clone, PartialEq)]
pub enum Screened<T> {
    Kept(T),
    Skipped(SkipReason),
}

/// One row of the cuisine listing: `$project`ed name, cuisine, borough and zipcode.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(crate = "rocket::serde")]
pub struct CuisineListing {
    pub name: String,
    pub cuisine: String,
    pub borough: Option<String>,
    pub zipcode: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(crate = "rocket::serde")]
pub struct DatabaseSummary {
    pub name: String,
    pub collections: Vec<String>,
}

impl NeighborhoodRecord {
    /// Reads `name` and the GeoJSON `geometry` subdocument. An unreadable
    /// geometry is reported as missing.
    pub fn from_document(doc: &Document) -> Self {
        let name = doc.get_str("name").ok().map(str::to_owned);
        let boundary = doc
            .get_document("geometry")
            .ok()
            .and_then(|geometry| match geometry_from_document(geometry) {
                Ok(geometry) => Some(geometry),
                Err(reason) => {
                    tracing::debug!(name = ?name, %reason, "unreadable neighborhood geometry");
                    None
                }
            });

        Self { name, boundary }
    }
}

impl Restaurant {
    pub fn from_document(doc: &Document) -> Self {
        Self {
            name: doc.get_str("name").unwrap_or_default().to_string(),
            cuisine: doc.get_str("cuisine").unwrap_or_default().to_string(),
            coordinate: doc
                .get_document("address")
                .ok()
                .and_then(|address| address.get("coord"))
                .cloned(),
        }
    }
}

impl CuisineListing {
    pub fn from_document(doc: &Document) -> Self {
        let address = doc.get_document("address").ok();

        Self {
            name: doc.get_str("name").unwrap_or_default().to_string(),
            cuisine: doc.get_str("cuisine").unwrap_or_default().to_string(),
            borough: doc.get_str("borough").ok().map(str::to_owned),
            zipcode: address
                .and_then(|a| a.get_str("zipcode").ok())
                .map(str::to_owned),
        }
    }
}

/// Converts a stored GeoJSON geometry into a `geo` geometry.
pub fn geometry_from_document(doc: &Document) -> Result<Geometry<f64>, String> {
    let json = Bson::Document(doc.clone()).into_relaxed_extjson();
    let geometry = geojson::Geometry::from_json_value(json).map_err(|e| e.to_string())?;

    geometry
        .value
        .try_into()
        .map_err(|e: geojson::Error| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{bson, doc};

    #[test]
    fn test_neighborhood_from_document() {
        let doc = doc! {
            "name": "Alpha",
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]
            }
        };

        let record = NeighborhoodRecord::from_document(&doc);

        assert_eq!(record.name.as_deref(), Some("Alpha"));
        assert!(matches!(record.boundary, Some(Geometry::Polygon(_))));
    }

    #[test]
    fn test_neighborhood_with_integer_coordinates() {
        let doc = doc! {
            "name": "Gamma",
            "geometry": {
                "type": "MultiPolygon",
                "coordinates": [[[[0, 0], [2, 0], [2, 2], [0, 0]]]]
            }
        };

        let record = NeighborhoodRecord::from_document(&doc);

        assert!(matches!(record.boundary, Some(Geometry::MultiPolygon(_))));
    }

    #[test]
    fn test_neighborhood_with_bad_geometry() {
        let missing = NeighborhoodRecord::from_document(&doc! { "name": "Nowhere" });
        assert!(missing.boundary.is_none());

        let garbage = NeighborhoodRecord::from_document(&doc! {
            "geometry": { "type": "Polygon", "coordinates": "none" }
        });
        assert!(garbage.name.is_none());
        assert!(garbage.boundary.is_none());
    }

    #[test]
    fn test_restaurant_from_document() {
        let doc = doc! {
            "name": "Morris Park Bake Shop",
            "cuisine": "Bakery",
            "address": { "coord": [-73.856077, 40.848447], "zipcode": "10462" }
        };

        let restaurant = Restaurant::from_document(&doc);

        assert_eq!(restaurant.name, "Morris Park Bake Shop");
        assert_eq!(restaurant.cuisine, "Bakery");
        assert_eq!(restaurant.coordinate, Some(bson!([-73.856077, 40.848447])));

        let bare = Restaurant::from_document(&doc! { "name": "Nomad" });
        assert_eq!(bare.cuisine, "");
        assert!(bare.coordinate.is_none());
    }

    #[test]
    fn test_cuisine_listing_from_document() {
        let doc = doc! {
            "name": "Wendy'S",
            "cuisine": "American",
            "borough": "Brooklyn",
            "address": { "zipcode": "11225" }
        };

        let listing = CuisineListing::from_document(&doc);

        assert_eq!(listing.name, "Wendy'S");
        assert_eq!(listing.borough.as_deref(), Some("Brooklyn"));
        assert_eq!(listing.zipcode.as_deref(), Some("11225"));
    }

    #[test]
    fn test_skip_reason_serialization() {
        let reason = SkipReason::MalformedNeighborhood {
            name: None,
            problem: NeighborhoodProblem::MissingName,
        };

        let json = serde_json::to_value(&reason).unwrap();

        assert_eq!(json["kind"], "malformed_neighborhood");
        assert_eq!(json["problem"], "missing_name");
    }
}
