use geo::Point;
use mongodb::bson::Bson;

use crate::geometry::NeighborhoodIndex;
use crate::models::{Located, Restaurant, RestaurantSummary, Screened, SkipReason};

/// Reads a `[longitude, latitude]` pair. Anything other than exactly two finite
/// numbers is rejected.
pub fn parse_coordinate(value: &Bson) -> Option<Point<f64>> {
    let Bson::Array(items) = value else {
        return None;
    };

    let [lon, lat] = items.as_slice() else {
        return None;
    };

    match (as_number(lon)?, as_number(lat)?) {
        (lon, lat) if lon.is_finite() && lat.is_finite() => Some(Point::new(lon, lat)),
        _ => None,
    }
}

fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Double(v) => Some(*v),
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        _ => None,
    }
}

pub fn locate(restaurant: Restaurant, index: &NeighborhoodIndex) -> Screened<Located> {
    let Some(point) = restaurant.coordinate.as_ref().and_then(parse_coordinate) else {
        return Screened::Skipped(SkipReason::MalformedCoordinate {
            restaurant: restaurant.name,
        });
    };

    match index.locate(point) {
        Some(neighborhood) => Screened::Kept(Located {
            neighborhood: neighborhood.to_string(),
            restaurant: RestaurantSummary {
                name: restaurant.name,
                cuisine: restaurant.cuisine,
            },
        }),
        None => Screened::Skipped(SkipReason::Unattributed {
            restaurant: restaurant.name,
        }),
    }
}

/// Lazily resolves each restaurant against `index`, one pass over `restaurants`.
pub fn locate_all<'a, I>(
    restaurants: I,
    index: &'a NeighborhoodIndex,
) -> impl Iterator<Item = Screened<Located>> + 'a
where
    I: IntoIterator<Item = Restaurant>,
    I::IntoIter: 'a,
{
    restaurants
        .into_iter()
        .map(move |restaurant| locate(restaurant, index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::tests::square;
    use mongodb::bson::bson;

    fn restaurant(name: &str, coordinate: Option<Bson>) -> Restaurant {
        Restaurant {
            name: name.to_string(),
            cuisine: "Pizza".to_string(),
            coordinate,
        }
    }

    #[test]
    fn test_parse_coordinate_accepts_numeric_pairs() {
        assert_eq!(
            parse_coordinate(&bson!([-73.9, 40.7])),
            Some(Point::new(-73.9, 40.7))
        );
        assert_eq!(parse_coordinate(&bson!([1, 2])), Some(Point::new(1.0, 2.0)));

        let big: i64 = 1 << 40;
        assert_eq!(
            parse_coordinate(&bson!([big, 2.5])),
            Some(Point::new(big as f64, 2.5))
        );
    }

    #[test]
    fn test_parse_coordinate_rejects_malformed() {
        assert_eq!(parse_coordinate(&Bson::Null), None);
        assert_eq!(parse_coordinate(&bson!([])), None);
        assert_eq!(parse_coordinate(&bson!([1.0])), None);
        assert_eq!(parse_coordinate(&bson!([1.0, 2.0, 3.0])), None);
        assert_eq!(parse_coordinate(&bson!(["1.0", 2.0])), None);
        assert_eq!(parse_coordinate(&bson!([1.0, null])), None);
        assert_eq!(parse_coordinate(&bson!({ "lon": 1.0, "lat": 2.0 })), None);

        let (nan, inf) = (f64::NAN, f64::INFINITY);
        assert_eq!(parse_coordinate(&bson!([nan, 2.0])), None);
        assert_eq!(parse_coordinate(&bson!([1.0, inf])), None);
    }

    #[test]
    fn test_locate_all_outcomes() {
        let index = crate::geometry::NeighborhoodIndex::build(vec![square("Alpha", 0.0, 0.0, 1.0)]);

        let outcomes: Vec<_> = locate_all(
            vec![
                restaurant("Inside", Some(bson!([0.5, 0.5]))),
                restaurant("Outside", Some(bson!([5.0, 5.0]))),
                restaurant("Absent", None),
                restaurant("Null", Some(Bson::Null)),
                restaurant("Triple", Some(bson!([0.5, 0.5, 0.5]))),
            ],
            &index,
        )
        .collect();

        assert_eq!(
            outcomes,
            vec![
                Screened::Kept(Located {
                    neighborhood: "Alpha".to_string(),
                    restaurant: RestaurantSummary {
                        name: "Inside".to_string(),
                        cuisine: "Pizza".to_string(),
                    },
                }),
                Screened::Skipped(SkipReason::Unattributed {
                    restaurant: "Outside".to_string()
                }),
                Screened::Skipped(SkipReason::MalformedCoordinate {
                    restaurant: "Absent".to_string()
                }),
                Screened::Skipped(SkipReason::MalformedCoordinate {
                    restaurant: "Null".to_string()
                }),
                Screened::Skipped(SkipReason::MalformedCoordinate {
                    restaurant: "Triple".to_string()
                }),
            ]
        );
    }

    #[test]
    fn test_locate_all_is_lazy() {
        let index = crate::geometry::NeighborhoodIndex::build(vec![square("Alpha", 0.0, 0.0, 1.0)]);
        let seen = std::cell::Cell::new(0);

        let source = (0..10).map(|i| {
            seen.set(seen.get() + 1);
            restaurant(&format!("r{i}"), Some(bson!([0.5, 0.5])))
        });

        let mut located = locate_all(source, &index);
        assert_eq!(seen.get(), 0);

        located.next();
        assert_eq!(seen.get(), 1);
    }
}
