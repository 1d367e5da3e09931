//! # Report assembly
//!
//! Groups located restaurants by neighborhood. Neighborhood keys and restaurant
//! names are ordered by plain byte comparison, so "Zed" sorts before "amy".
//! Restaurants sharing a name keep their input order.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::geometry::NeighborhoodIndex;
use crate::models::{Located, RestaurantSummary, Screened, SkipReason};

pub type Attribution = BTreeMap<String, Vec<RestaurantSummary>>;

pub fn assemble<I>(located: I) -> Attribution
where
    I: IntoIterator<Item = Located>,
{
    let mut attribution = Attribution::new();

    for Located {
        neighborhood,
        restaurant,
    } in located
    {
        attribution.entry(neighborhood).or_default().push(restaurant);
    }

    for restaurants in attribution.values_mut() {
        restaurants.sort_by(|a, b| a.name.cmp(&b.name));
    }

    attribution
}

#[derive(Debug, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(crate = "rocket::serde")]
pub struct SkipTally {
    pub malformed_neighborhoods: usize,
    pub malformed_coordinates: usize,
    pub unattributed: usize,
}

impl SkipTally {
    pub fn record(&mut self, reason: &SkipReason) {
        match reason {
            SkipReason::MalformedNeighborhood { .. } => self.malformed_neighborhoods += 1,
            SkipReason::MalformedCoordinate { .. } => self.malformed_coordinates += 1,
            SkipReason::Unattributed { .. } => self.unattributed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.malformed_neighborhoods + self.malformed_coordinates + self.unattributed
    }
}

#[derive(Debug, Serialize, Clone)]
#[serde(crate = "rocket::serde")]
pub struct NeighborhoodReport {
    pub generated_at: NaiveDateTime,
    pub neighborhood_count: usize,
    pub attributed: usize,
    pub skipped: SkipTally,
    pub neighborhoods: Attribution,
}

impl NeighborhoodReport {
    /// Drains `screened`, assembling the kept items and counting every skip,
    /// including the neighborhoods the index itself rejected.
    pub fn from_screened<I>(index: &NeighborhoodIndex, screened: I) -> Self
    where
        I: IntoIterator<Item = Screened<Located>>,
    {
        let mut skipped = SkipTally::default();
        for reason in index.skipped() {
            skipped.record(reason);
        }

        let mut located = Vec::new();
        for item in screened {
            match item {
                Screened::Kept(hit) => located.push(hit),
                Screened::Skipped(reason) => skipped.record(&reason),
            }
        }

        let attributed = located.len();

        Self {
            generated_at: chrono::Utc::now().naive_utc(),
            neighborhood_count: index.len(),
            attributed,
            skipped,
            neighborhoods: assemble(located),
        }
    }
}
