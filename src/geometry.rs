//! # Neighborhood geometry index
//!
//! Holds the neighborhood boundaries for one report run and answers "which
//! neighborhood contains this point".
//!
//! Lookups follow a first-match policy: when boundaries overlap, the
//! neighborhood loaded earliest wins. The R-tree only narrows the candidate
//! set by bounding box; the winner is always the lowest load position among
//! candidates whose boundary contains the point, so results match a plain
//! in-order scan.
//!
//! Containment is `geo::Contains`: a point on an edge or vertex, or inside a
//! hole, is not contained.

use geo::{BoundingRect, Contains, Geometry, MultiPolygon, Point};
use rstar::{AABB, RTree, RTreeObject};

use crate::models::{NeighborhoodProblem, NeighborhoodRecord, Screened, SkipReason};

#[derive(Debug, Clone)]
pub struct Neighborhood {
    pub name: String,
    pub boundary: MultiPolygon<f64>,
}

struct BoundaryEnvelope {
    position: usize,
    aabb: AABB<[f64; 2]>,
}

impl RTreeObject for BoundaryEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.aabb
    }
}

pub struct NeighborhoodIndex {
    neighborhoods: Vec<Neighborhood>,
    tree: RTree<BoundaryEnvelope>,
    skipped: Vec<SkipReason>,
}

/// Validates one record: it needs a non-empty name and a non-empty polygonal boundary.
pub fn screen_neighborhood(record: NeighborhoodRecord) -> Screened<Neighborhood> {
    let reject = |name: Option<String>, problem| {
        Screened::Skipped(SkipReason::MalformedNeighborhood { name, problem })
    };

    let name = match record.name {
        Some(name) if !name.is_empty() => name,
        _ => return reject(None, NeighborhoodProblem::MissingName),
    };

    let boundary = match record.boundary {
        Some(Geometry::Polygon(polygon)) => MultiPolygon::new(vec![polygon]),
        Some(Geometry::MultiPolygon(multi)) => multi,
        Some(_) => return reject(Some(name), NeighborhoodProblem::NotPolygonal),
        None => return reject(Some(name), NeighborhoodProblem::MissingBoundary),
    };

    if boundary.bounding_rect().is_none() {
        return reject(Some(name), NeighborhoodProblem::EmptyBoundary);
    }

    Screened::Kept(Neighborhood { name, boundary })
}

impl NeighborhoodIndex {
    /// Builds the index in input order. Malformed records are kept aside as
    /// skip reasons rather than failing the build.
    pub fn build<I>(records: I) -> Self
    where
        I: IntoIterator<Item = NeighborhoodRecord>,
    {
        let mut neighborhoods = Vec::new();
        let mut skipped = Vec::new();

        for record in records {
            match screen_neighborhood(record) {
                Screened::Kept(neighborhood) => neighborhoods.push(neighborhood),
                Screened::Skipped(reason) => skipped.push(reason),
            }
        }

        let envelopes = neighborhoods
            .iter()
            .enumerate()
            .filter_map(|(position, neighborhood)| {
                let rect = neighborhood.boundary.bounding_rect()?;
                Some(BoundaryEnvelope {
                    position,
                    aabb: AABB::from_corners(
                        [rect.min().x, rect.min().y],
                        [rect.max().x, rect.max().y],
                    ),
                })
            })
            .collect();

        Self {
            neighborhoods,
            tree: RTree::bulk_load(envelopes),
            skipped,
        }
    }

    /// Name of the first-loaded neighborhood whose boundary contains `point`.
    pub fn locate(&self, point: Point<f64>) -> Option<&str> {
        let envelope = AABB::from_point([point.x(), point.y()]);

        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|candidate| candidate.position)
            .filter(|&position| self.neighborhoods[position].boundary.contains(&point))
            .min()
            .map(|position| self.neighborhoods[position].name.as_str())
    }

    pub fn skipped(&self) -> &[SkipReason] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.neighborhoods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighborhoods.is_empty()
    }
}
