// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Great-circle nearest-neighbor index over station coordinates.
//!
//! Stations are stored as unit vectors in an R-tree. Straight-line (chord)
//! distance between unit vectors grows monotonically with great-circle
//! distance, so the tree's Euclidean search finds the same neighbors a
//! haversine metric would. Reported distances are haversine meters.

use crate::error::{OpsError, Result};
use crate::models::Station;
use rstar::primitives::GeomWithData;
use rstar::RTree;
use std::collections::HashMap;

/// Mean Earth radius used for all reported distances.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

type IndexedStation = GeomWithData<[f64; 3], usize>;

/// Haversine distance in meters between two `(latitude, longitude)` pairs in radians.
pub fn haversine_m(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (lat1, lon1) = a;
    let (lat2, lon2) = b;

    let h = ((lat2 - lat1) / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * ((lon2 - lon1) / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Haversine distance in meters between two stations.
pub fn station_distance_m(a: &Station, b: &Station) -> f64 {
    haversine_m(to_radians(a), to_radians(b))
}

fn to_radians(station: &Station) -> (f64, f64) {
    (station.latitude().to_radians(), station.longitude().to_radians())
}

fn unit_vector((lat, lon): (f64, f64)) -> [f64; 3] {
    [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
}

/// A station found near a query origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Position of the station in the slice the index was built from
    pub index: usize,
    pub station_id: u64,
    pub distance_m: f64,
}

/// Immutable nearest-neighbor index, built once per station set.
pub struct SpatialIndex {
    tree: RTree<IndexedStation>,
    /// (latitude, longitude) in radians, by position
    coords: Vec<(f64, f64)>,
    ids: Vec<u64>,
    positions: HashMap<u64, usize>,
}

impl SpatialIndex {
    /// Build the index over every station, in slice order.
    pub fn build(stations: &[Station]) -> Self {
        let coords: Vec<(f64, f64)> = stations.iter().map(to_radians).collect();
        let ids: Vec<u64> = stations.iter().map(|s| s.id).collect();

        let mut positions = HashMap::with_capacity(stations.len());
        for (index, id) in ids.iter().enumerate() {
            if positions.contains_key(id) {
                tracing::warn!(station_id = id, "Duplicate station id, keeping first position");
                continue;
            }
            positions.insert(*id, index);
        }

        let items: Vec<IndexedStation> = coords
            .iter()
            .enumerate()
            .map(|(index, coord)| GeomWithData::new(unit_vector(*coord), index))
            .collect();
        let tree = RTree::bulk_load(items);

        tracing::info!(stations = ids.len(), "Built spatial index");

        Self {
            tree,
            coords,
            ids,
            positions,
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Position of a station id in the indexed set.
    pub fn position_of(&self, station_id: u64) -> Option<usize> {
        self.positions.get(&station_id).copied()
    }

    pub fn station_id(&self, index: usize) -> Option<u64> {
        self.ids.get(index).copied()
    }

    /// The `k` stations nearest to the one at `origin`, closest first.
    ///
    /// The origin itself is never returned. When fewer than `k` other
    /// stations exist, all of them are returned. Equal distances are ordered
    /// by position so results are deterministic.
    pub fn query(&self, origin: usize, k: usize) -> Result<Vec<Neighbor>> {
        let center = *self.coords.get(origin).ok_or_else(|| {
            OpsError::InvalidParameter(format!(
                "Origin position {origin} outside index of {} stations",
                self.len()
            ))
        })?;

        if k == 0 {
            return Ok(Vec::new());
        }
        let query_point = unit_vector(center);

        // Nearest first. Keep reading past the k-th hit while the chord is
        // unchanged so that ties can be settled by position below.
        let mut hits: Vec<usize> = Vec::with_capacity(k);
        let mut cutoff: Option<f64> = None;
        for (item, chord_2) in self.tree.nearest_neighbor_iter_with_distance_2(&query_point) {
            if item.data == origin {
                continue;
            }
            if cutoff.is_some_and(|limit| chord_2 > limit) {
                break;
            }
            hits.push(item.data);
            if hits.len() == k {
                cutoff = Some(chord_2);
            }
        }

        let mut neighbors: Vec<Neighbor> = hits
            .into_iter()
            .map(|index| Neighbor {
                index,
                station_id: self.ids[index],
                distance_m: haversine_m(center, self.coords[index]),
            })
            .collect();

        neighbors.sort_by(|a, b| {
            a.distance_m
                .total_cmp(&b.distance_m)
                .then_with(|| a.index.cmp(&b.index))
        });
        neighbors.truncate(k);

        tracing::debug!(origin, k, found = neighbors.len(), "Nearest stations");
        Ok(neighbors)
    }

    /// Like [`SpatialIndex::query`], addressed by station id.
    pub fn query_station(&self, station_id: u64, k: usize) -> Result<Vec<Neighbor>> {
        let origin = self
            .position_of(station_id)
            .ok_or(OpsError::Lookup(station_id))?;
        self.query(origin, k)
    }
}
