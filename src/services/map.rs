// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GeoJSON map layers for station statuses and rebalance candidates.

use crate::error::{OpsError, Result};
use crate::models::{RebalanceCandidate, StationStatus};
use geojson::{feature::Id, Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde::Serialize;

/// One Point feature per station, with every status field as a property.
pub fn status_layer(statuses: &[StationStatus]) -> Result<FeatureCollection> {
    let features = statuses
        .iter()
        .map(|s| point_feature(s.station_id, s.longitude, s.latitude, s))
        .collect::<Result<Vec<_>>>()?;
    Ok(collection(features))
}

/// One Point feature per candidate, in ranking order.
pub fn candidate_layer(candidates: &[RebalanceCandidate]) -> Result<FeatureCollection> {
    let features = candidates
        .iter()
        .map(|c| point_feature(c.station_id, c.longitude, c.latitude, c))
        .collect::<Result<Vec<_>>>()?;
    Ok(collection(features))
}

fn collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn point_feature<T: Serialize>(
    station_id: u64,
    longitude: f64,
    latitude: f64,
    record: &T,
) -> Result<Feature> {
    Ok(Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(vec![longitude, latitude]))),
        id: Some(Id::Number(station_id.into())),
        properties: Some(properties(record)?),
        foreign_members: None,
    })
}

fn properties<T: Serialize>(record: &T) -> Result<JsonObject> {
    match serde_json::to_value(record).map_err(anyhow::Error::from)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(OpsError::Internal(anyhow::anyhow!(
            "Expected a JSON object for feature properties, got {other}"
        ))),
    }
}
