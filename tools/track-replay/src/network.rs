use anyhow::{bail, Context, Result};
use geo::{Coord, LineString, Point};
use geojson::{Feature, GeoJson, Value};
use jet_lag_locator::{PoiIdentifier, PointOfInterest, Route, Stop};
use std::path::Path;

/// Read a transit network from a GeoJSON FeatureCollection.
///
/// Point features become stops; LineString and MultiLineString features become
/// routes with one chain per line string.
pub fn read_network(path: &Path) -> Result<Vec<PointOfInterest>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read network file: {}", path.display()))?;

    parse_network(&content)
        .with_context(|| format!("Invalid network in: {}", path.display()))
}

pub fn parse_network(content: &str) -> Result<Vec<PointOfInterest>> {
    let geojson: GeoJson = content.parse().context("Failed to parse GeoJSON")?;

    let GeoJson::FeatureCollection(collection) = geojson else {
        bail!("Network must be a FeatureCollection");
    };

    collection
        .features
        .into_iter()
        .enumerate()
        .map(|(index, feature)| {
            feature_to_poi(feature).with_context(|| format!("Invalid feature #{index}"))
        })
        .collect()
}

fn feature_to_poi(feature: Feature) -> Result<PointOfInterest> {
    let id = feature_id(&feature)?;
    let name = string_property(&feature, "name").unwrap_or_default();
    let Some(geometry) = feature.geometry.as_ref() else {
        bail!("Feature {id} has no geometry");
    };

    match &geometry.value {
        Value::Point(position) => {
            let stop = Stop::new(id, name, coords_to_point(position)?)?;
            Ok(stop.into())
        }
        Value::LineString(line) => build_route(&feature, id, vec![coords_to_linestring(line)?]),
        Value::MultiLineString(lines) => {
            let chains = lines
                .iter()
                .map(|line| coords_to_linestring(line))
                .collect::<Result<Vec<_>>>()?;
            build_route(&feature, id, chains)
        }
        _ => bail!("Feature {id} is neither a stop point nor a route line"),
    }
}

fn build_route(feature: &Feature, id: PoiIdentifier, chains: Vec<LineString>) -> Result<PointOfInterest> {
    let reference = string_property(feature, "ref")
        .or_else(|| string_property(feature, "name"))
        .unwrap_or_default();
    let mut route = Route::new(id, reference, chains)?;

    if let (Some(from), Some(to)) = (string_property(feature, "from"), string_property(feature, "to")) {
        route = route.with_terminals(from, to);
    }
    Ok(route.into())
}

/// The `id` property, falling back to the feature id
fn feature_id(feature: &Feature) -> Result<PoiIdentifier> {
    let from_properties = feature.property("id").and_then(|value| match value {
        serde_json::Value::String(s) => Some(PoiIdentifier::new(s)),
        serde_json::Value::Number(n) => Some(PoiIdentifier::new(n.to_string())),
        _ => None,
    });

    let from_feature = || {
        feature.id.as_ref().map(|id| match id {
            geojson::feature::Id::String(s) => PoiIdentifier::new(s),
            geojson::feature::Id::Number(n) => PoiIdentifier::new(n.to_string()),
        })
    };

    from_properties
        .or_else(from_feature)
        .context("Feature has no id")
}

fn string_property(feature: &Feature, key: &str) -> Option<String> {
    feature
        .property(key)
        .and_then(serde_json::Value::as_str)
        .map(str::to_owned)
}

/// GeoJSON positions are [longitude, latitude, (altitude)]
pub fn coords_to_point(position: &[f64]) -> Result<Point> {
    match position {
        [lon, lat, ..] => Ok(Point::new(*lon, *lat)),
        _ => bail!("Position needs at least two coordinates"),
    }
}

fn coords_to_linestring(line: &[Vec<f64>]) -> Result<LineString> {
    line.iter()
        .map(|position| coords_to_point(position).map(|point| Coord::from(point)))
        .collect::<Result<Vec<_>>>()
        .map(LineString::new)
}
