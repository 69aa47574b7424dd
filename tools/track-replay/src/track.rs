use anyhow::{bail, Context, Result};
use geojson::{Feature, GeoJson, Value};
use jet_lag_locator::Position;
use std::path::Path;

/// Accuracy assumed for fixes that do not carry one, in meters
pub const DEFAULT_ACCURACY_M: f64 = 10.0;

/// Read a recorded track: `Point` features in recording order.
pub fn read_track(path: &Path) -> Result<Vec<Position>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read track file: {}", path.display()))?;

    parse_track(&content).with_context(|| format!("Invalid track in: {}", path.display()))
}

pub fn parse_track(content: &str) -> Result<Vec<Position>> {
    let geojson: GeoJson = content.parse().context("Failed to parse GeoJSON")?;

    let features = match geojson {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => bail!("Track must be a Feature or FeatureCollection"),
    };

    features
        .iter()
        .enumerate()
        .map(|(index, feature)| feature_to_position(feature).with_context(|| format!("Invalid fix #{index}")))
        .collect()
}

fn feature_to_position(feature: &Feature) -> Result<Position> {
    let Some(geometry) = feature.geometry.as_ref() else {
        bail!("Fix has no geometry");
    };
    let Value::Point(coords) = &geometry.value else {
        bail!("Fix must be a Point");
    };

    let mut position = match coords.as_slice() {
        [lon, lat] => Position::new(*lat, *lon),
        [lon, lat, alt, ..] => Position::new(*lat, *lon).with_altitude(*alt),
        _ => bail!("Position needs at least two coordinates"),
    };

    position = position
        .with_accuracy(number_property(feature, "accuracy").unwrap_or(DEFAULT_ACCURACY_M))
        .with_speed(number_property(feature, "speed").unwrap_or(0.0));

    Ok(position)
}

fn number_property(feature: &Feature, key: &str) -> Option<f64> {
    feature.property(key).and_then(serde_json::Value::as_f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TRACK: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "accuracy": 4.5, "speed": 12.0 },
                "geometry": { "type": "Point", "coordinates": [7.10283, 51.50483, 55.0] }
            },
            {
                "type": "Feature",
                "properties": {},
                "geometry": { "type": "Point", "coordinates": [7.10300, 51.50490] }
            }
        ]
    }"#;

    #[test]
    fn test_parse_track_properties() {
        let fixes = parse_track(TRACK).unwrap();
        assert_eq!(fixes.len(), 2);

        assert_eq!(fixes[0].latitude, 51.50483);
        assert_eq!(fixes[0].longitude, 7.10283);
        assert_eq!(fixes[0].altitude, Some(55.0));
        assert_eq!(fixes[0].accuracy, 4.5);
        assert_eq!(fixes[0].speed, 12.0);

        assert_eq!(fixes[1].altitude, None);
        assert_eq!(fixes[1].accuracy, DEFAULT_ACCURACY_M);
        assert_eq!(fixes[1].speed, 0.0);
    }

    #[test]
    fn test_rejects_non_point_fixes() {
        let content = r#"{
            "type": "Feature",
            "properties": {},
            "geometry": { "type": "LineString", "coordinates": [[7.1, 51.5], [7.2, 51.5]] }
        }"#;

        assert!(parse_track(content).is_err());
    }

    #[test]
    fn test_read_track_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TRACK.as_bytes()).unwrap();

        let fixes = read_track(file.path()).unwrap();
        assert_eq!(fixes.len(), 2);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_track(&dir.path().join("missing.geojson")).is_err());
    }
}
