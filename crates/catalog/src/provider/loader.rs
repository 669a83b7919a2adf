//! GeoJSON bundle loading.
//!
//! A bundle is a `FeatureCollection` of `Point` features. Each feature carries
//! a `kind` property (`"panorama"` or `"station"`), an `id`, and stations
//! additionally a `name`.

use std::path::Path;
use std::str::FromStr;

use geo::Point;
use geojson::{Feature, GeoJson, Value};

use crate::models::types::*;
use crate::provider::static_provider::StaticPanoramaCatalog;

impl StaticPanoramaCatalog {
    /// Parse a bundle from a GeoJSON string
    pub fn from_geojson_str(source: &str) -> Result<Self> {
        let collection = match GeoJson::from_str(source)? {
            GeoJson::FeatureCollection(collection) => collection,
            _ => {
                return Err(CatalogError::InvalidData(
                    "bundle must be a FeatureCollection".into(),
                ))
            }
        };

        let mut panoramas = Vec::new();
        let mut stations = Vec::new();

        for (n, feature) in collection.features.iter().enumerate() {
            let location = feature_point(feature, n)?;
            let id = string_property(feature, "id")
                .ok_or_else(|| CatalogError::InvalidData(format!("feature {n} has no id")))?;

            match string_property(feature, "kind") {
                Some("panorama") => panoramas.push(Panorama::new(id, location)),
                Some("station") => {
                    let name = string_property(feature, "name").unwrap_or(id);
                    stations.push(Station::new(id, name, location));
                }
                other => {
                    tracing::warn!(feature = n, kind = ?other, "skipping feature of unknown kind");
                }
            }
        }

        Ok(Self::from_data(panoramas, stations))
    }

    /// Load a bundle from a GeoJSON file on disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_geojson_str(&source)
    }
}

fn string_property<'a>(feature: &'a Feature, key: &str) -> Option<&'a str> {
    feature.property(key).and_then(|v| v.as_str())
}

fn feature_point(feature: &Feature, n: usize) -> Result<Point> {
    let geometry = feature
        .geometry
        .as_ref()
        .ok_or_else(|| CatalogError::InvalidData(format!("feature {n} has no geometry")))?;

    match &geometry.value {
        Value::Point(position) if position.len() >= 2 => {
            let (lng, lat) = (position[0], position[1]);
            if !(-180.0..=180.0).contains(&lng) || !(-90.0..=90.0).contains(&lat) {
                return Err(CatalogError::InvalidData(format!(
                    "feature {n} is out of range: ({lat}, {lng})"
                )));
            }
            Ok(Point::new(lng, lat))
        }
        _ => Err(CatalogError::InvalidData(format!(
            "feature {n} is not a point"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::traits::PanoramaCatalog;

    const BUNDLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [139.7671, 35.6812] },
                "properties": { "kind": "station", "id": "tokyo", "name": "Tokyo" }
            },
            {
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [139.7675, 35.6815] },
                "properties": { "kind": "panorama", "id": "marunouchi" }
            },
            {
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [139.70, 35.69] },
                "properties": { "kind": "vending_machine", "id": "v1" }
            }
        ]
    }"#;

    #[test]
    fn test_load_bundle() {
        let catalog = StaticPanoramaCatalog::from_geojson_str(BUNDLE).unwrap();

        assert_eq!(catalog.all_panoramas().len(), 1);
        assert_eq!(catalog.all_stations().len(), 1);
        assert_eq!(catalog.all_stations()[0].name.as_ref(), "Tokyo");
        assert_eq!(catalog.all_panoramas()[0].location, Point::new(139.7675, 35.6815));
    }

    #[test]
    fn test_rejects_non_collection() {
        let source = r#"{ "type": "Point", "coordinates": [139.0, 35.0] }"#;

        assert!(matches!(
            StaticPanoramaCatalog::from_geojson_str(source),
            Err(CatalogError::InvalidData(_))
        ));
    }

    #[test]
    fn test_rejects_feature_without_id() {
        let source = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [139.0, 35.0] },
                "properties": { "kind": "panorama" }
            }]
        }"#;

        assert!(StaticPanoramaCatalog::from_geojson_str(source).is_err());
    }
}
