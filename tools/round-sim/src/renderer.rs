use street_guess_core::provider::{MapRenderer, Marker, MarkerKind};
use street_guess_core::{Coordinate, Envelope};

/// Writes every drawing command to the log instead of a map widget
pub struct LogRenderer;

impl MapRenderer for LogRenderer {
    fn render_panorama(&self, at: Coordinate) {
        tracing::info!("panorama at {at}");
    }

    fn render_map(&self, center: Coordinate, zoom: u8) {
        tracing::debug!("map centered on {center} at zoom {zoom}");
    }

    fn place_marker(&self, marker: Marker) {
        match marker.kind {
            MarkerKind::Guess => tracing::debug!("guess pin at {}", marker.position),
            MarkerKind::Actual => tracing::info!("actual location {}", marker.position),
            MarkerKind::Distance { label, scale, .. } => {
                tracing::info!("{label} (label scale {scale:.2})")
            }
        }
    }

    fn draw_line(&self, from: Coordinate, to: Coordinate) {
        tracing::debug!("line {from} -> {to}");
    }

    fn fit_bounds(&self, envelope: Envelope, padding: u32) {
        tracing::debug!(?envelope, padding, "fit bounds");
    }

    fn clear_overlays(&self) {
        tracing::debug!("clear overlays");
    }

    fn show_map(&self, visible: bool) {
        tracing::debug!(visible, "map visibility");
    }
}
