use crate::location::{Coordinate, Envelope};

#[derive(Clone, Debug, PartialEq)]
pub enum MarkerKind {
    /// The player's pin
    Guess,
    /// Where the panorama really was; drawn as a yellow pin
    Actual,
    /// Text label halfway between the two pins
    Distance { label: String, title: String, scale: f64 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    pub kind: MarkerKind,
    pub position: Coordinate,
    pub draggable: bool,
}

/// Rendering instructions for the host's map widgets.
#[derive(Clone, Debug, PartialEq)]
pub enum MapCommand {
    RenderPanorama { at: Coordinate },
    RenderMap { center: Coordinate, zoom: u8 },
    PlaceMarker(Marker),
    DrawLine { from: Coordinate, to: Coordinate },
    FitBounds { envelope: Envelope, padding: u32 },
    /// Remove the actual-location pin, the line, and the distance label
    ClearOverlays,
    ShowMap { visible: bool },
}

/// Fire-and-forget drawing surface.
///
/// Nothing is returned; a command is considered accepted once the call
/// returns.
pub trait MapRenderer: Send + Sync {
    fn render_panorama(&self, at: Coordinate);
    fn render_map(&self, center: Coordinate, zoom: u8);
    fn place_marker(&self, marker: Marker);
    fn draw_line(&self, from: Coordinate, to: Coordinate);
    fn fit_bounds(&self, envelope: Envelope, padding: u32);
    fn clear_overlays(&self);
    fn show_map(&self, visible: bool);

    fn apply(&self, command: MapCommand) {
        match command {
            MapCommand::RenderPanorama { at } => self.render_panorama(at),
            MapCommand::RenderMap { center, zoom } => self.render_map(center, zoom),
            MapCommand::PlaceMarker(marker) => self.place_marker(marker),
            MapCommand::DrawLine { from, to } => self.draw_line(from, to),
            MapCommand::FitBounds { envelope, padding } => self.fit_bounds(envelope, padding),
            MapCommand::ClearOverlays => self.clear_overlays(),
            MapCommand::ShowMap { visible } => self.show_map(visible),
        }
    }
}
