//! Turns round updates into map drawing commands.
//!
//! [`plan`] is a pure diff between two snapshots; [`Presenter`] feeds it from
//! the controller's update channel and hands the commands to a
//! [`MapRenderer`].

use tokio::sync::watch;

use crate::config::GameConfig;
use crate::location::Coordinate;
use crate::provider::{MapCommand, MapRenderer, Marker, MarkerKind};
use crate::round::{Round, RoundStatus};

/// `m:ss`, as shown on the countdown
pub fn format_countdown(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

fn guess_marker(position: Coordinate) -> MapCommand {
    MapCommand::PlaceMarker(Marker {
        kind: MarkerKind::Guess,
        position,
        draggable: true,
    })
}

/// Commands that bring a map showing `prev` up to date with `next`.
///
/// Snapshots may be coalesced, so `next` can be several transitions ahead of
/// `prev`, possibly in a newer round.
pub fn plan(prev: &Round, next: &Round, config: &GameConfig) -> Vec<MapCommand> {
    let mut commands = Vec::new();
    let new_round = prev.generation() != next.generation();

    if new_round {
        commands.push(MapCommand::ClearOverlays);
        commands.push(MapCommand::RenderMap {
            center: config.default_center,
            zoom: config.zoom,
        });
        commands.push(guess_marker(config.default_center));
    }

    if new_round || prev.map_open() != next.map_open() {
        commands.push(MapCommand::ShowMap {
            visible: next.map_open(),
        });
    }

    let became = |status: RoundStatus| {
        next.status() == status && (new_round || prev.status() != status)
    };

    if let Some(actual) = next.actual_location() {
        if became(RoundStatus::Active) || (new_round && next.status() == RoundStatus::Revealed) {
            commands.push(MapCommand::RenderPanorama { at: actual });
        }
    }

    if let Some(guess) = next.guess_location() {
        if new_round || prev.guess_location() != Some(guess) {
            commands.push(guess_marker(guess));
        }
    }

    if became(RoundStatus::Revealed) {
        if let (Some(result), Some(framing)) = (next.result(), next.framing()) {
            commands.push(MapCommand::PlaceMarker(Marker {
                kind: MarkerKind::Actual,
                position: result.actual,
                draggable: false,
            }));

            if let Some(guess) = result.guess.location() {
                commands.push(MapCommand::DrawLine {
                    from: result.actual,
                    to: guess,
                });
            }

            commands.push(MapCommand::PlaceMarker(Marker {
                kind: MarkerKind::Distance {
                    label: result.label(),
                    title: result.title(),
                    scale: result.marker_scale(),
                },
                position: framing.center,
                draggable: false,
            }));
            commands.push(MapCommand::FitBounds {
                envelope: framing.envelope,
                padding: framing.padding,
            });
        }
    }

    commands
}

pub struct Presenter<R> {
    renderer: R,
    config: GameConfig,
}

impl<R: MapRenderer> Presenter<R> {
    pub fn new(renderer: R, config: GameConfig) -> Self {
        Self { renderer, config }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Initial map, plus the last played panorama if one was stored
    pub fn show_initial(&self, persisted: Option<Coordinate>) {
        self.renderer
            .render_map(self.config.default_center, self.config.zoom);
        self.renderer.place_marker(Marker {
            kind: MarkerKind::Guess,
            position: self.config.default_center,
            draggable: true,
        });

        if let Some(at) = persisted {
            self.renderer.render_panorama(at);
        }
    }

    /// Render every update until the controller goes away
    pub async fn run(&self, mut updates: watch::Receiver<Round>) {
        let mut last = updates.borrow_and_update().clone();

        while updates.changed().await.is_ok() {
            let next = updates.borrow_and_update().clone();

            for command in plan(&last, &next, &self.config) {
                tracing::trace!(?command, "render");
                self.renderer.apply(command);
            }

            last = next;
        }
    }
}
