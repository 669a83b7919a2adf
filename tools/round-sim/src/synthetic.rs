use anyhow::{bail, Result};
use geo::Point;
use street_guess_core::catalog::{Panorama, StaticPanoramaCatalog, Station};
use street_guess_core::BoundingBox;

/// Panorama offset from its station, in degrees of longitude
const PANORAMA_OFFSET: f64 = 0.0005;

/// Finest grid spacing accepted, in degrees (roughly 50 m)
pub const MIN_STEP_DEGREES: f64 = 0.0005;

pub fn check_step(step_degrees: f64) -> Result<()> {
    if step_degrees.is_nan() || step_degrees < MIN_STEP_DEGREES {
        bail!("Grid step must be at least {MIN_STEP_DEGREES} degrees, got {step_degrees}");
    }
    Ok(())
}

/// A regular grid of stations over `bounds`, each with one panorama just east
/// of it. Everything stays inside the bounds.
pub fn grid_catalog(bounds: &BoundingBox, step_degrees: f64) -> StaticPanoramaCatalog {
    // Slack so an exact multiple of the step still gets its last row
    let slack = 1e-9;
    let rows = ((bounds.north() - bounds.south()) / step_degrees + slack).floor() as usize;
    let cols =
        ((bounds.east() - bounds.west() - PANORAMA_OFFSET) / step_degrees + slack).floor() as usize;

    let mut panoramas = Vec::with_capacity((rows + 1) * (cols + 1));
    let mut stations = Vec::with_capacity((rows + 1) * (cols + 1));

    for row in 0..=rows {
        let lat = (bounds.south() + row as f64 * step_degrees).min(bounds.north());
        for col in 0..=cols {
            let lng = bounds.west() + col as f64 * step_degrees;
            let pano_lng = (lng + PANORAMA_OFFSET).min(bounds.east());
            let id = format!("grid-{row}-{col}");

            stations.push(Station::new(&id, &id, Point::new(lng, lat)));
            panoramas.push(Panorama::new(&id, Point::new(pano_lng, lat)));
        }
    }

    StaticPanoramaCatalog::from_data(panoramas, stations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use street_guess_core::catalog::PanoramaCatalog;

    #[test]
    fn test_check_step() {
        assert!(check_step(0.004).is_ok());
        assert!(check_step(MIN_STEP_DEGREES).is_ok());
        assert!(check_step(1e-9).is_err());
        assert!(check_step(0.0).is_err());
        assert!(check_step(-0.004).is_err());
        assert!(check_step(f64::NAN).is_err());
    }

    #[test]
    fn test_grid_covers_bounds() {
        let bounds = BoundingBox::new(35.01, 35.0, 139.01, 139.0).unwrap();
        let catalog = grid_catalog(&bounds, 0.005);

        // Three rows; the third column would push its panorama past the east edge
        assert_eq!(catalog.all_stations().len(), 6);
        assert_eq!(catalog.all_panoramas().len(), 6);

        for pano in catalog.all_panoramas() {
            assert!(bounds.contains(&pano.location.into()));
        }

        let corner = Point::new(139.0099, 35.0099);
        assert!(catalog.nearest_panorama(corner, 500.0).is_some());
    }
}
