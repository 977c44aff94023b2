use std::path::Path;

use planar::{Point, Polygon, Ring};
use serde::Deserialize;

use crate::error::{Error, OutlineError};

/// Points closer than this to the outline's boundary are neither inside nor outside.
const BOUNDARY_SLOP: f64 = 1e-9;

/// The fixed landmass that every region is clipped to.
///
/// Loaded once and then shared (usually in an `Arc`) by everything that gets parsed.
#[derive(Clone, Debug)]
pub struct Outline {
    polygon: Polygon,
}

#[derive(Deserialize)]
struct RawOutline {
    exterior: Vec<Point>,
    #[serde(default)]
    interiors: Vec<Vec<Point>>,
}

impl Outline {
    /// Wraps a polygon as an outline, checking that it encloses something and has finite coordinates.
    pub fn new(polygon: Polygon) -> Result<Outline, OutlineError> {
        let n = polygon.exterior.len();
        if n < 3 {
            return Err(OutlineError::TooFewPoints(n));
        }
        // Rejects NaNs and infinities.
        planar::default_eps(polygon.rings().flat_map(|r| r.points()))?;
        Ok(Outline { polygon })
    }

    /// Parses an outline from JSON: `{"exterior": [[lon, lat], ...], "interiors": [...]}`.
    pub fn from_json(s: &str) -> Result<Outline, OutlineError> {
        let raw: RawOutline = serde_json::from_str(s)?;
        Outline::new(Polygon::new(
            Ring::new(raw.exterior),
            raw.interiors.into_iter().map(Ring::new).collect(),
        ))
    }

    /// Reads an outline from a JSON file.
    pub fn read(path: impl AsRef<Path>) -> Result<Outline, Error> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::from_io(e, path))?;
        Ok(Outline::from_json(&text)?)
    }

    /// The outline's polygon.
    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    /// The boundary rings: exterior first, then holes.
    pub fn rings(&self) -> impl Iterator<Item = &Ring> + '_ {
        self.polygon.rings()
    }

    /// Is `p` inside the outline (or on its boundary)?
    pub fn contains(&self, p: &Point) -> bool {
        self.polygon.contains_point(p)
    }

    /// Is `p` outside the outline, and not on its boundary?
    pub fn strictly_outside(&self, p: &Point) -> bool {
        !self.polygon.contains_point(p) && self.polygon.boundary_distance(p) > BOUNDARY_SLOP
    }

    /// Does the outline contain `polygon`, once `polygon` has been shrunk by `tolerance`?
    pub fn contains_eroded(&self, polygon: &Polygon, tolerance: f64) -> bool {
        self.polygon.contains_eroded(polygon, tolerance)
    }
}
