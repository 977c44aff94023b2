use std::collections::BTreeMap;

use planar::Polygon;
use serde::Serialize;
use tracing::{debug, info_span, warn};

use crate::{
    config::ParseConfig,
    construct::{construct, Candidate},
    contour,
    error::{ProductError, ProductErrorKind},
    outline::Outline,
    resolve::resolve,
    risk::{ProductKind, RiskLevel},
    segment::split_polylines,
};

/// One forecast field of an outlook (the categorical outlook, or the
/// tornado, wind, or hail probabilities).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Product {
    name: String,
    kind: ProductKind,
    levels: BTreeMap<RiskLevel, Vec<Polygon>>,
    #[serde(skip)]
    errors: Vec<ProductError>,
}

impl Product {
    /// Parses the text of one product section.
    ///
    /// Problems with individual contours, polylines, or levels don't stop the
    /// parse: the offending piece is skipped and the problem is recorded in
    /// [`Product::errors`].
    pub fn parse(name: &str, text: &str, outline: &Outline, config: &ParseConfig) -> Product {
        let name = name.to_ascii_uppercase();
        let _span = info_span!("product", name = %name).entered();
        let kind = ProductKind::of(&name);
        let mut errors = Vec::new();
        let mut record = |level: Option<RiskLevel>, polyline: Option<usize>, kind: ProductErrorKind| {
            let err = ProductError {
                product: name.clone(),
                level,
                polyline,
                kind,
            };
            warn!(level = ?err.level, polyline = ?err.polyline, "{}", err.kind);
            errors.push(err);
        };

        let contours = contour::extract(text, kind, &config.overrides_for(&name));
        for err in contours.errors {
            record(None, None, err.into());
        }

        let mut levels = BTreeMap::new();
        for (level, coords) in contours.levels {
            let mut candidates: Vec<Candidate> = Vec::new();
            for (idx, polyline) in split_polylines(&coords).iter().enumerate() {
                match construct(polyline, outline, &config.construction) {
                    Ok(c) => candidates.extend(c),
                    Err(e) => record(Some(level), Some(idx), e.into()),
                }
            }
            debug!(%level, candidates = candidates.len(), "built candidates");
            if candidates.is_empty() {
                continue;
            }

            match resolve(candidates, &config.resolve) {
                Ok(polygons) if polygons.is_empty() => {}
                Ok(polygons) => {
                    debug!(%level, regions = polygons.len(), "resolved");
                    levels.insert(level, polygons);
                }
                Err(e) => record(Some(level), None, e.into()),
            }
        }

        Product {
            name,
            kind,
            levels,
            errors,
        }
    }

    /// The product's name, in lower case.
    pub fn name(&self) -> String {
        self.name.to_ascii_lowercase()
    }

    /// Whether this is the categorical product or a probabilistic one.
    pub fn kind(&self) -> ProductKind {
        self.kind
    }

    /// The levels that have regions, from least to most severe. The significant-severe overlay isn't included.
    pub fn risk_levels(&self) -> impl Iterator<Item = RiskLevel> + '_ {
        self.levels.keys().copied().filter(|l| !l.is_significant())
    }

    /// The regions for a level, or an empty slice if the level has none.
    pub fn regions(&self, level: RiskLevel) -> &[Polygon] {
        self.levels.get(&level).map(Vec::as_slice).unwrap_or_default()
    }

    /// The significant-severe overlay.
    pub fn significant(&self) -> &[Polygon] {
        self.regions(RiskLevel::Significant)
    }

    /// Everything that was skipped while parsing.
    pub fn errors(&self) -> &[ProductError] {
        &self.errors
    }
}
