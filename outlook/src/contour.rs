//! Splitting a product's text into contours.
//!
//! A product's text is a run of contours, each starting with its risk level
//! and followed by coordinate groups:
//!
//! ```text
//! 0.05   32929613 35169459 37389225 99999999 44038946 45098773
//! SIGN   34379482 36869232
//! ```

use std::{collections::HashMap, sync::LazyLock};

use regex::Regex;
use tracing::{debug, warn};

use crate::{
    coords::{Coordinate, SENTINEL_LAT},
    error::ContourError,
    risk::{ProductKind, RiskLevel},
};

/// The coordinates of every contour in a product, grouped by risk level.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Contours {
    /// Levels in the order they were first seen. A level that shows up more
    /// than once gets the coordinates of all its contours, separated by sentinels.
    pub levels: Vec<(RiskLevel, Vec<Coordinate>)>,
    /// The chunks we had to skip.
    pub errors: Vec<ContourError>,
}

struct Patterns {
    categorical: Regex,
    numeric: Regex,
    group: Regex,
}

impl Patterns {
    fn new() -> Patterns {
        // unwrap: these are fixed patterns, and they compile.
        Patterns {
            categorical: Regex::new(r"\s[A-Z]{3}").unwrap(),
            numeric: Regex::new(r"\s(0\.|SI|TS)").unwrap(),
            group: Regex::new(r"\d{8}").unwrap(),
        }
    }
}

static PATTERNS: LazyLock<Patterns> = LazyLock::new(Patterns::new);

/// Splits a product's text into one chunk per contour.
///
/// A new chunk starts wherever whitespace is followed by something that looks
/// like the start of a risk level: three capital letters for the categorical
/// product, and `0.`, `SI` (for `SIGN`), or `TS` (for `TSTM`) otherwise.
pub fn split_chunks(text: &str, kind: ProductKind) -> Vec<&str> {
    let re = match kind {
        ProductKind::Categorical => &PATTERNS.categorical,
        ProductKind::Numeric => &PATTERNS.numeric,
    };
    // Each match starts with the single whitespace character before the chunk.
    let mut starts = vec![0];
    starts.extend(re.find_iter(text).map(|m| m.start() + 1));
    starts.push(text.len());
    starts.dedup();
    starts
        .windows(2)
        .map(|w| text[w[0]..w[1]].trim())
        .filter(|chunk| !chunk.is_empty())
        .collect()
}

/// Extracts the contours of one product.
///
/// `overrides` maps raw level tokens to the level they should be read as,
/// before the usual parsing. Chunks that don't start with a level are skipped
/// and reported in [`Contours::errors`]; chunks without any coordinates
/// contribute nothing.
pub fn extract(
    text: &str,
    kind: ProductKind,
    overrides: &HashMap<String, RiskLevel>,
) -> Contours {
    let mut ret = Contours::default();
    let mut index: HashMap<RiskLevel, usize> = HashMap::new();

    for chunk in split_chunks(text, kind) {
        let token = chunk.split_whitespace().next().unwrap_or_default();
        let level = overrides
            .get(token)
            .copied()
            .or_else(|| RiskLevel::parse_for(token, kind));
        let Some(level) = level else {
            warn!(token, "skipping contour with unrecognised level");
            ret.errors.push(ContourError::UnknownLevel {
                token: token.to_owned(),
            });
            continue;
        };

        let coords: Vec<Coordinate> = PATTERNS
            .group
            .find_iter(chunk)
            .filter_map(|m| Coordinate::decode(m.as_str()))
            .collect();
        if coords.is_empty() {
            debug!(%level, "contour has no coordinates");
            continue;
        }

        let idx = *index.entry(level).or_insert_with(|| {
            ret.levels.push((level, Vec::new()));
            ret.levels.len() - 1
        });
        let level_coords = &mut ret.levels[idx].1;
        if !level_coords.is_empty() {
            // Keep this contour's polylines apart from the ones we already have.
            level_coords.push(Coordinate {
                lat: SENTINEL_LAT,
                lon: 0.0,
            });
        }
        level_coords.extend(coords);
    }

    ret
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::Category;

    const TORNADO: &str = "0.02   32929613 35169459\n0.05   33009600 34009500 \
                           99999999 40009000 41008900\nTSTM   30009000 31008900\n\
                           SIGN   34379482 36869232";

    #[test]
    fn split_numeric() {
        let chunks = split_chunks(TORNADO, ProductKind::Numeric);
        assert_eq!(chunks.len(), 4);
        assert!(chunks[2].starts_with("TSTM"));
        assert!(chunks[3].starts_with("SIGN"));
    }

    #[test]
    fn split_categorical() {
        let text = "SLGT   35009500 40009500\nENH    36009400 37009300\n\nTSTM   30009000";
        let chunks = split_chunks(text, ProductKind::Categorical);
        let heads: Vec<_> = chunks.iter().map(|c| &c[..4]).collect();
        assert_eq!(heads, ["SLGT", "ENH ", "TSTM"]);
    }

    #[test]
    fn tornado_override() {
        let overrides = HashMap::from([(
            "TSTM".to_owned(),
            RiskLevel::probability(0.45).unwrap(),
        )]);
        let contours = extract(TORNADO, ProductKind::Numeric, &overrides);
        let levels: Vec<_> = contours.levels.iter().map(|(l, _)| l.to_string()).collect();
        assert_eq!(levels, ["0.02", "0.05", "0.45", "SIGN"]);
        assert_eq!(contours.levels[1].1.len(), 5);
        assert!(contours.levels[1].1[2].is_sentinel());
        assert!(contours.errors.is_empty());
    }

    #[test]
    fn unknown_levels_are_skipped() {
        let contours = extract(TORNADO, ProductKind::Numeric, &HashMap::new());
        assert_eq!(contours.levels.len(), 3);
        assert_eq!(
            contours.errors,
            vec![ContourError::UnknownLevel {
                token: "TSTM".to_owned()
            }]
        );
    }

    #[test]
    fn repeated_levels_accumulate() {
        let text = "SLGT   35009500 40009500\nTSTM   30009000\nSLGT   36009400";
        let contours = extract(text, ProductKind::Categorical, &HashMap::new());
        assert_eq!(contours.levels.len(), 2);
        assert_eq!(contours.levels[0].0, RiskLevel::Category(Category::Slgt));
        assert_eq!(contours.levels[0].1.len(), 4);
        assert!(contours.levels[0].1[2].is_sentinel());
    }

    #[test]
    fn empty_text() {
        let contours = extract("", ProductKind::Categorical, &HashMap::new());
        assert!(contours.levels.is_empty());
        assert!(contours.errors.is_empty());
    }

    #[test]
    fn label_without_coordinates() {
        let contours = extract("MRGL\nSLGT 35009500", ProductKind::Categorical, &HashMap::new());
        assert_eq!(contours.levels.len(), 1);
        assert!(contours.errors.is_empty());
    }
}
