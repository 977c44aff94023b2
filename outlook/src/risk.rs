use std::fmt;

use ordered_float::NotNan;
use serde::{Deserialize, Serialize};

/// The categorical risk levels, from least to most severe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    /// General thunderstorms.
    Tstm,
    /// Marginal.
    Mrgl,
    /// Slight.
    Slgt,
    /// Enhanced.
    Enh,
    /// Moderate.
    Mdt,
    /// High.
    High,
}

impl Category {
    /// Every category, from least to most severe.
    pub const ALL: [Category; 6] = [
        Category::Tstm,
        Category::Mrgl,
        Category::Slgt,
        Category::Enh,
        Category::Mdt,
        Category::High,
    ];

    /// The label that bulletins use for this category.
    pub fn label(self) -> &'static str {
        match self {
            Category::Tstm => "TSTM",
            Category::Mrgl => "MRGL",
            Category::Slgt => "SLGT",
            Category::Enh => "ENH",
            Category::Mdt => "MDT",
            Category::High => "HIGH",
        }
    }

    /// Parses a bulletin label.
    pub fn from_label(label: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.label() == label)
    }
}

/// Whether a product's levels are categories or probabilities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductKind {
    /// The categorical outlook, whose levels are [`Category`]s.
    Categorical,
    /// A probabilistic outlook, whose levels are probabilities.
    Numeric,
}

impl ProductKind {
    /// The categorical product is the one called `CATEGORICAL`; everything else is numeric.
    pub fn of(name: &str) -> ProductKind {
        if name.eq_ignore_ascii_case("categorical") {
            ProductKind::Categorical
        } else {
            ProductKind::Numeric
        }
    }
}

/// The key of one contour in a product.
///
/// Levels sort categories first (by severity), then probabilities (in
/// increasing order), then the significant-severe flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RiskLevel {
    /// A categorical level.
    Category(Category),
    /// A probability in `(0, 1]`.
    Probability(NotNan<f64>),
    /// The hatched "significant severe" area, labelled `SIGN`.
    Significant,
}

impl RiskLevel {
    /// A probability level, if `p` is in `(0, 1]`.
    pub fn probability(p: f64) -> Option<RiskLevel> {
        (p > 0.0 && p <= 1.0)
            .then(|| NotNan::new(p).ok())
            .flatten()
            .map(RiskLevel::Probability)
    }

    /// Parses the token that starts a contour, if it's a level that makes sense for this kind of product.
    ///
    /// Numbers in `(0, 1]` are always accepted. Category labels are only
    /// accepted for the categorical product; `SIGN` is accepted everywhere.
    pub fn parse_for(token: &str, kind: ProductKind) -> Option<RiskLevel> {
        let level: RiskLevel = token.parse().ok()?;
        match (level, kind) {
            (RiskLevel::Category(_), ProductKind::Numeric) => None,
            _ => Some(level),
        }
    }

    /// Is this the significant-severe overlay?
    pub fn is_significant(&self) -> bool {
        matches!(self, RiskLevel::Significant)
    }
}

/// A string that isn't a risk level.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("not a risk level: {0:?}")]
pub struct ParseRiskLevelError(String);

impl std::str::FromStr for RiskLevel {
    type Err = ParseRiskLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "SIGN" {
            return Ok(RiskLevel::Significant);
        }
        if let Some(c) = Category::from_label(s) {
            return Ok(RiskLevel::Category(c));
        }
        s.parse::<f64>()
            .ok()
            .and_then(RiskLevel::probability)
            .ok_or_else(|| ParseRiskLevelError(s.to_owned()))
    }
}

impl TryFrom<String> for RiskLevel {
    type Error = ParseRiskLevelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<RiskLevel> for String {
    fn from(level: RiskLevel) -> Self {
        level.to_string()
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Category(c) => f.write_str(c.label()),
            RiskLevel::Probability(p) => write!(f, "{:.2}", p.into_inner()),
            RiskLevel::Significant => f.write_str("SIGN"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_levels() {
        assert_eq!(
            RiskLevel::parse_for("SLGT", ProductKind::Categorical),
            Some(RiskLevel::Category(Category::Slgt))
        );
        assert_eq!(RiskLevel::parse_for("SLGT", ProductKind::Numeric), None);
        assert_eq!(
            RiskLevel::parse_for("0.15", ProductKind::Numeric),
            RiskLevel::probability(0.15)
        );
        assert_eq!(
            RiskLevel::parse_for("SIGN", ProductKind::Numeric),
            Some(RiskLevel::Significant)
        );
        assert_eq!(RiskLevel::parse_for("0.0", ProductKind::Numeric), None);
        assert_eq!(RiskLevel::parse_for("1.5", ProductKind::Numeric), None);
        assert_eq!(RiskLevel::parse_for("NaN", ProductKind::Numeric), None);
        assert_eq!(RiskLevel::parse_for("XYZ", ProductKind::Categorical), None);
    }

    #[test]
    fn ordering() {
        let mut levels = vec![
            RiskLevel::Significant,
            RiskLevel::probability(0.3).unwrap(),
            RiskLevel::Category(Category::High),
            RiskLevel::probability(0.05).unwrap(),
            RiskLevel::Category(Category::Tstm),
        ];
        levels.sort();
        let labels: Vec<_> = levels.iter().map(|l| l.to_string()).collect();
        assert_eq!(labels, ["TSTM", "HIGH", "0.05", "0.30", "SIGN"]);
    }

    #[test]
    fn serde_as_strings() {
        let level: RiskLevel = serde_json::from_str("\"0.45\"").unwrap();
        assert_eq!(level, RiskLevel::probability(0.45).unwrap());
        assert_eq!(
            serde_json::to_string(&RiskLevel::Category(Category::Enh)).unwrap(),
            "\"ENH\""
        );
    }
}
