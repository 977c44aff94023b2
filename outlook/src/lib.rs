#![warn(missing_docs)]
//! Reconstructing the risk areas of a convective outlook.
//!
//! A convective outlook bulletin describes its risk areas as contours: lists of
//! coordinates, each enclosing the area to its right. This crate turns those
//! contours back into regions, clipped to a fixed outline of the land they
//! cover, with the regions for each risk level made disjoint.
//!
//! ```no_run
//! use std::sync::Arc;
//! use outlook::{Outline, Outlook, RiskLevel, Category};
//!
//! let outline = Arc::new(Outline::read("outline.json")?);
//! let outlook = Outlook::read("day1otlk.txt", outline)?;
//! if let Some(cat) = outlook.product("categorical") {
//!     for poly in cat.regions(RiskLevel::Category(Category::Slgt)) {
//!         println!("{}", poly.area());
//!     }
//! }
//! # Ok::<(), outlook::Error>(())
//! ```

use std::{
    collections::BTreeMap,
    ops::Range,
    path::Path,
    sync::{Arc, LazyLock},
};

use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::info_span;

pub mod config;
pub mod construct;
pub mod contour;
pub mod coords;
mod error;
pub mod header;
mod outline;
mod product;
pub mod resolve;
mod risk;
pub mod segment;

pub use config::{ConstructionConfig, ParseConfig, ResolveConfig};
pub use coords::Coordinate;
pub use error::{
    ContourError, Error, GeometryError, OutlineError, ProductError, ProductErrorKind, ResolveError,
};
pub use outline::Outline;
pub use product::Product;
pub use risk::{Category, ProductKind, RiskLevel};

/// The heading of a product section, like `... CATEGORICAL ...`.
// unwrap: this is a fixed pattern, and it compiles.
static SECTION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.\.\. ([A-Z ]+) \.\.\.").unwrap());

/// A parsed outlook bulletin.
#[derive(Clone, Debug)]
pub struct Outlook {
    issued: DateTime<Utc>,
    valid: Range<DateTime<Utc>>,
    products: BTreeMap<String, Product>,
    outline: Arc<Outline>,
}

impl Outlook {
    /// Parses a bulletin with the default settings.
    pub fn parse(text: &str, outline: Arc<Outline>) -> Result<Outlook, Error> {
        Outlook::parse_with(text, outline, &ParseConfig::default())
    }

    /// Parses a bulletin.
    ///
    /// Fails only if the bulletin's structure is broken. Problems inside a
    /// product are recorded on that product; see [`Product::errors`].
    pub fn parse_with(
        text: &str,
        outline: Arc<Outline>,
        config: &ParseConfig,
    ) -> Result<Outlook, Error> {
        let _span = info_span!("outlook").entered();
        let header::Header { issued, valid } = header::parse_header(text)?;

        let mut products = BTreeMap::new();
        for caps in SECTION.captures_iter(text) {
            let name = caps[1].trim();
            // unwrap: capture group 0 always exists.
            let rest = &text[caps.get(0).unwrap().end()..];
            let end = rest
                .find("&&")
                .ok_or_else(|| Error::MalformedBulletin(format!("{name} section has no `&&`")))?;
            let product = Product::parse(name, &rest[..end], &outline, config);
            products.insert(name.to_owned(), product);
        }

        Ok(Outlook {
            issued,
            valid,
            products,
            outline,
        })
    }

    /// Reads and parses a bulletin file.
    pub fn read(path: impl AsRef<Path>, outline: Arc<Outline>) -> Result<Outlook, Error> {
        Outlook::read_with(path, outline, &ParseConfig::default())
    }

    /// Reads and parses a bulletin file, with the given settings.
    pub fn read_with(
        path: impl AsRef<Path>,
        outline: Arc<Outline>,
        config: &ParseConfig,
    ) -> Result<Outlook, Error> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::from_io(e, path))?;
        Outlook::parse_with(&text, outline, config)
    }

    /// Looks up a product by name, ignoring case.
    pub fn product(&self, name: &str) -> Option<&Product> {
        self.products.get(&name.to_ascii_uppercase())
    }

    /// All the products, ordered by name.
    pub fn products(&self) -> impl Iterator<Item = &Product> + '_ {
        self.products.values()
    }

    /// When the bulletin was issued.
    pub fn issued(&self) -> DateTime<Utc> {
        self.issued
    }

    /// The time span that the outlook covers.
    pub fn valid(&self) -> Range<DateTime<Utc>> {
        self.valid.clone()
    }

    /// The outline that regions were clipped to.
    pub fn outline(&self) -> &Outline {
        &self.outline
    }
}
