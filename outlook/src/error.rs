use std::path::PathBuf;

use thiserror::Error;

use crate::risk::RiskLevel;

/// Errors that stop a bulletin from being parsed at all.
#[derive(Debug, Error)]
pub enum Error {
    /// The bulletin is missing its header, or a product section is unterminated.
    #[error("malformed bulletin: {0}")]
    MalformedBulletin(String),
    /// The file to read doesn't exist.
    #[error("no such file {path:?}")]
    NotFound {
        /// The path we tried to read.
        path: PathBuf,
    },
    /// The outline couldn't be loaded.
    #[error("bad outline")]
    Outline(#[from] OutlineError),
    /// Some other I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Maps a missing file to [`Error::NotFound`], and other I/O errors to [`Error::Io`].
    pub(crate) fn from_io(err: std::io::Error, path: &std::path::Path) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound {
                path: path.to_owned(),
            }
        } else {
            Error::Io(err)
        }
    }
}

/// Problems loading an outline.
#[derive(Debug, Error)]
pub enum OutlineError {
    /// The outline isn't valid JSON of the right shape.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// The exterior doesn't have enough points to enclose anything.
    #[error("outline exterior has {0} points, but needs at least 3")]
    TooFewPoints(usize),
    /// Some coordinates are NaN or infinite.
    #[error(transparent)]
    Planar(#[from] planar::Error),
}

/// A chunk of contour text that couldn't be understood.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ContourError {
    /// The chunk starts with something that isn't a level for this product.
    #[error("unrecognised risk level {token:?}")]
    UnknownLevel {
        /// The first word of the chunk.
        token: String,
    },
}

/// A polyline that couldn't be turned into regions.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum GeometryError {
    /// Too few distinct points.
    #[error("polyline has too few distinct points")]
    Degenerate,
    /// The polyline crosses itself.
    #[error("polyline crosses itself")]
    SelfIntersecting,
    /// The ends of an open polyline couldn't be pushed outside the outline.
    #[error("couldn't extend the polyline's ends past the outline")]
    ExtensionFailed,
    /// No part of the outline is on the polyline's right.
    #[error("no part of the outline lies to the right of the polyline")]
    NoQualifyingFaces,
    /// Some coordinates are NaN or infinite.
    #[error(transparent)]
    Planar(#[from] planar::Error),
}

/// Problems making a level's regions disjoint.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ResolveError {
    /// The regions still overlapped after the iteration limit.
    #[error("regions still overlap after {iterations} iterations")]
    NonConvergent {
        /// How many merge steps were taken.
        iterations: usize,
    },
    /// A boolean operation failed.
    #[error(transparent)]
    Planar(#[from] planar::Error),
}

/// What went wrong while parsing part of a product.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ProductErrorKind {
    /// A contour chunk was skipped.
    #[error(transparent)]
    Contour(#[from] ContourError),
    /// A polyline was skipped.
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    /// A risk level was dropped.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// A non-fatal error, recorded on a product along with where it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductError {
    /// The (upper-case) product name.
    pub product: String,
    /// The risk level being parsed, if we got as far as knowing it.
    pub level: Option<RiskLevel>,
    /// The index of the polyline within its risk level.
    pub polyline: Option<usize>,
    /// What went wrong.
    pub kind: ProductErrorKind,
}

impl std::fmt::Display for ProductError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.product)?;
        if let Some(level) = &self.level {
            write!(f, " {level}")?;
        }
        if let Some(idx) = self.polyline {
            write!(f, " polyline {idx}")?;
        }
        write!(f, ": {}", self.kind)
    }
}

impl std::error::Error for ProductError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}
