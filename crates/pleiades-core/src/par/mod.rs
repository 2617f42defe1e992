pub mod compose;
pub mod model;
pub mod reader;
pub mod writer;

pub use compose::{compose, normalized};
pub use model::{
    Broadening, ChannelRadius, GroupChannelMapping, IsotopicMass, Normalization, ParameterSet,
    ParticlePair, ResonanceParameter, SpinChannel, SpinGroup,
};
pub use reader::{parse, parse_source};
pub use writer::{render, write};

use crate::domain::ParResult;
use std::path::Path;

/// Per-file overrides applied on top of a freshly parsed set before it
/// is normalized: a display name, an abundance weight and an energy
/// window.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOptions {
    pub name: Option<String>,
    pub weight: f64,
    pub emin: f64,
    pub emax: f64,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            name: None,
            weight: 1.0,
            // No window unless the caller narrows it; negative-energy
            // bound states are real data.
            emin: f64::NEG_INFINITY,
            emax: f64::INFINITY,
        }
    }
}

/// Parses a parameter file and normalizes it under the given options.
pub fn parse_with(path: &Path, options: &ParseOptions) -> ParResult<ParameterSet> {
    let mut set = parse(path)?;
    if let Some(name) = &options.name {
        set.identity = crate::domain::SourceIdentity::Named(name.clone());
    }
    set.weight = options.weight;
    set.emin = options.emin;
    set.emax = options.emax;
    normalized(&set)
}
