pub mod errors;

pub use errors::{ParError, ParResult};

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Fixed-width record types registered in [`crate::format`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    /// Free-form key-word card; no column registration.
    ParticlePair,
    SpinGroup,
    SpinChannel,
    Resonance,
    IsotopicMass,
    Normalization,
    Broadening,
}

impl RecordKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ParticlePair => "PARTICLE PAIR",
            Self::SpinGroup => "SPIN GROUP",
            Self::SpinChannel => "SPIN CHANNEL",
            Self::Resonance => "RESONANCE",
            Self::IsotopicMass => "ISOTOPIC MASS",
            Self::Normalization => "NORMALIZATION",
            Self::Broadening => "BROADENING",
        }
    }
}

impl Display for RecordKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// Sections of a SAMMY par file, in their required write order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionKind {
    ParticlePairs,
    SpinGroups,
    ResonanceParams,
    ChannelRadii,
    IsotopicMasses,
    Normalization,
    Broadening,
}

impl SectionKind {
    pub const ALL: [SectionKind; 7] = [
        Self::ParticlePairs,
        Self::SpinGroups,
        Self::ResonanceParams,
        Self::ChannelRadii,
        Self::IsotopicMasses,
        Self::Normalization,
        Self::Broadening,
    ];

    /// Case-insensitive prefix that opens the section.
    pub const fn header_prefix(self) -> &'static str {
        match self {
            Self::ParticlePairs => "PARTICLE PAIR DEF",
            Self::SpinGroups => "SPIN GROUP INFO",
            Self::ResonanceParams => "RESONANCE PARAM",
            Self::ChannelRadii => "CHANNEL RADII IN KEY",
            Self::IsotopicMasses => "ISOTOPIC MASSES",
            Self::Normalization => "NORMALIZATION AND BACKGROUND",
            Self::Broadening => "BROADENING PARAMETERS",
        }
    }

    /// Full header line emitted by the writer.
    pub const fn header_line(self) -> &'static str {
        match self {
            Self::ParticlePairs => "PARTICLE PAIR DEFINITIONS",
            Self::SpinGroups => "SPIN GROUP INFORMATION",
            Self::ResonanceParams => "RESONANCE PARAMETERS",
            Self::ChannelRadii => "Channel radii in key-word format",
            Self::IsotopicMasses => "ISOTOPIC MASSES AND ABUNDANCES FOLLOW",
            Self::Normalization => "NORMALIZATION AND BACKGROUND FOLLOW",
            Self::Broadening => "BROADENING PARAMETERS MAY BE VARIED",
        }
    }
}

impl Display for SectionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.header_prefix())
    }
}

/// Where a parameter set came from, which also decides whether the
/// composer renames its particle pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceIdentity {
    /// Parsed from a file; the stem seeds particle-pair renaming.
    File { stem: String },
    /// Explicit name override for particle-pair renaming.
    Named(String),
    /// Produced by composition; particle pairs are already renamed.
    Compound,
}

impl SourceIdentity {
    /// Base string used to rename particle pairs, `None` for compounds.
    pub fn rename_base(&self) -> Option<&str> {
        match self {
            Self::File { stem } => Some(stem.as_str()),
            Self::Named(name) => Some(name.as_str()),
            Self::Compound => None,
        }
    }

    pub fn is_compound(&self) -> bool {
        matches!(self, Self::Compound)
    }
}

impl Display for SourceIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File { stem } => write!(f, "{stem}"),
            Self::Named(name) => write!(f, "{name}"),
            Self::Compound => f.write_str("compound"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SectionKind, SourceIdentity};

    #[test]
    fn section_headers_start_with_their_own_prefix() {
        for kind in SectionKind::ALL {
            assert!(
                kind.header_line()
                    .to_ascii_uppercase()
                    .starts_with(kind.header_prefix()),
                "{kind:?} header does not open its own section"
            );
        }
    }

    #[test]
    fn compound_identity_has_no_rename_base() {
        assert_eq!(
            SourceIdentity::File {
                stem: "Ar_40".to_string()
            }
            .rename_base(),
            Some("Ar_40")
        );
        assert_eq!(
            SourceIdentity::Named("argon".to_string()).rename_base(),
            Some("argon")
        );
        assert_eq!(SourceIdentity::Compound.rename_base(), None);
    }
}
