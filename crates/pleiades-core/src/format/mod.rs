//! Column registry for the fixed-width record types of a SAMMY par file.
//!
//! Spans are 0-based, end-exclusive, taken from the card descriptions in
//! the SAMMY manual (cards 1, 4, 7.2, 10.1 and 10.2). Free-form records
//! (particle pairs, channel radii) are not registered here; they use
//! key-word templates handled by the reader and writer directly.

pub mod codec;
pub mod numeric;

pub use codec::{FieldMap, decode, encode};

use crate::domain::{ParError, ParResult, RecordKind};

/// Legacy maximum line width inherited from punch-card FORTRAN input.
pub const MAX_LINE_WIDTH: usize = 80;

/// Column budget of the packed spin-group list in an isotopic-mass card.
pub const SPIN_GROUP_LIST_WIDTH: usize = 46;

/// Start column of the packed spin-group list on a continuation line.
pub const SPIN_GROUP_LIST_START: usize = 32;

/// The `-1` continuation sentinel occupies these last two columns.
pub const CONTINUATION_SPAN: FieldSpan = FieldSpan::new(78, 80);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpan {
    pub start: usize,
    pub end: usize,
}

impl FieldSpan {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub const fn width(self) -> usize {
        self.end - self.start
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Justify {
    /// Text fields are left-justified in their column span.
    Left,
    /// Numeric fields are right-justified in their column span.
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub span: FieldSpan,
    pub justify: Justify,
}

const fn field(name: &'static str, start: usize, end: usize, justify: Justify) -> FieldSpec {
    FieldSpec {
        name,
        span: FieldSpan::new(start, end),
        justify,
    }
}

static SPIN_GROUP_FIELDS: &[FieldSpec] = &[
    field("group_number", 0, 3, Justify::Right),
    field("exclude", 4, 5, Justify::Left),
    field("n_entrance_channel", 7, 10, Justify::Right),
    field("n_exit_channel", 12, 15, Justify::Right),
    field("spin", 15, 20, Justify::Right),
    field("isotopic_abundance", 20, 30, Justify::Right),
];

static SPIN_CHANNEL_FIELDS: &[FieldSpec] = &[
    field("channel_number", 2, 5, Justify::Right),
    field("channel_name", 7, 15, Justify::Left),
    field("exclude", 17, 18, Justify::Left),
    field("l_spin", 18, 20, Justify::Right),
    field("channel_spin", 20, 30, Justify::Right),
    field("boundary_condition", 30, 40, Justify::Right),
    field("effective_radius", 41, 52, Justify::Right),
    field("true_radius", 52, 63, Justify::Right),
];

// The igroup span has drifted across historical format variants (1-based
// 56-67 in older layouts, overlapping the vary flags). Columns 66-67 are
// the only span disjoint from the five two-column vary flags, so that is
// the canonical definition here.
static RESONANCE_FIELDS: &[FieldSpec] = &[
    field("resonance_energy", 0, 11, Justify::Right),
    field("capture_width", 11, 22, Justify::Right),
    field("neutron_width", 22, 33, Justify::Right),
    field("fission1_width", 33, 44, Justify::Right),
    field("fission2_width", 44, 55, Justify::Right),
    field("vary_energy", 55, 57, Justify::Right),
    field("vary_capture_width", 57, 59, Justify::Right),
    field("vary_neutron_width", 59, 61, Justify::Right),
    field("vary_fission1_width", 61, 63, Justify::Right),
    field("vary_fission2_width", 63, 65, Justify::Right),
    field("igroup", 65, 67, Justify::Right),
];

static ISOTOPIC_MASS_FIELDS: &[FieldSpec] = &[
    field("atomic_mass", 0, 10, Justify::Right),
    field("abundance", 10, 20, Justify::Right),
    field("abundance_uncertainty", 20, 30, Justify::Right),
    field("vary_abundance", 30, 32, Justify::Right),
    field("spin_groups", 32, 78, Justify::Left),
];

static NORMALIZATION_FIELDS: &[FieldSpec] = &[
    field("normalization", 0, 10, Justify::Right),
    field("constant_bg", 10, 20, Justify::Right),
    field("one_over_v_bg", 20, 30, Justify::Right),
    field("sqrt_energy_bg", 30, 40, Justify::Right),
    field("exponential_bg", 40, 50, Justify::Right),
    field("exp_decay_bg", 50, 60, Justify::Right),
    field("vary_normalization", 60, 62, Justify::Right),
    field("vary_constant_bg", 62, 64, Justify::Right),
    field("vary_one_over_v_bg", 64, 66, Justify::Right),
    field("vary_sqrt_energy_bg", 66, 68, Justify::Right),
    field("vary_exponential_bg", 68, 70, Justify::Right),
    field("vary_exp_decay_bg", 70, 72, Justify::Right),
];

static BROADENING_FIELDS: &[FieldSpec] = &[
    field("match_radius", 0, 10, Justify::Right),
    field("temperature", 10, 20, Justify::Right),
    field("thickness", 20, 30, Justify::Right),
    field("flight_path_spread", 30, 40, Justify::Right),
    field("deltag_fwhm", 40, 50, Justify::Right),
    field("deltae_us", 50, 60, Justify::Right),
    field("vary_match_radius", 60, 62, Justify::Right),
    field("vary_temperature", 62, 64, Justify::Right),
    field("vary_thickness", 64, 66, Justify::Right),
    field("vary_flight_path_spread", 66, 68, Justify::Right),
    field("vary_deltag_fwhm", 68, 70, Justify::Right),
    field("vary_deltae_us", 70, 72, Justify::Right),
];

/// Field specs of one record type, in column order.
pub fn fields(kind: RecordKind) -> &'static [FieldSpec] {
    match kind {
        // Particle pairs are key-word cards; nothing is column-registered.
        RecordKind::ParticlePair => &[],
        RecordKind::SpinGroup => SPIN_GROUP_FIELDS,
        RecordKind::SpinChannel => SPIN_CHANNEL_FIELDS,
        RecordKind::Resonance => RESONANCE_FIELDS,
        RecordKind::IsotopicMass => ISOTOPIC_MASS_FIELDS,
        RecordKind::Normalization => NORMALIZATION_FIELDS,
        RecordKind::Broadening => BROADENING_FIELDS,
    }
}

/// Total width of the registered spans of a record type.
pub fn total_width(kind: RecordKind) -> usize {
    fields(kind)
        .iter()
        .map(|spec| spec.span.end)
        .max()
        .unwrap_or(0)
}

pub fn field_spec(kind: RecordKind, name: &str) -> ParResult<&'static FieldSpec> {
    fields(kind)
        .iter()
        .find(|spec| spec.name == name)
        .ok_or_else(|| ParError::UnknownField {
            kind,
            field: name.to_string(),
        })
}
