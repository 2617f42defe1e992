//! In-memory model of one par file.
//!
//! Fixed-width fields are kept as the raw text slots sliced out of the
//! source line, so spacing and precision survive a round trip; typed
//! accessors parse on demand and setters re-render canonically. The two
//! free-form record types (particle pairs, channel radii) carry their own
//! key-word codecs here as well.

use crate::domain::{ParError, ParResult, RecordKind, SectionKind, SourceIdentity};
use crate::format::codec::{self, FieldMap};
use crate::format::numeric::{format_abundance, parse_fortran_f64, parse_i32};
use crate::format::{CONTINUATION_SPAN, MAX_LINE_WIDTH, SPIN_GROUP_LIST_START, SPIN_GROUP_LIST_WIDTH};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// A named two-body reaction channel, card 4 key-word style.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticlePair {
    pub name: String,
    pub particle_a: String,
    pub particle_b: String,
    pub charge_a: String,
    pub charge_b: String,
    pub vary_penetrability: String,
    pub vary_shift: String,
    pub spin_a: String,
    pub spin_b: String,
    /// Masses keep the original decimal text to avoid precision loss.
    pub mass_a: String,
    pub mass_b: String,
}

static PAIR_PATTERNS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();

fn pair_patterns() -> &'static [(&'static str, Regex)] {
    PAIR_PATTERNS.get_or_init(|| {
        [
            ("name", r"Name=\s*(\S+)"),
            ("particle_a", r"Particle a=\s*(\S+)"),
            ("particle_b", r"Particle b=\s*(\S+)"),
            ("charge_a", r"Za=\s*(-?\d+)"),
            ("charge_b", r"Zb=\s*(-?\d+)"),
            ("vary_penetrability", r"Pent=\s*(\d+)"),
            ("vary_shift", r"Shift=\s*(\d+)"),
            ("spin_a", r"Sa=\s*(-?[\d.]+)"),
            ("spin_b", r"Sb=\s*(-?[\d.]+)"),
            ("mass_a", r"Ma=\s*([\d.Ee+-]+)"),
            ("mass_b", r"Mb=\s*([\d.Ee+-]+)"),
        ]
        .into_iter()
        .map(|(key, pattern)| {
            (
                key,
                Regex::new(pattern).expect("particle-pair pattern must compile"),
            )
        })
        .collect()
    })
}

impl ParticlePair {
    /// Extracts the key-word values from one card's text (its physical
    /// lines joined with a blank). `None` when any key is missing.
    pub fn from_card_text(text: &str) -> Option<Self> {
        let mut pair = Self::default();
        for (key, pattern) in pair_patterns() {
            let value = pattern.captures(text)?.get(1)?.as_str().to_string();
            match *key {
                "name" => pair.name = value,
                "particle_a" => pair.particle_a = value,
                "particle_b" => pair.particle_b = value,
                "charge_a" => pair.charge_a = value,
                "charge_b" => pair.charge_b = value,
                "vary_penetrability" => pair.vary_penetrability = value,
                "vary_shift" => pair.vary_shift = value,
                "spin_a" => pair.spin_a = value,
                "spin_b" => pair.spin_b = value,
                "mass_a" => pair.mass_a = value,
                "mass_b" => pair.mass_b = value,
                _ => unreachable!(),
            }
        }
        Some(pair)
    }

    /// Renders the card back into its three-line key-word template.
    pub fn to_card_lines(&self) -> ParResult<Vec<String>> {
        if self.name.chars().count() > 8 {
            return Err(ParError::FieldWidth {
                kind: RecordKind::ParticlePair,
                field: "name",
                value: self.name.clone(),
                width: 8,
            });
        }
        let first = format!(
            "Name={:<8}  Particle a={:<8}  Particle b={:<8}",
            self.name, self.particle_a, self.particle_b
        );
        let second = format!(
            "      Za={:>4}      Zb={:>4}      Pent={}     Shift={}",
            self.charge_a, self.charge_b, self.vary_penetrability, self.vary_shift
        );
        let third = format!(
            "      Sa={:>5}     Sb={:>5}     Ma={:<19}     Mb={:<19}",
            self.spin_a, self.spin_b, self.mass_a, self.mass_b
        );
        Ok(vec![
            first.trim_end().to_string(),
            second.trim_end().to_string(),
            third.trim_end().to_string(),
        ])
    }
}

/// Card 10.2 spin-group header plus its owned channels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinGroup {
    pub group_number: String,
    pub exclude: String,
    pub n_entrance_channel: String,
    pub n_exit_channel: String,
    pub spin: String,
    pub isotopic_abundance: String,
    pub channels: Vec<SpinChannel>,
}

impl SpinGroup {
    pub fn decode(line: &str) -> ParResult<Self> {
        let fields = codec::decode(RecordKind::SpinGroup, line)?;
        Ok(Self {
            group_number: fields.slot("group_number"),
            exclude: fields.slot("exclude"),
            n_entrance_channel: fields.slot("n_entrance_channel"),
            n_exit_channel: fields.slot("n_exit_channel"),
            spin: fields.slot("spin"),
            isotopic_abundance: fields.slot("isotopic_abundance"),
            channels: Vec::new(),
        })
    }

    pub fn encode(&self) -> ParResult<String> {
        let mut fields = FieldMap::default();
        fields.set("group_number", self.group_number.clone());
        fields.set("exclude", self.exclude.clone());
        fields.set("n_entrance_channel", self.n_entrance_channel.clone());
        fields.set("n_exit_channel", self.n_exit_channel.clone());
        fields.set("spin", self.spin.clone());
        fields.set("isotopic_abundance", self.isotopic_abundance.clone());
        codec::encode(RecordKind::SpinGroup, &fields)
    }

    pub fn group_number(&self) -> ParResult<i32> {
        parse_i32("group_number", &self.group_number)
    }

    pub fn set_group_number(&mut self, value: i32) {
        self.group_number = value.to_string();
    }

    /// Declared number of channel lines following the header.
    pub fn channel_count(&self) -> ParResult<usize> {
        let entrance = int_or_zero("n_entrance_channel", &self.n_entrance_channel)?;
        let exit = int_or_zero("n_exit_channel", &self.n_exit_channel)?;
        Ok((entrance + exit) as usize)
    }

    pub fn set_abundance(&mut self, weight: f64) {
        self.isotopic_abundance = format_abundance(weight);
    }
}

/// One entrance or exit channel within a spin group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinChannel {
    pub channel_number: String,
    /// Named back-reference to a [`ParticlePair::name`].
    pub channel_name: String,
    pub exclude: String,
    pub l_spin: String,
    pub channel_spin: String,
    pub boundary_condition: String,
    pub effective_radius: String,
    pub true_radius: String,
}

impl SpinChannel {
    pub fn decode(line: &str) -> ParResult<Self> {
        let fields = codec::decode(RecordKind::SpinChannel, line)?;
        Ok(Self {
            channel_number: fields.slot("channel_number"),
            channel_name: fields.slot("channel_name"),
            exclude: fields.slot("exclude"),
            l_spin: fields.slot("l_spin"),
            channel_spin: fields.slot("channel_spin"),
            boundary_condition: fields.slot("boundary_condition"),
            effective_radius: fields.slot("effective_radius"),
            true_radius: fields.slot("true_radius"),
        })
    }

    pub fn encode(&self) -> ParResult<String> {
        let mut fields = FieldMap::default();
        fields.set("channel_number", self.channel_number.clone());
        fields.set("channel_name", self.channel_name.clone());
        fields.set("exclude", self.exclude.clone());
        fields.set("l_spin", self.l_spin.clone());
        fields.set("channel_spin", self.channel_spin.clone());
        fields.set("boundary_condition", self.boundary_condition.clone());
        fields.set("effective_radius", self.effective_radius.clone());
        fields.set("true_radius", self.true_radius.clone());
        codec::encode(RecordKind::SpinChannel, &fields)
    }
}

/// Card 1 resonance line: energy, four partial widths, vary flags and
/// the owning spin group (igroup).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResonanceParameter {
    pub resonance_energy: String,
    pub capture_width: String,
    pub neutron_width: String,
    pub fission1_width: String,
    pub fission2_width: String,
    pub vary_energy: String,
    pub vary_capture_width: String,
    pub vary_neutron_width: String,
    pub vary_fission1_width: String,
    pub vary_fission2_width: String,
    pub igroup: String,
}

impl ResonanceParameter {
    pub fn decode(line: &str) -> ParResult<Self> {
        let fields = codec::decode(RecordKind::Resonance, line)?;
        Ok(Self {
            resonance_energy: fields.slot("resonance_energy"),
            capture_width: fields.slot("capture_width"),
            neutron_width: fields.slot("neutron_width"),
            fission1_width: fields.slot("fission1_width"),
            fission2_width: fields.slot("fission2_width"),
            vary_energy: fields.slot("vary_energy"),
            vary_capture_width: fields.slot("vary_capture_width"),
            vary_neutron_width: fields.slot("vary_neutron_width"),
            vary_fission1_width: fields.slot("vary_fission1_width"),
            vary_fission2_width: fields.slot("vary_fission2_width"),
            igroup: fields.slot("igroup"),
        })
    }

    pub fn encode(&self) -> ParResult<String> {
        let mut fields = FieldMap::default();
        fields.set("resonance_energy", self.resonance_energy.clone());
        fields.set("capture_width", self.capture_width.clone());
        fields.set("neutron_width", self.neutron_width.clone());
        fields.set("fission1_width", self.fission1_width.clone());
        fields.set("fission2_width", self.fission2_width.clone());
        fields.set("vary_energy", self.vary_energy.clone());
        fields.set("vary_capture_width", self.vary_capture_width.clone());
        fields.set("vary_neutron_width", self.vary_neutron_width.clone());
        fields.set("vary_fission1_width", self.vary_fission1_width.clone());
        fields.set("vary_fission2_width", self.vary_fission2_width.clone());
        fields.set("igroup", self.igroup.clone());
        codec::encode(RecordKind::Resonance, &fields)
    }

    /// Resonance energy in eV, accepting packed exponent notation.
    pub fn energy(&self) -> ParResult<f64> {
        parse_fortran_f64("resonance_energy", &self.resonance_energy)
    }

    pub fn igroup(&self) -> ParResult<i32> {
        parse_i32("igroup", &self.igroup)
    }

    pub fn set_igroup(&mut self, value: i32) {
        self.igroup = value.to_string();
    }

    /// Holds every parameter fixed; only the fit driver decides what varies.
    pub fn clear_vary_flags(&mut self) {
        self.vary_energy = "0".to_string();
        self.vary_capture_width = "0".to_string();
        self.vary_neutron_width = "0".to_string();
        self.vary_fission1_width = "0".to_string();
        self.vary_fission2_width = "0".to_string();
    }
}

/// An effective interaction radius applied to (group, channel) pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRadius {
    pub radii: [String; 2],
    pub flags: [String; 2],
    pub groups: Vec<GroupChannelMapping>,
}

static RADII_PATTERN: OnceLock<Regex> = OnceLock::new();
static GROUP_PATTERN: OnceLock<Regex> = OnceLock::new();

fn radii_pattern() -> &'static Regex {
    RADII_PATTERN.get_or_init(|| {
        Regex::new(r"Radii=\s*([\d.]+),\s*([\d.]+)\s+Flags=\s*(\d+),\s*(\d+)")
            .expect("radii pattern must compile")
    })
}

fn group_pattern() -> &'static Regex {
    GROUP_PATTERN.get_or_init(|| {
        Regex::new(r"Group=\s*(\d+)\s+Chan(?:nel)?=\s*([\d,\s]+),")
            .expect("group-mapping pattern must compile")
    })
}

impl ChannelRadius {
    /// Matches a `Radii= ..., ...  Flags= ..., ...` header line.
    pub fn from_header_line(line: &str) -> Option<Self> {
        let captures = radii_pattern().captures(line)?;
        Some(Self {
            radii: [captures[1].to_string(), captures[2].to_string()],
            flags: [captures[3].to_string(), captures[4].to_string()],
            groups: Vec::new(),
        })
    }

    pub fn header_line(&self) -> String {
        format!(
            "{:<80}",
            format!(
                "Radii= {}, {}    Flags= {}, {}",
                self.radii[0], self.radii[1], self.flags[0], self.flags[1]
            )
        )
    }
}

/// Maps one spin group to the channel numbers a radius applies to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupChannelMapping {
    pub group: i32,
    pub channels: Vec<i32>,
}

impl GroupChannelMapping {
    /// Matches a `    Group=N Chan=C1, C2,` line.
    pub fn from_line(line: &str) -> Option<Self> {
        let captures = group_pattern().captures(line)?;
        let group = captures[1].parse::<i32>().ok()?;
        let mut channels = Vec::new();
        for token in captures[2].split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            channels.push(token.parse::<i32>().ok()?);
        }
        Some(Self { group, channels })
    }

    pub fn to_line(&self) -> String {
        let channels = self
            .channels
            .iter()
            .map(|channel| channel.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        format!("{:<80}", format!("    Group={} Chan={},", self.group, channels))
    }
}

/// Card 10.1 isotopic mass and abundance, with its wrapped list of
/// member spin groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IsotopicMass {
    pub atomic_mass: String,
    pub abundance: String,
    pub abundance_uncertainty: String,
    pub vary_abundance: String,
    pub spin_groups: Vec<i32>,
}

impl IsotopicMass {
    /// Decodes every record of an isotopic-masses section, following the
    /// `-1` continuation sentinel across physical lines.
    pub fn decode_all(lines: &[(usize, String)]) -> ParResult<Vec<Self>> {
        let mut records = Vec::new();
        let mut index = 0;
        while index < lines.len() {
            let (_, first) = &lines[index];
            let fields = codec::decode(RecordKind::IsotopicMass, first)?;
            let mut packed = fields.slot("spin_groups");
            let mut continued = has_continuation(first);
            while continued {
                index += 1;
                let Some((_, next)) = lines.get(index) else {
                    return Err(ParError::TruncatedSection {
                        kind: SectionKind::IsotopicMasses,
                        line: lines[index - 1].0,
                    });
                };
                packed.push_str(&continuation_slice(next));
                continued = has_continuation(next);
            }
            records.push(Self {
                atomic_mass: fields.slot("atomic_mass"),
                abundance: fields.slot("abundance"),
                abundance_uncertainty: fields.slot("abundance_uncertainty"),
                vary_abundance: fields.slot("vary_abundance"),
                spin_groups: unpack_spin_groups(&packed)?,
            });
            index += 1;
        }
        Ok(records)
    }

    /// Encodes the record, wrapping the packed spin-group list at the
    /// 46-column budget with the `-1` sentinel in columns 79-80.
    pub fn encode(&self) -> ParResult<Vec<String>> {
        let chunks = self.packed_group_chunks()?;
        let mut fields = FieldMap::default();
        fields.set("atomic_mass", self.atomic_mass.clone());
        fields.set("abundance", self.abundance.clone());
        fields.set("abundance_uncertainty", self.abundance_uncertainty.clone());
        fields.set("vary_abundance", self.vary_abundance.clone());
        fields.set("spin_groups", chunks.first().cloned().unwrap_or_default());
        let mut lines = vec![codec::encode(RecordKind::IsotopicMass, &fields)?];

        for chunk in chunks.iter().skip(1) {
            let mut buffer = vec![' '; MAX_LINE_WIDTH];
            buffer.splice(
                SPIN_GROUP_LIST_START..SPIN_GROUP_LIST_START + chunk.chars().count(),
                chunk.chars(),
            );
            lines.push(buffer.into_iter().collect());
        }

        // Each line but the last carries the continuation sentinel.
        let last = lines.len() - 1;
        for line in &mut lines[..last] {
            let mut buffer: Vec<char> = line.chars().collect();
            buffer.splice(CONTINUATION_SPAN.start..CONTINUATION_SPAN.end, "-1".chars());
            *line = buffer.into_iter().collect();
        }
        Ok(lines)
    }

    fn packed_group_chunks(&self) -> ParResult<Vec<String>> {
        let mut packed = String::new();
        for group in &self.spin_groups {
            let rendered = format!("{group:>2}");
            if rendered.chars().count() > 2 {
                return Err(ParError::FieldWidth {
                    kind: RecordKind::IsotopicMass,
                    field: "spin_groups",
                    value: rendered,
                    width: 2,
                });
            }
            packed.push_str(&rendered);
        }
        let per_line = SPIN_GROUP_LIST_WIDTH / 2;
        let chunks: Vec<String> = self
            .spin_groups
            .chunks(per_line.max(1))
            .map(|chunk| chunk.iter().map(|group| format!("{group:>2}")).collect())
            .collect();
        if chunks.is_empty() {
            return Ok(vec![String::new()]);
        }
        debug_assert_eq!(chunks.concat(), packed);
        Ok(chunks)
    }

    pub fn set_abundance(&mut self, weight: f64) {
        self.abundance = format_abundance(weight);
    }
}

fn has_continuation(line: &str) -> bool {
    let chars: Vec<char> = line.chars().collect();
    chars.len() >= CONTINUATION_SPAN.end
        && chars[CONTINUATION_SPAN.start..CONTINUATION_SPAN.end]
            .iter()
            .collect::<String>()
            == "-1"
}

fn continuation_slice(line: &str) -> String {
    let mut chars: Vec<char> = line.chars().collect();
    if chars.len() < SPIN_GROUP_LIST_START + SPIN_GROUP_LIST_WIDTH {
        chars.resize(SPIN_GROUP_LIST_START + SPIN_GROUP_LIST_WIDTH, ' ');
    }
    chars[SPIN_GROUP_LIST_START..SPIN_GROUP_LIST_START + SPIN_GROUP_LIST_WIDTH]
        .iter()
        .collect()
}

fn unpack_spin_groups(packed: &str) -> ParResult<Vec<i32>> {
    let trimmed = packed.trim_end();
    let chars: Vec<char> = trimmed.chars().collect();
    let mut groups = Vec::new();
    for chunk in chars.chunks(2) {
        let token: String = chunk.iter().collect();
        if token.trim().is_empty() {
            continue;
        }
        groups.push(parse_i32("spin_groups", token.trim())?);
    }
    Ok(groups)
}

/// Card 6 normalization and background terms with paired vary flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Normalization {
    pub normalization: String,
    pub constant_bg: String,
    pub one_over_v_bg: String,
    pub sqrt_energy_bg: String,
    pub exponential_bg: String,
    pub exp_decay_bg: String,
    pub vary_normalization: String,
    pub vary_constant_bg: String,
    pub vary_one_over_v_bg: String,
    pub vary_sqrt_energy_bg: String,
    pub vary_exponential_bg: String,
    pub vary_exp_decay_bg: String,
}

impl Normalization {
    pub fn decode(line: &str) -> ParResult<Self> {
        let fields = codec::decode(RecordKind::Normalization, line)?;
        Ok(Self {
            normalization: fields.slot("normalization"),
            constant_bg: fields.slot("constant_bg"),
            one_over_v_bg: fields.slot("one_over_v_bg"),
            sqrt_energy_bg: fields.slot("sqrt_energy_bg"),
            exponential_bg: fields.slot("exponential_bg"),
            exp_decay_bg: fields.slot("exp_decay_bg"),
            vary_normalization: fields.slot("vary_normalization"),
            vary_constant_bg: fields.slot("vary_constant_bg"),
            vary_one_over_v_bg: fields.slot("vary_one_over_v_bg"),
            vary_sqrt_energy_bg: fields.slot("vary_sqrt_energy_bg"),
            vary_exponential_bg: fields.slot("vary_exponential_bg"),
            vary_exp_decay_bg: fields.slot("vary_exp_decay_bg"),
        })
    }

    pub fn encode(&self) -> ParResult<String> {
        let mut fields = FieldMap::default();
        fields.set("normalization", self.normalization.clone());
        fields.set("constant_bg", self.constant_bg.clone());
        fields.set("one_over_v_bg", self.one_over_v_bg.clone());
        fields.set("sqrt_energy_bg", self.sqrt_energy_bg.clone());
        fields.set("exponential_bg", self.exponential_bg.clone());
        fields.set("exp_decay_bg", self.exp_decay_bg.clone());
        fields.set("vary_normalization", self.vary_normalization.clone());
        fields.set("vary_constant_bg", self.vary_constant_bg.clone());
        fields.set("vary_one_over_v_bg", self.vary_one_over_v_bg.clone());
        fields.set("vary_sqrt_energy_bg", self.vary_sqrt_energy_bg.clone());
        fields.set("vary_exponential_bg", self.vary_exponential_bg.clone());
        fields.set("vary_exp_decay_bg", self.vary_exp_decay_bg.clone());
        codec::encode(RecordKind::Normalization, &fields)
    }
}

/// Card 4 broadening terms with paired vary flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Broadening {
    pub match_radius: String,
    pub temperature: String,
    pub thickness: String,
    pub flight_path_spread: String,
    pub deltag_fwhm: String,
    pub deltae_us: String,
    pub vary_match_radius: String,
    pub vary_temperature: String,
    pub vary_thickness: String,
    pub vary_flight_path_spread: String,
    pub vary_deltag_fwhm: String,
    pub vary_deltae_us: String,
}

impl Broadening {
    pub fn decode(line: &str) -> ParResult<Self> {
        let fields = codec::decode(RecordKind::Broadening, line)?;
        Ok(Self {
            match_radius: fields.slot("match_radius"),
            temperature: fields.slot("temperature"),
            thickness: fields.slot("thickness"),
            flight_path_spread: fields.slot("flight_path_spread"),
            deltag_fwhm: fields.slot("deltag_fwhm"),
            deltae_us: fields.slot("deltae_us"),
            vary_match_radius: fields.slot("vary_match_radius"),
            vary_temperature: fields.slot("vary_temperature"),
            vary_thickness: fields.slot("vary_thickness"),
            vary_flight_path_spread: fields.slot("vary_flight_path_spread"),
            vary_deltag_fwhm: fields.slot("vary_deltag_fwhm"),
            vary_deltae_us: fields.slot("vary_deltae_us"),
        })
    }

    pub fn encode(&self) -> ParResult<String> {
        let mut fields = FieldMap::default();
        fields.set("match_radius", self.match_radius.clone());
        fields.set("temperature", self.temperature.clone());
        fields.set("thickness", self.thickness.clone());
        fields.set("flight_path_spread", self.flight_path_spread.clone());
        fields.set("deltag_fwhm", self.deltag_fwhm.clone());
        fields.set("deltae_us", self.deltae_us.clone());
        fields.set("vary_match_radius", self.vary_match_radius.clone());
        fields.set("vary_temperature", self.vary_temperature.clone());
        fields.set("vary_thickness", self.vary_thickness.clone());
        fields.set("vary_flight_path_spread", self.vary_flight_path_spread.clone());
        fields.set("vary_deltag_fwhm", self.vary_deltag_fwhm.clone());
        fields.set("vary_deltae_us", self.vary_deltae_us.clone());
        codec::encode(RecordKind::Broadening, &fields)
    }
}

/// Root entity for one isotope's (or compound's) parameter file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    pub identity: SourceIdentity,
    /// Isotope abundance weight in the target.
    pub weight: f64,
    /// Energy window lower bound, eV (inclusive).
    pub emin: f64,
    /// Energy window upper bound, eV (exclusive).
    pub emax: f64,
    pub particle_pairs: Vec<ParticlePair>,
    pub spin_groups: Vec<SpinGroup>,
    pub resonances: Vec<ResonanceParameter>,
    pub channel_radii: Vec<ChannelRadius>,
    pub isotopic_masses: Vec<IsotopicMass>,
    pub normalization: Option<Normalization>,
    pub broadening: Option<Broadening>,
}

impl ParameterSet {
    pub fn new(identity: SourceIdentity) -> Self {
        Self {
            identity,
            weight: 1.0,
            // Unbounded by default: bound-state resonances sit below zero,
            // so windowing only applies when a caller narrows the range.
            emin: f64::NEG_INFINITY,
            emax: f64::INFINITY,
            particle_pairs: Vec::new(),
            spin_groups: Vec::new(),
            resonances: Vec::new(),
            channel_radii: Vec::new(),
            isotopic_masses: Vec::new(),
            normalization: None,
            broadening: None,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_window(mut self, emin: f64, emax: f64) -> Self {
        self.emin = emin;
        self.emax = emax;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.particle_pairs.is_empty() && self.spin_groups.is_empty()
    }

    pub fn group_numbers(&self) -> ParResult<Vec<i32>> {
        self.spin_groups
            .iter()
            .map(SpinGroup::group_number)
            .collect()
    }

    /// Checks the two named back-references: channel name to particle
    /// pair, and resonance igroup to spin-group number.
    pub fn validate_references(&self) -> ParResult<()> {
        let pair_names: BTreeSet<&str> = self
            .particle_pairs
            .iter()
            .map(|pair| pair.name.trim())
            .collect();
        for group in &self.spin_groups {
            for channel in &group.channels {
                let name = channel.channel_name.trim();
                if !pair_names.contains(name) {
                    return Err(ParError::CrossReference(format!(
                        "spin channel references unknown particle pair '{name}'"
                    )));
                }
            }
        }

        let group_numbers: BTreeSet<i32> = self.group_numbers()?.into_iter().collect();
        for resonance in &self.resonances {
            let igroup = resonance.igroup()?;
            if !group_numbers.contains(&igroup) {
                return Err(ParError::CrossReference(format!(
                    "resonance references unknown spin group {igroup}"
                )));
            }
        }
        for radius in &self.channel_radii {
            for mapping in &radius.groups {
                if !group_numbers.contains(&mapping.group) {
                    return Err(ParError::CrossReference(format!(
                        "channel radius references unknown spin group {}",
                        mapping.group
                    )));
                }
            }
        }
        Ok(())
    }
}

fn int_or_zero(field: &'static str, text: &str) -> ParResult<i32> {
    if text.trim().is_empty() {
        return Ok(0);
    }
    parse_i32(field, text)
}
