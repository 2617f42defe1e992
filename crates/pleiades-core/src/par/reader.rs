//! Section scanner for SAMMY par files.
//!
//! The format is positionally fragile: a spin-group header declares how
//! many channel lines follow it, so one bad count desynchronizes every
//! later section. The scanner therefore runs an explicit state machine
//! (scanning / in-section with a channels-remaining counter), attributes
//! failures to line numbers, and never attempts partial recovery.

use super::model::{
    Broadening, ChannelRadius, GroupChannelMapping, IsotopicMass, Normalization, ParameterSet,
    ParticlePair, ResonanceParameter, SpinChannel, SpinGroup,
};
use crate::domain::{ParError, ParResult, SectionKind, SourceIdentity};
use std::fs;
use std::path::Path;

/// Reads and parses one par file. The returned set is raw: no renaming,
/// windowing or re-weighting is applied.
pub fn parse(path: &Path) -> ParResult<ParameterSet> {
    let source =
        fs::read_to_string(path).map_err(|error| ParError::io("read", path, error))?;
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("isotope")
        .to_string();
    parse_source(SourceIdentity::File { stem }, &source)
}

/// Parses par-file text that is already in memory.
pub fn parse_source(identity: SourceIdentity, source: &str) -> ParResult<ParameterSet> {
    let mut set = ParameterSet::new(identity);
    let mut seen: Vec<SectionKind> = Vec::new();

    let mut lines = source
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line));

    while let Some((number, line)) = lines.next() {
        let upper = line.trim_end().to_ascii_uppercase();
        let Some(kind) = SectionKind::ALL
            .into_iter()
            .find(|kind| upper.starts_with(kind.header_prefix()))
        else {
            continue;
        };
        if seen.contains(&kind) {
            return Err(ParError::DuplicateSection { kind, line: number });
        }
        seen.push(kind);

        let section = collect_section(&mut lines, kind, number)?;
        match kind {
            SectionKind::ParticlePairs => {
                set.particle_pairs = parse_particle_pairs(&section)?;
            }
            SectionKind::SpinGroups => {
                set.spin_groups = parse_spin_groups(&section)?;
            }
            SectionKind::ResonanceParams => {
                set.resonances = section
                    .iter()
                    .map(|(_, line)| ResonanceParameter::decode(line))
                    .collect::<ParResult<Vec<_>>>()?;
            }
            SectionKind::ChannelRadii => {
                set.channel_radii = parse_channel_radii(&section)?;
            }
            SectionKind::IsotopicMasses => {
                set.isotopic_masses = IsotopicMass::decode_all(&section)?;
            }
            SectionKind::Normalization => {
                let (line_number, line) = single_record_line(&section, kind, number)?;
                set.normalization = Some(Normalization::decode(line).map_err(|error| {
                    attribute_line(error, line_number, line)
                })?);
            }
            SectionKind::Broadening => {
                let (line_number, line) = single_record_line(&section, kind, number)?;
                set.broadening = Some(Broadening::decode(line).map_err(|error| {
                    attribute_line(error, line_number, line)
                })?);
            }
        }
    }

    Ok(set)
}

/// Consumes lines up to the blank terminator. EOF before the terminator
/// is a truncation.
fn collect_section<'a>(
    lines: &mut impl Iterator<Item = (usize, &'a str)>,
    kind: SectionKind,
    header_line: usize,
) -> ParResult<Vec<(usize, String)>> {
    let mut collected = Vec::new();
    loop {
        let Some((number, line)) = lines.next() else {
            let last = collected.last().map_or(header_line, |(n, _): &(usize, String)| *n);
            return Err(ParError::TruncatedSection { kind, line: last });
        };
        if line.trim().is_empty() {
            return Ok(collected);
        }
        collected.push((number, line.to_string()));
    }
}

fn parse_particle_pairs(section: &[(usize, String)]) -> ParResult<Vec<ParticlePair>> {
    let mut cards: Vec<(usize, Vec<&str>)> = Vec::new();
    for (number, line) in section {
        if line.starts_with("Name=") {
            cards.push((*number, vec![line.as_str()]));
        } else if let Some((_, lines)) = cards.last_mut() {
            lines.push(line.as_str());
        } else {
            return Err(ParError::UnparsableLine {
                line: *number,
                content: line.clone(),
            });
        }
    }

    let mut pairs = Vec::with_capacity(cards.len());
    for (number, lines) in cards {
        let text = lines.join(" ");
        let pair =
            ParticlePair::from_card_text(&text).ok_or_else(|| ParError::UnparsableLine {
                line: number,
                content: text.clone(),
            })?;
        pairs.push(pair);
    }
    Ok(pairs)
}

fn parse_spin_groups(section: &[(usize, String)]) -> ParResult<Vec<SpinGroup>> {
    let mut groups = Vec::new();
    let mut iter = section.iter();
    while let Some((header_number, line)) = iter.next() {
        let mut group = SpinGroup::decode(line)?;
        // Data-dependent coupling: the header declares how many channel
        // lines follow before the next group header.
        let mut channels_remaining = group.channel_count()?;
        while channels_remaining > 0 {
            let Some((_, channel_line)) = iter.next() else {
                return Err(ParError::TruncatedSection {
                    kind: SectionKind::SpinGroups,
                    line: *header_number,
                });
            };
            group.channels.push(SpinChannel::decode(channel_line)?);
            channels_remaining -= 1;
        }
        groups.push(group);
    }
    Ok(groups)
}

fn parse_channel_radii(section: &[(usize, String)]) -> ParResult<Vec<ChannelRadius>> {
    let mut radii: Vec<ChannelRadius> = Vec::new();
    for (number, line) in section {
        if let Some(radius) = ChannelRadius::from_header_line(line) {
            radii.push(radius);
        } else if let Some(mapping) = GroupChannelMapping::from_line(line) {
            let Some(radius) = radii.last_mut() else {
                return Err(ParError::UnparsableLine {
                    line: *number,
                    content: line.clone(),
                });
            };
            radius.groups.push(mapping);
        } else {
            return Err(ParError::UnparsableLine {
                line: *number,
                content: line.clone(),
            });
        }
    }
    Ok(radii)
}

fn single_record_line(
    section: &[(usize, String)],
    kind: SectionKind,
    header_line: usize,
) -> ParResult<(usize, &str)> {
    match section {
        [] => Err(ParError::TruncatedSection {
            kind,
            line: header_line,
        }),
        [(number, line)] => Ok((*number, line.as_str())),
        [_, (number, line), ..] => Err(ParError::UnparsableLine {
            line: *number,
            content: line.clone(),
        }),
    }
}

fn attribute_line(error: ParError, line: usize, content: &str) -> ParError {
    match error {
        ParError::MalformedRecord { .. } => ParError::UnparsableLine {
            line,
            content: content.to_string(),
        },
        other => other,
    }
}
