//! Serializes a [`ParameterSet`] into the exact section layout the
//! external fitting program expects. The writer trusts the ordering
//! invariants established at parse or compose time and never reorders
//! records.

use super::model::ParameterSet;
use crate::domain::{ParError, ParResult, SectionKind};
use crate::format::MAX_LINE_WIDTH;
use std::fs;
use std::path::Path;

/// Renders the set and writes it to `path`.
pub fn write(set: &ParameterSet, path: &Path) -> ParResult<()> {
    let content = render(set)?;
    fs::write(path, content).map_err(|error| ParError::io("write", path, error))
}

/// Renders the set to par-file text.
///
/// Layout: particle pairs, spin groups (+channels) and resonances in
/// fixed order with blank separators; after the resonances, two blank
/// 80-column lines (SAMMY reserves one for its fudge-factor convergence
/// scalar); then channel radii and the optional trailing blocks, each
/// followed by its own blank terminator.
pub fn render(set: &ParameterSet) -> ParResult<String> {
    if set.is_empty() {
        return Err(ParError::EmptyData);
    }

    let blank_card = " ".repeat(MAX_LINE_WIDTH);
    let mut lines: Vec<String> = Vec::new();

    lines.push(SectionKind::ParticlePairs.header_line().to_string());
    for pair in &set.particle_pairs {
        lines.extend(pair.to_card_lines()?);
    }
    lines.push(String::new());

    lines.push(SectionKind::SpinGroups.header_line().to_string());
    for group in &set.spin_groups {
        lines.push(group.encode()?);
        for channel in &group.channels {
            lines.push(channel.encode()?);
        }
    }
    lines.push(String::new());

    lines.push(SectionKind::ResonanceParams.header_line().to_string());
    for resonance in &set.resonances {
        lines.push(resonance.encode()?);
    }
    lines.push(blank_card.clone());
    lines.push(blank_card.clone());

    lines.push(format!("{:<80}", SectionKind::ChannelRadii.header_line()));
    for radius in &set.channel_radii {
        lines.push(radius.header_line());
        for mapping in &radius.groups {
            lines.push(mapping.to_line());
        }
    }
    lines.push(blank_card);
    lines.push(String::new());

    if !set.isotopic_masses.is_empty() {
        lines.push(format!("{:<80}", SectionKind::IsotopicMasses.header_line()));
        for mass in &set.isotopic_masses {
            lines.extend(mass.encode()?);
        }
        lines.push(String::new());
    }

    if let Some(normalization) = &set.normalization {
        lines.push(format!("{:<80}", SectionKind::Normalization.header_line()));
        lines.push(normalization.encode()?);
        lines.push(String::new());
    }

    if let Some(broadening) = &set.broadening {
        lines.push(format!("{:<80}", SectionKind::Broadening.header_line()));
        lines.push(broadening.encode()?);
        lines.push(String::new());
    }

    let mut content = lines.join("\n");
    content.push('\n');
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::render;
    use crate::domain::{ParError, SourceIdentity};
    use crate::par::model::ParameterSet;
    use crate::par::reader::parse_source;

    #[test]
    fn empty_set_refuses_to_write() {
        let set = ParameterSet::new(SourceIdentity::Compound);
        assert!(matches!(render(&set).unwrap_err(), ParError::EmptyData));
    }

    #[test]
    fn rendered_sections_keep_the_required_order_and_separators() {
        let source = sample();
        let set = parse_source(
            SourceIdentity::File {
                stem: "Ta_181".to_string(),
            },
            &source,
        )
        .unwrap();
        let rendered = render(&set).unwrap();

        let pairs = rendered.find("PARTICLE PAIR DEFINITIONS").unwrap();
        let groups = rendered.find("SPIN GROUP INFORMATION").unwrap();
        let resonances = rendered.find("RESONANCE PARAMETERS").unwrap();
        let radii = rendered.find("Channel radii in key-word format").unwrap();
        assert!(pairs < groups && groups < resonances && resonances < radii);

        // Fudge-factor reservation: two full blank cards after resonances.
        let after_resonances: Vec<&str> = rendered[resonances..].lines().collect();
        let first_blank = after_resonances
            .iter()
            .position(|line| line.trim().is_empty())
            .unwrap();
        assert_eq!(after_resonances[first_blank].len(), 80);
        assert_eq!(after_resonances[first_blank + 1].len(), 80);
    }

    #[test]
    fn render_is_stable_under_reparse() {
        let set = parse_source(
            SourceIdentity::File {
                stem: "Ta_181".to_string(),
            },
            &sample(),
        )
        .unwrap();
        let once = render(&set).unwrap();
        let reparsed = parse_source(SourceIdentity::Compound, &once).unwrap();
        let twice = render(&reparsed).unwrap();
        assert_eq!(once, twice);
    }

    fn pad80(line: &str) -> String {
        format!("{line:<80}")
    }

    fn sample() -> String {
        [
            "PARTICLE PAIR DEFINITIONS".to_string(),
            "Name=PPair1    Particle a=neutron   Particle b=Ta_181".to_string(),
            "      Za=   0      Zb=  73      Pent=1     Shift=0".to_string(),
            "      Sa=  0.5     Sb=  3.5     Ma=1.008664915780000   Mb=180.9479958".to_string(),
            String::new(),
            "SPIN GROUP INFORMATION".to_string(),
            pad80(&format!(
                "{:>3} {:<1}  {:>3}  {:>3}{:>5}{:>10}",
                1, "", 1, 0, "3.0", "1.0000000"
            )),
            pad80(&format!(
                "  {:>3}  {:<8}  {:<1}{:>2}{:>10}{:>10} {:>11}{:>11}",
                1, "PPair1", "", 0, "0.5", "0.0", "8.1271", "8.1271"
            )),
            String::new(),
            "RESONANCE PARAMETERS".to_string(),
            pad80(&format!(
                "{:>11}{:>11}{:>11}{:>11}{:>11}{:>2}{:>2}{:>2}{:>2}{:>2}{:>2}",
                "4.28000", "0.0550000", "0.0021100", "", "", 0, 1, 1, 0, 0, 1
            )),
            " ".repeat(80),
            " ".repeat(80),
            pad80("Channel radii in key-word format"),
            pad80("Radii= 8.1271, 8.1271    Flags= 1, 1"),
            pad80("    Group=1 Chan=1,"),
            " ".repeat(80),
            String::new(),
        ]
        .join("\n")
            + "\n"
    }
}
