//! Combines per-isotope parameter sets into one compound description.
//!
//! Every transformation here is copy-on-combine: operands are never
//! mutated, so a parsed set can be reused across independent
//! compositions. Renumbering always goes through a single old-to-new
//! map applied to spin groups, resonances and channel-radii mappings
//! alike; deriving the mapping per collection is how numbering drifts.

use super::model::{IsotopicMass, ParameterSet};
use crate::domain::{ParResult, SourceIdentity};
use std::collections::{BTreeMap, BTreeSet};

/// Self-normalizes one isotope's set: energy windowing, pruning,
/// re-indexing, particle-pair renaming and abundance assignment, in that
/// order. Pure; returns a new set. Idempotent, and a no-op beyond
/// renumbering consistency for compound sets.
pub fn normalized(set: &ParameterSet) -> ParResult<ParameterSet> {
    let mut out = set.clone();
    apply_window(&mut out)?;
    prune_and_renumber(&mut out)?;
    if !out.identity.is_compound() {
        rename_particle_pairs(&mut out);
        assign_abundance(&mut out)?;
    }
    out.validate_references()?;
    Ok(out)
}

/// Merges two parameter sets into a compound, left then right.
///
/// Both operands are normalized first; an operand left with no spin
/// groups by its energy window contributes nothing and is dropped from
/// the union. Vary flags of every resonance in the result are forced to
/// fixed; only the fit driver decides what varies.
pub fn compose(left: &ParameterSet, right: &ParameterSet) -> ParResult<ParameterSet> {
    let left = normalized(left)?;
    let right = normalized(right)?;

    if left.spin_groups.is_empty() {
        return Ok(finish_compound(right));
    }
    if right.spin_groups.is_empty() {
        return Ok(finish_compound(left));
    }

    let offset = left.spin_groups.len() as i32;
    let mut shifted = right;
    shift_group_numbers(&mut shifted, offset)?;

    let mut out = ParameterSet::new(SourceIdentity::Compound);
    out.weight = left.weight + shifted.weight;
    out.emin = left.emin.min(shifted.emin);
    out.emax = left.emax.max(shifted.emax);

    out.particle_pairs = [left.particle_pairs, shifted.particle_pairs].concat();
    out.spin_groups = [left.spin_groups, shifted.spin_groups].concat();
    out.resonances = [left.resonances, shifted.resonances].concat();
    out.channel_radii = [left.channel_radii, shifted.channel_radii].concat();
    out.isotopic_masses = [left.isotopic_masses, shifted.isotopic_masses].concat();
    out.normalization = left.normalization.or(shifted.normalization);
    out.broadening = left.broadening.or(shifted.broadening);

    for resonance in &mut out.resonances {
        resonance.clear_vary_flags();
    }

    out.validate_references()?;
    Ok(out)
}

fn finish_compound(mut set: ParameterSet) -> ParameterSet {
    set.identity = SourceIdentity::Compound;
    set
}

/// Drops resonances outside `[emin, emax)`. Runs before renumbering.
fn apply_window(set: &mut ParameterSet) -> ParResult<()> {
    let (emin, emax) = (set.emin, set.emax);
    let mut kept = Vec::with_capacity(set.resonances.len());
    for resonance in set.resonances.drain(..) {
        let energy = resonance.energy()?;
        if emin <= energy && energy < emax {
            kept.push(resonance);
        }
    }
    set.resonances = kept;
    Ok(())
}

/// Prunes spin groups with no surviving resonance, then assigns fresh
/// contiguous 1-based group numbers through one shared mapping.
fn prune_and_renumber(set: &mut ParameterSet) -> ParResult<()> {
    let mut surviving: BTreeSet<i32> = BTreeSet::new();
    for resonance in &set.resonances {
        surviving.insert(resonance.igroup()?);
    }

    let mut remap: BTreeMap<i32, i32> = BTreeMap::new();
    let mut next = 1;
    let mut groups = Vec::new();
    for group in set.spin_groups.drain(..) {
        let old = group.group_number()?;
        if !surviving.contains(&old) {
            continue;
        }
        let mut group = group;
        remap.insert(old, next);
        group.set_group_number(next);
        next += 1;
        groups.push(group);
    }
    set.spin_groups = groups;

    for resonance in &mut set.resonances {
        let old = resonance.igroup()?;
        // Every igroup seeded the survivor set, so the lookup holds.
        if let Some(new) = remap.get(&old) {
            resonance.set_igroup(*new);
        }
    }

    let mut radii = Vec::new();
    for mut radius in set.channel_radii.drain(..) {
        radius.groups = radius
            .groups
            .into_iter()
            .filter_map(|mut mapping| {
                remap.get(&mapping.group).map(|new| {
                    mapping.group = *new;
                    mapping
                })
            })
            .collect();
        if !radius.groups.is_empty() {
            radii.push(radius);
        }
    }
    set.channel_radii = radii;

    let mut masses = Vec::new();
    for mut mass in set.isotopic_masses.drain(..) {
        mass.spin_groups = mass
            .spin_groups
            .iter()
            .filter_map(|group| remap.get(group).copied())
            .collect();
        if !mass.spin_groups.is_empty() {
            masses.push(mass);
        }
    }
    set.isotopic_masses = masses;

    Ok(())
}

/// Rewrites particle-pair names to a short identifier derived from the
/// set's identity, updating every channel back-reference: the full base
/// (clipped to eight characters) for a single pair, a six-character
/// base with a 1-based suffix otherwise.
fn rename_particle_pairs(set: &mut ParameterSet) {
    let Some(base) = set.identity.rename_base().map(str::to_string) else {
        return;
    };
    let single = set.particle_pairs.len() == 1;
    for index in 0..set.particle_pairs.len() {
        let old_name = set.particle_pairs[index].name.trim().to_string();
        let new_name = if single {
            clip(&base, 8)
        } else {
            format!("{}_{}", clip(&base, 6), index + 1)
        };
        for group in &mut set.spin_groups {
            for channel in &mut group.channels {
                if channel.channel_name.trim() == old_name {
                    channel.channel_name = new_name.clone();
                }
            }
        }
        set.particle_pairs[index].name = new_name;
    }
}

fn clip(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

/// Pushes the set's abundance weight into every spin group and into the
/// isotopic-mass block, synthesizing one record from spin-group
/// membership when the file carried none.
fn assign_abundance(set: &mut ParameterSet) -> ParResult<()> {
    let weight = set.weight;
    for group in &mut set.spin_groups {
        group.set_abundance(weight);
    }

    if set.isotopic_masses.is_empty() {
        if set.spin_groups.is_empty() {
            return Ok(());
        }
        let spin_groups = set.group_numbers()?;
        // The pair card gives the mass 19 columns; the mass record only 10.
        let atomic_mass = set
            .particle_pairs
            .first()
            .map(|pair| clip(pair.mass_b.trim(), 10))
            .unwrap_or_default();
        set.isotopic_masses.push(IsotopicMass {
            atomic_mass,
            abundance: crate::format::numeric::format_abundance(weight),
            abundance_uncertainty: crate::format::numeric::format_abundance(weight * 0.1),
            vary_abundance: "1".to_string(),
            spin_groups,
        });
    } else {
        for mass in &mut set.isotopic_masses {
            mass.set_abundance(weight);
        }
    }
    Ok(())
}

/// Adds a constant offset to every group number, igroup and radii
/// mapping of an already-normalized set.
fn shift_group_numbers(set: &mut ParameterSet, offset: i32) -> ParResult<()> {
    for group in &mut set.spin_groups {
        let number = group.group_number()?;
        group.set_group_number(number + offset);
    }
    for resonance in &mut set.resonances {
        let igroup = resonance.igroup()?;
        resonance.set_igroup(igroup + offset);
    }
    for radius in &mut set.channel_radii {
        for mapping in &mut radius.groups {
            mapping.group += offset;
        }
    }
    for mass in &mut set.isotopic_masses {
        for group in &mut mass.spin_groups {
            *group += offset;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{compose, normalized};
    use crate::domain::SourceIdentity;
    use crate::par::model::{
        ChannelRadius, GroupChannelMapping, ParameterSet, ParticlePair, ResonanceParameter,
        SpinChannel, SpinGroup,
    };

    fn isotope(stem: &str, groups: usize, energies: &[(f64, i32)]) -> ParameterSet {
        let mut set = ParameterSet::new(SourceIdentity::File {
            stem: stem.to_string(),
        });
        set.particle_pairs.push(ParticlePair {
            name: "PPair1".to_string(),
            particle_a: "neutron".to_string(),
            particle_b: stem.to_string(),
            charge_a: "0".to_string(),
            charge_b: "18".to_string(),
            vary_penetrability: "1".to_string(),
            vary_shift: "0".to_string(),
            spin_a: "0.5".to_string(),
            spin_b: "0.0".to_string(),
            mass_a: "1.008664915".to_string(),
            mass_b: "39.96238312".to_string(),
        });
        for number in 1..=groups {
            let mut group = SpinGroup {
                group_number: number.to_string(),
                n_entrance_channel: "1".to_string(),
                n_exit_channel: "0".to_string(),
                spin: "0.5".to_string(),
                isotopic_abundance: "1.0000000".to_string(),
                ..SpinGroup::default()
            };
            group.channels.push(SpinChannel {
                channel_number: "1".to_string(),
                channel_name: "PPair1".to_string(),
                ..SpinChannel::default()
            });
            set.spin_groups.push(group);
        }
        for (energy, igroup) in energies {
            set.resonances.push(ResonanceParameter {
                resonance_energy: energy.to_string(),
                capture_width: "0.055".to_string(),
                neutron_width: "0.002".to_string(),
                vary_energy: "1".to_string(),
                vary_capture_width: "1".to_string(),
                igroup: igroup.to_string(),
                ..ResonanceParameter::default()
            });
        }
        set.channel_radii.push(ChannelRadius {
            radii: ["3.2".to_string(), "3.2".to_string()],
            flags: ["1".to_string(), "1".to_string()],
            groups: (1..=groups as i32)
                .map(|group| GroupChannelMapping {
                    group,
                    channels: vec![1],
                })
                .collect(),
        });
        set
    }

    #[test]
    fn windowing_prunes_groups_and_renumbers_contiguously() {
        let set = isotope(
            "Zr_90",
            4,
            &[(0.5, 1), (2.3, 2), (50.1, 3), (150.0, 4)],
        )
        .with_window(1.0, 100.0);
        let out = normalized(&set).unwrap();

        assert_eq!(out.resonances.len(), 2);
        for resonance in &out.resonances {
            let energy = resonance.energy().unwrap();
            assert!((1.0..100.0).contains(&energy));
        }
        assert_eq!(out.group_numbers().unwrap(), vec![1, 2]);
        assert_eq!(
            out.resonances
                .iter()
                .map(|r| r.igroup().unwrap())
                .collect::<Vec<_>>(),
            vec![1, 2]
        );
        // Radii mappings follow the same old-to-new map.
        assert_eq!(out.channel_radii.len(), 1);
        assert_eq!(
            out.channel_radii[0]
                .groups
                .iter()
                .map(|m| m.group)
                .collect::<Vec<_>>(),
            vec![1, 2]
        );
    }

    #[test]
    fn bound_state_resonances_survive_without_a_window() {
        let set = isotope("U_235", 2, &[(-0.4826224, 1), (25.43619, 2)]);
        let out = normalized(&set).unwrap();
        assert_eq!(out.spin_groups.len(), 2);
        assert_eq!(out.resonances.len(), 2);
        assert!((out.resonances[0].energy().unwrap() - (-0.4826224)).abs() < 1e-12);
    }

    #[test]
    fn normalization_is_idempotent() {
        let set = isotope("Ar_40", 2, &[(4.2, 1), (9.9, 2)]).with_weight(0.8);
        let once = normalized(&set).unwrap();
        let twice = normalized(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn rename_clips_and_suffixes_per_pair() {
        let mut set = isotope("Molybdenum_96", 1, &[(4.2, 1)]);
        let mut second = set.particle_pairs[0].clone();
        second.name = "PPair2".to_string();
        set.particle_pairs.push(second);
        let out = normalized(&set).unwrap();
        assert_eq!(out.particle_pairs[0].name, "Molybd_1");
        assert_eq!(out.particle_pairs[1].name, "Molybd_2");
        assert_eq!(
            out.spin_groups[0].channels[0].channel_name.trim(),
            "Molybd_1"
        );

        let single = normalized(&isotope("Molybdenum_96", 1, &[(4.2, 1)])).unwrap();
        assert_eq!(single.particle_pairs[0].name, "Molybden");
    }

    #[test]
    fn compose_renumbers_and_weights_both_operands() {
        let left = isotope("Ar_40", 5, &[(1.0, 1), (2.0, 2), (3.0, 3), (4.0, 4), (5.0, 5)])
            .with_weight(0.6);
        let right = isotope("Ar_36", 3, &[(1.5, 1), (2.5, 2), (3.5, 3)]).with_weight(0.4);
        let compound = compose(&left, &right).unwrap();

        assert_eq!(compound.identity, SourceIdentity::Compound);
        assert_eq!(
            compound.group_numbers().unwrap(),
            (1..=8).collect::<Vec<i32>>()
        );
        for group in &compound.spin_groups[..5] {
            assert_eq!(group.isotopic_abundance.trim(), "0.6000000");
        }
        for group in &compound.spin_groups[5..] {
            assert_eq!(group.isotopic_abundance.trim(), "0.4000000");
        }
        // Merged resonances are held fixed.
        for resonance in &compound.resonances {
            assert_eq!(resonance.vary_energy, "0");
            assert_eq!(resonance.vary_capture_width, "0");
        }
        compound.validate_references().unwrap();
    }

    #[test]
    fn compose_does_not_mutate_its_operands() {
        let left = isotope("Ar_40", 2, &[(1.0, 1), (2.0, 2)]).with_weight(0.6);
        let right = isotope("Ar_36", 1, &[(1.5, 1)]).with_weight(0.4);
        let left_before = left.clone();
        let right_before = right.clone();
        compose(&left, &right).unwrap();
        assert_eq!(left, left_before);
        assert_eq!(right, right_before);
    }

    #[test]
    fn operand_emptied_by_its_window_is_dropped_from_the_union() {
        let left = isotope("Ar_40", 2, &[(1.0, 1), (2.0, 2)]).with_weight(0.6);
        let right = isotope("Ar_36", 1, &[(500.0, 1)])
            .with_weight(0.4)
            .with_window(0.0, 100.0);
        let compound = compose(&left, &right).unwrap();
        assert_eq!(compound.spin_groups.len(), 2);
        assert_eq!(compound.particle_pairs.len(), 1);
        assert_eq!(compound.particle_pairs[0].name, "Ar_40");
    }

    #[test]
    fn composition_group_content_is_associative() {
        let a = isotope("Ar_40", 2, &[(1.0, 1), (2.0, 2)]).with_weight(0.5);
        let b = isotope("Ar_38", 1, &[(1.5, 1)]).with_weight(0.3);
        let c = isotope("Ar_36", 2, &[(4.0, 1), (5.0, 2)]).with_weight(0.2);

        let left_first = compose(&compose(&a, &b).unwrap(), &c).unwrap();
        let right_first = compose(&a, &compose(&b, &c).unwrap()).unwrap();

        assert_eq!(
            left_first.group_numbers().unwrap(),
            right_first.group_numbers().unwrap()
        );
        let spins = |set: &crate::par::model::ParameterSet| {
            set.spin_groups
                .iter()
                .map(|group| group.spin.trim().to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(spins(&left_first), spins(&right_first));
        assert_eq!(
            left_first
                .resonances
                .iter()
                .map(|r| r.energy().unwrap().to_string())
                .collect::<Vec<_>>(),
            right_first
                .resonances
                .iter()
                .map(|r| r.energy().unwrap().to_string())
                .collect::<Vec<_>>()
        );
    }
}
