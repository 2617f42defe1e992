//! Workflow check: two isotope sets rendered, reparsed, composed and
//! rendered again must stay parseable and keep contiguous numbering.

use pleiades_core::domain::SourceIdentity;
use pleiades_core::par::model::{
    ChannelRadius, GroupChannelMapping, ParameterSet, ParticlePair, ResonanceParameter,
    SpinChannel, SpinGroup,
};
use pleiades_core::{compose, parse_source, render};

fn isotope(stem: &str, groups: usize, energies: &[(f64, i32)], weight: f64) -> ParameterSet {
    let mut set = ParameterSet::new(SourceIdentity::File {
        stem: stem.to_string(),
    })
    .with_weight(weight);
    set.particle_pairs.push(ParticlePair {
        name: "PPair1".to_string(),
        particle_a: "neutron".to_string(),
        particle_b: stem.to_string(),
        charge_a: "0".to_string(),
        charge_b: "73".to_string(),
        vary_penetrability: "1".to_string(),
        vary_shift: "0".to_string(),
        spin_a: "0.5".to_string(),
        spin_b: "3.5".to_string(),
        mass_a: "1.008664915".to_string(),
        mass_b: "180.948030".to_string(),
    });
    for number in 1..=groups {
        let mut group = SpinGroup {
            group_number: number.to_string(),
            n_entrance_channel: "1".to_string(),
            n_exit_channel: "0".to_string(),
            spin: "3.0".to_string(),
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
            igroup: igroup.to_string(),
            ..ResonanceParameter::default()
        });
    }
    set.channel_radii.push(ChannelRadius {
        radii: ["8.1271".to_string(), "8.1271".to_string()],
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

fn reparsed(set: &ParameterSet) -> ParameterSet {
    let text = render(set).expect("set should render");
    let mut out = parse_source(set.identity.clone(), &text).expect("rendered text should parse");
    out.weight = set.weight;
    out.emin = set.emin;
    out.emax = set.emax;
    out
}

#[test]
fn composed_compound_survives_render_and_reparse() {
    let tantalum = reparsed(&isotope(
        "Ta_181",
        5,
        &[(4.28, 1), (10.36, 2), (13.95, 3), (20.29, 4), (22.72, 5)],
        0.6,
    ));
    let tungsten = reparsed(&isotope(
        "W_184",
        3,
        &[(7.6, 1), (101.9, 2), (184.9, 3)],
        0.4,
    ));

    let compound = compose(&tantalum, &tungsten).expect("composition should succeed");
    assert_eq!(compound.identity, SourceIdentity::Compound);
    assert_eq!(
        compound.group_numbers().unwrap(),
        (1..=8).collect::<Vec<i32>>()
    );
    assert_eq!(compound.particle_pairs[0].name.trim(), "Ta_181");
    assert_eq!(compound.particle_pairs[1].name.trim(), "W_184");

    let text = render(&compound).expect("compound should render");
    let round = parse_source(SourceIdentity::Compound, &text).expect("compound should reparse");
    assert_eq!(round.group_numbers().unwrap(), (1..=8).collect::<Vec<i32>>());
    assert_eq!(round.resonances.len(), 8);
    round.validate_references().expect("references should hold");

    // A reparsed compound renders identically.
    assert_eq!(render(&round).unwrap(), text);
}

#[test]
fn window_then_compose_drops_out_of_range_groups() {
    let tantalum = isotope("Ta_181", 2, &[(0.5, 1), (50.1, 2)], 0.7).with_window(1.0, 100.0);
    let tungsten = isotope("W_184", 2, &[(2.3, 1), (150.0, 2)], 0.3).with_window(1.0, 100.0);

    let compound = compose(&tantalum, &tungsten).expect("composition should succeed");
    assert_eq!(compound.group_numbers().unwrap(), vec![1, 2]);
    let energies: Vec<f64> = compound
        .resonances
        .iter()
        .map(|resonance| resonance.energy().unwrap())
        .collect();
    assert_eq!(energies, vec![50.1, 2.3]);
}
