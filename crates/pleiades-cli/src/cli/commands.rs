use super::CliError;
use anyhow::Context;
use pleiades_core::{ParameterSet, ParseOptions, compose, parse, parse_with, write};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(clap::Args)]
pub(super) struct ShowArgs {
    /// Parameter file to summarize
    input: PathBuf,
}

#[derive(clap::Args)]
pub(super) struct RewriteArgs {
    /// Parameter file to read
    input: PathBuf,

    /// Output path
    #[arg(short, long)]
    output: PathBuf,

    /// Override the isotope name used for particle-pair renaming
    #[arg(long)]
    name: Option<String>,

    /// Abundance weight assigned to every spin group
    #[arg(long)]
    weight: Option<f64>,

    /// Lower energy bound (eV), inclusive
    #[arg(long)]
    emin: Option<f64>,

    /// Upper energy bound (eV), exclusive
    #[arg(long)]
    emax: Option<f64>,
}

#[derive(clap::Args)]
pub(super) struct CompoundArgs {
    /// Weighted input, `PATH:WEIGHT`; repeat once per isotope
    #[arg(short, long = "input", value_name = "PATH:WEIGHT", required = true)]
    inputs: Vec<String>,

    /// Output path
    #[arg(short, long)]
    output: PathBuf,

    /// Lower energy bound (eV) applied to every input, inclusive
    #[arg(long, default_value_t = f64::NEG_INFINITY, hide_default_value = true)]
    emin: f64,

    /// Upper energy bound (eV) applied to every input, exclusive
    #[arg(long, default_value_t = f64::INFINITY, hide_default_value = true)]
    emax: f64,
}

#[derive(Serialize)]
struct SetSummary {
    source: String,
    weight: f64,
    particle_pairs: Vec<String>,
    spin_groups: usize,
    channels: usize,
    resonances: usize,
    energy_range: Option<[f64; 2]>,
    channel_radii: usize,
    isotopic_masses: usize,
    has_normalization: bool,
    has_broadening: bool,
}

impl SetSummary {
    fn from_set(set: &ParameterSet) -> Result<Self, CliError> {
        let mut energy_range: Option<[f64; 2]> = None;
        for resonance in &set.resonances {
            let energy = resonance.energy().map_err(CliError::Par)?;
            energy_range = Some(match energy_range {
                None => [energy, energy],
                Some([lo, hi]) => [lo.min(energy), hi.max(energy)],
            });
        }
        Ok(Self {
            source: format!("{}", set.identity),
            weight: set.weight,
            particle_pairs: set
                .particle_pairs
                .iter()
                .map(|pair| pair.name.trim().to_string())
                .collect(),
            spin_groups: set.spin_groups.len(),
            channels: set
                .spin_groups
                .iter()
                .map(|group| group.channels.len())
                .sum(),
            resonances: set.resonances.len(),
            energy_range,
            channel_radii: set.channel_radii.len(),
            isotopic_masses: set.isotopic_masses.len(),
            has_normalization: set.normalization.is_some(),
            has_broadening: set.broadening.is_some(),
        })
    }
}

pub(super) fn run_show_command(args: ShowArgs) -> Result<i32, CliError> {
    let set = parse(&args.input)?;
    let summary = SetSummary::from_set(&set)?;
    let rendered = serde_json::to_string_pretty(&summary)
        .context("failed to serialize parameter file summary")?;
    println!("{rendered}");
    Ok(0)
}

pub(super) fn run_rewrite_command(args: RewriteArgs) -> Result<i32, CliError> {
    // Without overrides this is a pure fidelity pass: raw parse, write.
    // Presence of a flag selects normalization, not its value, so an
    // explicit `--weight 1.0` still renames and stamps abundances.
    let untouched = args.name.is_none()
        && args.weight.is_none()
        && args.emin.is_none()
        && args.emax.is_none();
    let set = if untouched {
        parse(&args.input)?
    } else {
        let defaults = ParseOptions::default();
        let options = ParseOptions {
            name: args.name,
            weight: args.weight.unwrap_or(defaults.weight),
            emin: args.emin.unwrap_or(defaults.emin),
            emax: args.emax.unwrap_or(defaults.emax),
        };
        parse_with(&args.input, &options)?
    };
    write(&set, &args.output)?;
    info!(
        input = %args.input.display(),
        output = %args.output.display(),
        spin_groups = set.spin_groups.len(),
        resonances = set.resonances.len(),
        "rewrote parameter file"
    );
    Ok(0)
}

pub(super) fn run_compound_command(args: CompoundArgs) -> Result<i32, CliError> {
    let mut combined: Option<ParameterSet> = None;
    for spec in &args.inputs {
        let (path, weight) = split_weighted_input(spec)?;
        let options = ParseOptions {
            name: None,
            weight,
            emin: args.emin,
            emax: args.emax,
        };
        let set = parse_with(&path, &options)?;
        info!(
            input = %path.display(),
            weight,
            spin_groups = set.spin_groups.len(),
            "loaded isotope"
        );
        combined = Some(match combined {
            None => set,
            Some(current) => compose(&current, &set)?,
        });
    }

    let Some(compound) = combined else {
        return Err(CliError::Usage(
            "at least one --input PATH:WEIGHT is required".to_string(),
        ));
    };
    write(&compound, &args.output)?;
    info!(
        output = %args.output.display(),
        spin_groups = compound.spin_groups.len(),
        total_weight = compound.weight,
        "wrote compound parameter file"
    );
    Ok(0)
}

/// Splits `PATH:WEIGHT`, tolerating colons inside the path itself by
/// taking the last one as the separator.
fn split_weighted_input(spec: &str) -> Result<(PathBuf, f64), CliError> {
    let Some((path, weight)) = spec.rsplit_once(':') else {
        return Err(CliError::Usage(format!(
            "input '{spec}' is not of the form PATH:WEIGHT"
        )));
    };
    let weight: f64 = weight.parse().map_err(|_| {
        CliError::Usage(format!("input '{spec}' has a non-numeric weight '{weight}'"))
    })?;
    Ok((PathBuf::from(path), weight))
}
