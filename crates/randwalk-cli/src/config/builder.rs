use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::{AppConfig, PolicySelection, RunSettings};
use crate::cli::{RunArgs, StyleArg};
use crate::error::{CliError, Result};
use crate::utils::parser;
use clap::ValueEnum;
use randwalk::engine::config::SimulationConfigBuilder;
use std::str::FromStr;
use tracing::debug;

/// Resolves the run configuration from CLI flags, `--set` overrides, the config file and the
/// built-in defaults, in that order of precedence.
pub fn build_config(args: &RunArgs) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };

    let mut file_config = apply_set_values(file_config, &args.set_values)?;
    debug!("Configuration after --set overrides: {:?}", file_config);

    let sim_file = file_config.simulation.take().unwrap_or_default();
    let run_file = file_config.run.take().unwrap_or_default();

    let simulation = SimulationConfigBuilder::new()
        .particle_count(
            args.particles
                .or(sim_file.particles)
                .unwrap_or(defaults.particles),
        )
        .bits(args.bits.or(sim_file.bits).unwrap_or(defaults.bits))
        .seed(args.seed.or(sim_file.seed).unwrap_or(defaults.seed))
        .fluctuation(
            args.fluctuation
                .or(sim_file.fluctuation)
                .unwrap_or(defaults.fluctuation),
        )
        .style(
            args.style
                .map(Into::into)
                .or(sim_file.style)
                .unwrap_or(defaults.style),
        )
        .replica(args.replica.or(sim_file.replica).unwrap_or(defaults.replica))
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    let track = if args.track.is_empty() {
        run_file.track.unwrap_or_default()
    } else {
        args.track.clone()
    };

    let run = RunSettings {
        steps: args.steps.or(run_file.steps).unwrap_or(defaults.steps),
        report: args.report.or(run_file.report).unwrap_or(defaults.report),
        policy: args.policy.or(run_file.policy).unwrap_or(defaults.policy),
        chunk_steps: args
            .chunk_steps
            .or(run_file.chunk_steps)
            .unwrap_or(defaults.chunk_steps),
        track,
    };

    if run.steps == 0 {
        return Err(CliError::Config(
            "`run.steps` must be at least 1; the count includes the initial step.".to_string(),
        ));
    }
    if run.chunk_steps == 0 {
        return Err(CliError::Config(
            "`run.chunk-steps` must be at least 1.".to_string(),
        ));
    }

    Ok(AppConfig { simulation, run })
}

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value)))
}

fn parse_enum<T: ValueEnum>(key: &str, value: &str) -> Result<T> {
    <T as ValueEnum>::from_str(value, true)
        .map_err(|_| CliError::Config(format!("Invalid value for {}: {}", key, value)))
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let (key, value) = parser::parse_assignment(kv_pair).map_err(|_| {
            CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            ))
        })?;

        match key {
            "simulation.particles" => {
                config
                    .simulation
                    .get_or_insert_with(Default::default)
                    .particles = Some(parse_value(key, value, "integer")?);
            }
            "simulation.bits" => {
                config.simulation.get_or_insert_with(Default::default).bits =
                    Some(parse_value(key, value, "integer")?);
            }
            "simulation.seed" => {
                config.simulation.get_or_insert_with(Default::default).seed =
                    Some(parse_value(key, value, "integer")?);
            }
            "simulation.fluctuation" => {
                let fluctuation = parser::parse_finite_f64(value).map_err(|e| {
                    CliError::Config(format!("Invalid float value for {}: {}", key, e))
                })?;
                config
                    .simulation
                    .get_or_insert_with(Default::default)
                    .fluctuation = Some(fluctuation);
            }
            "simulation.style" => {
                let style: StyleArg = parse_enum(key, value)?;
                config.simulation.get_or_insert_with(Default::default).style = Some(style.into());
            }
            "simulation.replica" => {
                config.simulation.get_or_insert_with(Default::default).replica =
                    Some(parse_value(key, value, "integer")?);
            }
            "run.steps" => {
                config.run.get_or_insert_with(Default::default).steps =
                    Some(parse_value(key, value, "integer")?);
            }
            "run.report" => {
                config.run.get_or_insert_with(Default::default).report =
                    Some(parse_value(key, value, "integer")?);
            }
            "run.policy" => {
                let policy: PolicySelection = parse_enum(key, value)?;
                config.run.get_or_insert_with(Default::default).policy = Some(policy);
            }
            "run.chunk-steps" => {
                config.run.get_or_insert_with(Default::default).chunk_steps =
                    Some(parse_value(key, value, "integer")?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}
