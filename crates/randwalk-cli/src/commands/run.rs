use crate::cli::RunArgs;
use crate::config::{AppConfig, build_config};
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use randwalk::core::analysis::expected_mean_squared_displacement;
use randwalk::engine::progress::ProgressReporter;
use randwalk::workflows::simulate::{self, RunOptions, SimulationReport};
use std::fmt;
use tracing::info;

const COLUMN_WIDTH: usize = 22;

pub fn run(args: RunArgs, quiet: bool) -> Result<()> {
    info!("Resolving configuration...");
    let config = build_config(&args)?;
    let options = run_options(&config);

    let progress_handler = if quiet {
        CliProgressHandler::hidden()
    } else {
        CliProgressHandler::new()
    };
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Starting random walk of {} particles for {} steps...",
        config.simulation.particle_count, config.run.steps
    );
    info!("Invoking the core simulation workflow...");
    let report = simulate::run(&config.simulation, &options, &reporter)?;
    info!(
        "Workflow finished after {} steps per particle.",
        report.total_steps
    );
    print!("{}", ReportView(&report));
    Ok(())
}

fn run_options(config: &AppConfig) -> RunOptions {
    let tracked = if config.run.track.is_empty() {
        simulate::evenly_spaced_indices(
            config.simulation.particle_count as usize,
            config.run.report,
        )
    } else {
        config.run.track.clone()
    };

    RunOptions::new(config.run.steps)
        .with_policies(config.run.policy.policies())
        .with_tracked(tracked)
        .with_chunk_steps(config.run.chunk_steps)
}

/// Human-readable rendering of a finished run.
struct ReportView<'a>(&'a SimulationReport);

impl ReportView<'_> {
    fn write_table(
        &self,
        f: &mut fmt::Formatter<'_>,
        title: &str,
        pick: impl Fn(&simulate::TrackedParticle) -> &[(f64, f64)],
    ) -> fmt::Result {
        let report = self.0;
        writeln!(f, "{}", title)?;
        write!(f, "{:>8}", "Index")?;
        for policy in &report.policies {
            write!(f, "{:>w$}", format!("X ({})", policy), w = COLUMN_WIDTH)?;
            write!(f, "{:>w$}", format!("Y ({})", policy), w = COLUMN_WIDTH)?;
        }
        writeln!(f)?;
        for particle in &report.tracked {
            write!(f, "{:>8}", particle.index)?;
            for (x, y) in pick(particle) {
                write!(f, "{:>w$.4}{:>w$.4}", x, y, w = COLUMN_WIDTH)?;
            }
            writeln!(f)?;
        }
        writeln!(f)
    }
}

impl fmt::Display for ReportView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        let config = &report.config;

        self.write_table(f, "Initial coordinates for selected particles:", |p| {
            p.initial.as_slice()
        })?;
        self.write_table(f, "Final coordinates for selected particles:", |p| {
            p.final_position.as_slice()
        })?;

        let diffusion = &report.diffusion;
        writeln!(
            f,
            "Diffusion after {} steps ({} particles, {} style, fluctuation {}):",
            diffusion.steps, diffusion.particle_count, config.style, config.fluctuation
        )?;
        writeln!(
            f,
            "  Centroid:                  ({:.4}, {:.4})",
            diffusion.centroid.x, diffusion.centroid.y
        )?;
        writeln!(
            f,
            "  Mean squared displacement: {:.4} (expected {:.4})",
            diffusion.mean_squared_displacement,
            expected_mean_squared_displacement(config.style, config.fluctuation, diffusion.steps)
        )?;
        writeln!(
            f,
            "  RMS displacement:          {:.4}",
            diffusion.rms_displacement
        )?;
        writeln!(
            f,
            "  Max displacement:          {:.4}",
            diffusion.max_displacement
        )?;
        if let Some(coefficient) = diffusion.diffusion_coefficient() {
            writeln!(f, "  Diffusion coefficient:     {:.6}", coefficient)?;
        }
        writeln!(f)?;

        if report.policies.len() < 2 {
            writeln!(f, "Execution policy: {}", report.policies[0])
        } else if report.policies_agree() {
            writeln!(
                f,
                "✓ All execution policies produced identical coordinates for all {} particles.",
                config.particle_count
            )
        } else {
            writeln!(
                f,
                "✗ {} of {} particles differ between execution policies.",
                report.mismatched_particles, config.particle_count
            )
        }
    }
}
