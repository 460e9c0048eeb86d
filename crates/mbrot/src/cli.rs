use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use mbrot_backend::HeadlessBackend;
use mbrot_core::{EngineConfig, Viewport, ViewportController};
use mbrot_render::{FrameRenderer, RunMode, Strategy};

use crate::error::{AppError, Result};
use crate::logging::{self, LogTarget};
use crate::program::Program;
use crate::report::{BenchReport, ProbeReport};

#[derive(Debug, Parser)]
#[command(
    name = "mbrot",
    about = "Mandelbrot renderer with scalar, portable-lane and AVX escape-time kernels",
    version
)]
pub struct Cli {
    #[command(flatten)]
    pub engine: EngineArgs,

    #[command(flatten)]
    pub log: LogArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Kernel and starting-view settings shared by every command.
#[derive(Debug, Clone, Args)]
pub struct EngineArgs {
    /// Escape-time strategy: scalar, portable or hardware.
    #[arg(long, global = true, default_value = "hardware")]
    pub strategy: Strategy,

    /// Iteration cap.
    #[arg(long = "n-max", global = true, default_value_t = EngineConfig::DEFAULT_N_MAX)]
    pub n_max: u32,

    /// Squared escape radius.
    #[arg(long = "r2-max", global = true, default_value_t = EngineConfig::DEFAULT_R2_MAX)]
    pub r2_max: f32,

    #[arg(long = "x-shift", global = true, default_value_t = 0.0, allow_negative_numbers = true)]
    pub x_shift: f32,

    #[arg(long = "y-shift", global = true, default_value_t = 0.0, allow_negative_numbers = true)]
    pub y_shift: f32,

    /// Multiplier on the pixel spacing; larger values show more of the plane.
    #[arg(long, global = true, default_value_t = 1.0, allow_negative_numbers = true)]
    pub scale: f32,
}

impl EngineArgs {
    /// Validated engine configuration.
    ///
    /// # Errors
    /// Returns [`AppError::Config`] when a setting is out of range.
    pub fn engine_config(&self) -> Result<EngineConfig> {
        let config = EngineConfig::default()
            .with_n_max(self.n_max)
            .with_r2_max(self.r2_max)
            .validate()?;
        Ok(config)
    }

    /// Starting viewport.
    ///
    /// # Errors
    /// Returns [`AppError::Config`] for a non-finite shift or a non-positive scale.
    pub fn viewport(&self) -> Result<Viewport> {
        Ok(Viewport::try_new(self.x_shift, self.y_shift, self.scale)?)
    }
}

#[derive(Debug, Clone, Args)]
pub struct LogArgs {
    /// Append log lines to this file instead of stderr.
    #[arg(long = "log-file", global = true)]
    pub log_file: Option<PathBuf>,

    /// Filter directive used when MBROT_LOG is unset.
    #[arg(long = "log-level", global = true, default_value = "info")]
    pub log_level: String,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Interactive terminal session. WASD pans, Up/Down zoom, q quits.
    Run,

    /// Render a fixed number of frames without presenting them and report timings.
    Bench {
        #[arg(long, default_value_t = RunMode::DEFAULT_BENCH_FRAMES)]
        frames: u64,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the complex coordinate, iteration count and color of one pixel.
    Probe {
        #[arg(long, default_value_t = EngineConfig::DEFAULT_LENGTH / 2)]
        x: usize,

        #[arg(long, default_value_t = EngineConfig::DEFAULT_WIDTH / 2)]
        y: usize,

        #[arg(long)]
        json: bool,
    },
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    let owns_terminal = matches!(cli.command, Commands::Run);
    let target = LogTarget::choose(cli.log.log_file.as_deref(), owns_terminal);
    logging::init(&cli.log.log_level, &target)?;
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(cli, &mut out)
}

/// Dispatch a parsed command line, writing reports to `out`.
///
/// # Errors
/// Returns configuration, argument, backend and output errors.
pub fn execute(cli: Cli, out: &mut impl Write) -> Result<()> {
    let config = cli.engine.engine_config()?;
    let viewport = cli.engine.viewport()?;
    let renderer = build_renderer(&config, cli.engine.strategy)?;

    match cli.command {
        Commands::Run => run_interactive(&config, renderer, viewport, out),
        Commands::Bench { frames, json } => {
            run_bench(&config, renderer, viewport, frames, json, out)
        }
        Commands::Probe { x, y, json } => run_probe(&config, &renderer, viewport, x, y, json, out),
    }
}

fn build_renderer(config: &EngineConfig, requested: Strategy) -> Result<FrameRenderer> {
    let renderer = FrameRenderer::new(config, requested)?;
    if renderer.strategy() == requested {
        tracing::info!(strategy = %requested, "strategy selected");
    } else {
        tracing::warn!(
            requested = %requested,
            effective = %renderer.strategy(),
            "strategy unavailable on this CPU; falling back"
        );
    }
    Ok(renderer)
}

fn run_bench(
    config: &EngineConfig,
    renderer: FrameRenderer,
    viewport: Viewport,
    frames: u64,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    if frames == 0 {
        return Err(AppError::invalid("--frames must be at least 1"));
    }
    let controller = ViewportController::new(config).with_viewport(viewport);
    let mut program = Program::new(
        HeadlessBackend::new(),
        renderer,
        controller,
        RunMode::Headless { frames },
    );
    let summary = program.run()?;
    let report = BenchReport::from_summary(&summary);
    tracing::info!(
        strategy = %report.strategy,
        frames = report.frames,
        total_micros = report.total_micros,
        micros_per_frame = report.micros_per_frame,
        "benchmark finished"
    );

    if json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
    } else {
        writeln!(out, "{report}")?;
    }
    Ok(())
}

fn run_probe(
    config: &EngineConfig,
    renderer: &FrameRenderer,
    viewport: Viewport,
    x: usize,
    y: usize,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    if x >= config.length || y >= config.width {
        return Err(AppError::invalid(format!(
            "pixel ({x}, {y}) is outside the {}x{} raster",
            config.length, config.width
        )));
    }
    let probe = renderer.probe(x, y, &viewport);
    let report = ProbeReport::new(&probe, config.n_max);
    if json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
    } else {
        writeln!(out, "{report}")?;
    }
    Ok(())
}

#[cfg(feature = "terminal")]
fn run_interactive(
    config: &EngineConfig,
    renderer: FrameRenderer,
    viewport: Viewport,
    out: &mut impl Write,
) -> Result<()> {
    use mbrot_backend::TerminalBackend;

    let controller = ViewportController::new(config).with_viewport(viewport);
    let mut program = Program::new(
        TerminalBackend::new()?,
        renderer,
        controller,
        RunMode::Interactive,
    );
    let summary = program.run();
    // Restore the terminal before printing anything.
    drop(program);
    let summary = summary?;

    let v = summary.viewport;
    writeln!(
        out,
        "{} frames, final view x_shift {} y_shift {} scale {}",
        summary.frames, v.x_shift, v.y_shift, v.scale
    )?;
    Ok(())
}

#[cfg(not(feature = "terminal"))]
fn run_interactive(
    _config: &EngineConfig,
    _renderer: FrameRenderer,
    _viewport: Viewport,
    _out: &mut impl Write,
) -> Result<()> {
    Err(AppError::UnsupportedMode {
        mode: "run",
        reason: "built without the `terminal` feature".to_string(),
    })
}
