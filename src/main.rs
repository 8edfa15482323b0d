//! TSP Annealing - Command Line Interface
//!
//! Searches for a short closed tour through 2D points with reheating
//! simulated annealing.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use tsp_annealing::config::{validate_point_count, InputSource, RunConfig};
use tsp_annealing::error::Result;
use tsp_annealing::heuristics::annealing::Annealer;
use tsp_annealing::instance::Instance;
use tsp_annealing::interruption::{parse_time_limit, StopCondition, StopReason};
use tsp_annealing::trace::{RunSummary, RunTrace};
use tsp_annealing::visualization::{Frame, Visualizer};

use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "tsp-annealing")]
#[command(version = "1.0")]
#[command(about = "Traveling Salesman tours with reheating simulated annealing")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Anneal a tour through points from a CSV file or random points
    Solve {
        /// .csv file path with x and y columns (don't use with -n)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Number of random data points (don't use with -f)
        #[arg(short = 'n', long, allow_hyphen_values = true)]
        count: Option<i64>,

        /// Number of iterations to perform; runs until stopped if omitted
        #[arg(short, long, allow_hyphen_values = true)]
        iterations: Option<i64>,

        /// Number of iterations before reheating
        #[arg(short, long, default_value = "100", allow_hyphen_values = true)]
        reheat: i64,

        /// PRNG seed
        #[arg(short, long)]
        seed: Option<u64>,

        /// Stop pulling iterations after this many seconds (Ctrl-C also stops cleanly)
        #[arg(short, long)]
        time_limit: Option<f64>,

        /// Directory for tour/distance SVGs, trace CSV and summary JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keep a frame every N iterations for the animation (0 disables frames)
        #[arg(long, default_value = "0")]
        frame_every: usize,

        /// Also write PNG versions of the tour and distance plots
        #[arg(long)]
        png: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Write random points to a CSV file usable with `solve -f`
    Generate {
        /// Number of random data points
        #[arg(short = 'n', long, allow_hyphen_values = true)]
        count: i64,

        /// PRNG seed
        #[arg(short, long)]
        seed: Option<u64>,

        /// Output CSV file
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Options of the `solve` subcommand
struct SolveOptions {
    file: Option<PathBuf>,
    count: Option<i64>,
    iterations: Option<i64>,
    reheat: i64,
    seed: Option<u64>,
    time_limit: Option<f64>,
    output: Option<PathBuf>,
    frame_every: usize,
    png: bool,
    verbose: bool,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Solve { file, count, iterations, reheat, seed, time_limit, output, frame_every, png, verbose } => {
            solve(SolveOptions { file, count, iterations, reheat, seed, time_limit, output, frame_every, png, verbose })
        }

        Commands::Generate { count, seed, output } => generate(count, seed, &output),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn make_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

fn solve(opts: SolveOptions) -> Result<()> {
    // Validate everything before any point or tour exists.
    let source = InputSource::resolve(opts.file, opts.count)?;
    let config = RunConfig::new(opts.iterations, opts.reheat, opts.seed)?;

    // One random stream per run: point generation, shuffle, moves, acceptance.
    let mut rng = make_rng(config.seed);
    let instance = match &source {
        InputSource::File(path) => Instance::from_file(path)?,
        InputSource::Random(count) => Instance::random(*count, &mut rng)?,
    };

    println!("Loaded {} from {}", instance.name, source);
    if opts.verbose {
        println!("{}", instance.statistics());
    }

    let progress = match config.iteration_limit() {
        Some(n) => ProgressBar::new(n as u64),
        None => ProgressBar::new_spinner(),
    };
    if let Ok(style) = ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} {msg}") {
        progress.set_style(style);
    }

    let started_at = chrono::Local::now();
    let stop = StopCondition::new(parse_time_limit(opts.time_limit)).with_ctrlc_handler();
    let annealer = Annealer::with_rng(&instance.points, config.clone(), rng);
    let mut trace = RunTrace::new();
    let mut frames: Vec<Frame> = Vec::new();

    for step in annealer {
        trace.record(&step);
        if opts.frame_every > 0 && step.iteration % opts.frame_every == 0 {
            frames.push(Frame::from(&step));
        }

        progress.inc(1);
        if step.iteration % 64 == 0 {
            progress.set_message(format!("distance {:.2} | T {:.4}", step.distance, step.temperature));
        }
        match stop.check() {
            Some(StopReason::TimeLimit) => {
                log::info!("Time limit reached after {} iterations", step.iteration + 1);
                break;
            }
            Some(StopReason::Interrupted) => {
                log::info!("Interrupted after {} iterations", step.iteration + 1);
                break;
            }
            None => {}
        }
    }
    progress.finish_and_clear();

    let elapsed = stop.elapsed();

    println!("\n{}", trace.generate_report());
    println!("Time: {:.4}s", elapsed.as_secs_f64());
    if opts.verbose {
        if let Some(tour) = trace.last_tour() {
            println!("\n{}", tour);
        }
    }

    if let Some(dir) = &opts.output {
        let summary = RunSummary::new(
            &instance.name,
            instance.len(),
            &config,
            started_at,
            elapsed.as_secs_f64(),
            &trace,
        );
        export(dir, &trace, &frames, &summary, opts.png)?;
    }

    if let Some(distance) = trace.final_distance() {
        println!("final distance: {}", distance);
    }

    Ok(())
}

fn export(dir: &Path, trace: &RunTrace, frames: &[Frame], summary: &RunSummary, png: bool) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    let viz = Visualizer::new();

    trace.export_to_csv(dir.join("trace.csv"))?;
    summary.save_json(dir.join("summary.json"))?;

    let mut plots = Vec::new();
    if let Some(tour) = trace.last_tour() {
        plots.push(("tour", viz.generate_tour_svg(tour, tour.length())));
    }
    plots.push(("distance", viz.generate_distance_svg(trace.records())));

    for (name, svg) in &plots {
        viz.save_svg(svg, dir.join(format!("{}.svg", name)))?;
        if png {
            let png_path = dir.join(format!("{}.png", name));
            match viz.save_png(svg, &png_path) {
                Ok(()) => println!("Plot saved to {:?}", png_path),
                Err(e) => println!("PNG conversion failed ({}). Kept {}.svg", e, name),
            }
        }
    }

    if !frames.is_empty() {
        viz.write_frames(dir.join("frames"), frames, trace.records())?;
        let animation = viz.generate_animation_svg(frames, trace.records());
        viz.save_svg(&animation, dir.join("animation.svg"))?;
    }

    log::info!("Exported run artifacts to {}", dir.display());
    println!("Results saved to {:?}", dir);
    Ok(())
}

fn generate(count: i64, seed: Option<u64>, output: &Path) -> Result<()> {
    let count = validate_point_count(count)?;

    let mut rng = make_rng(seed);
    let instance = Instance::random(count, &mut rng)?;
    instance.save_csv(output)?;

    println!("Wrote {} points to {:?}", instance.len(), output);
    Ok(())
}
