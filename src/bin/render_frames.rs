use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tsp_annealing::visualization::Visualizer;

/// Convert every SVG in a directory (e.g. exported animation frames) to PNG
#[derive(Parser)]
#[command(name = "render-frames")]
struct Args {
    /// Directory holding the .svg files
    #[arg(default_value = "frames")]
    dir: PathBuf,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let entries = match fs::read_dir(&args.dir) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("Cannot read {:?}: {}", args.dir, e);
            std::process::exit(1);
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "svg"))
        .collect();
    paths.sort();

    let mut failures = 0;
    for path in &paths {
        let svg = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Failed to read {:?}: {}", path, e);
                failures += 1;
                continue;
            }
        };
        let out = path.with_extension("png");
        match Visualizer::svg_to_png_file(&svg, &out) {
            Ok(()) => println!("Converted {:?} -> {:?}", path, out),
            Err(e) => {
                eprintln!("Failed to convert {:?}: {}", path, e);
                failures += 1;
            }
        }
    }

    println!("{} of {} files converted", paths.len() - failures, paths.len());
    if failures > 0 {
        std::process::exit(1);
    }
}
