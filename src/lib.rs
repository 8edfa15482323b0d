//! TSP Annealing Library
//!
//! Approximate Traveling Salesman tours through 2D points with simulated
//! annealing and a periodically reheated temperature.
//!
//! # Features
//!
//! - Point sets from CSV files or a seeded random generator
//! - Segment-reversal neighbors with Metropolis acceptance
//! - A pull-based optimizer: [`Annealer`] is an [`Iterator`] over iterations
//! - Trace export (CSV, JSON summary) and SVG/PNG visualization
//!
//! # Example
//!
//! ```no_run
//! use tsp_annealing::instance::Instance;
//! use tsp_annealing::heuristics::annealing::Annealer;
//! use tsp_annealing::config::RunConfig;
//!
//! // Load instance
//! let instance = Instance::from_file("points.csv").unwrap();
//!
//! // Run 10000 iterations with the default reheat period
//! let config = RunConfig::default().with_iterations(10_000).unwrap().with_seed(7);
//! let last = Annealer::new(&instance.points, config).last().unwrap();
//!
//! println!("Tour length: {:.2}", last.tour.length());
//! ```

pub mod error;
pub mod config;
pub mod geometry;
pub mod instance;
pub mod interruption;
pub mod solution;
pub mod heuristics;
pub mod trace;
pub mod visualization;

pub use config::RunConfig;
pub use heuristics::annealing::Annealer;
pub use instance::Instance;
pub use solution::Tour;
