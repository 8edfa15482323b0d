//! Run trace, statistics and export.
//!
//! The trace is the in-memory record of every produced iteration. It feeds
//! the distance curve, the CSV export and the end-of-run summary.

use crate::config::RunConfig;
use crate::error::Result;
use crate::heuristics::annealing::AnnealingStep;
use crate::solution::Tour;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::fs::File;
use std::path::Path;

/// One iteration of a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
    pub iteration: usize,
    pub temperature: f64,
    /// Tour length before the iteration's transition
    pub distance: f64,
    pub accepted: bool,
}

impl From<&AnnealingStep> for TraceRecord {
    fn from(step: &AnnealingStep) -> Self {
        TraceRecord {
            iteration: step.iteration,
            temperature: step.temperature,
            distance: step.distance,
            accepted: step.accepted,
        }
    }
}

/// Aggregated statistics over the recorded distances
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceStatistics {
    pub iterations: usize,
    pub accepted_moves: usize,
    pub acceptance_rate: f64,
    pub initial_distance: f64,
    pub best_distance: f64,
    pub mean_distance: f64,
    /// `None` with fewer than two samples
    pub std_distance: Option<f64>,
}

/// Recorder for a run
#[derive(Debug, Clone)]
pub struct RunTrace {
    records: Vec<TraceRecord>,
    best_tour: Option<Tour>,
    best_distance: f64,
    last_tour: Option<Tour>,
}

impl RunTrace {
    pub fn new() -> Self {
        RunTrace {
            records: Vec::new(),
            best_tour: None,
            best_distance: f64::INFINITY,
            last_tour: None,
        }
    }

    /// Record one produced item
    pub fn record(&mut self, step: &AnnealingStep) {
        self.records.push(TraceRecord::from(step));

        let length = step.tour.length();
        if length < self.best_distance {
            self.best_distance = length;
            self.best_tour = Some(step.tour.clone());
        }
        self.last_tour = Some(step.tour.clone());
    }

    pub fn records(&self) -> &[TraceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Shortest tour seen after any transition
    pub fn best_tour(&self) -> Option<&Tour> {
        self.best_tour.as_ref()
    }

    /// Tour after the last recorded transition
    pub fn last_tour(&self) -> Option<&Tour> {
        self.last_tour.as_ref()
    }

    /// Objective value reported with the last produced item
    pub fn final_distance(&self) -> Option<f64> {
        self.records.last().map(|r| r.distance)
    }

    pub fn distances(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.distance).collect()
    }

    pub fn statistics(&self) -> Option<TraceStatistics> {
        let first = self.records.first()?;
        let distances = self.distances();

        let accepted_moves = self.records.iter().filter(|r| r.accepted).count();
        let recorded_min = distances
            .iter()
            .copied()
            .min_by_key(|&d| OrderedFloat(d))
            .unwrap_or(f64::INFINITY);
        let std_distance = if distances.len() > 1 {
            Some(distances.iter().std_dev())
        } else {
            None
        };

        Some(TraceStatistics {
            iterations: self.records.len(),
            accepted_moves,
            acceptance_rate: accepted_moves as f64 / self.records.len() as f64,
            initial_distance: first.distance,
            best_distance: recorded_min.min(self.best_distance),
            mean_distance: distances.iter().mean(),
            std_distance,
        })
    }

    /// Export one CSV row per iteration
    pub fn export_to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for record in &self.records {
            writer.serialize(record)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Generate summary report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();

        report.push_str("========== Results ==========\n");
        match self.statistics() {
            Some(stats) => {
                report.push_str(&format!("Iterations: {}\n", stats.iterations));
                report.push_str(&format!(
                    "Accepted moves: {} ({:.1}%)\n",
                    stats.accepted_moves,
                    stats.acceptance_rate * 100.0
                ));
                report.push_str(&format!("Initial distance: {:.2}\n", stats.initial_distance));
                report.push_str(&format!("Best distance: {:.2}\n", stats.best_distance));
                report.push_str(&format!("Mean distance: {:.2}\n", stats.mean_distance));
                if let Some(std) = stats.std_distance {
                    report.push_str(&format!("Std distance: {:.2}\n", std));
                }
            }
            None => report.push_str("No iterations recorded\n"),
        }

        report
    }
}

impl Default for RunTrace {
    fn default() -> Self {
        Self::new()
    }
}

/// Machine-readable summary of a finished run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub instance: String,
    pub num_points: usize,
    pub config: RunConfig,
    pub started_at: String,
    pub elapsed_seconds: f64,
    pub final_distance: Option<f64>,
    pub statistics: Option<TraceStatistics>,
    pub final_tour: Option<Tour>,
    pub best_tour: Option<Tour>,
}

impl RunSummary {
    pub fn new(
        instance: &str,
        num_points: usize,
        config: &RunConfig,
        started_at: chrono::DateTime<chrono::Local>,
        elapsed_seconds: f64,
        trace: &RunTrace,
    ) -> Self {
        RunSummary {
            instance: instance.to_string(),
            num_points,
            config: config.clone(),
            started_at: started_at.to_rfc3339(),
            elapsed_seconds,
            final_distance: trace.final_distance(),
            statistics: trace.statistics(),
            final_tour: trace.last_tour().cloned(),
            best_tour: trace.best_tour().cloned(),
        }
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
