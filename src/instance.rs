//! Module for loading and generating point sets.
//!
//! Points come either from a CSV file with `x` and `y` header columns (any
//! other columns are ignored) or from a uniform random generator over the
//! integer grid `[1, 100)`.

use crate::config::MIN_POINTS;
use crate::error::{Error, Result};
use crate::geometry::{distance, Coordinate};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Lower bound (inclusive) of generated coordinates
pub const RANDOM_COORD_MIN: u32 = 1;
/// Upper bound (exclusive) of generated coordinates
pub const RANDOM_COORD_MAX: u32 = 100;

/// One CSV row
#[derive(Debug, Deserialize, Serialize)]
struct PointRecord {
    x: f64,
    y: f64,
}

/// A named set of points to route through
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    pub name: String,
    pub points: Vec<Coordinate>,
}

impl Instance {
    /// Wrap points, rejecting sets that are too small or not finite
    pub fn new(name: impl Into<String>, points: Vec<Coordinate>) -> Result<Self> {
        if points.len() < MIN_POINTS {
            return Err(Error::InsufficientPoints(points.len()));
        }
        if let Some(row) = points.iter().position(|p| !p.is_finite()) {
            return Err(Error::NonFiniteCoordinate { row: row + 1 });
        }

        Ok(Instance { name: name.into(), points })
    }

    /// Read points from a CSV file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::MissingInputFile(path.to_path_buf()));
        }

        let file = File::open(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "points".to_string());

        let instance = Self::from_reader(file, name)?;
        log::info!("Loaded {} points from {}", instance.len(), path.display());
        Ok(instance)
    }

    /// Read points from any CSV source
    pub fn from_reader<R: Read>(reader: R, name: impl Into<String>) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let mut points = Vec::new();
        for record in csv_reader.deserialize() {
            let record: PointRecord = record?;
            points.push(Coordinate::new(record.x, record.y));
        }

        Self::new(name, points)
    }

    /// `count` points with integer coordinates drawn uniformly from `[1, 100)`
    pub fn random<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Result<Self> {
        let points = (0..count)
            .map(|_| {
                let x = rng.gen_range(RANDOM_COORD_MIN..RANDOM_COORD_MAX);
                let y = rng.gen_range(RANDOM_COORD_MIN..RANDOM_COORD_MAX);
                Coordinate::new(x as f64, y as f64)
            })
            .collect();

        Self::new(format!("random-{}", count), points)
    }

    /// Write the points as an `x,y` CSV
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for point in &self.points {
            csv_writer.serialize(PointRecord { x: point.x, y: point.y })?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn save_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_csv(file)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Bounding box as `(min_x, max_x, min_y, max_y)`
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        bounds_of(&self.points)
    }

    /// Get statistics about the point set
    pub fn statistics(&self) -> InstanceStatistics {
        let (min_x, max_x, min_y, max_y) = self.bounds();

        let mut distances: Vec<f64> = Vec::new();
        for i in 0..self.points.len() {
            for j in i + 1..self.points.len() {
                distances.push(distance(self.points[i], self.points[j]));
            }
        }
        let avg_distance = if distances.is_empty() {
            0.0
        } else {
            distances.iter().sum::<f64>() / distances.len() as f64
        };
        let max_distance = distances.iter().cloned().fold(0.0, f64::max);

        InstanceStatistics {
            name: self.name.clone(),
            num_points: self.points.len(),
            min_x,
            max_x,
            min_y,
            max_y,
            avg_distance,
            max_distance,
        }
    }
}

/// Bounding box of a point slice as `(min_x, max_x, min_y, max_y)`
pub fn bounds_of(points: &[Coordinate]) -> (f64, f64, f64, f64) {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for p in points {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }

    (min_x, max_x, min_y, max_y)
}

/// Statistics about a point set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceStatistics {
    pub name: String,
    pub num_points: usize,
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub avg_distance: f64,
    pub max_distance: f64,
}

impl std::fmt::Display for InstanceStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Instance: {}", self.name)?;
        writeln!(f, "  Points: {}", self.num_points)?;
        writeln!(f, "  X range: [{:.2}, {:.2}]", self.min_x, self.max_x)?;
        writeln!(f, "  Y range: [{:.2}, {:.2}]", self.min_y, self.max_y)?;
        writeln!(f, "  Avg distance: {:.2}", self.avg_distance)?;
        writeln!(f, "  Max distance: {:.2}", self.max_distance)
    }
}
