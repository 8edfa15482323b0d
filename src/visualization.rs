//! Visualization utilities for annealing runs.
//!
//! Generates SVG renderings of the current tour (as a closed polyline), of
//! the distance-over-iteration curve, and an animated SVG replaying sampled
//! frames of a run.

use crate::geometry::Coordinate;
use crate::heuristics::annealing::AnnealingStep;
use crate::instance::bounds_of;
use crate::solution::Tour;
use crate::trace::TraceRecord;
use rayon::prelude::*;
use std::fs::File;
use std::io::Write;
use std::path::Path;
#[cfg(feature = "resvg")]
use resvg::usvg;
#[cfg(feature = "resvg")]
use resvg::render;
#[cfg(feature = "resvg")]
use resvg::FitTo;
#[cfg(feature = "resvg")]
use resvg::tiny_skia::{Pixmap, Transform};
#[cfg(feature = "resvg")]
use resvg::usvg::TreeParsing;

const STYLE: &str = r##"<style>
    .point { fill: #3498db; stroke: #2c3e50; stroke-width: 1; }
    .tour { stroke: #34495e; stroke-width: 2; fill: none; }
    .curve { stroke: #e67e22; stroke-width: 2; fill: none; }
    .axis { stroke: #2c3e50; stroke-width: 1; }
    .label { font-family: Arial; font-size: 12px; fill: #2c3e50; }
    .title { font-family: Arial; font-size: 14px; fill: #2c3e50; font-weight: bold; }
</style>"##;

/// Snapshot of one iteration kept for rendering
#[derive(Debug, Clone)]
pub struct Frame {
    pub iteration: usize,
    pub temperature: f64,
    pub distance: f64,
    pub tour: Tour,
}

impl From<&AnnealingStep> for Frame {
    fn from(step: &AnnealingStep) -> Self {
        Frame {
            iteration: step.iteration,
            temperature: step.temperature,
            distance: step.distance,
            tour: step.tour.clone(),
        }
    }
}

/// Maps point coordinates into a square panel, flipping the y axis
struct Projection {
    min_x: f64,
    min_y: f64,
    scale: f64,
    margin: f64,
    height: f64,
}

impl Projection {
    fn new(points: &[Coordinate], width: f64, height: f64, margin: f64) -> Self {
        let (min_x, max_x, min_y, max_y) = bounds_of(points);
        let scale_x = (width - 2.0 * margin) / (max_x - min_x).max(1.0);
        let scale_y = (height - 2.0 * margin) / (max_y - min_y).max(1.0);

        Projection {
            min_x,
            min_y,
            scale: scale_x.min(scale_y),
            margin,
            height,
        }
    }

    fn apply(&self, c: Coordinate) -> (f64, f64) {
        let tx = self.margin + (c.x - self.min_x) * self.scale;
        let ty = self.height - self.margin - (c.y - self.min_y) * self.scale;
        (tx, ty)
    }

    fn polyline_points(&self, tour: &Tour) -> String {
        tour.closed_polyline()
            .into_iter()
            .map(|c| {
                let (x, y) = self.apply(c);
                format!("{:.2},{:.2}", x, y)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Maps (iteration, distance) pairs into the curve panel
struct CurveAxes {
    x_scale: f64,
    y_min: f64,
    y_scale: f64,
    margin: f64,
    height: f64,
}

impl CurveAxes {
    fn new(records: &[TraceRecord], width: f64, height: f64, margin: f64) -> Self {
        let last_iteration = records.last().map_or(1, |r| r.iteration.max(1));
        let mut y_min = records.iter().map(|r| r.distance).fold(f64::INFINITY, f64::min);
        let mut y_max = records.iter().map(|r| r.distance).fold(f64::NEG_INFINITY, f64::max);
        if !y_min.is_finite() || !y_max.is_finite() {
            y_min = 0.0;
            y_max = 1.0;
        }
        if y_max - y_min < 1e-9 {
            y_min -= 1.0;
            y_max += 1.0;
        }

        CurveAxes {
            x_scale: (width - 2.0 * margin) / last_iteration as f64,
            y_min,
            y_scale: (height - 2.0 * margin) / (y_max - y_min),
            margin,
            height,
        }
    }

    fn apply(&self, iteration: usize, distance: f64) -> (f64, f64) {
        let x = self.margin + iteration as f64 * self.x_scale;
        let y = self.height - self.margin - (distance - self.y_min) * self.y_scale;
        (x, y)
    }
}

/// SVG visualization generator
pub struct Visualizer {
    /// Width of one panel
    pub width: f64,
    /// Panel height
    pub height: f64,
    /// Margin
    pub margin: f64,
    /// Point radius
    pub node_radius: f64,
    /// Display time of one frame in animations, in milliseconds
    pub frame_millis: u64,
}

impl Default for Visualizer {
    fn default() -> Self {
        Visualizer {
            width: 600.0,
            height: 600.0,
            margin: 50.0,
            node_radius: 4.0,
            frame_millis: 40,
        }
    }
}

impl Visualizer {
    pub fn new() -> Self {
        Self::default()
    }

    fn header(&self, width: f64, height: f64) -> String {
        format!(
            r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">
{style}
<rect width="100%" height="100%" fill="#ecf0f1"/>
"##,
            w = width,
            h = height,
            style = STYLE
        )
    }

    /// Tour panel body: closed polyline, points and distance title
    fn tour_panel(&self, tour: &Tour, distance: f64) -> String {
        let projection = Projection::new(tour.points(), self.width, self.height, self.margin);
        let mut body = String::new();

        body.push_str(&format!(
            r#"<text x="{}" y="25" class="title">Current Distance: {:.2}</text>
"#,
            self.margin, distance
        ));
        body.push_str(&format!(
            r#"<polyline points="{}" class="tour"/>
"#,
            projection.polyline_points(tour)
        ));

        for &point in tour.points() {
            let (x, y) = projection.apply(point);
            body.push_str(&format!(
                r#"<circle cx="{:.2}" cy="{:.2}" r="{}" class="point"/>
"#,
                x, y, self.node_radius
            ));
        }

        body
    }

    /// Distance curve panel body with axis labels and temperature title
    fn curve_panel(&self, records: &[TraceRecord], temperature: f64) -> String {
        let axes = CurveAxes::new(records, self.width, self.height, self.margin);
        let mut body = String::new();

        body.push_str(&format!(
            r#"<text x="{}" y="25" class="title">Current Temperature: {:.4}</text>
"#,
            self.margin, temperature
        ));
        body.push_str(&format!(
            r##"<line x1="{m}" y1="{b}" x2="{r}" y2="{b}" class="axis"/>
<line x1="{m}" y1="{m}" x2="{m}" y2="{b}" class="axis"/>
<text x="{cx}" y="{ly}" class="label" text-anchor="middle">Iteration #</text>
<text x="15" y="{cy}" class="label" text-anchor="middle" transform="rotate(-90 15 {cy})">Distance</text>
"##,
            m = self.margin,
            b = self.height - self.margin,
            r = self.width - self.margin,
            cx = self.width / 2.0,
            ly = self.height - 15.0,
            cy = self.height / 2.0
        ));

        let mut path = String::new();
        for (i, record) in records.iter().enumerate() {
            let (x, y) = axes.apply(record.iteration, record.distance);
            if i == 0 {
                path.push_str(&format!("M {:.2} {:.2}", x, y));
            } else {
                path.push_str(&format!(" L {:.2} {:.2}", x, y));
            }
        }
        if !path.is_empty() {
            body.push_str(&format!(
                r#"<path d="{}" class="curve"/>
"#,
                path
            ));
        }

        body
    }

    /// Generate SVG of a tour
    pub fn generate_tour_svg(&self, tour: &Tour, distance: f64) -> String {
        let mut svg = self.header(self.width, self.height);
        svg.push_str(&self.tour_panel(tour, distance));
        svg.push_str("</svg>");
        svg
    }

    /// Generate SVG of the distance-over-iteration curve
    pub fn generate_distance_svg(&self, records: &[TraceRecord]) -> String {
        let temperature = records.last().map_or(1.0, |r| r.temperature);
        let mut svg = self.header(self.width, self.height);
        svg.push_str(&self.curve_panel(records, temperature));
        svg.push_str("</svg>");
        svg
    }

    /// Tour and distance curve side by side, as of `frame`
    pub fn generate_frame_svg(&self, frame: &Frame, records: &[TraceRecord]) -> String {
        let end = records.partition_point(|r| r.iteration <= frame.iteration);
        let mut svg = self.header(2.0 * self.width, self.height);

        svg.push_str("<g>\n");
        svg.push_str(&self.tour_panel(&frame.tour, frame.distance));
        svg.push_str("</g>\n");
        svg.push_str(&format!(r#"<g transform="translate({},0)">
"#, self.width));
        svg.push_str(&self.curve_panel(&records[..end], frame.temperature));
        svg.push_str("</g>\n");

        svg.push_str("</svg>");
        svg
    }

    /// Animated SVG replaying `frames`: the tour polyline morphs frame by
    /// frame while a marker walks along the full distance curve
    pub fn generate_animation_svg(&self, frames: &[Frame], records: &[TraceRecord]) -> String {
        let mut svg = self.header(2.0 * self.width, self.height);
        let Some(first) = frames.first() else {
            svg.push_str("</svg>");
            return svg;
        };

        let projection = Projection::new(first.tour.points(), self.width, self.height, self.margin);
        let duration = self.frame_millis * frames.len() as u64;

        let tour_values: Vec<String> = frames.iter().map(|f| projection.polyline_points(&f.tour)).collect();
        svg.push_str(&format!(
            r#"<text x="{}" y="25" class="title">{} frames, {} points</text>
"#,
            self.margin,
            frames.len(),
            first.tour.len()
        ));
        svg.push_str(&format!(
            r#"<polyline points="{}" class="tour">
<animate attributeName="points" dur="{}ms" repeatCount="indefinite" calcMode="discrete" values="{}"/>
</polyline>
"#,
            tour_values[0],
            duration,
            tour_values.join(";")
        ));
        for &point in first.tour.points() {
            let (x, y) = projection.apply(point);
            svg.push_str(&format!(
                r#"<circle cx="{:.2}" cy="{:.2}" r="{}" class="point"/>
"#,
                x, y, self.node_radius
            ));
        }

        let axes = CurveAxes::new(records, self.width, self.height, self.margin);
        let (cx_values, cy_values): (Vec<String>, Vec<String>) = frames
            .iter()
            .map(|f| {
                let (x, y) = axes.apply(f.iteration, f.distance);
                (format!("{:.2}", x + self.width), format!("{:.2}", y))
            })
            .unzip();

        svg.push_str(&format!(r#"<g transform="translate({},0)">
"#, self.width));
        svg.push_str(&self.curve_panel(records, records.last().map_or(1.0, |r| r.temperature)));
        svg.push_str("</g>\n");
        svg.push_str(&format!(
            r##"<circle cx="{cx0}" cy="{cy0}" r="5" fill="#c0392b">
<animate attributeName="cx" dur="{d}ms" repeatCount="indefinite" calcMode="discrete" values="{cx}"/>
<animate attributeName="cy" dur="{d}ms" repeatCount="indefinite" calcMode="discrete" values="{cy}"/>
</circle>
"##,
            cx0 = cx_values[0],
            cy0 = cy_values[0],
            d = duration,
            cx = cx_values.join(";"),
            cy = cy_values.join(";")
        ));

        svg.push_str("</svg>");
        svg
    }

    /// Write one side-by-side SVG per frame into `dir`, in parallel
    pub fn write_frames<P: AsRef<Path>>(&self, dir: P, frames: &[Frame], records: &[TraceRecord]) -> std::io::Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        frames.par_iter().try_for_each(|frame| {
            let svg = self.generate_frame_svg(frame, records);
            self.save_svg(&svg, dir.join(format!("frame_{:06}.svg", frame.iteration)))
        })?;

        log::info!("Wrote {} frames to {}", frames.len(), dir.display());
        Ok(())
    }

    /// Save SVG to file
    pub fn save_svg<P: AsRef<Path>>(&self, svg: &str, path: P) -> std::io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(svg.as_bytes())?;
        Ok(())
    }

    /// Save SVG as PNG, natively with the `resvg` feature, otherwise through
    /// `rsvg-convert`, `magick` or `inkscape`
    pub fn save_png<P: AsRef<Path>>(&self, svg: &str, path: P) -> std::io::Result<()> {
        let (w, h) = svg_canvas_size(svg).unwrap_or((self.width as u32, self.height as u32));
        render_png(svg, path.as_ref(), w, h)
    }

    /// Render an SVG string directly to a PNG file
    pub fn svg_to_png_file(svg: &str, out: &Path) -> std::io::Result<()> {
        let (w, h) = svg_canvas_size(svg).unwrap_or((800, 800));
        render_png(svg, out, w, h)
    }
}

/// Canvas size from the `width`/`height` attributes of the root element
pub fn svg_canvas_size(svg: &str) -> Option<(u32, u32)> {
    let attribute = |name: &str| -> Option<u32> {
        let (_, rest) = svg.split_once(&format!(" {}=\"", name))?;
        let (value, _) = rest.split_once('"')?;
        value.parse::<f64>().ok().map(|v| v as u32)
    };
    Some((attribute("width")?, attribute("height")?))
}

#[cfg(feature = "resvg")]
fn render_png(svg: &str, path: &Path, w: u32, h: u32) -> std::io::Result<()> {
    use std::io::{Error, ErrorKind};

    let opt = usvg::Options::default();
    let rtree = usvg::Tree::from_str(svg, &opt)
        .map_err(|e| Error::new(ErrorKind::Other, format!("usvg parse error: {}", e)))?;
    let mut pixmap = Pixmap::new(w.max(1), h.max(1))
        .ok_or_else(|| Error::new(ErrorKind::Other, "Failed to create pixmap"))?;
    render(&rtree, FitTo::Original, Transform::default(), pixmap.as_mut())
        .ok_or_else(|| Error::new(ErrorKind::Other, "resvg render failed"))?;
    pixmap
        .save_png(path)
        .map_err(|e| Error::new(ErrorKind::Other, format!("save_png failed: {}", e)))
}

#[cfg(not(feature = "resvg"))]
fn render_png(svg: &str, path: &Path, _w: u32, _h: u32) -> std::io::Result<()> {
    use std::process::Command;

    let tmp_svg = path.with_extension("svg.tmp");
    std::fs::write(&tmp_svg, svg)?;

    let input = tmp_svg.to_string_lossy().to_string();
    let output = path.to_string_lossy().to_string();
    let converters: [(&str, Vec<&str>); 3] = [
        ("rsvg-convert", vec!["-o", output.as_str(), input.as_str()]),
        ("magick", vec!["convert", input.as_str(), output.as_str()]),
        ("inkscape", vec![input.as_str(), "--export-type=png", "--export-filename", output.as_str()]),
    ];

    for (program, args) in &converters {
        if let Ok(status) = Command::new(program).args(args).status() {
            if status.success() {
                let _ = std::fs::remove_file(&tmp_svg);
                return Ok(());
            }
        }
        log::debug!("{} could not convert {}", program, input);
    }

    let _ = std::fs::remove_file(&tmp_svg);
    Err(std::io::Error::new(
        std::io::ErrorKind::Other,
        "No SVG->PNG converter succeeded (tried rsvg-convert, magick, inkscape)",
    ))
}
