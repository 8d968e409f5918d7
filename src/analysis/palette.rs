//! Deterministic color assignment for comparison charts.
//!
//! Bar-style charts get one base color per project, cycled from the
//! project palette. Segment-style charts get one color per category from the
//! metric's category palette, lightened per project so that rings or slices
//! of different projects stay distinguishable.

use crate::models::{Color, MetricKind, SeriesColors};
use tracing::debug;

/// Base colors for projects in bar-style charts.
pub const PROJECT_PALETTE: [Color; 5] = [
    Color::rgb(0x3b, 0x82, 0xf6), // blue
    Color::rgb(0xef, 0x44, 0x44), // red
    Color::rgb(0x10, 0xb9, 0x81), // green
    Color::rgb(0xf5, 0x9e, 0x0b), // amber
    Color::rgb(0x8b, 0x5c, 0xf6), // violet
];

/// Category colors for the status distribution.
pub const STATUS_PALETTE: [Color; 5] = [
    Color::rgb(0xef, 0x44, 0x44), // open
    Color::rgb(0xf5, 0x9e, 0x0b), // in progress
    Color::rgb(0x10, 0xb9, 0x81), // resolved
    Color::rgb(0x3b, 0x82, 0xf6), // closed
    Color::rgb(0x8b, 0x5c, 0xf6), // reopened
];

/// Category colors for priorities, most severe first.
pub const PRIORITY_PALETTE: [Color; 4] = [
    Color::rgb(0xef, 0x44, 0x44),
    Color::rgb(0xf9, 0x73, 0x16),
    Color::rgb(0xf5, 0x9e, 0x0b),
    Color::rgb(0x84, 0xcc, 0x16),
];

/// Default lightness shift between consecutive projects, in percentage points.
pub const DEFAULT_SHADE_STEP: f64 = 12.0;

/// Palette settings used by the aggregator.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub projects: Vec<Color>,
    pub statuses: Vec<Color>,
    pub priorities: Vec<Color>,
    /// Shade segment colors per project.
    pub shading: bool,
    /// Lightness added per project index, in percentage points.
    pub shade_step: f64,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            projects: PROJECT_PALETTE.to_vec(),
            statuses: STATUS_PALETTE.to_vec(),
            priorities: PRIORITY_PALETTE.to_vec(),
            shading: true,
            shade_step: DEFAULT_SHADE_STEP,
        }
    }
}

impl From<&crate::config::ChartConfig> for Palette {
    fn from(config: &crate::config::ChartConfig) -> Self {
        let parse = |hexes: &[String], fallback: &[Color]| -> Vec<Color> {
            let colors: Vec<Color> = hexes
                .iter()
                .filter_map(|h| {
                    let color = Color::from_hex(h);
                    if color.is_none() {
                        debug!("Ignoring invalid palette color {:?}", h);
                    }
                    color
                })
                .collect();
            if colors.is_empty() {
                fallback.to_vec()
            } else {
                colors
            }
        };

        Self {
            projects: parse(&config.project_colors, &PROJECT_PALETTE),
            statuses: parse(&config.status_colors, &STATUS_PALETTE),
            priorities: parse(&config.priority_colors, &PRIORITY_PALETTE),
            shading: config.shading,
            shade_step: config.shade_step,
        }
    }
}

impl Palette {
    /// Base color of the project at `index` in the selection.
    pub fn project_color(&self, index: usize) -> Color {
        cycle(&self.projects, &PROJECT_PALETTE, index)
    }

    /// Category colors for a segment chart, shaded for the project at `index`.
    pub fn category_colors(
        &self,
        kind: MetricKind,
        categories: usize,
        project_index: usize,
    ) -> Vec<Color> {
        let (base, fallback): (&[Color], &[Color]) = match kind {
            MetricKind::Priority => (&self.priorities, &PRIORITY_PALETTE),
            _ => (&self.statuses, &STATUS_PALETTE),
        };
        let shift = if self.shading {
            self.shade_step * project_index as f64
        } else {
            0.0
        };

        (0..categories)
            .map(|i| {
                let color = cycle(base, fallback, i);
                if shift == 0.0 {
                    color
                } else {
                    lighten(color, shift)
                }
            })
            .collect()
    }

    /// Colors for one project's series of `categories` values.
    pub fn assign(&self, kind: MetricKind, categories: usize, project_index: usize) -> SeriesColors {
        if kind.chart_style().is_segmented() {
            SeriesColors::PerCategory(self.category_colors(kind, categories, project_index))
        } else {
            SeriesColors::Solid(self.project_color(project_index))
        }
    }
}

fn cycle(colors: &[Color], fallback: &[Color], index: usize) -> Color {
    let colors = if colors.is_empty() { fallback } else { colors };
    colors[index % colors.len()]
}

/// Raises HSL lightness by `points` percentage points, clamped to white.
pub fn lighten(color: Color, points: f64) -> Color {
    let (h, s, l) = rgb_to_hsl(color);
    let l = (l + points / 100.0).clamp(0.0, 1.0);
    hsl_to_rgb(h, s, l)
}

fn rgb_to_hsl(color: Color) -> (f64, f64, f64) {
    let r = color.r as f64 / 255.0;
    let g = color.g as f64 / 255.0;
    let b = color.b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if max == min {
        return (0.0, 0.0, l);
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };
    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    (h / 6.0, s, l)
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Color {
    let to_byte = |v: f64| (v * 255.0).round().clamp(0.0, 255.0) as u8;

    if s == 0.0 {
        let v = to_byte(l);
        return Color::rgb(v, v, v);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    Color::rgb(
        to_byte(hue_to_rgb(p, q, h + 1.0 / 3.0)),
        to_byte(hue_to_rgb(p, q, h)),
        to_byte(hue_to_rgb(p, q, h - 1.0 / 3.0)),
    )
}

fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}
