//! SVG geometry for the category charts. Pure functions so layout can be
//! tested without a renderer.

use std::f64::consts::{FRAC_PI_2, TAU};

use rust_decimal::prelude::ToPrimitive;

use crate::domain::entities::scenario::CostAggregate;

pub const PALETTE: [&str; 8] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#17becf",
];

pub fn palette_color(idx: usize) -> &'static str {
    PALETTE[idx % PALETTE.len()]
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub width: f64,
    pub height: f64,
    /// Space kept free under the baseline for axis labels.
    pub label_band: f64,
}

impl PlotArea {
    pub fn baseline(&self) -> f64 {
        self.height - self.label_band
    }
}

/// Lays out one bar per entry. Negative sums are drawn as zero-height bars.
pub fn bar_layout(aggregate: &CostAggregate, area: PlotArea) -> Vec<Bar> {
    if aggregate.is_empty() {
        return Vec::new();
    }
    let values: Vec<(String, f64)> = aggregate
        .iter()
        .map(|(label, value)| (label.clone(), value.to_f64().unwrap_or(0.0)))
        .collect();
    let max = values.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);

    let slot = area.width / values.len() as f64;
    let bar_width = slot * 0.7;
    let plot_height = area.baseline();

    values
        .into_iter()
        .enumerate()
        .map(|(idx, (label, value))| {
            let height = if max > 0.0 {
                value.max(0.0) / max * plot_height
            } else {
                0.0
            };
            Bar {
                label,
                x: slot * idx as f64 + (slot - bar_width) / 2.0,
                y: plot_height - height,
                width: bar_width,
                height,
                color: palette_color(idx),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct DonutSlice {
    pub label: String,
    /// Fraction of the positive total, in `0.0..=1.0`.
    pub share: f64,
    pub path: String,
    pub color: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DonutGeometry {
    pub cx: f64,
    pub cy: f64,
    pub outer: f64,
    pub inner: f64,
}

/// Slices start at twelve o'clock and run clockwise. Entries that are not
/// positive have no area and are omitted.
pub fn donut_layout(aggregate: &CostAggregate, geometry: DonutGeometry) -> Vec<DonutSlice> {
    let values: Vec<(usize, &String, f64)> = aggregate
        .iter()
        .enumerate()
        .map(|(idx, (label, value))| (idx, label, value.to_f64().unwrap_or(0.0)))
        .filter(|(_, _, value)| *value > 0.0)
        .collect();
    let total: f64 = values.iter().map(|(_, _, v)| v).sum();
    if total <= 0.0 {
        return Vec::new();
    }

    let mut start = -FRAC_PI_2;
    values
        .into_iter()
        .map(|(idx, label, value)| {
            let share = value / total;
            let end = start + share * TAU;
            let path = annulus_sector(geometry, start, end);
            start = end;
            DonutSlice {
                label: label.clone(),
                share,
                path,
                color: palette_color(idx),
            }
        })
        .collect()
}

fn point(cx: f64, cy: f64, radius: f64, angle: f64) -> (f64, f64) {
    (cx + radius * angle.cos(), cy + radius * angle.sin())
}

fn annulus_sector(g: DonutGeometry, start: f64, end: f64) -> String {
    let sweep = end - start;
    // A single arc cannot describe a full circle; split it in two halves.
    if sweep >= TAU - 1e-9 {
        let mid = start + TAU / 2.0;
        return format!(
            "{} {}",
            annulus_sector(g, start, mid),
            annulus_sector(g, mid, start + TAU)
        );
    }
    let large = if sweep > std::f64::consts::PI { 1 } else { 0 };
    let (ox0, oy0) = point(g.cx, g.cy, g.outer, start);
    let (ox1, oy1) = point(g.cx, g.cy, g.outer, end);
    let (ix1, iy1) = point(g.cx, g.cy, g.inner, end);
    let (ix0, iy0) = point(g.cx, g.cy, g.inner, start);
    format!(
        "M {ox0:.3} {oy0:.3} A {r:.3} {r:.3} 0 {large} 1 {ox1:.3} {oy1:.3} \
         L {ix1:.3} {iy1:.3} A {ri:.3} {ri:.3} 0 {large} 0 {ix0:.3} {iy0:.3} Z",
        r = g.outer,
        ri = g.inner,
    )
}
