// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! SVG bar chart: one bar per period, a cumulative line, and an optional
//! dashed baseline line.

use handlebars::html_escape;
use crate::format::{fmt_millions, fmt_thousands};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

const WIDTH: f64 = 1000.0;
const HEIGHT: f64 = 480.0;
const LEFT: f64 = 70.0;
const RIGHT: f64 = 90.0;
const TOP: f64 = 50.0;
const BOTTOM: f64 = 80.0;
const BAR_COLOR: &str = "#1f77b4";
const BASELINE_COLOR: &str = "#d62728";

#[derive(Debug, Clone)]
pub struct ChartSpec<'a> {
    pub title: &'a str,
    pub x_label: &'a str,
    pub bar_label: &'a str,
    pub line_label: &'a str,
    pub baseline_label: Option<&'a str>,
    pub labels: Vec<String>,
    pub bars: Vec<Decimal>,
    pub cumulative: Vec<Decimal>,
    pub baseline: Option<Vec<Decimal>>,
}

fn f(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

pub fn bar_chart(spec: &ChartSpec<'_>) -> String {
    let n = spec.labels.len().max(1);
    let plot_w = WIDTH - LEFT - RIGHT;
    let plot_h = HEIGHT - TOP - BOTTOM;

    let all = spec
        .bars
        .iter()
        .chain(&spec.cumulative)
        .chain(spec.baseline.iter().flatten())
        .map(|d| f(*d));
    let (lo, hi) = all.fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let span = if hi - lo <= f64::EPSILON { 1.0 } else { hi - lo };
    let y = |v: f64| TOP + plot_h * (hi - v) / span;
    let slot = plot_w / n as f64;
    let x_mid = |i: usize| LEFT + slot * (i as f64 + 0.5);

    let mut out = String::new();
    out.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}" font-family="Century Gothic, sans-serif" font-size="12">"#
    ));
    out.push('\n');
    out.push_str(&format!(
        "<rect width=\"{WIDTH}\" height=\"{HEIGHT}\" fill=\"white\"/>\n\
         <text x=\"{:.1}\" y=\"25\" text-anchor=\"middle\" font-size=\"18\" font-weight=\"bold\">{}</text>\n",
        WIDTH / 2.0,
        html_escape(spec.title)
    ));

    // axes
    let zero = y(0.0);
    out.push_str(&format!(
        "<line x1=\"{LEFT}\" y1=\"{zero:.1}\" x2=\"{:.1}\" y2=\"{zero:.1}\" stroke=\"black\"/>\n\
         <line x1=\"{LEFT}\" y1=\"{TOP}\" x2=\"{LEFT}\" y2=\"{:.1}\" stroke=\"black\"/>\n",
        WIDTH - RIGHT,
        TOP + plot_h
    ));
    out.push_str(&format!(
        "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{}</text>\n",
        LEFT + plot_w / 2.0,
        HEIGHT - 10.0,
        html_escape(spec.x_label)
    ));

    let bar_w = slot * 0.7;
    for (i, v) in spec.bars.iter().enumerate() {
        let top = y(f(*v));
        let (ry, rh) = if top < zero {
            (top, zero - top)
        } else {
            (zero, top - zero)
        };
        out.push_str(&format!(
            "<rect x=\"{:.1}\" y=\"{ry:.1}\" width=\"{bar_w:.1}\" height=\"{rh:.1}\" fill=\"{BAR_COLOR}\"/>\n",
            x_mid(i) - bar_w / 2.0
        ));
        out.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"10\">{}</text>\n",
            x_mid(i),
            ry - 3.0,
            fmt_thousands(*v)
        ));
    }
    for (i, l) in spec.labels.iter().enumerate() {
        let (lx, ly) = (x_mid(i), TOP + plot_h + 14.0);
        out.push_str(&format!(
            "<text x=\"{lx:.1}\" y=\"{ly:.1}\" text-anchor=\"end\" font-size=\"10\" transform=\"rotate(-45 {lx:.1} {ly:.1})\">{}</text>\n",
            html_escape(l)
        ));
    }

    out.push_str(&polyline(&spec.cumulative, &y, &x_mid, "black", None));
    if let Some(last) = spec.cumulative.last() {
        let i = spec.cumulative.len() - 1;
        out.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\">{}</text>\n",
            x_mid(i) + 6.0,
            y(f(*last)) + 4.0,
            fmt_millions(*last)
        ));
    }
    if let Some(base) = &spec.baseline {
        out.push_str(&polyline(base, &y, &x_mid, BASELINE_COLOR, Some("6,4")));
        if let Some(last) = base.last() {
            let i = base.len() - 1;
            out.push_str(&format!(
                "<text x=\"{:.1}\" y=\"{:.1}\" fill=\"{BASELINE_COLOR}\">{}</text>\n",
                x_mid(i) + 6.0,
                y(f(*last)) + 4.0,
                fmt_millions(*last)
            ));
        }
    }

    out.push_str(&legend(spec));
    out.push_str("</svg>\n");
    out
}

fn polyline(
    series: &[Decimal],
    y: &dyn Fn(f64) -> f64,
    x: &dyn Fn(usize) -> f64,
    color: &str,
    dash: Option<&str>,
) -> String {
    if series.is_empty() {
        return String::new();
    }
    let pts: Vec<String> = series
        .iter()
        .enumerate()
        .map(|(i, v)| format!("{:.1},{:.1}", x(i), y(f(*v))))
        .collect();
    let dash_attr = dash
        .map(|d| format!(" stroke-dasharray=\"{}\"", d))
        .unwrap_or_default();
    format!(
        "<polyline points=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\"{}/>\n",
        pts.join(" "),
        color,
        dash_attr
    )
}

fn legend(spec: &ChartSpec<'_>) -> String {
    let mut items = vec![
        (spec.bar_label, BAR_COLOR, false),
        (spec.line_label, "black", false),
    ];
    if let (Some(label), Some(_)) = (spec.baseline_label, &spec.baseline) {
        items.push((label, BASELINE_COLOR, true));
    }
    let mut out = String::new();
    for (i, (label, color, dashed)) in items.into_iter().enumerate() {
        let ly = TOP + 8.0 + 18.0 * i as f64;
        let lx = LEFT + 10.0;
        let dash = if dashed { " stroke-dasharray=\"6,4\"" } else { "" };
        out.push_str(&format!(
            "<line x1=\"{lx:.1}\" y1=\"{ly:.1}\" x2=\"{:.1}\" y2=\"{ly:.1}\" stroke=\"{color}\" stroke-width=\"3\"{dash}/>\n\
             <text x=\"{:.1}\" y=\"{:.1}\">{}</text>\n",
            lx + 24.0,
            lx + 30.0,
            ly + 4.0,
            html_escape(label)
        ));
    }
    out
}
