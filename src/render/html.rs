// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Styled HTML tables for the report email.
//!
//! Styles are inlined on every cell; most mail clients drop `<style>` blocks.

use super::render_template;
use crate::error::TemplateError;
use crate::format::fmt_currency;
use crate::models::{BaselineKind, SummaryTable, VarianceBlock};
use serde_json::{Value, json};

const FONT: &str = "font-family: Century Gothic, sans-serif; font-size: 14px;";
const ACCENT: &str = "#305496";
const BAND: &str = "#D9E1F2";

fn cell_style(row: usize, col: usize, rows: usize, cols: usize) -> String {
    let mut s = format!("{FONT} text-align: left; padding: 3px 20px 3px 5px;");
    if row % 2 == 0 {
        s.push_str(&format!(" background-color: {BAND};"));
    } else {
        s.push_str(" background-color: white; color: black;");
    }
    if col == 0 {
        s.push_str(&format!(" border-right: 2px solid {ACCENT};"));
    }
    if col + 1 == cols {
        s.push_str(&format!(" font-weight: bold; border-left: 2px solid {ACCENT};"));
    }
    if row + 1 == rows {
        s.push_str(&format!(" font-weight: bold; border-top: 2px solid {ACCENT};"));
    }
    s
}

fn header_style(col: usize, cols: usize) -> String {
    let color = if col + 1 == cols { "black" } else { ACCENT };
    format!(
        "{FONT} background-color: #FFFFFF; color: {color}; \
         border-bottom: 2px solid {ACCENT}; text-align: left; padding: 0px 20px 0px 5px;"
    )
}

const TABLE: &str = r#"<table style="border-spacing: 0; border-collapse: separate;">
<caption style="font-weight: bold; font-size: 18px; font-family: Century Gothic, sans-serif; padding: 0px 0px 5px 0px; text-align: left;">{{caption}}</caption>
<thead><tr>{{#each headers}}<th style="{{style}}">{{text}}</th>{{/each}}</tr></thead>
<tbody>
{{#each rows}}<tr>{{#each this}}<td style="{{style}}">{{text}}</td>{{/each}}</tr>
{{/each}}</tbody>
</table>
"#;

const PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>{{title}}</title>
</head>
<body>
{{{fragment}}}</body>
</html>
"#;

/// A captioned table; the first column is the row label, the last row and
/// last column are rendered as totals.
pub fn styled_table(
    caption: &str,
    headers: &[String],
    rows: &[Vec<String>],
) -> Result<String, TemplateError> {
    let cols = headers.len();
    let headers: Vec<Value> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| json!({ "text": h, "style": header_style(i, cols) }))
        .collect();
    let body: Vec<Vec<Value>> = rows
        .iter()
        .enumerate()
        .map(|(r, row)| {
            row.iter()
                .enumerate()
                .map(|(c, v)| json!({ "text": v, "style": cell_style(r, c, rows.len(), cols) }))
                .collect()
        })
        .collect();
    render_template(
        TABLE,
        &json!({ "caption": caption, "headers": headers, "rows": body }),
    )
}

pub fn summary_rows(table: &SummaryTable) -> Vec<Vec<String>> {
    table
        .rows
        .iter()
        .map(|r| {
            let mut cells = Vec::with_capacity(r.values.len() + 2);
            cells.push(r.label.to_string());
            cells.extend(r.values.iter().map(|v| fmt_currency(*v)));
            cells.push(fmt_currency(r.total));
            cells
        })
        .collect()
}

pub fn variance_rows(block: &VarianceBlock, baseline: BaselineKind) -> Vec<Vec<String>> {
    block
        .rows
        .iter()
        .map(|r| {
            let mut cells = Vec::with_capacity(r.values.len() + 2);
            cells.push(baseline.row_label(r.kind).to_string());
            cells.extend(r.values.iter().map(|v| fmt_currency(*v)));
            cells.push(fmt_currency(r.total));
            cells
        })
        .collect()
}

pub fn variance_headers(block: &VarianceBlock) -> Vec<String> {
    let mut h = vec!["Type".to_string()];
    h.extend(block.columns.iter().cloned());
    h.push(crate::models::TOTAL.to_string());
    h
}

pub fn summary_table(caption: &str, table: &SummaryTable) -> Result<String, TemplateError> {
    styled_table(caption, &table.headers(), &summary_rows(table))
}

pub fn variance_table(
    caption: &str,
    block: &VarianceBlock,
    baseline: BaselineKind,
) -> Result<String, TemplateError> {
    styled_table(
        caption,
        &variance_headers(block),
        &variance_rows(block, baseline),
    )
}

/// Standalone page around a rendered fragment, for writing artifacts to disk.
pub fn page(title: &str, fragment: &str) -> Result<String, TemplateError> {
    render_template(PAGE, &json!({ "title": title, "fragment": fragment }))
}
