// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::format::fmt_amount;
use crate::models::{BaselineKind, SummaryTable, VarianceBlock};
use crate::utils::pretty_table;
use comfy_table::Table;

pub fn summary(table: &SummaryTable) -> Table {
    let rows = table
        .rows
        .iter()
        .map(|r| {
            let mut cells = vec![r.label.to_string()];
            cells.extend(r.values.iter().map(|v| fmt_amount(*v)));
            cells.push(fmt_amount(r.total));
            cells
        })
        .collect();
    pretty_table(&table.headers(), rows)
}

pub fn variance(block: &VarianceBlock, baseline: BaselineKind) -> Table {
    let rows = block
        .rows
        .iter()
        .map(|r| {
            let mut cells = vec![baseline.row_label(r.kind).to_string()];
            cells.extend(r.values.iter().map(|v| fmt_amount(*v)));
            cells.push(fmt_amount(r.total));
            cells
        })
        .collect();
    pretty_table(&super::html::variance_headers(block), rows)
}
