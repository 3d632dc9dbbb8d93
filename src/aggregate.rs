// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Revenue roll-ups: daily and monthly category pivots with row and column
//! totals, and the Actual/Baseline/Variance comparison.
//!
//! Everything here is a pure function of its arguments. Categories, policies
//! and windows come in as parameters; nothing reads the clock or environment.

use crate::models::{
    BaselineRow, PeriodKey, RowLabel, SummaryRow, SummaryTable, Transaction, UNLISTED,
    UnlistedPolicy, VarianceBlock, VarianceKind, VarianceRow, YearMonth,
};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

pub type CategoryTotals = BTreeMap<String, Decimal>;

/// Daily pivot for `[month_start, month_end]`, unlisted categories dropped.
pub fn aggregate_daily(
    transactions: &[Transaction],
    categories: &[String],
    month_start: NaiveDate,
    month_end: NaiveDate,
) -> SummaryTable {
    Aggregation::new(categories).daily(transactions, month_start, month_end)
}

/// Monthly pivot for all twelve months of `year`.
pub fn aggregate_monthly(
    transactions: &[Transaction],
    categories: &[String],
    year: i32,
) -> SummaryTable {
    aggregate_monthly_through(transactions, categories, year, 12)
}

/// Monthly pivot for January through `last_month` of `year`.
pub fn aggregate_monthly_through(
    transactions: &[Transaction],
    categories: &[String],
    year: i32,
    last_month: u32,
) -> SummaryTable {
    Aggregation::new(categories).monthly_through(transactions, year, last_month)
}

/// Compare two category total rows over `categories`.
///
/// Categories missing from either side count as zero; keys outside
/// `categories` are ignored. `Variance = Actual - Baseline` for every column
/// and for Total.
pub fn variance(
    actual: &CategoryTotals,
    baseline: &CategoryTotals,
    categories: &[String],
) -> VarianceBlock {
    let pick = |m: &CategoryTotals| -> Vec<Decimal> {
        categories
            .iter()
            .map(|c| m.get(c).copied().unwrap_or(Decimal::ZERO))
            .collect()
    };
    let a = pick(actual);
    let b = pick(baseline);
    let v: Vec<Decimal> = a.iter().zip(&b).map(|(x, y)| *x - *y).collect();
    let row = |kind, values: Vec<Decimal>| {
        let total = values.iter().sum();
        VarianceRow {
            kind,
            values,
            total,
        }
    };
    VarianceBlock {
        columns: categories.to_vec(),
        rows: [
            row(VarianceKind::Actual, a),
            row(VarianceKind::Baseline, b),
            row(VarianceKind::Variance, v),
        ],
    }
}

/// Last year's actuals grouped by month, re-keyed onto the same month of `year`.
pub fn prior_year_baseline(transactions: &[Transaction], year: i32) -> Vec<BaselineRow> {
    let mut agg: BTreeMap<(YearMonth, String), Decimal> = BTreeMap::new();
    for t in transactions.iter().filter(|t| t.effective_date.year() == year - 1) {
        let key = (YearMonth::of(t.effective_date).with_year(year), t.category.clone());
        *agg.entry(key).or_insert(Decimal::ZERO) += t.amount;
    }
    agg.into_iter()
        .map(|((month, category), amount)| BaselineRow {
            month,
            category,
            amount,
        })
        .collect()
}

pub fn baseline_for_month(rows: &[BaselineRow], month: YearMonth) -> CategoryTotals {
    sum_by_category(rows.iter().filter(|r| r.month == month))
}

/// Baseline from January of `month`'s year through `month` inclusive.
pub fn baseline_through(rows: &[BaselineRow], month: YearMonth) -> CategoryTotals {
    sum_by_category(
        rows.iter()
            .filter(|r| r.month.year() == month.year() && r.month <= month),
    )
}

fn sum_by_category<'a>(rows: impl Iterator<Item = &'a BaselineRow>) -> CategoryTotals {
    let mut out = CategoryTotals::new();
    for r in rows {
        *out.entry(r.category.clone()).or_insert(Decimal::ZERO) += r.amount;
    }
    out
}

pub fn category_totals(table: &SummaryTable) -> CategoryTotals {
    table.column_totals().into_iter().collect()
}

/// Category list plus the policy for categories outside it.
#[derive(Debug, Clone, Copy)]
pub struct Aggregation<'a> {
    pub categories: &'a [String],
    pub unlisted: UnlistedPolicy,
}

impl<'a> Aggregation<'a> {
    pub fn new(categories: &'a [String]) -> Self {
        Self {
            categories,
            unlisted: UnlistedPolicy::Drop,
        }
    }

    pub fn with_unlisted(mut self, unlisted: UnlistedPolicy) -> Self {
        self.unlisted = unlisted;
        self
    }

    pub fn columns(&self) -> Vec<String> {
        let mut cols = self.categories.to_vec();
        if self.unlisted == UnlistedPolicy::Column {
            cols.push(UNLISTED.to_string());
        }
        cols
    }

    fn column_index(&self, category: &str) -> Option<usize> {
        match self.categories.iter().position(|c| c == category) {
            Some(i) => Some(i),
            None if self.unlisted == UnlistedPolicy::Column => Some(self.categories.len()),
            None => None,
        }
    }

    pub fn daily(
        &self,
        transactions: &[Transaction],
        month_start: NaiveDate,
        month_end: NaiveDate,
    ) -> SummaryTable {
        let periods: Vec<PeriodKey> = month_start
            .iter_days()
            .take_while(|d| *d <= month_end)
            .map(PeriodKey::Day)
            .collect();
        self.pivot(
            &periods,
            transactions
                .iter()
                .map(|t| (PeriodKey::Day(t.effective_date), t)),
        )
    }

    pub fn monthly_through(
        &self,
        transactions: &[Transaction],
        year: i32,
        last_month: u32,
    ) -> SummaryTable {
        let periods: Vec<PeriodKey> = (1..=last_month.min(12))
            .filter_map(|m| YearMonth::new(year, m))
            .map(PeriodKey::Month)
            .collect();
        self.pivot(
            &periods,
            transactions
                .iter()
                .map(|t| (PeriodKey::Month(YearMonth::of(t.effective_date)), t)),
        )
    }

    /// Fold raw category totals onto this aggregation's columns.
    pub fn project(&self, totals: &CategoryTotals) -> CategoryTotals {
        let cols = self.columns();
        let mut out: CategoryTotals = cols.iter().map(|c| (c.clone(), Decimal::ZERO)).collect();
        for (cat, amt) in totals {
            if let Some(i) = self.column_index(cat) {
                *out.entry(cols[i].clone()).or_insert(Decimal::ZERO) += *amt;
            }
        }
        out
    }

    /// Variance of a table's Total row against a baseline, both projected
    /// onto the same columns.
    pub fn variance(&self, actual: &SummaryTable, baseline: &CategoryTotals) -> VarianceBlock {
        variance(
            &category_totals(actual),
            &self.project(baseline),
            &self.columns(),
        )
    }

    /// Running baseline total per month, January through `last_month`.
    pub fn cumulative_baseline(
        &self,
        rows: &[BaselineRow],
        year: i32,
        last_month: u32,
    ) -> Vec<Decimal> {
        let mut acc = Decimal::ZERO;
        (1..=last_month.min(12))
            .filter_map(|m| YearMonth::new(year, m))
            .map(|ym| {
                acc += self.project(&baseline_for_month(rows, ym)).values().sum::<Decimal>();
                acc
            })
            .collect()
    }

    fn pivot<'t>(
        &self,
        periods: &[PeriodKey],
        keyed: impl Iterator<Item = (PeriodKey, &'t Transaction)>,
    ) -> SummaryTable {
        let columns = self.columns();
        let width = columns.len();
        let mut grid: BTreeMap<PeriodKey, Vec<Decimal>> = periods
            .iter()
            .map(|p| (*p, vec![Decimal::ZERO; width]))
            .collect();

        for (key, t) in keyed {
            let Some(cells) = grid.get_mut(&key) else {
                continue;
            };
            if let Some(i) = self.column_index(&t.category) {
                cells[i] += t.amount;
            }
        }

        let mut column_sums = vec![Decimal::ZERO; width];
        let mut rows = Vec::with_capacity(grid.len() + 1);
        for (key, values) in grid {
            for (acc, v) in column_sums.iter_mut().zip(&values) {
                *acc += *v;
            }
            rows.push(SummaryRow {
                label: RowLabel::Period(key),
                total: values.iter().sum(),
                values,
            });
        }
        rows.push(SummaryRow {
            label: RowLabel::Total,
            total: column_sums.iter().sum(),
            values: column_sums,
        });
        SummaryTable { columns, rows }
    }
}
