// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

pub const TOTAL: &str = "Total";
pub const DATE: &str = "Date";
pub const UNLISTED: &str = "Unlisted";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub effective_date: NaiveDate,
    pub category: String,
    pub amount: Decimal,
}

impl Transaction {
    pub fn new(effective_date: NaiveDate, category: impl Into<String>, amount: Decimal) -> Self {
        Self {
            effective_date,
            category: category.into(),
            amount,
        }
    }
}

/// A budget figure or prior-year actual for one month and category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineRow {
    pub month: YearMonth,
    pub category: String,
    pub amount: Decimal,
}

/// Calendar month. Displays zero-padded (`2024-09`) so string order and
/// chronological order agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        // month is validated on construction
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next().first_day().pred_opt().unwrap_or(NaiveDate::MAX)
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn with_year(&self, year: i32) -> Self {
        Self {
            year,
            month: self.month,
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let d = NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
            .map_err(|_| anyhow::anyhow!("Invalid month '{}', expected YYYY-MM", s))?;
        Ok(Self::of(d))
    }
}

impl Serialize for YearMonth {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PeriodKey {
    Day(NaiveDate),
    Month(YearMonth),
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodKey::Day(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            PeriodKey::Month(m) => write!(f, "{}", m),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLabel {
    Period(PeriodKey),
    Total,
}

impl fmt::Display for RowLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowLabel::Period(p) => write!(f, "{}", p),
            RowLabel::Total => f.write_str(TOTAL),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub label: RowLabel,
    /// One value per column, in `SummaryTable::columns` order.
    pub values: Vec<Decimal>,
    pub total: Decimal,
}

impl SummaryRow {
    pub fn is_total(&self) -> bool {
        self.label == RowLabel::Total
    }
}

/// Period rows ascending, then one trailing `Total` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryTable {
    pub columns: Vec<String>,
    pub rows: Vec<SummaryRow>,
}

impl SummaryTable {
    pub fn headers(&self) -> Vec<String> {
        let mut h = Vec::with_capacity(self.columns.len() + 2);
        h.push(DATE.to_string());
        h.extend(self.columns.iter().cloned());
        h.push(TOTAL.to_string());
        h
    }

    pub fn period_rows(&self) -> &[SummaryRow] {
        match self.rows.split_last() {
            Some((last, rest)) if last.is_total() => rest,
            _ => &self.rows,
        }
    }

    pub fn total_row(&self) -> Option<&SummaryRow> {
        self.rows.last().filter(|r| r.is_total())
    }

    pub fn value(&self, row: usize, column: &str) -> Option<Decimal> {
        let r = self.rows.get(row)?;
        if column == TOTAL {
            return Some(r.total);
        }
        let idx = self.columns.iter().position(|c| c == column)?;
        r.values.get(idx).copied()
    }

    /// Category totals taken from the trailing Total row.
    pub fn column_totals(&self) -> Vec<(String, Decimal)> {
        match self.total_row() {
            Some(t) => self
                .columns
                .iter()
                .cloned()
                .zip(t.values.iter().copied())
                .collect(),
            None => self
                .columns
                .iter()
                .map(|c| (c.clone(), Decimal::ZERO))
                .collect(),
        }
    }

    pub fn running_totals(&self) -> Vec<Decimal> {
        let mut acc = Decimal::ZERO;
        self.period_rows()
            .iter()
            .map(|r| {
                acc += r.total;
                acc
            })
            .collect()
    }

    pub fn to_records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|r| {
                let mut m = Map::new();
                m.insert(DATE.into(), Value::String(r.label.to_string()));
                for (c, v) in self.columns.iter().zip(&r.values) {
                    m.insert(c.clone(), Value::String(v.to_string()));
                }
                m.insert(TOTAL.into(), Value::String(r.total.to_string()));
                m
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VarianceKind {
    Actual,
    Baseline,
    Variance,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarianceRow {
    pub kind: VarianceKind,
    pub values: Vec<Decimal>,
    pub total: Decimal,
}

/// Actual, Baseline and Variance rows over the same columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarianceBlock {
    pub columns: Vec<String>,
    pub rows: [VarianceRow; 3],
}

impl VarianceBlock {
    pub fn actual(&self) -> &VarianceRow {
        &self.rows[0]
    }

    pub fn baseline(&self) -> &VarianceRow {
        &self.rows[1]
    }

    pub fn variance(&self) -> &VarianceRow {
        &self.rows[2]
    }

    pub fn get(&self, kind: VarianceKind, column: &str) -> Option<Decimal> {
        let row = self.rows.iter().find(|r| r.kind == kind)?;
        if column == TOTAL {
            return Some(row.total);
        }
        let idx = self.columns.iter().position(|c| c == column)?;
        row.values.get(idx).copied()
    }

    pub fn to_records(&self, baseline: BaselineKind) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|r| {
                let mut m = Map::new();
                m.insert("Type".into(), Value::String(baseline.row_label(r.kind).into()));
                for (c, v) in self.columns.iter().zip(&r.values) {
                    m.insert(c.clone(), Value::String(v.to_string()));
                }
                m.insert(TOTAL.into(), Value::String(r.total.to_string()));
                m
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BaselineKind {
    #[default]
    PriorYear,
    Budget,
    None,
}

impl BaselineKind {
    pub fn row_label(&self, kind: VarianceKind) -> &'static str {
        match (self, kind) {
            (BaselineKind::PriorYear, VarianceKind::Actual) => "Current Year",
            (BaselineKind::PriorYear, VarianceKind::Baseline) => "Prior Year",
            (_, VarianceKind::Actual) => "Actual",
            (_, VarianceKind::Baseline) => "Budget",
            (_, VarianceKind::Variance) => "Variance",
        }
    }

    pub fn caption(&self) -> &'static str {
        match self {
            BaselineKind::PriorYear => "Prior Year",
            BaselineKind::Budget => "Budget",
            BaselineKind::None => "",
        }
    }
}

impl FromStr for BaselineKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prior-year" | "prior_year" | "prioryear" => Ok(BaselineKind::PriorYear),
            "budget" => Ok(BaselineKind::Budget),
            "none" | "off" => Ok(BaselineKind::None),
            other => Err(anyhow::anyhow!(
                "Unknown baseline '{}' (use prior-year|budget|none)",
                other
            )),
        }
    }
}

/// What happens to categories that are not in the configured list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnlistedPolicy {
    /// Excluded from every column and from Total.
    #[default]
    Drop,
    /// Collected into a trailing `Unlisted` column that counts toward Total.
    Column,
}
