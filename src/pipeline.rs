// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregate::{Aggregation, baseline_for_month, baseline_through, prior_year_baseline};
use crate::config::ReportConfig;
use crate::db::RevenueSource;
use crate::error::TemplateError;
use crate::models::{
    BaselineKind, BaselineRow, PeriodKey, RowLabel, SummaryTable, Transaction, VarianceBlock,
    YearMonth,
};
use crate::render::chart::{ChartSpec, bar_chart};
use crate::render::html;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Dates a run covers, derived from the run clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    pub as_of: NaiveDate,
    /// Last complete day: the day before `as_of`.
    pub report_date: NaiveDate,
    pub month_start: NaiveDate,
    pub month: YearMonth,
}

impl ReportWindow {
    pub fn for_run(as_of: NaiveDate) -> Self {
        let report_date = as_of.pred_opt().unwrap_or(as_of);
        let month = YearMonth::of(report_date);
        Self {
            as_of,
            report_date,
            month_start: month.first_day(),
            month,
        }
    }

    pub fn year(&self) -> i32 {
        self.month.year()
    }

    /// First date that has to be read: January 1st, one year earlier when the
    /// prior year is the baseline.
    pub fn fetch_from(&self, baseline: BaselineKind) -> NaiveDate {
        let year = match baseline {
            BaselineKind::PriorYear => self.year() - 1,
            _ => self.year(),
        };
        NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(self.month_start)
    }
}

#[derive(Debug, Clone)]
pub struct Report {
    pub window: ReportWindow,
    pub baseline: BaselineKind,
    pub daily: SummaryTable,
    pub monthly: SummaryTable,
    pub mtd: Option<VarianceBlock>,
    pub ytd: Option<VarianceBlock>,
    /// Running baseline per month, for the monthly chart.
    pub ytd_baseline_cumulative: Option<Vec<Decimal>>,
}

pub fn load_baseline(
    source: &dyn RevenueSource,
    kind: BaselineKind,
    transactions: &[Transaction],
    year: i32,
) -> Result<Vec<BaselineRow>> {
    Ok(match kind {
        BaselineKind::PriorYear => prior_year_baseline(transactions, year),
        BaselineKind::Budget => source.budget(year).context("Read budget")?,
        BaselineKind::None => Vec::new(),
    })
}

pub fn build_report(
    source: &dyn RevenueSource,
    cfg: &ReportConfig,
    as_of: NaiveDate,
) -> Result<Report> {
    cfg.validate()?;
    let window = ReportWindow::for_run(as_of);
    let agg = Aggregation::new(&cfg.categories).with_unlisted(cfg.unlisted);

    info!(from = %window.fetch_from(cfg.baseline), to = %window.report_date, "get actuals data");
    let transactions = source
        .transactions(window.fetch_from(cfg.baseline), window.report_date)
        .context("Read revenue from warehouse")?;

    info!(baseline = ?cfg.baseline, "get baseline data");
    let baseline_rows = load_baseline(source, cfg.baseline, &transactions, window.year())?;

    info!("daily data");
    let daily = agg.daily(&transactions, window.month_start, window.report_date);

    info!("monthly data");
    let monthly = agg.monthly_through(&transactions, window.year(), window.month.month());

    let (mtd, ytd, ytd_baseline_cumulative) = if cfg.baseline == BaselineKind::None {
        (None, None, None)
    } else {
        info!("variance against baseline");
        (
            Some(agg.variance(&daily, &baseline_for_month(&baseline_rows, window.month))),
            Some(agg.variance(&monthly, &baseline_through(&baseline_rows, window.month))),
            Some(agg.cumulative_baseline(&baseline_rows, window.year(), window.month.month())),
        )
    };

    Ok(Report {
        window,
        baseline: cfg.baseline,
        daily,
        monthly,
        mtd,
        ytd,
        ytd_baseline_cumulative,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Table,
    Chart,
}

#[derive(Debug, Clone)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub caption: String,
    pub file_name: String,
    pub content: String,
}

impl Artifact {
    fn table(file_name: &str, caption: String, content: String) -> Self {
        Self {
            kind: ArtifactKind::Table,
            caption,
            file_name: file_name.to_string(),
            content,
        }
    }

    fn chart(file_name: &str, caption: &str, content: String) -> Self {
        Self {
            kind: ArtifactKind::Chart,
            caption: caption.to_string(),
            file_name: file_name.to_string(),
            content,
        }
    }
}

/// Charts and tables in mail order: daily chart, MTD comparison, daily
/// table, monthly chart, YTD comparison, monthly table.
pub fn render_artifacts(report: &Report) -> Result<Vec<Artifact>, TemplateError> {
    let versus = report.baseline.caption();
    let baseline_label = (report.baseline != BaselineKind::None).then_some(versus);
    let mut out = Vec::new();

    let daily_rows = report.daily.period_rows();
    let mtd_baseline_total = report.mtd.as_ref().map(|b| b.baseline().total);
    let daily_chart = ChartSpec {
        title: "Current Month Cash",
        x_label: "Day",
        bar_label: "Daily Total",
        line_label: "MTD Total",
        baseline_label,
        labels: daily_rows
            .iter()
            .map(|r| match r.label {
                RowLabel::Period(PeriodKey::Day(d)) => d.format("%m-%d").to_string(),
                other => other.to_string(),
            })
            .collect(),
        bars: daily_rows.iter().map(|r| r.total).collect(),
        cumulative: report.daily.running_totals(),
        baseline: mtd_baseline_total.map(|t| vec![t; daily_rows.len()]),
    };
    out.push(Artifact::chart("day_chart.svg", daily_chart.title, bar_chart(&daily_chart)));

    if let Some(mtd) = &report.mtd {
        let caption = format!("Current Month Cash by Product vs {}", versus);
        out.push(Artifact::table(
            "mtd_variance_table.html",
            caption.clone(),
            html::variance_table(&caption, mtd, report.baseline)?,
        ));
    }

    let caption = "Current Month Cash by Product by Day".to_string();
    out.push(Artifact::table(
        "day_table.html",
        caption.clone(),
        html::summary_table(&caption, &report.daily)?,
    ));

    let monthly_rows = report.monthly.period_rows();
    let monthly_chart = ChartSpec {
        title: "Cash by Month",
        x_label: "Month",
        bar_label: "Monthly Total",
        line_label: "YTD Total",
        baseline_label,
        labels: monthly_rows.iter().map(|r| r.label.to_string()).collect(),
        bars: monthly_rows.iter().map(|r| r.total).collect(),
        cumulative: report.monthly.running_totals(),
        baseline: report.ytd_baseline_cumulative.clone(),
    };
    out.push(Artifact::chart("month_chart.svg", monthly_chart.title, bar_chart(&monthly_chart)));

    if let Some(ytd) = &report.ytd {
        let caption = format!("YTD Cash by Product vs {}", versus);
        out.push(Artifact::table(
            "ytd_variance_table.html",
            caption.clone(),
            html::variance_table(&caption, ytd, report.baseline)?,
        ));
    }

    let caption = "Cash by Product by Month".to_string();
    out.push(Artifact::table(
        "month_table.html",
        caption.clone(),
        html::summary_table(&caption, &report.monthly)?,
    ));
    Ok(out)
}

/// Write each artifact under `dir`; tables are wrapped into full pages.
pub fn write_artifacts(dir: &Path, artifacts: &[Artifact]) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("Create output dir {}", dir.display()))?;
    let mut paths = Vec::with_capacity(artifacts.len());
    for a in artifacts {
        let path = dir.join(&a.file_name);
        let body = match a.kind {
            ArtifactKind::Table => html::page(&a.caption, &a.content)?,
            ArtifactKind::Chart => a.content.clone(),
        };
        fs::write(&path, body).with_context(|| format!("Write {}", path.display()))?;
        paths.push(path);
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn window_reports_through_yesterday() {
        let w = ReportWindow::for_run(d("2024-03-15"));
        assert_eq!(w.report_date, d("2024-03-14"));
        assert_eq!(w.month_start, d("2024-03-01"));
        assert_eq!(w.month.to_string(), "2024-03");
    }

    #[test]
    fn window_on_first_of_month_covers_previous_month() {
        let w = ReportWindow::for_run(d("2024-01-01"));
        assert_eq!(w.report_date, d("2023-12-31"));
        assert_eq!(w.month_start, d("2023-12-01"));
        assert_eq!(w.year(), 2023);
        assert_eq!(w.fetch_from(BaselineKind::PriorYear), d("2022-01-01"));
        assert_eq!(w.fetch_from(BaselineKind::Budget), d("2023-01-01"));
    }
}
