//! # Reports
//!
//! Pure rules behind the invoice reports:
//!
//! - **Excel filename**: built from whichever of customer, month and year
//!   the client filtered by.
//! - **Revenue**: totals and per-day / per-month buckets for the period
//!   (day, month or year) containing a reference date.
//!
//! ## Filename Rule
//! ```text
//! ┌──────────────────────┬──────────────────────────────────────────┐
//! │ customer, month, year│ filename                                 │
//! ├──────────────────────┼──────────────────────────────────────────┤
//! │ –, –, –              │ error: MissingReportCriteria             │
//! │ Jane Doe, –, –       │ invoice_report_Jane_Doe.xlsx             │
//! │ –, 5, 2024           │ invoice_report_5_2024.xlsx               │
//! │ Jane Doe, 5, 2024    │ invoice_report_Jane_Doe_5_2024.xlsx      │
//! └──────────────────────┴──────────────────────────────────────────┘
//! ```

use chrono::{Datelike, Months, NaiveDate};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::dto::{RevenueBucketDto, RevenueShowDto};
use crate::error::{CoreError, CoreResult};

// =============================================================================
// Excel Filename
// =============================================================================

const REPORT_PREFIX: &str = "invoice_report";

/// Builds the download name of an invoice Excel report.
///
/// `customer_name` is the resolved name of the filtered customer, not its id.
///
/// ## Example
/// ```rust
/// use pos_core::report::excel_report_filename;
///
/// assert_eq!(
///     excel_report_filename(None, Some(5), Some(2024)).unwrap(),
///     "invoice_report_5_2024.xlsx"
/// );
/// assert!(excel_report_filename(None, None, None).is_err());
/// ```
pub fn excel_report_filename(
    customer_name: Option<&str>,
    month: Option<u32>,
    year: Option<i32>,
) -> CoreResult<String> {
    if customer_name.is_none() && month.is_none() && year.is_none() {
        return Err(CoreError::MissingReportCriteria);
    }

    let mut name = String::from(REPORT_PREFIX);
    // A name with nothing left after sanitizing adds no segment
    if let Some(customer) = customer_name.map(filename_segment) {
        if !customer.is_empty() {
            name.push('_');
            name.push_str(&customer);
        }
    }
    if let Some(month) = month {
        name.push_str(&format!("_{month}"));
    }
    if let Some(year) = year {
        name.push_str(&format!("_{year}"));
    }
    name.push_str(".xlsx");

    Ok(name)
}

/// Collapses each whitespace run to one `_` and drops characters that would
/// break a `Content-Disposition` header or a path.
fn filename_segment(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| !matches!(c, '"' | '/' | '\\' | ';'))
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

// =============================================================================
// Revenue Period
// =============================================================================

/// Granularity of a revenue query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevenueBy {
    Day,
    Month,
    Year,
}

impl RevenueBy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RevenueBy::Day => "day",
            RevenueBy::Month => "month",
            RevenueBy::Year => "year",
        }
    }

    /// First and last day (inclusive) of the period containing `date`.
    pub fn period_bounds(&self, date: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            RevenueBy::Day => (date, date),
            RevenueBy::Month => {
                let start = date.with_day(1).unwrap_or(date);
                let end = start
                    .checked_add_months(Months::new(1))
                    .and_then(|next| next.pred_opt())
                    .unwrap_or(date);
                (start, end)
            }
            RevenueBy::Year => {
                let start = NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date);
                let end = NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date);
                (start, end)
            }
        }
    }

    /// Key of the breakdown bucket a date falls in.
    fn bucket_key(&self, date: NaiveDate) -> String {
        match self {
            RevenueBy::Day | RevenueBy::Month => date.format("%Y-%m-%d").to_string(),
            RevenueBy::Year => date.format("%Y-%m").to_string(),
        }
    }
}

impl fmt::Display for RevenueBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RevenueBy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(RevenueBy::Day),
            "month" => Ok(RevenueBy::Month),
            "year" => Ok(RevenueBy::Year),
            _ => Err(CoreError::UnknownRevenuePeriod(s.to_string())),
        }
    }
}

// =============================================================================
// Revenue Summary
// =============================================================================

/// Sums `(invoice_date, total_cents)` pairs that fall inside the period.
///
/// Pairs outside the period are ignored, so callers may pass a superset.
/// Fails with `AmountOverflow` rather than wrapping a huge total.
pub fn summarize_revenue(
    date: NaiveDate,
    revenue_by: RevenueBy,
    invoices: &[(NaiveDate, i64)],
) -> CoreResult<RevenueShowDto> {
    let overflow = || CoreError::AmountOverflow("revenue total".to_string());
    let (start, end) = revenue_by.period_bounds(date);

    let mut buckets: BTreeMap<String, (i64, i64)> = BTreeMap::new();
    let mut total = 0i64;
    let mut count = 0i64;

    for (invoice_date, total_cents) in invoices {
        if *invoice_date < start || *invoice_date > end {
            continue;
        }
        total = total.checked_add(*total_cents).ok_or_else(overflow)?;
        count += 1;

        let bucket = buckets
            .entry(revenue_by.bucket_key(*invoice_date))
            .or_insert((0, 0));
        bucket.0 = bucket.0.checked_add(*total_cents).ok_or_else(overflow)?;
        bucket.1 += 1;
    }

    Ok(RevenueShowDto {
        date,
        revenue_by: revenue_by.as_str().to_string(),
        period_start: start,
        period_end: end,
        total_revenue_cents: total,
        invoice_count: count,
        breakdown: buckets
            .into_iter()
            .map(|(period, (revenue_cents, invoice_count))| RevenueBucketDto {
                period,
                revenue_cents,
                invoice_count,
            })
            .collect(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_filename_customer_only() {
        assert_eq!(
            excel_report_filename(Some("Jane Doe"), None, None).unwrap(),
            "invoice_report_Jane_Doe.xlsx"
        );
    }

    #[test]
    fn test_filename_month_year() {
        assert_eq!(
            excel_report_filename(None, Some(5), Some(2024)).unwrap(),
            "invoice_report_5_2024.xlsx"
        );
    }

    #[test]
    fn test_filename_all_three() {
        assert_eq!(
            excel_report_filename(Some("Jane Doe"), Some(5), Some(2024)).unwrap(),
            "invoice_report_Jane_Doe_5_2024.xlsx"
        );
    }

    #[test]
    fn test_filename_single_criteria() {
        assert_eq!(
            excel_report_filename(None, Some(12), None).unwrap(),
            "invoice_report_12.xlsx"
        );
        assert_eq!(
            excel_report_filename(None, None, Some(2023)).unwrap(),
            "invoice_report_2023.xlsx"
        );
    }

    #[test]
    fn test_filename_collapses_whitespace_runs() {
        assert_eq!(
            excel_report_filename(Some("  Nguyen   Van\tA "), None, Some(2024)).unwrap(),
            "invoice_report_Nguyen_Van_A_2024.xlsx"
        );
        assert_eq!(
            excel_report_filename(Some("A \"B\"/C"), None, None).unwrap(),
            "invoice_report_A_BC.xlsx"
        );
    }

    #[test]
    fn test_filename_skips_unusable_customer_name() {
        assert_eq!(
            excel_report_filename(Some("\"/\\;"), Some(5), None).unwrap(),
            "invoice_report_5.xlsx"
        );
        assert_eq!(
            excel_report_filename(Some(" ; "), None, None).unwrap(),
            "invoice_report.xlsx"
        );
    }

    #[test]
    fn test_filename_requires_criteria() {
        let err = excel_report_filename(None, None, None).unwrap_err();
        assert!(matches!(err, CoreError::MissingReportCriteria));
    }

    #[test]
    fn test_revenue_by_parse() {
        assert_eq!("DAY".parse::<RevenueBy>().unwrap(), RevenueBy::Day);
        assert_eq!(" month ".parse::<RevenueBy>().unwrap(), RevenueBy::Month);
        assert!(matches!(
            "week".parse::<RevenueBy>(),
            Err(CoreError::UnknownRevenuePeriod(_))
        ));
    }

    #[test]
    fn test_period_bounds() {
        assert_eq!(
            RevenueBy::Month.period_bounds(d(2024, 2, 17)),
            (d(2024, 2, 1), d(2024, 2, 29))
        );
        assert_eq!(
            RevenueBy::Month.period_bounds(d(2023, 12, 5)),
            (d(2023, 12, 1), d(2023, 12, 31))
        );
        assert_eq!(
            RevenueBy::Year.period_bounds(d(2024, 7, 4)),
            (d(2024, 1, 1), d(2024, 12, 31))
        );
        assert_eq!(
            RevenueBy::Day.period_bounds(d(2024, 7, 4)),
            (d(2024, 7, 4), d(2024, 7, 4))
        );
    }

    #[test]
    fn test_month_breakdown_by_day() {
        let invoices = vec![
            (d(2024, 5, 1), 1000),
            (d(2024, 5, 1), 500),
            (d(2024, 5, 20), 250),
            (d(2024, 6, 1), 9999),
        ];
        let summary = summarize_revenue(d(2024, 5, 10), RevenueBy::Month, &invoices).unwrap();

        assert_eq!(summary.total_revenue_cents, 1750);
        assert_eq!(summary.invoice_count, 3);
        assert_eq!(summary.breakdown.len(), 2);
        assert_eq!(summary.breakdown[0].period, "2024-05-01");
        assert_eq!(summary.breakdown[0].revenue_cents, 1500);
        assert_eq!(summary.breakdown[0].invoice_count, 2);
        assert_eq!(summary.breakdown[1].period, "2024-05-20");
    }

    #[test]
    fn test_year_breakdown_by_month() {
        let invoices = vec![
            (d(2024, 1, 3), 100),
            (d(2024, 1, 30), 200),
            (d(2024, 11, 2), 300),
            (d(2023, 12, 31), 400),
        ];
        let summary = summarize_revenue(d(2024, 6, 1), RevenueBy::Year, &invoices).unwrap();

        assert_eq!(summary.total_revenue_cents, 600);
        assert_eq!(summary.revenue_by, "year");
        let periods: Vec<_> = summary.breakdown.iter().map(|b| b.period.as_str()).collect();
        assert_eq!(periods, vec!["2024-01", "2024-11"]);
        assert_eq!(summary.breakdown[0].revenue_cents, 300);
    }

    #[test]
    fn test_day_with_no_invoices() {
        let summary = summarize_revenue(d(2024, 6, 1), RevenueBy::Day, &[]).unwrap();
        assert_eq!(summary.total_revenue_cents, 0);
        assert_eq!(summary.invoice_count, 0);
        assert!(summary.breakdown.is_empty());
    }

    #[test]
    fn test_revenue_overflow_is_an_error() {
        let invoices = vec![(d(2024, 5, 1), i64::MAX), (d(2024, 5, 2), 1)];
        assert!(matches!(
            summarize_revenue(d(2024, 5, 1), RevenueBy::Month, &invoices),
            Err(CoreError::AmountOverflow(_))
        ));
    }
}
