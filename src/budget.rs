use crate::models::{BudgetAnalytics, BudgetRecord, Period, TimeSeries};
use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// The `expenses` category treated as savings rather than spend.
const SAVINGS_CATEGORY: &str = "savings";

impl Period {
    /// Whole months before the current one that the window reaches
    /// back; "last 3 months" is the current month plus two prior.
    fn months_back(self) -> u32 {
        match self {
            Period::ThreeMonths => 2,
            Period::SixMonths => 5,
            Period::OneYear => 11,
            Period::ThreeYears => 35,
        }
    }
}

/// First day of the month `period.months_back()` months before `now`'s
/// month.
pub fn period_start(period: Period, now: DateTime<Utc>) -> NaiveDate {
    let today = now.date_naive();
    let months = today.year() * 12 + today.month0() as i32 - period.months_back() as i32;
    let year = months.div_euclid(12);
    let month0 = months.rem_euclid(12) as u32;
    // First of a valid month, construction cannot fail.
    NaiveDate::from_ymd_opt(year, month0 + 1, 1).unwrap_or(today)
}

fn expense_sum(record: &BudgetRecord) -> f64 {
    record
        .expenses
        .iter()
        .filter(|(category, _)| category.as_str() != SAVINGS_CATEGORY)
        .map(|(_, value)| value)
        .sum()
}

fn savings_value(record: &BudgetRecord) -> f64 {
    record.expenses.get(SAVINGS_CATEGORY).copied().unwrap_or(0.0)
}

/// Chart-ready view of a user's budget history.
///
/// The time series keeps records with a timestamp on or after the
/// period start, in their original order. The current-month breakdown
/// is independent of the period filter: it reflects only the latest
/// record inside the current calendar month (last record wins), with
/// zero-valued categories dropped. Empty input is a valid empty result.
pub fn aggregate(records: &[BudgetRecord], period: Period, now: DateTime<Utc>) -> BudgetAnalytics {
    let start = period_start(period, now);
    let mut time_series = TimeSeries::default();
    for record in records {
        if record.timestamp.date_naive() < start {
            continue;
        }
        time_series
            .labels
            .push(record.timestamp.date_naive().to_string());
        time_series.income.push(record.income);
        time_series.expenses.push(expense_sum(record));
        time_series.savings.push(savings_value(record));
    }

    let today = now.date_naive();
    let current_month_breakdown = records
        .iter()
        .filter(|record| {
            let date = record.timestamp.date_naive();
            date.year() == today.year() && date.month() == today.month()
        })
        .next_back()
        .map(|record| {
            record
                .expenses
                .iter()
                .filter(|&(_, &value)| value != 0.0)
                .map(|(category, &value)| (category.clone(), value))
                .collect()
        })
        .unwrap_or_default();

    BudgetAnalytics {
        time_series,
        current_month_breakdown,
    }
}
