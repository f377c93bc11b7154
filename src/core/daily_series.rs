//! Complete daily sales series and the builder that produces it.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::core::Transaction;
use crate::error::{ForecastError, Result};

/// A gap-free daily aggregate series.
///
/// Invariants: one value per calendar day over the closed range
/// `[start_date, last_date]`, dates increasing by exactly one day, no NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl DailySeries {
    /// Build from a start date and one value per consecutive day.
    pub fn from_start(start: NaiveDate, values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(ForecastError::EmptyInput);
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::Computation(
                "daily series values must be finite".to_string(),
            ));
        }
        let dates = (0..values.len())
            .map(|i| start + Duration::days(i as i64))
            .collect();
        Ok(Self { dates, values })
    }

    /// Number of days in the series.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the series has no days (never true for a built series).
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All dates, consecutive.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// All values, aligned with `dates`.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// First day of the series.
    pub fn start_date(&self) -> NaiveDate {
        self.dates[0]
    }

    /// Last day of the series.
    pub fn last_date(&self) -> NaiveDate {
        *self.dates.last().expect("series is never empty")
    }
}

/// Builds a [`DailySeries`] from raw transactions.
///
/// Aggregation first sums amounts per day, then reindexes over the full
/// calendar range. Zero-sales days are treated as missing (configurable) and
/// missing days are filled with a trailing 7-day rolling mean over the
/// observed values; leading gaps back-fill and trailing gaps forward-fill.
#[derive(Debug, Clone)]
pub struct SeriesBuilder {
    rolling_window: usize,
    treat_zero_as_missing: bool,
}

impl Default for SeriesBuilder {
    fn default() -> Self {
        Self {
            rolling_window: 7,
            treat_zero_as_missing: true,
        }
    }
}

impl SeriesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the trailing rolling-mean window (days).
    pub fn rolling_window(mut self, days: usize) -> Self {
        self.rolling_window = days.max(1);
        self
    }

    /// Keep recorded zero-sales days as genuine zeros instead of imputing them.
    ///
    /// Most sales exports cannot distinguish a zero-sales day from an
    /// unrecorded one, so the default imputes both.
    pub fn treat_zero_as_missing(mut self, enabled: bool) -> Self {
        self.treat_zero_as_missing = enabled;
        self
    }

    /// Aggregate, reindex and impute.
    pub fn build(&self, transactions: &[Transaction]) -> Result<DailySeries> {
        if transactions.is_empty() {
            return Err(ForecastError::EmptyInput);
        }

        let mut daily_totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for tx in transactions {
            *daily_totals.entry(tx.issue_date).or_insert(0.0) += tx.amount;
        }

        let first = *daily_totals.keys().next().expect("non-empty totals");
        let last = *daily_totals.keys().next_back().expect("non-empty totals");
        let days = (last - first).num_days() as usize + 1;

        // Reindex: absent days (and, by default, zero days) become NaN.
        let mut values: Vec<f64> = (0..days)
            .map(|offset| {
                let date = first + Duration::days(offset as i64);
                match daily_totals.get(&date) {
                    Some(&total) if total == 0.0 && self.treat_zero_as_missing => f64::NAN,
                    Some(&total) => total,
                    None => f64::NAN,
                }
            })
            .collect();

        let missing_before = values.iter().filter(|v| v.is_nan()).count();
        self.impute(&mut values);
        debug!(
            days,
            imputed = missing_before,
            "built daily series from {} transactions",
            transactions.len()
        );

        DailySeries::from_start(first, values)
    }

    fn impute(&self, values: &mut [f64]) {
        // Trailing rolling mean over the observed values only: means are taken
        // from a pre-fill snapshot, so one imputed day does not feed the next
        // window.
        let window = self.rolling_window;
        let observed = values.to_vec();
        for i in 0..values.len() {
            if !values[i].is_nan() {
                continue;
            }
            let lo = i.saturating_sub(window - 1);
            let present: Vec<f64> = observed[lo..=i]
                .iter()
                .copied()
                .filter(|x| !x.is_nan())
                .collect();
            if !present.is_empty() {
                values[i] = present.iter().sum::<f64>() / present.len() as f64;
            }
        }

        // Leading gaps: carry the next available value backward.
        let mut next_valid = f64::NAN;
        for v in values.iter_mut().rev() {
            if v.is_nan() {
                *v = next_valid;
            } else {
                next_valid = *v;
            }
        }

        // Trailing gaps: carry the last available value forward.
        let mut last_valid = f64::NAN;
        for v in values.iter_mut() {
            if v.is_nan() {
                *v = last_valid;
            } else {
                last_valid = *v;
            }
        }

        // All-missing input (every recorded day zero): degenerate all-zero
        // series, accepted.
        for v in values.iter_mut() {
            if v.is_nan() {
                *v = 0.0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tx(d: NaiveDate, amount: f64) -> Transaction {
        Transaction::new(d, amount)
    }

    #[test]
    fn sums_same_day_transactions() {
        let d = date(2024, 1, 1);
        let series = SeriesBuilder::new()
            .build(&[tx(d, 10.0), tx(d, 15.0), tx(d + Duration::days(1), 5.0)])
            .unwrap();

        assert_eq!(series.len(), 2);
        assert_relative_eq!(series.values()[0], 25.0);
        assert_relative_eq!(series.values()[1], 5.0);
    }

    #[test]
    fn output_covers_full_range_without_gaps() {
        let start = date(2024, 1, 1);
        let transactions = vec![
            tx(start, 10.0),
            tx(start + Duration::days(9), 20.0), // 8-day gap
        ];
        let series = SeriesBuilder::new().build(&transactions).unwrap();

        assert_eq!(series.len(), 10);
        assert_eq!(series.start_date(), start);
        assert_eq!(series.last_date(), start + Duration::days(9));
        for w in series.dates().windows(2) {
            assert_eq!(w[1] - w[0], Duration::days(1));
        }
        assert!(series.values().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn zero_day_is_imputed_from_trailing_mean() {
        // [10, 0, 20, 10, 0, 10, 30] -> day 2 becomes the rolling mean of
        // day 1 alone.
        let start = date(2024, 1, 1);
        let amounts = [10.0, 0.0, 20.0, 10.0, 0.0, 10.0, 30.0];
        let transactions: Vec<Transaction> = amounts
            .iter()
            .enumerate()
            .map(|(i, &a)| tx(start + Duration::days(i as i64), a))
            .collect();

        let series = SeriesBuilder::new().build(&transactions).unwrap();
        assert_relative_eq!(series.values()[1], 10.0);
        // Day 5 zero: mean of observed days 1-4 within the window
        // {10, 20, 10} plus nothing else = 40/3.
        assert_relative_eq!(series.values()[4], 40.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn zeros_can_be_kept_as_zeros() {
        let start = date(2024, 1, 1);
        let transactions = vec![tx(start, 10.0), tx(start + Duration::days(1), 0.0)];
        let series = SeriesBuilder::new()
            .treat_zero_as_missing(false)
            .build(&transactions)
            .unwrap();
        assert_relative_eq!(series.values()[1], 0.0);
    }

    #[test]
    fn leading_gap_backfills_from_next_value() {
        let start = date(2024, 1, 1);
        // Day 1 is zero (missing), nothing observed before it.
        let transactions = vec![
            tx(start, 0.0),
            tx(start + Duration::days(1), 12.0),
            tx(start + Duration::days(2), 18.0),
        ];
        let series = SeriesBuilder::new().build(&transactions).unwrap();
        assert_relative_eq!(series.values()[0], 12.0);
    }

    #[test]
    fn imputed_days_do_not_feed_later_windows() {
        let start = date(2024, 1, 1);
        // Days 2 and 3 missing; day 3 must average only day 1's observed value,
        // not day 2's imputation.
        let transactions = vec![tx(start, 10.0), tx(start + Duration::days(3), 50.0)];
        let series = SeriesBuilder::new().build(&transactions).unwrap();
        assert_relative_eq!(series.values()[1], 10.0);
        assert_relative_eq!(series.values()[2], 10.0);
        assert_relative_eq!(series.values()[3], 50.0);
    }

    #[test]
    fn all_zero_input_degenerates_to_zero_series() {
        let start = date(2024, 1, 1);
        let transactions: Vec<Transaction> = (0..5)
            .map(|i| tx(start + Duration::days(i), 0.0))
            .collect();
        let series = SeriesBuilder::new().build(&transactions).unwrap();
        assert_eq!(series.len(), 5);
        assert!(series.values().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = SeriesBuilder::new().build(&[]).unwrap_err();
        assert_eq!(err, ForecastError::EmptyInput);
    }

    #[test]
    fn single_day_input_is_a_one_point_series() {
        let series = SeriesBuilder::new().build(&[tx(date(2024, 1, 1), 42.0)]).unwrap();
        assert_eq!(series.len(), 1);
        assert_relative_eq!(series.values()[0], 42.0);
    }
}
