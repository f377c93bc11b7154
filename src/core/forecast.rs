//! Forecast results: raw model output and the dated forecast table.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Point predictions with optional two-sided interval bounds.
///
/// Produced by a model; dates are attached later by [`ForecastTable`] since
/// models operate on positions, not calendars.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forecast {
    point: Vec<f64>,
    lower: Option<Vec<f64>>,
    upper: Option<Vec<f64>>,
    level: Option<f64>,
}

impl Forecast {
    /// Create a point-only forecast.
    pub fn from_points(point: Vec<f64>) -> Self {
        Self {
            point,
            lower: None,
            upper: None,
            level: None,
        }
    }

    /// Create a forecast with interval bounds at the given confidence level.
    pub fn with_intervals(point: Vec<f64>, lower: Vec<f64>, upper: Vec<f64>, level: f64) -> Self {
        debug_assert_eq!(point.len(), lower.len());
        debug_assert_eq!(point.len(), upper.len());
        Self {
            point,
            lower: Some(lower),
            upper: Some(upper),
            level: Some(level),
        }
    }

    /// Number of forecast steps.
    pub fn horizon(&self) -> usize {
        self.point.len()
    }

    pub fn is_empty(&self) -> bool {
        self.point.is_empty()
    }

    /// Point predictions.
    pub fn points(&self) -> &[f64] {
        &self.point
    }

    /// Lower interval bounds, when available.
    pub fn lower(&self) -> Option<&[f64]> {
        self.lower.as_deref()
    }

    /// Upper interval bounds, when available.
    pub fn upper(&self) -> Option<&[f64]> {
        self.upper.as_deref()
    }

    /// Confidence level of the intervals, when available.
    pub fn level(&self) -> Option<f64> {
        self.level
    }

    pub fn has_intervals(&self) -> bool {
        self.lower.is_some() && self.upper.is_some()
    }
}

/// One dated forecast record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub date: NaiveDate,
    pub prediction: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper: Option<f64>,
}

/// Dated forecast covering consecutive days after the series' last date.
///
/// Serializes transparently as an array of rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForecastTable {
    rows: Vec<ForecastRow>,
}

impl ForecastTable {
    /// Attach dates to a model forecast, starting the day after `last_date`.
    pub fn from_forecast(forecast: &Forecast, last_date: NaiveDate) -> Self {
        let rows = forecast
            .points()
            .iter()
            .enumerate()
            .map(|(h, &prediction)| ForecastRow {
                date: last_date + Duration::days(h as i64 + 1),
                prediction,
                lower: forecast.lower().map(|l| l[h]),
                upper: forecast.upper().map(|u| u[h]),
            })
            .collect();
        Self { rows }
    }

    /// Rebuild from rows (used by the spreadsheet importer).
    pub fn from_rows(rows: Vec<ForecastRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[ForecastRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ForecastRow> {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn point_only_forecast() {
        let forecast = Forecast::from_points(vec![1.0, 2.0, 3.0]);
        assert_eq!(forecast.horizon(), 3);
        assert!(!forecast.has_intervals());
        assert!(forecast.lower().is_none());
        assert!(forecast.level().is_none());
    }

    #[test]
    fn interval_forecast_carries_level() {
        let forecast =
            Forecast::with_intervals(vec![2.0, 3.0], vec![1.0, 2.0], vec![3.0, 4.0], 0.95);
        assert!(forecast.has_intervals());
        assert_eq!(forecast.lower().unwrap(), &[1.0, 2.0]);
        assert_eq!(forecast.upper().unwrap(), &[3.0, 4.0]);
        assert_eq!(forecast.level(), Some(0.95));
    }

    #[test]
    fn table_dates_start_the_day_after_last() {
        let forecast = Forecast::from_points(vec![5.0, 6.0, 7.0]);
        let table = ForecastTable::from_forecast(&forecast, date(2024, 2, 28));

        assert_eq!(table.len(), 3);
        assert_eq!(table.rows()[0].date, date(2024, 2, 29)); // leap year
        assert_eq!(table.rows()[1].date, date(2024, 3, 1));
        assert_eq!(table.rows()[2].date, date(2024, 3, 2));
        assert!(table.rows()[0].lower.is_none());
    }

    #[test]
    fn table_serializes_dates_as_iso() {
        let forecast = Forecast::with_intervals(vec![5.0], vec![4.0], vec![6.0], 0.95);
        let table = ForecastTable::from_forecast(&forecast, date(2024, 1, 31));
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json[0]["date"], "2024-02-01");
        assert_eq!(json[0]["lower"], 4.0);
    }
}
