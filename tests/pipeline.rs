//! End-to-end pipeline tests: CSV in, structured payload and spreadsheet out.

use chrono::{Duration, NaiveDate};
use ventas_forecast::analytics;
use ventas_forecast::export::{read_forecast_csv, write_forecast_csv};
use ventas_forecast::prelude::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Eight weeks of synthetic sales with a weekly rhythm, two customers, and a
/// few silent days.
fn sales_csv() -> String {
    let start = date(2024, 1, 1);
    let mut csv = String::from("issue_date,amount,customer_id,customer_name\n");
    for i in 0..56u32 {
        let day = start + Duration::days(i as i64);
        // Sundays go quiet; weekdays alternate between the two customers.
        if i % 7 == 6 {
            continue;
        }
        let amount = 250.0
            + 3.0 * i as f64
            + 60.0 * (2.0 * std::f64::consts::PI * i as f64 / 7.0).sin();
        let (id, name) = if i % 2 == 0 {
            ("C001", "ACME SA")
        } else {
            ("C002", "Beta SRL")
        };
        csv.push_str(&format!("{day},{amount:.2},{id},{name}\n"));
    }
    csv
}

#[test]
fn csv_to_payload_to_spreadsheet() {
    let transactions = ventas_forecast::core::read_transactions(sales_csv().as_bytes()).unwrap();

    let mut pipeline = Pipeline::new();
    let config = PipelineConfig::new().with_horizon(14).with_seasonal_period(7);
    let output = pipeline.run(&transactions, &config).unwrap();

    // History spans the full calendar range, gap-free.
    let first = output.historico.first().unwrap().date;
    let last = output.historico.last().unwrap().date;
    assert_eq!(
        output.historico.len() as i64,
        (last - first).num_days() + 1
    );
    assert!(output.historico.iter().all(|p| p.sales.is_finite()));

    // Forecast: exactly 14 consecutive dated rows after the last history day.
    assert_eq!(output.forecast.len(), 14);
    assert_eq!(output.forecast.rows()[0].date, last + Duration::days(1));

    // Spreadsheet round trip preserves the (date, prediction) pairs.
    let mut buffer = Vec::new();
    write_forecast_csv(&output.forecast, &mut buffer).unwrap();
    let imported = read_forecast_csv(buffer.as_slice()).unwrap();
    for (exported, back) in output.forecast.iter().zip(imported.iter()) {
        assert_eq!(exported.date, back.date);
        assert_eq!(exported.prediction, back.prediction);
    }
}

#[test]
fn payload_contract_keys_and_error_shape() {
    let transactions = ventas_forecast::core::read_transactions(sales_csv().as_bytes()).unwrap();
    let mut pipeline = Pipeline::new();

    let ok = pipeline.run_to_payload(&transactions, &PipelineConfig::new().with_horizon(7));
    assert!(ok["historico"].is_array());
    assert!(ok["forecast"].is_array());
    assert!(ok["forecast"][0]["lower"].is_number());
    assert!(ok["forecast"][0]["upper"].is_number());

    let err = pipeline.run_to_payload(&[], &PipelineConfig::new());
    assert_eq!(err["error"]["kind"], "empty_input");
}

#[test]
fn selection_is_idempotent_across_calls() {
    let transactions = ventas_forecast::core::read_transactions(sales_csv().as_bytes()).unwrap();
    let series = SeriesBuilder::new().build(&transactions).unwrap();
    let config = SelectorConfig::new().with_seasonal_period(7);

    let first = select_model(&series, &config).unwrap();
    let second = select_model(&series, &config).unwrap();
    assert_eq!(first.spec, second.spec);
    assert_eq!(first.rmse, second.rmse);
}

#[test]
fn imputation_replaces_zero_day_with_trailing_mean() {
    // [10, 0, 20, 10, 0, 10, 30]: the zero on day 2 becomes the mean of day 1.
    let start = date(2024, 1, 1);
    let amounts = [10.0, 0.0, 20.0, 10.0, 0.0, 10.0, 30.0];
    let transactions: Vec<Transaction> = amounts
        .iter()
        .enumerate()
        .map(|(i, &a)| Transaction::new(start + Duration::days(i as i64), a))
        .collect();

    let series = SeriesBuilder::new().build(&transactions).unwrap();
    assert_eq!(series.len(), 7);
    assert_eq!(series.values()[1], 10.0);
}

#[test]
fn no_viable_candidate_yields_model_selection_error() {
    // Constant-zero week under an order requiring seasonal differencing.
    let start = date(2024, 1, 1);
    let transactions: Vec<Transaction> = (0..7)
        .map(|i| Transaction::new(start + Duration::days(i), 0.0))
        .collect();
    let series = SeriesBuilder::new().build(&transactions).unwrap();

    let config = SelectorConfig::new()
        .with_seasonal_period(7)
        .with_strategy(SearchStrategy::FixedOrder(SarimaSpec::new(
            0, 0, 0, 0, 1, 0, 7,
        )));
    assert!(matches!(
        select_model(&series, &config),
        Err(ForecastError::ModelSelection { tried: 1 })
    ));
}

#[test]
fn horizon_bounds_are_enforced_at_the_boundary() {
    let transactions = ventas_forecast::core::read_transactions(sales_csv().as_bytes()).unwrap();
    let mut pipeline = Pipeline::new();

    let payload = pipeline.run_to_payload(&transactions, &PipelineConfig::new().with_horizon(0));
    assert_eq!(payload["error"]["kind"], "invalid_horizon");
}

#[test]
fn analytics_run_off_raw_records_independently() {
    let transactions = ventas_forecast::core::read_transactions(sales_csv().as_bytes()).unwrap();

    let summary = analytics::summarize(&transactions);
    assert_eq!(summary.distinct_customers, 2);
    assert!(summary.average_ticket > 0.0);

    let top = analytics::top_customers(&transactions, 1);
    assert_eq!(top.len(), 1);

    let history = analytics::customer_history(&transactions, &top[0].customer_id);
    assert!(!history.is_empty());
    assert!(history.windows(2).all(|w| w[0].issue_date <= w[1].issue_date));

    let monthly = analytics::monthly_totals(&transactions, &top[0].customer_id);
    let total: f64 = monthly.iter().sum();
    assert!((total - top[0].total_sales).abs() < 1e-9);
}

#[test]
fn schema_violation_surfaces_before_any_modeling() {
    let bad = "fecha,importe\n2024-01-01,10.0\n";
    let err = ventas_forecast::core::read_transactions(bad.as_bytes()).unwrap_err();
    assert!(matches!(err, ForecastError::Schema(_)));
}
