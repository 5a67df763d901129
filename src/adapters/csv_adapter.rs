//! CSV directory data adapter.
//!
//! One file per ticker, `<base_path>/<TICKER>.csv`, with header
//! `date,open,high,low,close,adj_close,volume`.

use crate::domain::error::AnalysisError;
use crate::domain::ohlcv::Observation;
use crate::domain::price_series::PriceSeries;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }
}

fn unavailable(ticker: &str, reason: String) -> AnalysisError {
    AnalysisError::DataUnavailable {
        ticker: ticker.to_string(),
        reason,
    }
}

fn field<'r>(
    record: &'r csv::StringRecord,
    index: usize,
    name: &str,
    ticker: &str,
    line: u64,
) -> Result<&'r str, AnalysisError> {
    record
        .get(index)
        .map(str::trim)
        .ok_or_else(|| unavailable(ticker, format!("line {line}: missing {name} column")))
}

fn parse_price(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
    ticker: &str,
    line: u64,
) -> Result<f64, AnalysisError> {
    field(record, index, name, ticker, line)?
        .parse()
        .map_err(|e| unavailable(ticker, format!("line {line}: invalid {name} value: {e}")))
}

fn parse_volume(record: &csv::StringRecord, ticker: &str, line: u64) -> Result<u64, AnalysisError> {
    let raw = field(record, 6, "volume", ticker, line)?;
    if let Ok(volume) = raw.parse::<u64>() {
        return Ok(volume);
    }
    // Some exports write volume as a float ("1234.0").
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v as u64),
        _ => Err(unavailable(
            ticker,
            format!("line {line}: invalid volume value '{raw}'"),
        )),
    }
}

impl DataPort for CsvAdapter {
    fn fetch(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, AnalysisError> {
        let path = self.csv_path(ticker);
        let content = fs::read_to_string(&path)
            .map_err(|e| unavailable(ticker, format!("failed to read {}: {}", path.display(), e)))?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut observations = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| unavailable(ticker, format!("CSV parse error: {}", e)))?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let date_str = field(&record, 0, "date", ticker, line)?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                unavailable(ticker, format!("line {line}: invalid date format: {e}"))
            })?;

            if date < start_date || date > end_date {
                continue;
            }

            let volume = parse_volume(&record, ticker, line)?;

            observations.push(Observation {
                date,
                open: parse_price(&record, 1, "open", ticker, line)?,
                high: parse_price(&record, 2, "high", ticker, line)?,
                low: parse_price(&record, 3, "low", ticker, line)?,
                close: parse_price(&record, 4, "close", ticker, line)?,
                adj_close: parse_price(&record, 5, "adj_close", ticker, line)?,
                volume,
            });
        }

        tracing::debug!(
            ticker,
            path = %path.display(),
            rows = observations.len(),
            "loaded CSV price data"
        );
        PriceSeries::new(ticker, observations)
    }

    fn name(&self) -> &str {
        "csv"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HEADER: &str = "date,open,high,low,close,adj_close,volume\n";

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = format!(
            "{HEADER}\
            2024-01-17,110.0,120.0,105.0,115.0,114.0,55000\n\
            2024-01-15,100.0,110.0,90.0,105.0,104.5,50000\n\
            2024-01-16,105.0,115.0,100.0,110.0,109.5,60000\n"
        );

        fs::write(path.join("BHP.csv"), csv_content).unwrap();
        fs::write(path.join("EMPTY.csv"), HEADER).unwrap();
        fs::write(
            path.join("BAD.csv"),
            format!("{HEADER}2024-01-15,100.0,abc,90.0,105.0,104.5,50000\n"),
        )
        .unwrap();
        fs::write(
            path.join("DUP.csv"),
            format!(
                "{HEADER}2024-01-15,1,1,1,1,1,1\n2024-01-15,2,2,2,2,2,2\n"
            ),
        )
        .unwrap();

        (dir, path)
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn fetch_returns_sorted_observations() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let series = adapter.fetch("BHP", date(15), date(17)).unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series.ticker(), "BHP");
        let first = &series.observations()[0];
        assert_eq!(first.date, date(15));
        assert_eq!(first.open, 100.0);
        assert_eq!(first.high, 110.0);
        assert_eq!(first.low, 90.0);
        assert_eq!(first.close, 105.0);
        assert_eq!(first.adj_close, 104.5);
        assert_eq!(first.volume, 50000);
        assert_eq!(series.dates(), vec![date(15), date(16), date(17)]);
    }

    #[test]
    fn fetch_filters_by_inclusive_range() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let series = adapter.fetch("BHP", date(16), date(16)).unwrap();
        assert_eq!(series.dates(), vec![date(16)]);
    }

    #[test]
    fn fetch_outside_range_is_empty() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let series = adapter.fetch("BHP", date(1), date(10)).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn fetch_header_only_is_empty() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        assert!(adapter.fetch("EMPTY", date(1), date(31)).unwrap().is_empty());
    }

    #[test]
    fn fetch_missing_file_is_data_unavailable() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let result = adapter.fetch("XYZ", date(1), date(31));
        assert!(matches!(
            result,
            Err(AnalysisError::DataUnavailable { ref ticker, .. }) if ticker == "XYZ"
        ));
    }

    #[test]
    fn fetch_bad_number_names_column() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let err = adapter.fetch("BAD", date(1), date(31)).unwrap_err();
        assert!(err.to_string().contains("invalid high value"), "{err}");
    }

    #[test]
    fn fetch_duplicate_dates_is_malformed() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let result = adapter.fetch("DUP", date(1), date(31));
        assert!(matches!(result, Err(AnalysisError::MalformedSeries { .. })));
    }

    #[test]
    fn float_volume_is_accepted() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("VOL.csv"),
            format!("{HEADER}2024-01-15,1,1,1,1,1,1234.0\n"),
        )
        .unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        let series = adapter.fetch("VOL", date(1), date(31)).unwrap();
        assert_eq!(series.volumes(), vec![1234]);
    }

    #[test]
    fn negative_or_nan_volume_is_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("NEG.csv"),
            format!("{HEADER}2024-01-15,1,1,1,1,1,1\n2024-01-16,1,1,1,1,1,-5\n"),
        )
        .unwrap();
        fs::write(
            dir.path().join("NAN.csv"),
            format!("{HEADER}2024-01-15,1,1,1,1,1,nan\n"),
        )
        .unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());

        let err = adapter.fetch("NEG", date(1), date(31)).unwrap_err();
        assert!(matches!(err, AnalysisError::DataUnavailable { .. }));
        assert!(err.to_string().contains("line 3: invalid volume value '-5'"), "{err}");

        let err = adapter.fetch("NAN", date(1), date(31)).unwrap_err();
        assert!(err.to_string().contains("invalid volume value 'nan'"), "{err}");
    }
}
