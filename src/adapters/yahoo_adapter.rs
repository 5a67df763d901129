//! Yahoo Finance data adapter.
//!
//! Fetches daily bars from the v8 chart API with a request timeout and a
//! small bounded number of retries for transient failures (connect errors,
//! timeouts, HTTP 5xx). Anything else is terminal for the request.

use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::domain::error::AnalysisError;
use crate::domain::ohlcv::Observation;
use crate::domain::price_series::PriceSeries;
use crate::ports::data_port::DataPort;

const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

pub struct YahooAdapter {
    client: reqwest::blocking::Client,
    base_url: String,
    retries: u32,
    base_delay: Duration,
}

fn unavailable(ticker: &str, reason: impl Into<String>) -> AnalysisError {
    AnalysisError::DataUnavailable {
        ticker: ticker.to_string(),
        reason: reason.into(),
    }
}

/// Outcome of one HTTP attempt.
enum Attempt {
    Done(Result<PriceSeries, AnalysisError>),
    Retry(String),
}

impl YahooAdapter {
    pub fn new(timeout: Duration, retries: u32) -> Result<Self, AnalysisError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AnalysisError::invalid_parameter("timeout_secs", e.to_string()))?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            retries,
            base_delay: Duration::from_millis(500),
        })
    }

    /// Point the adapter at another chart endpoint, e.g. a mirror or proxy.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn chart_url(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> String {
        let start_ts = start.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        let end_ts = end
            .and_time(chrono::NaiveTime::MIN)
            .and_utc()
            .timestamp()
            + 86_399;
        format!(
            "{}/{}?period1={start_ts}&period2={end_ts}&interval=1d&includeAdjustedClose=true",
            self.base_url,
            ticker.replace('^', "%5E")
        )
    }

    fn attempt(&self, url: &str, ticker: &str, start: NaiveDate, end: NaiveDate) -> Attempt {
        let resp = match self.client.get(url).send() {
            Ok(resp) => resp,
            Err(e) if e.is_connect() || e.is_timeout() => return Attempt::Retry(e.to_string()),
            Err(e) => return Attempt::Done(Err(unavailable(ticker, e.to_string()))),
        };

        let status = resp.status();
        if status.is_server_error() {
            return Attempt::Retry(format!("HTTP {status}"));
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Attempt::Done(Err(unavailable(ticker, "symbol not found")));
        }
        if !status.is_success() {
            return Attempt::Done(Err(unavailable(ticker, format!("HTTP {status}"))));
        }

        let body = match resp.text() {
            Ok(body) => body,
            Err(e) if e.is_timeout() => return Attempt::Retry(e.to_string()),
            Err(e) => return Attempt::Done(Err(unavailable(ticker, e.to_string()))),
        };
        Attempt::Done(parse_chart(ticker, &body, start, end))
    }
}

/// Decode a chart API body into a series. Timestamps outside
/// `[start, end]` and rows with any missing price are skipped.
fn parse_chart(
    ticker: &str,
    body: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PriceSeries, AnalysisError> {
    let resp: ChartResponse = serde_json::from_str(body)
        .map_err(|e| unavailable(ticker, format!("unexpected response format: {e}")))?;

    let result = match (resp.chart.result, resp.chart.error) {
        (Some(result), _) => result,
        (None, Some(err)) if err.code == "Not Found" => {
            return Err(unavailable(ticker, "symbol not found"));
        }
        (None, Some(err)) => {
            return Err(unavailable(ticker, format!("{}: {}", err.code, err.description)));
        }
        (None, None) => return Err(unavailable(ticker, "empty result with no error")),
    };

    let Some(data) = result.into_iter().next() else {
        return Err(unavailable(ticker, "result array is empty"));
    };
    // No timestamps means no trading days in range.
    let timestamps = data.timestamp.unwrap_or_default();
    let Some(quote) = data.indicators.quote.into_iter().next() else {
        return Err(unavailable(ticker, "no quote data"));
    };
    let adj_closes = data
        .indicators
        .adjclose
        .and_then(|v| v.into_iter().next())
        .map(|a| a.adjclose);

    let at = |v: &Vec<Option<f64>>, i: usize| v.get(i).copied().flatten();

    let mut observations = Vec::with_capacity(timestamps.len());
    let mut skipped = 0usize;
    for (i, &ts) in timestamps.iter().enumerate() {
        let Some(date) = chrono::DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive()) else {
            return Err(unavailable(ticker, format!("invalid timestamp: {ts}")));
        };
        if date < start || date > end {
            continue;
        }

        let (Some(open), Some(high), Some(low), Some(close)) = (
            at(&quote.open, i),
            at(&quote.high, i),
            at(&quote.low, i),
            at(&quote.close, i),
        ) else {
            skipped += 1;
            continue;
        };
        let adj_close = adj_closes.as_ref().and_then(|v| at(v, i)).unwrap_or(close);
        let volume = at(&quote.volume, i).map(|v| v.max(0.0) as u64).unwrap_or(0);

        observations.push(Observation {
            date,
            open,
            high,
            low,
            close,
            adj_close,
            volume,
        });
    }

    if skipped > 0 {
        tracing::warn!(ticker, skipped, "skipped rows with missing prices");
    }
    PriceSeries::new(ticker, observations)
}

impl DataPort for YahooAdapter {
    fn fetch(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, AnalysisError> {
        let url = self.chart_url(ticker, start_date, end_date);
        let mut last_error = String::new();

        for attempt in 0..=self.retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                tracing::warn!(ticker, attempt, error = %last_error, "retrying chart request");
                std::thread::sleep(delay);
            }

            match self.attempt(&url, ticker, start_date, end_date) {
                Attempt::Done(result) => return result,
                Attempt::Retry(reason) => last_error = reason,
            }
        }

        Err(unavailable(
            ticker,
            format!("gave up after {} attempts: {last_error}", self.retries + 1),
        ))
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // 2024-01-02 14:30 UTC and the two following trading days.
    const BODY: &str = r#"{
      "chart": {
        "result": [{
          "timestamp": [1704205800, 1704292200, 1704378600],
          "indicators": {
            "quote": [{
              "open":   [187.15, 184.22, null],
              "high":   [188.44, 185.88, 183.09],
              "low":    [183.89, 183.43, 180.88],
              "close":  [185.64, 184.25, 181.91],
              "volume": [82488700, 58414500, 71983600]
            }],
            "adjclose": [{ "adjclose": [184.94, 183.55, 181.22] }]
          }
        }],
        "error": null
      }
    }"#;

    #[test]
    fn parse_chart_decodes_rows() {
        let series = parse_chart("AAPL", BODY, date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        assert_eq!(series.ticker(), "AAPL");
        // third row has a null open
        assert_eq!(series.len(), 2);
        let first = &series.observations()[0];
        assert_eq!(first.date, date(2024, 1, 2));
        assert_eq!(first.close, 185.64);
        assert_eq!(first.adj_close, 184.94);
        assert_eq!(first.volume, 82_488_700);
    }

    #[test]
    fn parse_chart_filters_range() {
        let series = parse_chart("AAPL", BODY, date(2024, 1, 3), date(2024, 1, 3)).unwrap();
        assert_eq!(series.dates(), vec![date(2024, 1, 3)]);
    }

    #[test]
    fn parse_chart_not_found() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let err = parse_chart("NOPE", body, date(2024, 1, 1), date(2024, 1, 31)).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::DataUnavailable { ref ticker, ref reason } if ticker == "NOPE" && reason == "symbol not found"
        ));
    }

    #[test]
    fn parse_chart_garbage_is_unavailable() {
        let err = parse_chart("X", "<html>", date(2024, 1, 1), date(2024, 1, 31)).unwrap_err();
        assert!(matches!(err, AnalysisError::DataUnavailable { .. }));
    }

    #[test]
    fn parse_chart_without_timestamps_is_empty() {
        let body = r#"{"chart":{"result":[{"indicators":{"quote":[{}]}}],"error":null}}"#;
        let series = parse_chart("X", body, date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn missing_adjclose_falls_back_to_close() {
        let body = r#"{"chart":{"result":[{"timestamp":[1704205800],"indicators":{"quote":[{"open":[1.0],"high":[2.0],"low":[0.5],"close":[1.5],"volume":[null]}]}}],"error":null}}"#;
        let series = parse_chart("X", body, date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        assert_eq!(series.observations()[0].adj_close, 1.5);
        assert_eq!(series.observations()[0].volume, 0);
    }

    #[test]
    fn chart_url_encodes_index_symbols() {
        let adapter = YahooAdapter::new(Duration::from_secs(5), 1).unwrap();
        let url = adapter.chart_url("^GSPC", date(2024, 1, 1), date(2024, 1, 1));
        assert!(url.starts_with(DEFAULT_BASE_URL));
        assert!(url.contains("/%5EGSPC?"));
        assert!(url.contains("period1=1704067200"));
        assert!(url.contains("period2=1704153599"));
    }

    #[test]
    fn with_base_url_replaces_endpoint() {
        let adapter = YahooAdapter::new(Duration::from_secs(5), 1)
            .unwrap()
            .with_base_url("http://127.0.0.1:9/chart/");
        let url = adapter.chart_url("BHP.AX", date(2024, 1, 1), date(2024, 1, 1));
        assert!(url.starts_with("http://127.0.0.1:9/chart/BHP.AX?"), "{url}");
    }

    mod fetch {
        use super::*;
        use std::io::{BufRead, BufReader, Write};
        use std::net::TcpListener;
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::thread;

        /// Local HTTP server answering one connection per canned response.
        /// Returns its base URL and a count of requests received.
        fn serve(responses: Vec<(u16, &'static str)>) -> (String, Arc<AtomicUsize>) {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let base_url = format!("http://{}", listener.local_addr().unwrap());
            let hits = Arc::new(AtomicUsize::new(0));
            let counter = Arc::clone(&hits);

            thread::spawn(move || {
                for (status, body) in responses {
                    let Ok((mut stream, _)) = listener.accept() else {
                        return;
                    };
                    counter.fetch_add(1, Ordering::SeqCst);

                    let mut reader = BufReader::new(stream.try_clone().unwrap());
                    let mut line = String::new();
                    loop {
                        line.clear();
                        match reader.read_line(&mut line) {
                            Ok(0) | Err(_) => break,
                            Ok(_) if line == "\r\n" => break,
                            Ok(_) => {}
                        }
                    }

                    let _ = write!(
                        stream,
                        "HTTP/1.1 {status} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = stream.flush();
                }
            });

            (base_url, hits)
        }

        fn adapter(base_url: &str, retries: u32) -> YahooAdapter {
            let mut adapter = YahooAdapter::new(Duration::from_secs(5), retries)
                .unwrap()
                .with_base_url(base_url);
            // Loopback must not go through an environment proxy.
            adapter.client = reqwest::blocking::Client::builder()
                .timeout(Duration::from_secs(5))
                .no_proxy()
                .build()
                .unwrap();
            adapter.base_delay = Duration::ZERO;
            adapter
        }

        #[test]
        fn server_error_then_success_retries_once() {
            let (url, hits) = serve(vec![(503, ""), (200, BODY)]);
            let series = adapter(&url, 1)
                .fetch("AAPL", date(2024, 1, 1), date(2024, 1, 31))
                .unwrap();

            assert_eq!(series.len(), 2);
            assert_eq!(hits.load(Ordering::SeqCst), 2);
        }

        #[test]
        fn persistent_server_error_gives_up_after_retries() {
            let (url, hits) = serve(vec![(503, ""); 6]);
            let err = adapter(&url, 2)
                .fetch("AAPL", date(2024, 1, 1), date(2024, 1, 31))
                .unwrap_err();

            assert!(matches!(
                err,
                AnalysisError::DataUnavailable { ref ticker, ref reason }
                    if ticker == "AAPL" && reason.starts_with("gave up after 3 attempts")
            ));
            assert_eq!(hits.load(Ordering::SeqCst), 3);
        }

        #[test]
        fn not_found_is_not_retried() {
            let (url, hits) = serve(vec![(404, ""), (200, BODY)]);
            let err = adapter(&url, 2)
                .fetch("NOPE", date(2024, 1, 1), date(2024, 1, 31))
                .unwrap_err();

            assert!(matches!(
                err,
                AnalysisError::DataUnavailable { ref reason, .. } if reason == "symbol not found"
            ));
            assert_eq!(hits.load(Ordering::SeqCst), 1);
        }

        #[test]
        fn client_error_is_terminal() {
            let (url, hits) = serve(vec![(400, ""), (200, BODY)]);
            let err = adapter(&url, 2)
                .fetch("AAPL", date(2024, 1, 1), date(2024, 1, 31))
                .unwrap_err();

            assert!(matches!(err, AnalysisError::DataUnavailable { ref reason, .. } if reason.contains("400")));
            assert_eq!(hits.load(Ordering::SeqCst), 1);
        }
    }
}
