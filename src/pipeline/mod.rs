pub mod sink;
pub mod traits;

use std::time::Instant;

use crate::market_data::TickerSource;
use crate::persistence::SnapshotStore;
use crate::telemetry::prometheus as telemetry;
use traits::{Diagnostic, DiagnosticSink, PipelineOutcome};

/// Fetch one snapshot and, if that succeeded, persist it.
///
/// Every failure is reported to `sink` and returned in the outcome; a
/// fetch failure leaves the store untouched.
pub async fn run_pipeline(
    source: &dyn TickerSource,
    store: &SnapshotStore,
    sink: &dyn DiagnosticSink,
) -> PipelineOutcome {
    let endpoint = source.endpoint();
    sink.report(Diagnostic::FetchStarted { endpoint });

    let started_at = Instant::now();
    let fetched = match source.fetch_snapshot().await {
        Ok(fetched) => fetched,
        Err(error) => {
            telemetry::record_fetch(endpoint, "failure");
            sink.report(Diagnostic::FetchFailed {
                endpoint,
                error: &error,
            });
            return PipelineOutcome::FetchFailed(error);
        }
    };
    telemetry::record_fetch(endpoint, "success");
    telemetry::record_fetch_latency(endpoint, started_at.elapsed().as_secs_f64() * 1_000.0);
    telemetry::record_ticks(fetched.snapshot.data.len());

    sink.report(Diagnostic::Fetched {
        endpoint,
        ticks: fetched.snapshot.data.len(),
    });
    if !fetched.warnings.is_empty() {
        telemetry::record_sentinel_prices(fetched.warnings.len());
        sink.report(Diagnostic::SentinelPrices {
            warnings: &fetched.warnings,
        });
    }

    match store.save(&fetched.snapshot) {
        Ok(report) => {
            telemetry::record_persist("success");
            telemetry::record_persisted_bytes(report.bytes);
            sink.report(Diagnostic::Persisted { report: &report });
            PipelineOutcome::Persisted(report)
        }
        Err(error) => {
            telemetry::record_persist("failure");
            sink.report(Diagnostic::PersistFailed { error: &error });
            PipelineOutcome::PersistFailed(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::normalize::{FetchedSnapshot, PricePolicy, normalize_ticks};
    use crate::market_data::FetchError;
    use crate::market_data::error::FetchResult;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use serde_json::{Value, json};
    use std::process::ExitCode;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Replays a fixed upstream body, or fails with a 502 when there is none.
    struct StubSource {
        body: Option<Value>,
        policy: PricePolicy,
    }

    impl StubSource {
        fn ok(body: Value) -> Self {
            Self {
                body: Some(body),
                policy: PricePolicy::Lenient,
            }
        }

        fn failing() -> Self {
            Self {
                body: None,
                policy: PricePolicy::Lenient,
            }
        }
    }

    #[async_trait]
    impl TickerSource for StubSource {
        fn endpoint(&self) -> &str {
            "stub://tickers"
        }

        async fn fetch_snapshot(&self) -> FetchResult<FetchedSnapshot> {
            match &self.body {
                Some(body) => normalize_ticks(body.clone(), self.policy),
                None => Err(FetchError::Status {
                    status: StatusCode::BAD_GATEWAY,
                    body: String::new(),
                }),
            }
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        kinds: Mutex<Vec<&'static str>>,
    }

    impl RecordingSink {
        fn kinds(&self) -> Vec<&'static str> {
            self.kinds.lock().unwrap().clone()
        }
    }

    impl DiagnosticSink for RecordingSink {
        fn report(&self, diagnostic: Diagnostic<'_>) {
            self.kinds.lock().unwrap().push(kind(&diagnostic));
        }
    }

    fn kind(diagnostic: &Diagnostic<'_>) -> &'static str {
        match diagnostic {
            Diagnostic::FetchStarted { .. } => "fetch_started",
            Diagnostic::Fetched { .. } => "fetched",
            Diagnostic::SentinelPrices { .. } => "sentinel_prices",
            Diagnostic::FetchFailed { .. } => "fetch_failed",
            Diagnostic::Persisted { .. } => "persisted",
            Diagnostic::PersistFailed { .. } => "persist_failed",
        }
    }

    fn store_in(dir: &TempDir) -> SnapshotStore {
        SnapshotStore::new(dir.path().join("priceData.json"))
    }

    fn tickers() -> Value {
        json!([
            {"tokenSymbol": "ETH", "minPrice": "1.23", "maxPrice": "4.56", "updatedAt": 1},
            {"tokenSymbol": "BTC", "minPrice": "60000", "maxPrice": "60001.5", "updatedAt": 2}
        ])
    }

    #[tokio::test]
    async fn successful_run_persists_snapshot() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let sink = RecordingSink::default();

        let outcome = run_pipeline(&StubSource::ok(tickers()), &store, &sink).await;

        assert_eq!(outcome.exit_code(), ExitCode::SUCCESS);
        assert_eq!(sink.kinds(), ["fetch_started", "fetched", "persisted"]);
        let written = std::fs::read_to_string(store.path()).unwrap();
        let PipelineOutcome::Persisted(report) = &outcome else {
            panic!("unexpected outcome: {outcome:?}");
        };
        assert_eq!(report.path, store.path());
        assert_eq!(report.bytes, written.len());
        assert_eq!(
            written,
            concat!(
                r#"{"data":[{"tokenSymbol":"ETH","minPrice":1.23,"maxPrice":4.56,"updatedAt":1},"#,
                r#"{"tokenSymbol":"BTC","minPrice":60000,"maxPrice":60001.5,"updatedAt":2}]}"#
            )
        );
    }

    #[tokio::test]
    async fn repeated_runs_write_identical_bytes() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let source = StubSource::ok(tickers());

        run_pipeline(&source, &store, &RecordingSink::default()).await;
        let first = std::fs::read(store.path()).unwrap();
        run_pipeline(&source, &store, &RecordingSink::default()).await;
        let second = std::fs::read(store.path()).unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn fetch_failure_skips_persistence() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let sink = RecordingSink::default();

        let outcome = run_pipeline(&StubSource::failing(), &store, &sink).await;

        assert!(matches!(outcome, PipelineOutcome::FetchFailed(_)));
        assert_eq!(outcome.exit_code(), ExitCode::from(1));
        assert_eq!(sink.kinds(), ["fetch_started", "fetch_failed"]);
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn fetch_failure_keeps_previous_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), r#"{"data":[]}"#).unwrap();

        run_pipeline(&StubSource::failing(), &store, &RecordingSink::default()).await;

        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), r#"{"data":[]}"#);
    }

    #[tokio::test]
    async fn empty_upstream_writes_empty_envelope() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let outcome = run_pipeline(&StubSource::ok(json!([])), &store, &RecordingSink::default()).await;

        assert!(matches!(outcome, PipelineOutcome::Persisted(_)));
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), r#"{"data":[]}"#);
    }

    #[tokio::test]
    async fn sentinel_prices_are_reported_and_persisted_as_null() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let sink = RecordingSink::default();
        let source = StubSource::ok(json!([{"id": "X", "minPrice": "N/A", "maxPrice": "2"}]));

        let outcome = run_pipeline(&source, &store, &sink).await;

        assert!(matches!(outcome, PipelineOutcome::Persisted(_)));
        assert_eq!(
            sink.kinds(),
            ["fetch_started", "fetched", "sentinel_prices", "persisted"]
        );
        assert_eq!(
            std::fs::read_to_string(store.path()).unwrap(),
            r#"{"data":[{"id":"X","minPrice":null,"maxPrice":2}]}"#
        );
    }

    #[tokio::test]
    async fn strict_source_failure_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let source = StubSource {
            body: Some(json!([{"id": "X", "minPrice": "N/A", "maxPrice": "2"}])),
            policy: PricePolicy::Strict,
        };

        let outcome = run_pipeline(&source, &store, &RecordingSink::default()).await;

        assert!(matches!(
            outcome,
            PipelineOutcome::FetchFailed(FetchError::InvalidPrice { .. })
        ));
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn unwritable_target_is_reported_not_raised() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path().join("no-such-dir").join("priceData.json"));
        let sink = RecordingSink::default();

        let outcome = run_pipeline(&StubSource::ok(tickers()), &store, &sink).await;

        assert!(matches!(outcome, PipelineOutcome::PersistFailed(_)));
        assert_eq!(outcome.exit_code(), ExitCode::from(2));
        assert_eq!(sink.kinds(), ["fetch_started", "fetched", "persist_failed"]);
    }
}
