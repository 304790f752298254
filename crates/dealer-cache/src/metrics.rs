//! Metrics for the Dealer Cache
//!
//! Operations report through the `metrics` facade. Nothing is recorded
//! unless the host process installs a recorder.

use metrics::{counter, histogram};
use std::future::Future;
use std::time::{Duration, Instant};

use crate::error::Result;

/// Counter of cache operations, labelled by `op` and `outcome`
pub const OPERATIONS_TOTAL: &str = "dealer_cache_operations_total";

/// Histogram of cache operation latency in seconds, labelled by `op`
pub const OPERATION_SECONDS: &str = "dealer_cache_operation_seconds";

/// Outcome label for an operation result
pub fn outcome<T, E>(result: &std::result::Result<T, E>) -> &'static str {
    if result.is_ok() {
        "ok"
    } else {
        "error"
    }
}

/// Record one completed operation
pub fn record_operation(op: &'static str, outcome: &'static str, elapsed: Duration) {
    counter!(OPERATIONS_TOTAL, "op" => op, "outcome" => outcome).increment(1);
    histogram!(OPERATION_SECONDS, "op" => op).record(elapsed.as_secs_f64());
}

/// Run an operation and record its latency and outcome
pub async fn observe<T, F>(op: &'static str, operation: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let start = Instant::now();
    let result = operation.await;
    record_operation(op, outcome(&result), start.elapsed());
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::DealerCacheError;
    use metrics::{
        Counter, CounterFn, Gauge, Histogram, HistogramFn, Key, KeyName, Metadata, Recorder,
        SharedString, Unit,
    };
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::Arc;

    /// Everything recorded, keyed by `name{label=value,...}`
    #[derive(Default)]
    struct Tally {
        counts: Mutex<HashMap<String, u64>>,
        samples: Mutex<Vec<(String, f64)>>,
    }

    struct TallyHandle {
        tally: Arc<Tally>,
        key: String,
    }

    impl CounterFn for TallyHandle {
        fn increment(&self, value: u64) {
            *self.tally.counts.lock().entry(self.key.clone()).or_default() += value;
        }

        fn absolute(&self, value: u64) {
            self.tally.counts.lock().insert(self.key.clone(), value);
        }
    }

    impl HistogramFn for TallyHandle {
        fn record(&self, value: f64) {
            self.tally.samples.lock().push((self.key.clone(), value));
        }
    }

    struct TallyRecorder(Arc<Tally>);

    impl TallyRecorder {
        fn handle(&self, key: &Key) -> Arc<TallyHandle> {
            let mut labels: Vec<String> = key
                .labels()
                .map(|label| format!("{}={}", label.key(), label.value()))
                .collect();
            labels.sort();
            Arc::new(TallyHandle {
                tally: self.0.clone(),
                key: format!("{}{{{}}}", key.name(), labels.join(",")),
            })
        }
    }

    impl Recorder for TallyRecorder {
        fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

        fn register_counter(&self, key: &Key, _: &Metadata<'_>) -> Counter {
            Counter::from_arc(self.handle(key))
        }

        fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
            Gauge::noop()
        }

        fn register_histogram(&self, key: &Key, _: &Metadata<'_>) -> Histogram {
            Histogram::from_arc(self.handle(key))
        }
    }

    #[test]
    fn test_observe_records_outcome_and_latency() {
        let tally = Arc::new(Tally::default());
        let recorder = TallyRecorder(tally.clone());
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();

        let (ok, err) = metrics::with_local_recorder(&recorder, || {
            runtime.block_on(async {
                let ok = observe("get_quote", async { Ok(7u32) }).await;
                let err = observe("get_quote", async {
                    Err::<u32, _>(DealerCacheError::QuoteNotFound("q".to_string()))
                })
                .await;
                (ok, err)
            })
        });

        // The wrapped result comes back untouched.
        assert_eq!(ok.unwrap(), 7);
        assert!(err.unwrap_err().is_not_found());

        let counts = tally.counts.lock();
        assert_eq!(
            counts.get("dealer_cache_operations_total{op=get_quote,outcome=ok}"),
            Some(&1)
        );
        assert_eq!(
            counts.get("dealer_cache_operations_total{op=get_quote,outcome=error}"),
            Some(&1)
        );

        let samples = tally.samples.lock();
        assert_eq!(samples.len(), 2);
        assert!(samples
            .iter()
            .all(|(key, secs)| key == "dealer_cache_operation_seconds{op=get_quote}" && *secs >= 0.0));
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(outcome::<(), ()>(&Ok(())), "ok");
        assert_eq!(outcome::<(), ()>(&Err(())), "error");
    }
}
