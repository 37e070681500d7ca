use serde::Serialize;
use std::sync::Mutex;

pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

/// Point-in-time copy of the recorder's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub processed: usize,
    pub errors: usize,
    pub masks: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_processed(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.processed += 1;
        }
    }

    pub fn record_error(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.errors += 1;
        }
    }

    pub fn record_masks(&self, count: usize) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.masks += count;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner
            .lock()
            .map(|metrics| *metrics)
            .unwrap_or_default()
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn counts_across_threads() {
        let recorder = Arc::new(MetricsRecorder::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let recorder = Arc::clone(&recorder);
                thread::spawn(move || {
                    recorder.record_processed();
                    recorder.record_masks(2);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        recorder.record_error();

        assert_eq!(
            recorder.snapshot(),
            MetricsSnapshot {
                processed: 4,
                errors: 1,
                masks: 8,
            }
        );
    }
}
