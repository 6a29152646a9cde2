use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use tracing::warn;

use super::engine::FrameReport;

static METRICS_LOCK_POISON_WARNED: AtomicBool = AtomicBool::new(false);

fn warn_metrics_lock_poison_once(operation: &'static str) {
    if METRICS_LOCK_POISON_WARNED
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        warn!(operation, "metrics lock poisoned; recovered inner value");
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RenderMetricsSnapshot {
    pub fps: f32,
    pub frame_time_ms: f32,
    pub drawn_per_frame: f32,
    pub culled_per_frame: f32,
}

/// Cloneable read side of the render metrics, shared with the host.
#[derive(Clone, Debug)]
pub struct MetricsHandle {
    snapshot: Arc<RwLock<RenderMetricsSnapshot>>,
}

impl Default for MetricsHandle {
    fn default() -> Self {
        Self {
            snapshot: Arc::new(RwLock::new(RenderMetricsSnapshot::default())),
        }
    }
}

impl MetricsHandle {
    pub fn snapshot(&self) -> RenderMetricsSnapshot {
        match self.snapshot.read() {
            Ok(guard) => *guard,
            Err(poisoned) => {
                warn_metrics_lock_poison_once("read");
                *poisoned.into_inner()
            }
        }
    }

    pub(crate) fn publish(&self, snapshot: RenderMetricsSnapshot) {
        match self.snapshot.write() {
            Ok(mut guard) => *guard = snapshot,
            Err(poisoned) => {
                warn_metrics_lock_poison_once("write");
                let mut guard = poisoned.into_inner();
                *guard = snapshot;
            }
        }
    }
}

#[derive(Debug)]
pub(crate) struct MetricsAccumulator {
    interval_start: Instant,
    interval: Duration,
    frames: u32,
    frame_time_sum: Duration,
    drawn: u64,
    culled: u64,
}

impl MetricsAccumulator {
    pub(crate) fn new(interval: Duration) -> Self {
        Self {
            interval_start: Instant::now(),
            interval,
            frames: 0,
            frame_time_sum: Duration::ZERO,
            drawn: 0,
            culled: 0,
        }
    }

    pub(crate) fn record_frame(&mut self, frame_dt: Duration, report: &FrameReport) {
        self.frames = self.frames.saturating_add(1);
        self.frame_time_sum = self.frame_time_sum.saturating_add(frame_dt);
        self.drawn = self.drawn.saturating_add(report.drawn as u64);
        self.culled = self.culled.saturating_add(report.culled as u64);
    }

    pub(crate) fn maybe_snapshot(&mut self, now: Instant) -> Option<RenderMetricsSnapshot> {
        let elapsed = now.saturating_duration_since(self.interval_start);
        if elapsed < self.interval {
            return None;
        }

        let elapsed_seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let snapshot = if self.frames == 0 {
            RenderMetricsSnapshot::default()
        } else {
            let frames = self.frames as f32;
            RenderMetricsSnapshot {
                fps: frames / elapsed_seconds,
                frame_time_ms: (self.frame_time_sum.as_secs_f32() / frames) * 1000.0,
                drawn_per_frame: self.drawn as f32 / frames,
                culled_per_frame: self.culled as f32 / frames,
            }
        };

        self.interval_start = now;
        self.frames = 0;
        self.frame_time_sum = Duration::ZERO;
        self.drawn = 0;
        self.culled = 0;

        Some(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::RwLock;
    use std::thread;

    use super::*;

    fn poison_lock(lock: &RwLock<RenderMetricsSnapshot>) {
        thread::scope(|scope| {
            let _ = scope
                .spawn(|| {
                    let _guard = lock.write().expect("write guard");
                    panic!("poison metrics lock");
                })
                .join();
        });
    }

    fn report(drawn: usize, culled: usize) -> FrameReport {
        FrameReport {
            layers: 1,
            drawn,
            culled,
        }
    }

    #[test]
    fn snapshot_averages_frame_counts() {
        let mut accumulator = MetricsAccumulator::new(Duration::from_secs(1));
        let base = Instant::now();

        accumulator.record_frame(Duration::from_millis(20), &report(4, 0));
        accumulator.record_frame(Duration::from_millis(40), &report(2, 6));

        let snapshot = accumulator
            .maybe_snapshot(base + Duration::from_secs(1))
            .expect("snapshot should be emitted");

        assert!((snapshot.fps - 2.0).abs() < 0.05);
        assert!((snapshot.frame_time_ms - 30.0).abs() < 0.001);
        assert_eq!(snapshot.drawn_per_frame, 3.0);
        assert_eq!(snapshot.culled_per_frame, 3.0);
    }

    #[test]
    fn snapshot_not_emitted_before_interval() {
        let mut accumulator = MetricsAccumulator::new(Duration::from_secs(1));
        let base = Instant::now();
        accumulator.record_frame(Duration::from_millis(16), &report(1, 0));

        assert!(accumulator
            .maybe_snapshot(base + Duration::from_millis(500))
            .is_none());
    }

    #[test]
    fn idle_interval_publishes_zeroes() {
        let mut accumulator = MetricsAccumulator::new(Duration::from_millis(10));
        let snapshot = accumulator
            .maybe_snapshot(Instant::now() + Duration::from_secs(1))
            .expect("snapshot");
        assert_eq!(snapshot, RenderMetricsSnapshot::default());
    }

    #[test]
    fn publish_recovers_after_poison_without_panic() {
        let handle = MetricsHandle::default();
        poison_lock(handle.snapshot.as_ref());
        assert_eq!(handle.snapshot().fps, 0.0);

        let expected = RenderMetricsSnapshot {
            fps: 30.0,
            frame_time_ms: 33.0,
            drawn_per_frame: 12.0,
            culled_per_frame: 4.0,
        };
        handle.publish(expected);
        assert_eq!(handle.snapshot(), expected);
    }
}
