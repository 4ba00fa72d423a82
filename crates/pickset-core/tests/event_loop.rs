//! Integration tests wiring timers, signals and the async bridge together
//! the way a widget event loop does.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use pickset_core::{completion_channel, AsyncRuntime, Signal, TimerId, TimerManager};

/// A tiny debounced echo: `update` re-arms a timer, expiry emits the text.
struct Echo {
    timers: TimerManager,
    pending: Option<(TimerId, String)>,
    fired: Signal<String>,
}

impl Echo {
    fn new() -> Self {
        Self {
            timers: TimerManager::new(),
            pending: None,
            fired: Signal::new(),
        }
    }

    fn update(&mut self, now: Instant, text: &str) {
        if let Some((id, _)) = self.pending.take() {
            let _ = self.timers.stop(id);
        }
        let id = self.timers.start_one_shot_at(now, Duration::from_millis(300));
        self.pending = Some((id, text.to_string()));
    }

    fn pump(&mut self, now: Instant) {
        for id in self.timers.process_expired_at(now) {
            if let Some((pending_id, text)) = self.pending.take() {
                if pending_id == id {
                    self.fired.emit(text);
                } else {
                    self.pending = Some((pending_id, text));
                }
            }
        }
    }
}

#[test]
fn test_rearmed_timer_emits_latest_value_once() {
    let mut echo = Echo::new();
    let received = Arc::new(Mutex::new(Vec::new()));
    let received_clone = received.clone();
    echo.fired.connect(move |text| received_clone.lock().push(text.clone()));

    let t0 = Instant::now();
    echo.update(t0, "A");
    echo.update(t0 + Duration::from_millis(100), "AB");
    echo.update(t0 + Duration::from_millis(200), "ABC");

    echo.pump(t0 + Duration::from_millis(400));
    assert!(received.lock().is_empty());

    echo.pump(t0 + Duration::from_millis(500));
    assert_eq!(*received.lock(), vec!["ABC".to_string()]);

    echo.pump(t0 + Duration::from_secs(5));
    assert_eq!(received.lock().len(), 1);
}

#[test]
fn test_async_results_surface_through_signal() {
    let runtime = AsyncRuntime::new().unwrap();
    let (tx, mut rx) = completion_channel::<usize>();
    let loaded = Signal::<usize>::new();
    let seen = Arc::new(Mutex::new(None));

    let seen_clone = seen.clone();
    let _guard = loaded.connect_scoped(move |&n| *seen_clone.lock() = Some(n));

    runtime.spawn_posting(
        async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            25
        },
        tx,
    );

    let value = runtime.wait_for(&mut rx, Duration::from_secs(2)).unwrap();
    loaded.emit(value);
    assert_eq!(*seen.lock(), Some(25));
}
