//! Progress reporting for conversions.
//!
//! Progress is advisory: the writer reports after each table finishes and
//! never waits on the sink for anything else. All reports from concurrent
//! workers go through [`SharedProgress`], which holds one lock so labels and
//! percentages arrive in pairs and the completion ordinal never repeats.

use parking_lot::Mutex;

/// Label shown when no conversion is running.
pub const IDLE_LABEL: &str = "Converting:";

/// Receiver of progress updates: a label and a percentage in `0..=100`.
pub trait ProgressSink: Send + Sync {
    fn report(&self, label: &str, percent: f64);
}

/// Drops every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _label: &str, _percent: f64) {}
}

/// Adapts a closure into a [`ProgressSink`].
pub struct FnProgress<F>(pub F);

impl<F> ProgressSink for FnProgress<F>
where
    F: Fn(&str, f64) + Send + Sync,
{
    fn report(&self, label: &str, percent: f64) {
        (self.0)(label, percent)
    }
}

/// Serializes updates from table workers into one sink.
pub struct SharedProgress<'a> {
    inner: Mutex<State<'a>>,
    total: usize,
}

struct State<'a> {
    sink: &'a dyn ProgressSink,
    completed: usize,
}

impl<'a> SharedProgress<'a> {
    /// Track `total` tables reporting to `sink`.
    pub fn new(sink: &'a dyn ProgressSink, total: usize) -> Self {
        Self {
            inner: Mutex::new(State { sink, completed: 0 }),
            total,
        }
    }

    /// Record that the table called `name` is done and report the new percentage.
    pub fn table_done(&self, name: &str) {
        let mut state = self.inner.lock();
        state.completed += 1;
        let percent = if self.total == 0 {
            100.0
        } else {
            state.completed as f64 * 100.0 / self.total as f64
        };
        state
            .sink
            .report(&format!("{} {}", IDLE_LABEL, name), percent);
    }

    /// Put the indicator back to idle.
    pub fn reset(&self) {
        let state = self.inner.lock();
        state.sink.report(IDLE_LABEL, 0.0);
    }

    /// Tables reported so far.
    pub fn completed(&self) -> usize {
        self.inner.lock().completed
    }
}
