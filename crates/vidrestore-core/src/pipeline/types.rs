use std::time::Duration;

use super::task::{TaskProgress, TaskStatus};

/// Thread-safe progress reporting for a running task.
///
/// Implementors can use this to drive progress bars, logging, or any other
/// UI feedback. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A frame has been processed and stored.
    fn progress(&self, _progress: &TaskProgress) {}

    /// Wall time since the task started and the estimated time remaining.
    fn time(&self, _elapsed: Duration, _eta: Option<Duration>) {}

    /// The task changed state.
    fn status(&self, _status: TaskStatus) {}
}

/// Reporter that ignores everything.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}

type ProgressFn = Box<dyn Fn(&TaskProgress) + Send + Sync>;
type TimeFn = Box<dyn Fn(Duration, Option<Duration>) + Send + Sync>;
type StatusFn = Box<dyn Fn(TaskStatus) + Send + Sync>;

/// Adapts three plain callbacks (progress, time, status) into a [`ProgressReporter`].
pub struct CallbackReporter {
    on_progress: ProgressFn,
    on_time: TimeFn,
    on_status: StatusFn,
}

impl CallbackReporter {
    pub fn new(
        on_progress: impl Fn(&TaskProgress) + Send + Sync + 'static,
        on_time: impl Fn(Duration, Option<Duration>) + Send + Sync + 'static,
        on_status: impl Fn(TaskStatus) + Send + Sync + 'static,
    ) -> Self {
        Self {
            on_progress: Box::new(on_progress),
            on_time: Box::new(on_time),
            on_status: Box::new(on_status),
        }
    }
}

impl ProgressReporter for CallbackReporter {
    fn progress(&self, progress: &TaskProgress) {
        (self.on_progress)(progress)
    }

    fn time(&self, elapsed: Duration, eta: Option<Duration>) {
        (self.on_time)(elapsed, eta)
    }

    fn status(&self, status: TaskStatus) {
        (self.on_status)(status)
    }
}
