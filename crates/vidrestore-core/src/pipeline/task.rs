use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::error::{RestoreError, Result};

use super::config::TaskConfig;

/// Lifecycle of a task.
///
/// `Pending -> Running -> {Paused <-> Running} -> {Completed | Stopped | Failed}`.
/// A task that cannot open its source goes straight from `Pending` to `Failed`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Running,
    Paused,
    Completed,
    Failed,
    Stopped,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Stopped)
    }

    /// Whether the state machine allows moving from `self` to `next`.
    pub fn can_become(self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        matches!(
            (self, next),
            (Pending, Running | Failed)
                | (Running, Paused | Completed | Failed | Stopped)
                | (Paused, Running | Failed | Stopped)
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Paused => write!(f, "paused"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// Live counters of a running task.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TaskProgress {
    /// Frames processed so far.
    pub current: usize,
    /// Frame count reported by the source, if any.
    pub total: Option<usize>,
    pub percent: f32,
    /// Rolling frames per second.
    pub fps: f64,
    pub elapsed: Duration,
    pub eta: Option<Duration>,
}

impl TaskProgress {
    pub fn update(&mut self, current: usize, total: Option<usize>, fps: f64, elapsed: Duration) {
        self.current = current;
        self.total = total;
        self.fps = fps;
        self.elapsed = elapsed;
        self.percent = match total {
            Some(t) if t > 0 => (current as f32 / t as f32 * 100.0).min(100.0),
            _ => 0.0,
        };
        self.eta = match total {
            Some(t) if fps > 0.0 => Some(Duration::from_secs_f64(
                t.saturating_sub(current) as f64 / fps,
            )),
            _ => None,
        };
    }
}

/// A restoration job: paths and stage selection, plus its live state.
#[derive(Clone, Debug)]
pub struct Task {
    pub id: String,
    pub config: TaskConfig,
    pub progress: TaskProgress,
    status: TaskStatus,
    failure: Option<String>,
}

impl Task {
    pub fn new(id: impl Into<String>, config: TaskConfig) -> Self {
        Self {
            id: id.into(),
            config,
            progress: TaskProgress::default(),
            status: TaskStatus::Pending,
            failure: None,
        }
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    /// Human-readable reason once the task has failed.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub(crate) fn transition(&mut self, next: TaskStatus) -> Result<()> {
        if self.status == next {
            return Ok(());
        }
        if !self.status.can_become(next) {
            return Err(RestoreError::Pipeline(format!(
                "task {} cannot go from {} to {next}",
                self.id, self.status
            )));
        }
        self.status = next;
        Ok(())
    }

    pub(crate) fn fail(&mut self, reason: impl Into<String>) -> Result<()> {
        self.failure = Some(reason.into());
        self.transition(TaskStatus::Failed)
    }
}

/// Frames per second over the most recent frame latencies.
#[derive(Debug)]
pub struct FpsMeter {
    window: VecDeque<Duration>,
    capacity: usize,
}

impl FpsMeter {
    pub fn new(capacity: usize) -> Self {
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn record(&mut self, latency: Duration) {
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(latency);
    }

    pub fn fps(&self) -> f64 {
        let total: Duration = self.window.iter().sum();
        if total.is_zero() {
            return 0.0;
        }
        self.window.len() as f64 / total.as_secs_f64()
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_machine_edges() {
        use TaskStatus::*;
        assert!(Pending.can_become(Running));
        assert!(Running.can_become(Paused));
        assert!(Paused.can_become(Running));
        assert!(Paused.can_become(Stopped));
        assert!(!Completed.can_become(Running));
        assert!(!Pending.can_become(Completed));
        assert!(Stopped.is_terminal() && Failed.is_terminal() && Completed.is_terminal());
        assert!(!Paused.is_terminal());
    }

    #[test]
    fn fps_window_is_bounded() {
        let mut meter = FpsMeter::new(30);
        for _ in 0..40 {
            meter.record(Duration::from_millis(100));
        }
        assert_eq!(meter.len(), 30);
        assert!((meter.fps() - 10.0).abs() < 1e-6);
    }

    #[test]
    fn progress_percent_and_eta() {
        let mut progress = TaskProgress::default();
        progress.update(25, Some(100), 5.0, Duration::from_secs(5));
        assert_eq!(progress.percent, 25.0);
        assert_eq!(progress.eta, Some(Duration::from_secs(15)));

        progress.update(3, None, 5.0, Duration::from_secs(1));
        assert_eq!(progress.percent, 0.0);
        assert_eq!(progress.eta, None);
    }
}
