use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct ControlState {
    paused: bool,
    stopped: bool,
}

/// Pause/stop signals for one task, polled by the driver between frames.
///
/// Share it through an `Arc`. `stop` wins over `pause` and also wakes a
/// paused driver.
#[derive(Debug, Default)]
pub struct TaskControl {
    state: Mutex<ControlState>,
    changed: Condvar,
}

impl TaskControl {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ControlState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn pause(&self) {
        self.lock().paused = true;
        self.changed.notify_all();
    }

    pub fn resume(&self) {
        self.lock().paused = false;
        self.changed.notify_all();
    }

    pub fn stop(&self) {
        self.lock().stopped = true;
        self.changed.notify_all();
    }

    pub fn is_paused(&self) -> bool {
        let state = self.lock();
        state.paused && !state.stopped
    }

    pub fn is_stopped(&self) -> bool {
        self.lock().stopped
    }

    /// Block while paused. Returns `true` if the task was stopped.
    pub fn wait_while_paused(&self) -> bool {
        let state = self
            .changed
            .wait_while(self.lock(), |s| s.paused && !s.stopped)
            .unwrap_or_else(PoisonError::into_inner);
        state.stopped
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn resume_wakes_waiter() {
        let control = Arc::new(TaskControl::new());
        control.pause();
        assert!(control.is_paused());

        let waiter = {
            let control = Arc::clone(&control);
            thread::spawn(move || control.wait_while_paused())
        };
        thread::sleep(Duration::from_millis(20));
        control.resume();
        assert!(!waiter.join().unwrap());
    }

    #[test]
    fn stop_wakes_paused_waiter() {
        let control = Arc::new(TaskControl::new());
        control.pause();
        let waiter = {
            let control = Arc::clone(&control);
            thread::spawn(move || control.wait_while_paused())
        };
        thread::sleep(Duration::from_millis(20));
        control.stop();
        assert!(waiter.join().unwrap());
        assert!(!control.is_paused());
    }

    #[test]
    fn not_paused_returns_immediately() {
        assert!(!TaskControl::new().wait_while_paused());
    }
}
