//! Cancellable scheduled tasks
//!
//! The level has three kinds of delayed work: the looping gravity variation,
//! the one-shot trick star expiry, and the looping glitch flash. All of them
//! live in one `Scheduler` owned by the session, so tearing the session down
//! cancels everything in one call and nothing can fire into a dead level.
//!
//! Time is a monotonic millisecond clock advanced by the caller. Due tasks are
//! popped one at a time in (due time, id) order so a handler can cancel a
//! task that would otherwise fire again later in the same frame.

use serde::{Deserialize, Serialize};

/// Handle to a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId(u32);

/// What a task does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerKind {
    /// Re-roll gravity around its base value
    GravityVariation,
    /// Disable the trick star if it is still around
    HazardExpiry,
    /// One pulse of the max-score glitch
    GlitchFlash,
}

/// A task that came due
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fired {
    pub id: TimerId,
    pub kind: TimerKind,
    /// Clock time the task was due at
    pub at_ms: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Task {
    id: TimerId,
    kind: TimerKind,
    due_ms: f64,
    /// Repeat period (None = one-shot)
    period_ms: Option<f64>,
}

/// Owns every pending task of a level session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scheduler {
    now_ms: f64,
    tasks: Vec<Task>,
    next_id: u32,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock time
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Schedule a one-shot task `delay_ms` from now
    pub fn after(&mut self, kind: TimerKind, delay_ms: f32) -> TimerId {
        self.push(kind, delay_ms, None)
    }

    /// Schedule a task every `period_ms`, first firing one period from now
    pub fn every(&mut self, kind: TimerKind, period_ms: f32) -> TimerId {
        // A zero period would fire forever within one frame
        let period = f64::from(period_ms.max(1.0));
        self.push(kind, period_ms.max(1.0), Some(period))
    }

    fn push(&mut self, kind: TimerKind, delay_ms: f32, period_ms: Option<f64>) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.tasks.push(Task {
            id,
            kind,
            due_ms: self.now_ms + f64::from(delay_ms.max(0.0)),
            period_ms,
        });
        id
    }

    /// Cancel a task. Returns false if it already fired (one-shot) or was
    /// cancelled before.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    /// Cancel every pending task, returning how many were dropped
    pub fn cancel_all(&mut self) -> usize {
        let count = self.tasks.len();
        self.tasks.clear();
        count
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.tasks.iter().any(|t| t.id == id)
    }

    /// Number of pending tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Pop the earliest task due at or before `horizon_ms`.
    ///
    /// The clock moves to the task's due time, so tasks scheduled from inside
    /// a handler are relative to when the firing task was due. Repeating
    /// tasks are rescheduled one period later.
    pub fn pop_due(&mut self, horizon_ms: f64) -> Option<Fired> {
        let idx = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= horizon_ms)
            .min_by(|(_, a), (_, b)| {
                a.due_ms
                    .partial_cmp(&b.due_ms)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.id.0.cmp(&b.id.0))
            })
            .map(|(i, _)| i)?;

        let task = &mut self.tasks[idx];
        let fired = Fired {
            id: task.id,
            kind: task.kind,
            at_ms: task.due_ms,
        };
        self.now_ms = self.now_ms.max(task.due_ms);

        match task.period_ms {
            Some(period) => task.due_ms += period,
            None => {
                self.tasks.swap_remove(idx);
            }
        }

        Some(fired)
    }

    /// Move the clock to `horizon_ms` once every due task has been popped
    pub fn settle(&mut self, horizon_ms: f64) {
        self.now_ms = self.now_ms.max(horizon_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(s: &mut Scheduler, dt: f64) -> Vec<(TimerKind, f64)> {
        let horizon = s.now_ms() + dt;
        let mut out = Vec::new();
        while let Some(f) = s.pop_due(horizon) {
            out.push((f.kind, f.at_ms));
        }
        s.settle(horizon);
        out
    }

    #[test]
    fn test_one_shot_fires_once() {
        let mut s = Scheduler::new();
        let id = s.after(TimerKind::HazardExpiry, 6700.0);
        assert!(drain(&mut s, 6699.0).is_empty());
        assert_eq!(drain(&mut s, 1.0), vec![(TimerKind::HazardExpiry, 6700.0)]);
        assert!(!s.is_scheduled(id));
        assert!(drain(&mut s, 10_000.0).is_empty());
    }

    #[test]
    fn test_repeating_catches_up_in_order() {
        let mut s = Scheduler::new();
        s.every(TimerKind::GlitchFlash, 150.0);
        s.every(TimerKind::GravityVariation, 200.0);
        let fired = drain(&mut s, 450.0);
        assert_eq!(
            fired,
            vec![
                (TimerKind::GlitchFlash, 150.0),
                (TimerKind::GravityVariation, 200.0),
                (TimerKind::GlitchFlash, 300.0),
                (TimerKind::GravityVariation, 400.0),
                (TimerKind::GlitchFlash, 450.0),
            ]
        );
    }

    #[test]
    fn test_cancel_inside_batch_stops_later_occurrences() {
        let mut s = Scheduler::new();
        let id = s.every(TimerKind::GlitchFlash, 100.0);
        let horizon = 1000.0;
        let mut count = 0;
        while let Some(f) = s.pop_due(horizon) {
            count += 1;
            if count == 3 {
                assert!(s.cancel(f.id));
            }
        }
        assert_eq!(count, 3);
        assert!(!s.is_scheduled(id));
    }

    #[test]
    fn test_cancel_all() {
        let mut s = Scheduler::new();
        s.every(TimerKind::GravityVariation, 3000.0);
        s.after(TimerKind::HazardExpiry, 6700.0);
        assert_eq!(s.len(), 2);
        assert_eq!(s.cancel_all(), 2);
        assert!(s.is_empty());
        assert!(drain(&mut s, 100_000.0).is_empty());
    }

    #[test]
    fn test_schedule_relative_to_firing_time() {
        let mut s = Scheduler::new();
        s.after(TimerKind::HazardExpiry, 100.0);
        let horizon = 500.0;
        let first = s.pop_due(horizon).map(|f| f.at_ms);
        assert_eq!(first, Some(100.0));
        // Scheduled from the handler: due at 100 + 150
        s.after(TimerKind::GlitchFlash, 150.0);
        assert_eq!(s.pop_due(horizon).map(|f| f.at_ms), Some(250.0));
        assert!(s.pop_due(horizon).is_none());
    }
}
