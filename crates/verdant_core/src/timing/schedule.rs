//! One-shot deferred events owned by a single entity.

/// A pending event and the time left before it fires.
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduledTask<E> {
    /// Time remaining before the event fires.
    pub remaining: f32,
    /// The event to deliver.
    pub event: E,
}

/// Pending one-shot events of one owner.
///
/// Dropping the list cancels everything in it, so an owner that stores
/// its list inline cannot be called back after it is destroyed.
#[derive(Clone, Debug, PartialEq)]
pub struct TaskList<E> {
    tasks: Vec<ScheduledTask<E>>,
}

impl<E> Default for TaskList<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> TaskList<E> {
    /// Creates an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Schedules `event` to fire once after `delay` time units.
    ///
    /// Negative or NaN delays fire on the next advance.
    pub fn schedule(&mut self, delay: f32, event: E) {
        let remaining = if delay.is_nan() { 0.0 } else { delay.max(0.0) };
        self.tasks.push(ScheduledTask { remaining, event });
    }

    /// Advances every task by `dt` and returns the events that fired,
    /// earliest first. Events due at the same time keep insertion order.
    pub fn advance(&mut self, dt: f32) -> Vec<E> {
        self.advance_timed(dt).into_iter().map(|(event, _)| event).collect()
    }

    /// Like [`TaskList::advance`], but pairs each event with how long ago
    /// within this step it fell due (`0..=dt`).
    pub fn advance_timed(&mut self, dt: f32) -> Vec<(E, f32)> {
        let mut due: Vec<ScheduledTask<E>> = Vec::new();
        let mut index = 0;
        while index < self.tasks.len() {
            self.tasks[index].remaining -= dt;
            if self.tasks[index].remaining <= 0.0 {
                due.push(self.tasks.remove(index));
            } else {
                index += 1;
            }
        }

        // most overdue first
        due.sort_by(|a, b| a.remaining.total_cmp(&b.remaining));
        due.into_iter()
            .map(|task| (task.event, (-task.remaining).clamp(0.0, dt.max(0.0))))
            .collect()
    }

    /// Cancels every pending event.
    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// Number of pending events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns true if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Iterates over the pending events.
    pub fn pending(&self) -> impl Iterator<Item = &ScheduledTask<E>> {
        self.tasks.iter()
    }
}
