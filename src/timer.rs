//! Deferred view effects.
//!
//! Screens schedule small effects (reveal a panel, reset a view) to happen
//! after a delay. The UI loop feeds elapsed time through [`Timers::advance`]
//! and applies whatever comes due. A screen clears its timers on teardown,
//! so nothing fires against a destroyed view.

use log::trace;
use std::time::Duration;

/// Handle for cancelling a scheduled effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Pending<E> {
    id: TimerId,
    remaining: Duration,
    effect: E,
}

/// A set of cancellable one-shot effects driven by elapsed time.
///
/// ```
/// use std::time::Duration;
/// use printdash_core::Timers;
///
/// let mut timers = Timers::new();
/// timers.schedule(Duration::from_millis(50), "reveal");
/// let hide = timers.schedule(Duration::from_millis(500), "hide");
/// timers.cancel(hide);
///
/// assert!(timers.advance(Duration::from_millis(40)).is_empty());
/// assert_eq!(timers.advance(Duration::from_millis(10)), vec!["reveal"]);
/// assert!(timers.is_empty());
/// ```
#[derive(Debug)]
pub struct Timers<E> {
    next_id: u64,
    pending: Vec<Pending<E>>,
}

impl<E> Timers<E> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            pending: Vec::new(),
        }
    }

    /// Schedule `effect` to come due after `delay`.
    pub fn schedule(&mut self, delay: Duration, effect: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending {
            id,
            remaining: delay,
            effect,
        });
        trace!("timer {:?} scheduled in {:?}", id, delay);
        id
    }

    /// Cancel a pending effect. Returns false if it already fired or was
    /// cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        before != self.pending.len()
    }

    /// Drop every pending effect.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Let `elapsed` pass and return the effects that came due, earliest first.
    /// Effects due at the same instant keep their scheduling order.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<E> {
        let mut due = Vec::new();
        let mut waiting = Vec::with_capacity(self.pending.len());
        for mut pending in self.pending.drain(..) {
            if pending.remaining <= elapsed {
                due.push(pending);
            } else {
                pending.remaining -= elapsed;
                waiting.push(pending);
            }
        }
        self.pending = waiting;

        due.sort_by_key(|p| (p.remaining, p.id.0));
        due.into_iter()
            .map(|p| {
                trace!("timer {:?} fired", p.id);
                p.effect
            })
            .collect()
    }
}

impl<E> Default for Timers<E> {
    fn default() -> Self {
        Self::new()
    }
}
