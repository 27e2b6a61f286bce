use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::dom::DomError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntervalId(i32);

impl IntervalId {
    pub fn new(raw: i32) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> i32 {
        self.0
    }
}

/// Repeating timers, `setInterval` style.
pub trait Scheduler {
    fn set_interval(&self, period_ms: u32, callback: Rc<dyn Fn()>) -> Result<IntervalId, DomError>;
    /// Clearing an unknown or already cleared interval does nothing.
    fn clear_interval(&self, id: IntervalId);
}

/// Owns whatever keeps each scheduled callback alive (a JS closure in the
/// browser). A callback cleared while any callback is running is parked and
/// released at the next `insert` or `remove` made outside a callback.
pub struct IntervalSlots<C> {
    active: RefCell<HashMap<IntervalId, C>>,
    retired: RefCell<Vec<C>>,
    firing: Rc<Cell<usize>>,
}

impl<C> Default for IntervalSlots<C> {
    fn default() -> Self {
        Self {
            active: RefCell::new(HashMap::new()),
            retired: RefCell::new(Vec::new()),
            firing: Rc::new(Cell::new(0)),
        }
    }
}

impl<C> IntervalSlots<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter to hand to [`FiringGuard::enter`] from inside a callback.
    pub fn firing(&self) -> Rc<Cell<usize>> {
        self.firing.clone()
    }

    pub fn insert(&self, id: IntervalId, slot: C) {
        self.release_retired();
        self.active.borrow_mut().insert(id, slot);
    }

    pub fn remove(&self, id: IntervalId) {
        let removed = self.active.borrow_mut().remove(&id);
        if let Some(slot) = removed {
            if self.firing.get() > 0 {
                self.retired.borrow_mut().push(slot);
            } else {
                drop(slot);
            }
        }
        self.release_retired();
    }

    pub fn active_count(&self) -> usize {
        self.active.borrow().len()
    }

    pub fn retired_count(&self) -> usize {
        self.retired.borrow().len()
    }

    fn release_retired(&self) {
        if self.firing.get() == 0 {
            let released = std::mem::take(&mut *self.retired.borrow_mut());
            drop(released);
        }
    }
}

/// Marks a callback as running until dropped.
pub struct FiringGuard(Rc<Cell<usize>>);

impl FiringGuard {
    pub fn enter(firing: &Rc<Cell<usize>>) -> Self {
        firing.set(firing.get() + 1);
        Self(firing.clone())
    }
}

impl Drop for FiringGuard {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}

struct ManualInterval {
    id: IntervalId,
    period_ms: u32,
    callback: Rc<dyn Fn()>,
}

/// Scheduler driven by hand: nothing fires until [`ManualScheduler::fire`].
#[derive(Clone, Default)]
pub struct ManualScheduler {
    next_id: Rc<Cell<i32>>,
    active: Rc<RefCell<Vec<ManualInterval>>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_count(&self) -> usize {
        self.active.borrow().len()
    }

    pub fn period_ms(&self, id: IntervalId) -> Option<u32> {
        self.active
            .borrow()
            .iter()
            .find(|interval| interval.id == id)
            .map(|interval| interval.period_ms)
    }

    /// Elapses one period of every active interval. Returns how many fired.
    pub fn fire(&self) -> usize {
        let due: Vec<(IntervalId, Rc<dyn Fn()>)> = self
            .active
            .borrow()
            .iter()
            .map(|interval| (interval.id, interval.callback.clone()))
            .collect();

        let mut fired = 0;
        for (id, callback) in due {
            // An earlier callback may have cleared this one.
            let still_active = self.active.borrow().iter().any(|interval| interval.id == id);
            if still_active {
                callback();
                fired += 1;
            }
        }
        fired
    }
}

impl Scheduler for ManualScheduler {
    fn set_interval(&self, period_ms: u32, callback: Rc<dyn Fn()>) -> Result<IntervalId, DomError> {
        let id = IntervalId::new(self.next_id.get() + 1);
        self.next_id.set(id.raw());
        self.active.borrow_mut().push(ManualInterval { id, period_ms, callback });
        Ok(id)
    }

    fn clear_interval(&self, id: IntervalId) {
        self.active.borrow_mut().retain(|interval| interval.id != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fire_runs_each_active_interval() {
        let scheduler = ManualScheduler::new();
        let count = Rc::new(Cell::new(0));
        let counter = count.clone();
        let id = scheduler
            .set_interval(1000, Rc::new(move || counter.set(counter.get() + 1)))
            .unwrap();

        assert_eq!(scheduler.fire(), 1);
        assert_eq!(scheduler.fire(), 1);
        assert_eq!(count.get(), 2);
        assert_eq!(scheduler.period_ms(id), Some(1000));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let scheduler = ManualScheduler::new();
        let id = scheduler.set_interval(1000, Rc::new(|| {})).unwrap();

        scheduler.clear_interval(id);
        scheduler.clear_interval(id);

        assert_eq!(scheduler.active_count(), 0);
        assert_eq!(scheduler.fire(), 0);
    }

    #[test]
    fn test_callback_may_clear_itself() {
        let scheduler = ManualScheduler::new();
        let slot: Rc<Cell<Option<IntervalId>>> = Rc::new(Cell::new(None));
        let own = slot.clone();
        let handle = scheduler.clone();
        let id = scheduler
            .set_interval(1000, Rc::new(move || {
                if let Some(id) = own.get() {
                    handle.clear_interval(id);
                }
            }))
            .unwrap();
        slot.set(Some(id));

        assert_eq!(scheduler.fire(), 1);
        assert_eq!(scheduler.fire(), 0);
    }

    struct Tracked(Rc<Cell<usize>>);

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_slot_cleared_outside_callback_is_dropped_at_once() {
        let slots = IntervalSlots::new();
        let dropped = Rc::new(Cell::new(0));
        slots.insert(IntervalId::new(1), Tracked(dropped.clone()));

        slots.remove(IntervalId::new(1));

        assert_eq!(dropped.get(), 1);
        assert_eq!(slots.active_count(), 0);
        assert_eq!(slots.retired_count(), 0);
    }

    #[test]
    fn test_slot_cleared_inside_callback_is_parked_until_idle() {
        let slots = IntervalSlots::new();
        let dropped = Rc::new(Cell::new(0));
        slots.insert(IntervalId::new(1), Tracked(dropped.clone()));

        let firing = slots.firing();
        {
            let _running = FiringGuard::enter(&firing);
            slots.remove(IntervalId::new(1));
            assert_eq!(dropped.get(), 0);
            assert_eq!(slots.retired_count(), 1);
        }

        slots.remove(IntervalId::new(7));

        assert_eq!(dropped.get(), 1);
        assert_eq!(slots.retired_count(), 0);
    }
}
