use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Listener<S> = Rc<dyn Fn(&S)>;

struct Registry<S> {
    next_id: u64,
    listeners: Vec<(u64, Listener<S>)>,
}

/// Holds a single state value and notifies subscribers on every change.
///
/// Listeners run in subscription order with the new state. A panicking
/// listener unwinds out of `set_state` and the remaining listeners are not
/// called for that update.
pub struct Store<S> {
    state: RefCell<Rc<S>>,
    registry: Rc<RefCell<Registry<S>>>,
}

impl<S: 'static> Store<S> {
    pub fn new(initial: S) -> Self {
        Self {
            state: RefCell::new(Rc::new(initial)),
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// The value last set, shared rather than copied.
    pub fn get_state(&self) -> Rc<S> {
        self.state.borrow().clone()
    }

    pub fn set_state(&self, next: S) {
        let next = Rc::new(next);
        *self.state.borrow_mut() = next.clone();

        // Snapshot so listeners may (un)subscribe while being notified.
        let listeners: Vec<Listener<S>> = self
            .registry
            .borrow()
            .listeners
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(&next);
        }
    }

    pub fn update_state(&self, next: S) {
        self.set_state(next);
    }

    pub fn subscribe(&self, listener: impl Fn(&S) + 'static) -> Subscription {
        let id = {
            let mut registry = self.registry.borrow_mut();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.listeners.push((id, Rc::new(listener)));
            id
        };

        let registry: Weak<RefCell<Registry<S>>> = Rc::downgrade(&self.registry);
        Subscription {
            unsubscribe: RefCell::new(Some(Box::new(move || {
                if let Some(registry) = registry.upgrade() {
                    registry.borrow_mut().listeners.retain(|(other, _)| *other != id);
                }
            }))),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.registry.borrow().listeners.len()
    }
}

/// Returned by [`Store::subscribe`]. Dropping it keeps the listener registered.
pub struct Subscription {
    unsubscribe: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl Subscription {
    /// Removes exactly the listener this subscription registered. Later calls do nothing.
    pub fn unsubscribe(&self) {
        let unsubscribe = self.unsubscribe.borrow_mut().take();
        if let Some(unsubscribe) = unsubscribe {
            unsubscribe();
        }
    }
}
