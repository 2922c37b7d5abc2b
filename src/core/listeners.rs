//! Callback registry that tolerates registration from inside a callback.

use std::cell::RefCell;

#[derive(Debug)]
pub struct Listeners<T> {
    entries: RefCell<Vec<T>>,
}

impl<T> Default for Listeners<T> {
    fn default() -> Self { Self { entries: RefCell::new(Vec::new()) } }
}

impl<T: Clone> Listeners<T> {
    pub fn new() -> Self { Self::default() }

    pub fn register(&self, entry: T) {
        self.entries.borrow_mut().push(entry);
    }

    /// Copy of the current entries. Iterate this, not the registry: a callback
    /// may register another one, which takes effect from the next dispatch.
    pub fn snapshot(&self) -> Vec<T> {
        self.entries.borrow().clone()
    }

    pub fn len(&self) -> usize { self.entries.borrow().len() }

    pub fn is_empty(&self) -> bool { self.entries.borrow().is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Clone)]
    struct Callback(Rc<dyn Fn(&Listeners<Callback>)>);

    fn dispatch(listeners: &Listeners<Callback>) {
        for Callback(callback) in listeners.snapshot() {
            callback(listeners);
        }
    }

    #[test]
    fn callback_can_register_during_dispatch() {
        let listeners: Listeners<Callback> = Listeners::new();
        let late_calls = Rc::new(Cell::new(0));

        let counter = late_calls.clone();
        listeners.register(Callback(Rc::new(move |registry: &Listeners<Callback>| {
            let counter = counter.clone();
            registry.register(Callback(Rc::new(move |_: &Listeners<Callback>| counter.set(counter.get() + 1))));
        })));

        dispatch(&listeners);
        assert_eq!(listeners.len(), 2);
        assert_eq!(late_calls.get(), 0);

        dispatch(&listeners);
        assert_eq!(late_calls.get(), 1);
        assert_eq!(listeners.len(), 3);
    }

    #[test]
    fn starts_empty() {
        let listeners: Listeners<u8> = Listeners::new();
        assert!(listeners.is_empty());
        listeners.register(7);
        assert_eq!(listeners.snapshot(), vec![7]);
    }
}
