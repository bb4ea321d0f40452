//! Cross-filter event bus.
//!
//! The trails dashboard owns one [`Dispatcher`]. Toggling a bar publishes a
//! [`FilterEvent::FilterCategories`] carrying the new [`SelectionSet`]; every
//! subscribed chart receives it synchronously, in subscription order.

use anyhow::Result;
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

/// Category labels currently toggled on. Empty means "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    categories: BTreeSet<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `category`; returns whether it is now selected
    pub fn toggle(&mut self, category: &str) -> bool {
        if self.categories.remove(category) {
            false
        } else {
            self.categories.insert(category.to_string());
            true
        }
    }

    pub fn contains(&self, category: &str) -> bool {
        self.categories.contains(category)
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn clear(&mut self) {
        self.categories.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for SelectionSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            categories: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for SelectionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.iter().collect::<Vec<_>>().join(", "))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterEvent {
    /// The `filterCategories` channel
    FilterCategories(SelectionSet),
}

impl FilterEvent {
    pub fn channel(&self) -> &'static str {
        match self {
            FilterEvent::FilterCategories(_) => "filterCategories",
        }
    }
}

pub type Listener = Box<dyn FnMut(&FilterEvent) -> Result<()>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(usize);

#[derive(Default)]
pub struct Dispatcher {
    next_id: usize,
    listeners: Vec<(ListenerId, Listener)>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&FilterEvent) -> Result<()> + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false when `id` was not subscribed
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Deliver `event` to every listener. All listeners run; the first error is returned.
    pub fn publish(&mut self, event: &FilterEvent) -> Result<()> {
        let FilterEvent::FilterCategories(selection) = event;
        debug!(channel = event.channel(), selection = %selection, listeners = self.listeners.len(), "publish");

        let mut first_error = None;
        for (_, listener) in self.listeners.iter_mut() {
            if let Err(e) = listener(event) {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_toggle_membership() {
        let mut set = SelectionSet::new();
        assert!(set.toggle("Easy"));
        assert!(set.toggle("Difficult"));
        assert!(!set.toggle("Easy"));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["Difficult"]);
        assert!(!set.toggle("Difficult"));
        assert!(set.is_empty());
    }

    #[test]
    fn test_publish_in_subscription_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut dispatcher = Dispatcher::new();
        for name in ["first", "second"] {
            let log = Rc::clone(&log);
            dispatcher.subscribe(move |event| {
                let FilterEvent::FilterCategories(sel) = event;
                log.borrow_mut().push(format!("{name}:{sel}"));
                Ok(())
            });
        }

        let selection: SelectionSet = ["Easy"].into_iter().collect();
        dispatcher.publish(&FilterEvent::FilterCategories(selection)).unwrap();
        assert_eq!(*log.borrow(), vec!["first:[Easy]", "second:[Easy]"]);
    }

    #[test]
    fn test_publish_runs_all_listeners_on_error() {
        let calls = Rc::new(RefCell::new(0));
        let mut dispatcher = Dispatcher::new();
        dispatcher.subscribe(|_| Err(anyhow::anyhow!("first failed")));
        let counter = Rc::clone(&calls);
        dispatcher.subscribe(move |_| {
            *counter.borrow_mut() += 1;
            Ok(())
        });

        let err = dispatcher
            .publish(&FilterEvent::FilterCategories(SelectionSet::new()))
            .unwrap_err();
        assert_eq!(err.to_string(), "first failed");
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn test_unsubscribe() {
        let mut dispatcher = Dispatcher::new();
        let a = dispatcher.subscribe(|_| Ok(()));
        let _b = dispatcher.subscribe(|_| Ok(()));
        assert!(dispatcher.unsubscribe(a));
        assert!(!dispatcher.unsubscribe(a));
        assert_eq!(dispatcher.listener_count(), 1);
    }
}
