//! Change notifications and the ordered list of subscribers that receive them.
use std::sync::Arc;

use crate::net::{Marking, Net, TransitionId};

/// What caused a marking change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeCause {
    Init,
    Fire,
    Undo,
    Redo,
}

/// A marking-change notification.
///
/// The marking is only borrowed for the duration of the callback; observers that need it
/// afterwards clone it. `transition` is informational: set for fires and redos, absent for
/// init and undo.
#[derive(Debug, Clone, Copy)]
pub struct Change<'a> {
    pub marking: &'a Marking,
    pub transition: Option<TransitionId>,
    pub cause: ChangeCause,
}

/// Receives marking changes.
///
/// Closures taking `&Change` implement this automatically.
pub trait Observer {
    fn on_change(&mut self, change: &Change<'_>);
}

impl<F> Observer for F
where
    F: FnMut(&Change<'_>),
{
    fn on_change(&mut self, change: &Change<'_>) {
        self(change)
    }
}

/// Handle returned by [`ObserverList::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Observers in registration order.
#[derive(Default)]
pub struct ObserverList {
    observers: Vec<(ObserverId, Box<dyn Observer + Send>)>,
    next_id: u64,
}

impl ObserverList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<O>(&mut self, observer: O) -> ObserverId
    where
        O: Observer + Send + 'static,
    {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Removes an observer. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Delivers `change` to every observer, oldest registration first.
    pub fn notify(&mut self, change: &Change<'_>) {
        for (_, observer) in self.observers.iter_mut() {
            observer.on_change(change);
        }
    }
}

/// Logs every change at `info` level, naming places and transitions.
pub struct LogObserver {
    net: Arc<Net>,
}

impl LogObserver {
    pub fn new(net: Arc<Net>) -> Self {
        Self { net }
    }
}

impl Observer for LogObserver {
    fn on_change(&mut self, change: &Change<'_>) {
        let marking = self.net.describe_marking(change.marking);
        match change.transition {
            Some(transition) => log::info!(
                "{:?} `{}` -> {:?}",
                change.cause,
                self.net.transition_name(transition),
                marking
            ),
            None => log::info!("{:?} -> {:?}", change.cause, marking),
        }
    }
}

impl std::fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverList")
            .field("len", &self.observers.len())
            .finish()
    }
}
