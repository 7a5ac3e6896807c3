//! Holds the present marking of one net and fires transitions against it.
use std::sync::Arc;

use crate::engine::observer::{Change, ChangeCause, Observer, ObserverId, ObserverList};
use crate::net::{FireError, Marking, ModelError, Net, TransitionId};

/// Gates firing through the net's enablement rule and publishes every successful fire.
#[derive(Debug)]
pub struct Controller {
    net: Arc<Net>,
    marking: Marking,
    observers: ObserverList,
}

impl Controller {
    pub fn new(net: Arc<Net>, marking: Marking) -> Result<Self, ModelError> {
        net.check_marking(&marking)?;
        Ok(Self {
            net,
            marking,
            observers: ObserverList::new(),
        })
    }

    pub fn net(&self) -> &Arc<Net> {
        &self.net
    }

    pub fn marking(&self) -> &Marking {
        &self.marking
    }

    pub fn subscribe<O>(&mut self, observer: O) -> ObserverId
    where
        O: Observer + Send + 'static,
    {
        self.observers.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    pub fn is_fireable(&self, transition: TransitionId) -> bool {
        self.net.is_enabled(&self.marking, transition)
    }

    /// Fires `transition` and returns the new marking.
    ///
    /// On error the present marking is unchanged and no observer is notified.
    pub fn fire(&mut self, transition: TransitionId) -> Result<&Marking, FireError> {
        let next = self.net.fire(&self.marking, transition).inspect_err(|err| {
            log::debug!("rejected fire of {transition:?}: {err}");
        })?;
        self.marking = next;
        log::debug!(
            "fired `{}`, marking is now {:?}",
            self.net.transition_name(transition),
            self.marking
        );
        self.observers.notify(&Change {
            marking: &self.marking,
            transition: Some(transition),
            cause: ChangeCause::Fire,
        });
        Ok(&self.marking)
    }

    pub fn fire_by_name(&mut self, name: &str) -> Result<&Marking, FireError> {
        let transition = self.net.resolve_transition(name)?;
        self.fire(transition)
    }

    /// Replaces the present marking without notifying, e.g. when history moves the cursor.
    pub(crate) fn replace_marking(&mut self, marking: Marking) {
        self.marking = marking;
    }
}
