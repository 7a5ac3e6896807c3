//! One running net: a controller, its history, and the viewers listening to both.
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::engine::controller::Controller;
use crate::engine::history::History;
use crate::engine::observer::{Change, ChangeCause, Observer, ObserverId, ObserverList};
use crate::net::{FireError, Marking, ModelError, Net, TransitionId};

/// The only mutation point for a net instance.
///
/// Firing goes through the [`Controller`]; every successful fire is recorded in the
/// [`History`] and the present marking is republished to the session's observers. Undo and
/// redo move the history cursor and push the marking at the new cursor back into the
/// controller, so the next fire starts from it.
///
/// The history is fed from the marking [`Controller::fire`] returns, not through a
/// subscription: the controller's own observer list stays empty inside a session, and
/// viewers subscribe here so they only ever see markings the history already holds.
#[derive(Debug)]
pub struct Session {
    controller: Controller,
    history: History,
    observers: ObserverList,
}

impl Session {
    pub fn new(net: Arc<Net>, initial: Marking) -> Result<Self, ModelError> {
        Self::with_observers(net, initial, None, ObserverList::new())
    }

    /// Starts a session and announces the initial marking to `observers`.
    pub fn with_observers(
        net: Arc<Net>,
        initial: Marking,
        history_limit: Option<usize>,
        observers: ObserverList,
    ) -> Result<Self, ModelError> {
        let controller = Controller::new(net, initial.clone())?;
        let mut session = Self {
            controller,
            history: History::with_limit(initial, history_limit),
            observers,
        };
        log::info!(
            "session started with {} places, {} transitions",
            session.net().places_len(),
            session.net().transitions_len()
        );
        session.publish(None, ChangeCause::Init);
        Ok(session)
    }

    pub fn net(&self) -> &Arc<Net> {
        self.controller.net()
    }

    pub fn history(&self) -> &History {
        &self.history
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

    pub fn current(&self) -> &Marking {
        self.history.current()
    }

    pub fn is_fireable(&self, transition: TransitionId) -> bool {
        self.controller.is_fireable(transition)
    }

    pub fn enabled_transitions(&self) -> Vec<TransitionId> {
        self.net().enabled_transitions(self.current())
    }

    pub fn fire(&mut self, transition: TransitionId) -> Result<&Marking, FireError> {
        let next = self.controller.fire(transition)?.clone();
        self.history.record_fire(next, transition);
        self.publish(Some(transition), ChangeCause::Fire);
        Ok(self.current())
    }

    pub fn fire_by_name(&mut self, name: &str) -> Result<&Marking, FireError> {
        let transition = self.net().resolve_transition(name)?;
        self.fire(transition)
    }

    /// Steps back one fire and republishes the present marking.
    ///
    /// At the start of history the cursor stays put and false is returned, but observers
    /// still receive the (unchanged) marking.
    pub fn undo(&mut self) -> bool {
        let moved = self.history.undo();
        if moved {
            self.sync_controller();
            log::debug!("undo to entry {}: {:?}", self.history.cursor(), self.current());
        } else {
            log::debug!("undo ignored at start of history");
        }
        self.publish(None, ChangeCause::Undo);
        moved
    }

    /// Re-applies the next recorded fire and republishes the present marking.
    ///
    /// At the end of history the cursor stays put and false is returned; observers are
    /// still notified with the current entry.
    pub fn redo(&mut self) -> bool {
        let moved = self.history.redo();
        if moved {
            self.sync_controller();
            log::debug!("redo to entry {}: {:?}", self.history.cursor(), self.current());
        } else {
            log::debug!("redo ignored at end of history");
        }
        let transition = self.history.current_entry().transition;
        self.publish(transition, ChangeCause::Redo);
        moved
    }

    /// Fired transitions from the initial marking to the present.
    pub fn sequence(&self) -> Vec<TransitionId> {
        self.history.sequence()
    }

    pub fn sequence_names(&self) -> Vec<String> {
        self.sequence()
            .into_iter()
            .map(|t| self.net().transition_name(t))
            .collect()
    }

    /// Starts over from `marking`, dropping all history.
    pub fn reset(&mut self, marking: Marking) -> Result<(), ModelError> {
        self.net().check_marking(&marking)?;
        self.controller.replace_marking(marking.clone());
        self.history.init(marking);
        log::info!("session reset");
        self.publish(None, ChangeCause::Init);
        Ok(())
    }

    fn sync_controller(&mut self) {
        let marking = self.history.current().clone();
        self.controller.replace_marking(marking);
    }

    fn publish(&mut self, transition: Option<TransitionId>, cause: ChangeCause) {
        self.observers.notify(&Change {
            marking: self.history.current(),
            transition,
            cause,
        });
    }
}

/// A [`Session`] behind a mutex, for callers on several threads.
///
/// Each operation holds the lock for its whole check-then-act sequence, so concurrent fires
/// on one net are serialised.
#[derive(Debug, Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<Session>>,
}

impl SharedSession {
    pub fn new(session: Session) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Locks the session for a compound operation.
    pub fn lock(&self) -> MutexGuard<'_, Session> {
        // A panicking observer cannot leave the session half-updated: the history and the
        // controller are both written before observers run.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn fire_by_name(&self, name: &str) -> Result<Marking, FireError> {
        self.lock().fire_by_name(name).cloned()
    }

    pub fn fire(&self, transition: TransitionId) -> Result<Marking, FireError> {
        self.lock().fire(transition).cloned()
    }

    pub fn undo(&self) -> bool {
        self.lock().undo()
    }

    pub fn redo(&self) -> bool {
        self.lock().redo()
    }

    pub fn current(&self) -> Marking {
        self.lock().current().clone()
    }

    pub fn sequence(&self) -> Vec<TransitionId> {
        self.lock().sequence()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::net::core::tests::{example_description, example_net};
    use crate::net::{NetDescription, TransitionDescription};

    type Seen = Arc<Mutex<Vec<(Marking, Option<TransitionId>, ChangeCause)>>>;

    fn recording() -> (ObserverList, Seen) {
        let seen: Seen = Arc::default();
        let mut observers = ObserverList::new();
        let sink = Arc::clone(&seen);
        observers.subscribe(move |change: &Change<'_>| {
            sink.lock()
                .unwrap()
                .push((change.marking.clone(), change.transition, change.cause));
        });
        (observers, seen)
    }

    fn session() -> Session {
        Session::new(Arc::new(example_net()), Marking::from(vec![1, 0])).unwrap()
    }

    #[test]
    fn walk_through_the_example_net() {
        let mut session = session();
        let t1 = session.net().transition_id("t1").unwrap();
        let t0 = session.net().transition_id("t0").unwrap();

        assert!(session.is_fireable(t1));
        assert_eq!(session.fire(t1).unwrap(), &Marking::from(vec![0, 2]));
        assert!(session.is_fireable(t0));
        assert_eq!(session.fire(t0).unwrap(), &Marking::from(vec![1, 1]));
        assert!(!session.is_fireable(t0));
        assert_eq!(session.sequence_names(), vec!["t1", "t0"]);

        assert!(session.undo());
        assert!(session.undo());
        assert_eq!(session.current(), &Marking::from(vec![1, 0]));
        assert!(session.sequence().is_empty());
        assert!(!session.undo());
    }

    #[test]
    fn fire_after_undo_starts_from_the_undone_marking() {
        let mut session = session();
        session.fire_by_name("t1").unwrap();
        session.undo();
        assert!(session.is_fireable(session.net().transition_id("t1").unwrap()));
        assert!(!session.is_fireable(session.net().transition_id("t0").unwrap()));
        session.fire_by_name("t1").unwrap();
        assert_eq!(session.current(), &Marking::from(vec![0, 2]));
    }

    #[test]
    fn new_fire_after_undo_discards_redo() {
        let mut session = session();
        session.fire_by_name("t1").unwrap();
        session.fire_by_name("t0").unwrap();
        session.undo();
        session.fire_by_name("t0").unwrap();
        assert!(!session.redo());
        assert_eq!(session.sequence_names(), vec!["t1", "t0"]);
        assert_eq!(session.history().len(), 3);
    }

    #[test]
    fn redo_restores_what_undo_left() {
        let mut session = session();
        session.fire_by_name("t1").unwrap();
        let after_fire = session.current().clone();
        session.undo();
        assert!(session.redo());
        assert_eq!(session.current(), &after_fire);
        assert!(!session.redo());
    }

    #[test]
    fn failed_fire_does_not_touch_history() {
        let (observers, seen) = recording();
        let mut session =
            Session::with_observers(Arc::new(example_net()), Marking::from(vec![1, 0]), None, observers)
                .unwrap();
        assert!(matches!(
            session.fire_by_name("t0"),
            Err(FireError::NotEnabled { .. })
        ));
        assert!(matches!(
            session.fire_by_name("t9"),
            Err(FireError::UnknownTransition(_))
        ));
        assert_eq!(session.history().len(), 1);
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn observers_get_one_notification_per_change() {
        let (observers, seen) = recording();
        let net = Arc::new(example_net());
        let t1 = net.transition_id("t1").unwrap();
        let mut session =
            Session::with_observers(net, Marking::from(vec![1, 0]), None, observers).unwrap();

        session.fire(t1).unwrap();
        session.undo();
        session.undo();
        session.redo();
        session.redo();

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                (Marking::from(vec![1, 0]), None, ChangeCause::Init),
                (Marking::from(vec![0, 2]), Some(t1), ChangeCause::Fire),
                (Marking::from(vec![1, 0]), None, ChangeCause::Undo),
                (Marking::from(vec![1, 0]), None, ChangeCause::Undo),
                (Marking::from(vec![0, 2]), Some(t1), ChangeCause::Redo),
                (Marking::from(vec![0, 2]), Some(t1), ChangeCause::Redo),
            ]
        );
    }

    #[test]
    fn undo_and_redo_at_the_boundaries_still_republish() {
        let count = Arc::new(Mutex::new(0usize));
        let mut observers = ObserverList::new();
        {
            let count = Arc::clone(&count);
            observers.subscribe(move |_: &Change<'_>| *count.lock().unwrap() += 1);
        }
        let net = Arc::new(example_net());
        let mut session =
            Session::with_observers(net, Marking::from(vec![1, 0]), None, observers).unwrap();
        assert_eq!(*count.lock().unwrap(), 1);

        assert!(!session.undo());
        assert!(!session.redo());
        assert_eq!(*count.lock().unwrap(), 3);
        assert_eq!(session.current(), &Marking::from(vec![1, 0]));
        assert_eq!(session.history().cursor(), 0);
    }

    #[test]
    fn reset_clears_history_and_announces() {
        let (observers, seen) = recording();
        let mut session =
            Session::with_observers(Arc::new(example_net()), Marking::from(vec![1, 0]), None, observers)
                .unwrap();
        session.fire_by_name("t1").unwrap();
        session.reset(Marking::from(vec![0, 3])).unwrap();

        assert_eq!(session.history().len(), 1);
        assert_eq!(session.current(), &Marking::from(vec![0, 3]));
        assert!(!session.undo());
        assert_eq!(seen.lock().unwrap().last().unwrap().2, ChangeCause::Init);
        assert_eq!(
            session.reset(Marking::from(vec![1])),
            Err(ModelError::MarkingSize {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn embedded_state_seeds_a_session() {
        let desc = example_description();
        let net = Arc::new(Net::from_description(&desc).unwrap());
        let initial = net.marking(desc.state.as_ref().unwrap()).unwrap();
        let session = Session::new(net, initial).unwrap();
        assert_eq!(session.enabled_transitions().len(), 1);
    }

    #[test]
    fn shared_session_serialises_concurrent_fires() {
        let desc = NetDescription {
            places: vec!["pool".into(), "done".into()],
            transitions: vec![TransitionDescription::new("take").pre("pool", 1).post("done", 1)],
            state: None,
        };
        let net = Arc::new(Net::from_description(&desc).unwrap());
        let shared = SharedSession::new(Session::new(net, Marking::from(vec![8, 0])).unwrap());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                thread::spawn(move || {
                    (0..4)
                        .filter(|_| shared.fire_by_name("take").is_ok())
                        .count()
                })
            })
            .collect();
        let fired: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

        assert_eq!(fired, 8);
        assert_eq!(shared.current(), Marking::from(vec![0, 8]));
        assert_eq!(shared.sequence().len(), 8);
        assert!(shared.undo());
        assert_eq!(shared.current(), Marking::from(vec![1, 7]));
        assert!(shared.redo());
    }
}
