use std::sync::{Arc, Mutex};

use petri_stepper::engine::{Change, ChangeCause, ObserverList, Session};
use petri_stepper::net::{self, FireError, Marking, ModelError, Net, NetDescription};

const EXAMPLE: &str = include_str!("../nets/example.json");
const MUTEX: &str = include_str!("../nets/mutex.ron");

fn load(desc: &NetDescription) -> Session {
    let net = Arc::new(Net::from_description(desc).unwrap());
    let initial = net.marking(desc.state.as_ref().unwrap()).unwrap();
    Session::new(net, initial).unwrap()
}

fn marking(session: &Session, pairs: &[(&str, u64)]) -> Marking {
    let desc: net::MarkingDescription = pairs.iter().map(|&(p, n)| (p.to_owned(), n)).collect();
    session.net().marking(&desc).unwrap()
}

#[test]
fn example_net_steps_forward_and_back() {
    let desc: NetDescription = net::io::from_json_str(EXAMPLE).unwrap();
    let mut session = load(&desc);
    let t1 = session.net().transition_id("t1").unwrap();
    let t0 = session.net().transition_id("t0").unwrap();

    assert!(session.is_fireable(t1));
    session.fire(t1).unwrap();
    assert_eq!(session.current(), &marking(&session, &[("p0", 0), ("p1", 2)]));

    assert!(session.is_fireable(t0));
    session.fire(t0).unwrap();
    assert_eq!(session.current(), &marking(&session, &[("p0", 1), ("p1", 1)]));
    assert!(!session.is_fireable(t0));

    assert!(session.undo());
    assert!(session.undo());
    assert_eq!(session.current(), &marking(&session, &[("p0", 1), ("p1", 0)]));
    assert!(session.sequence().is_empty());
}

#[test]
fn undo_round_trips_any_run() {
    let desc: NetDescription = net::io::from_ron_str(MUTEX).unwrap();
    let mut session = load(&desc);
    let script = ["acquire_a", "release_a", "acquire_b", "release_b", "acquire_a"];

    let mut before = Vec::new();
    for name in script {
        before.push(session.current().clone());
        session.fire_by_name(name).unwrap();
        assert_eq!(session.sequence().len(), session.history().cursor());
    }
    assert_eq!(session.sequence_names(), script);

    while let Some(expected) = before.pop() {
        assert!(session.undo());
        assert_eq!(session.current(), &expected);
    }
    assert!(!session.undo());
}

#[test]
fn greedy_walk_keeps_mutex_invariants() {
    let desc: NetDescription = net::io::from_ron_str(MUTEX).unwrap();
    let mut session = load(&desc);
    let place = |name: &str| session.net().place_id(name).unwrap();
    let (lock, idle_a, busy_a, idle_b, busy_b) = (
        place("lock"),
        place("idle_a"),
        place("busy_a"),
        place("idle_b"),
        place("busy_b"),
    );

    // Greedy walk: always fire the first enabled transition.
    for _ in 0..20 {
        let enabled = session.enabled_transitions();
        let Some(&next) = enabled.first() else {
            break;
        };
        session.fire(next).unwrap();

        let m = session.current();
        assert_eq!(m.tokens(lock) + m.tokens(busy_a) + m.tokens(busy_b), 1);
        assert_eq!(m.tokens(idle_a) + m.tokens(busy_a), 1);
        assert_eq!(m.tokens(idle_b) + m.tokens(busy_b), 1);
    }
    assert_eq!(session.sequence().len(), 20);
}

#[test]
fn mutual_exclusion_blocks_second_acquire() {
    let desc: NetDescription = net::io::from_ron_str(MUTEX).unwrap();
    let mut session = load(&desc);
    session.fire_by_name("acquire_a").unwrap();
    assert!(matches!(
        session.fire_by_name("acquire_b"),
        Err(FireError::NotEnabled { .. })
    ));
    assert_eq!(session.sequence_names(), vec!["acquire_a"]);
}

#[test]
fn branching_after_undo_drops_the_old_future() {
    let desc: NetDescription = net::io::from_ron_str(MUTEX).unwrap();
    let mut session = load(&desc);
    session.fire_by_name("acquire_a").unwrap();
    session.undo();
    session.fire_by_name("acquire_b").unwrap();
    assert!(!session.redo());
    assert_eq!(session.sequence_names(), vec!["acquire_b"]);
}

#[test]
fn viewers_see_every_change_in_order() {
    let desc: NetDescription = net::io::from_json_str(EXAMPLE).unwrap();
    let net = Arc::new(Net::from_description(&desc).unwrap());
    let initial = net.marking(desc.state.as_ref().unwrap()).unwrap();

    let causes = Arc::new(Mutex::new(Vec::new()));
    let mut observers = ObserverList::new();
    {
        let causes = Arc::clone(&causes);
        observers.subscribe(move |change: &Change<'_>| causes.lock().unwrap().push(change.cause));
    }
    let mut session = Session::with_observers(net, initial, None, observers).unwrap();
    session.fire_by_name("t1").unwrap();
    assert!(session.fire_by_name("t1").is_err());
    session.undo();
    session.undo();
    session.redo();

    assert_eq!(
        *causes.lock().unwrap(),
        vec![
            ChangeCause::Init,
            ChangeCause::Fire,
            ChangeCause::Undo,
            ChangeCause::Undo,
            ChangeCause::Redo
        ]
    );
}

#[test]
fn invalid_descriptions_are_rejected() {
    let raw = r#"{ "places": ["a"], "transitions": [
        { "name": "t", "preconditions": { "b": 1 } }
    ] }"#;
    let desc: NetDescription = net::io::from_json_str(raw).unwrap();
    assert!(matches!(
        Net::from_description(&desc),
        Err(ModelError::UndeclaredPlace { .. })
    ));
}
