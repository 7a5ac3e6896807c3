//! Execution engine for place/transition Petri nets with inhibitor arcs.
//!
//! [`net`] holds the immutable net model and the firing rule; [`engine`] steps one net
//! instance forward through a controller and keeps a linear undo/redo history of markings.

pub mod config;
pub mod engine;
pub mod net;
pub mod options;

pub use engine::{Change, ChangeCause, Controller, History, Observer, Session, SharedSession};
pub use net::{FireError, Marking, ModelError, Net, NetDescription, PlaceId, TransitionId};
