//! # Place/transition nets with inhibitor arcs
//!
//! A net has places `P` and transitions `T`. Each transition `t` carries a pre set
//! `Pre(·, t)`, a post set `Post(·, t)` (positive weights) and a set of inhibitor places
//! `I(t)`. For a marking `M ∈ ℕ^{|P|}`:
//!
//! * `t` is **enabled** iff `∀p: M[p] ≥ Pre(p, t)` and `∀p ∈ I(t): M[p] = 0`;
//! * **firing** `t` yields `M'[p] = M[p] - Pre(p, t) + Post(p, t)`; `M` itself is unchanged.
//!
//! ## Example
//!
//! ```rust
//! use petri_stepper::net::*;
//!
//! let desc = NetDescription {
//!     places: vec!["p0".into(), "p1".into()],
//!     transitions: vec![TransitionDescription::new("t1").pre("p0", 1).post("p1", 2)],
//!     state: None,
//! };
//! let net = Net::from_description(&desc).unwrap();
//! let t1 = net.transition_id("t1").unwrap();
//!
//! let marking = Marking::from(vec![1, 0]);
//! assert_eq!(net.enabled_transitions(&marking), vec![t1]);
//! let next = net.fire(&marking, t1).unwrap();
//! assert_eq!(next, Marking::from(vec![0, 2]));
//! ```

pub mod core;
pub mod ids;
pub mod incidence;
pub mod index_vec;
pub mod io;
pub mod structure;

pub use self::core::{FireError, ModelError, Net};
pub use ids::{PlaceId, TransitionId};
pub use incidence::{Incidence, InhibitorIncidence};
pub use index_vec::{Idx, IndexVec};
pub use io::{Format, IoError, MarkingDescription, NetDescription, TransitionDescription};
pub use structure::{Marking, Place, Transition, Weight};
