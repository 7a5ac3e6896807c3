//! The net itself and the firing rule: enablement and successor markings.
use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use crate::net::ids::{PlaceId, TransitionId};
use crate::net::incidence::{Incidence, InhibitorIncidence};
use crate::net::index_vec::{Idx, IndexVec};
use crate::net::io::{MarkingDescription, NetDescription, TransitionDescription};
use crate::net::structure::{Marking, Place, Transition, Weight};

/// Rejected net descriptions. Construction either succeeds fully or yields one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("place `{0}` is declared twice")]
    DuplicatePlace(String),
    #[error("transition `{0}` is declared twice")]
    DuplicateTransition(String),
    #[error("transition `{transition}` references undeclared place `{place}`")]
    UndeclaredPlace { transition: String, place: String },
    #[error("transition `{transition}` has a zero-weight arc on place `{place}`")]
    ZeroWeight { transition: String, place: String },
    #[error("marking references undeclared place `{0}`")]
    UndeclaredMarkingPlace(String),
    #[error("marking has {actual} places, the net declares {expected}")]
    MarkingSize { expected: usize, actual: usize },
}

/// Reasons a transition could not be fired. The marking is never touched when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FireError {
    #[error("unknown transition `{0}`")]
    UnknownTransition(String),
    #[error("transition {0:?} is out of bounds")]
    OutOfBounds(TransitionId),
    #[error("transition `{transition}` is not enabled under the current marking")]
    NotEnabled { transition: String },
    #[error("firing `{transition}` overflows the token count of place {place:?}")]
    Overflow {
        transition: String,
        place: PlaceId,
    },
}

/// An immutable place/transition net with inhibitor arcs.
///
/// Built once from a [`NetDescription`] and shared read-only afterwards; nothing mutates it
/// after [`Net::from_description`] returns.
#[derive(Clone)]
pub struct Net {
    places: IndexVec<PlaceId, Place>,
    transitions: IndexVec<TransitionId, Transition>,
    pre: Incidence,
    post: Incidence,
    inhibitor: InhibitorIncidence,
    place_names: HashMap<String, PlaceId>,
    transition_names: HashMap<String, TransitionId>,
}

impl fmt::Debug for Net {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Net")
            .field("places", &self.places)
            .field("transitions", &self.transitions)
            .field("pre", &self.pre)
            .field("post", &self.post)
            .field("inhibitor", &self.inhibitor)
            .finish()
    }
}

impl Net {
    /// Validates `desc` and builds the net.
    pub fn from_description(desc: &NetDescription) -> Result<Self, ModelError> {
        let mut places = IndexVec::with_capacity(desc.places.len());
        let mut place_names = HashMap::with_capacity(desc.places.len());
        for name in &desc.places {
            if place_names.contains_key(name) {
                return Err(ModelError::DuplicatePlace(name.clone()));
            }
            let id = places.push(Place::new(name.as_str()));
            place_names.insert(name.clone(), id);
        }

        let mut transitions = IndexVec::with_capacity(desc.transitions.len());
        let mut transition_names = HashMap::with_capacity(desc.transitions.len());
        let mut pre = Incidence::new();
        let mut post = Incidence::new();
        let mut inhibitor = InhibitorIncidence::new();

        for trans in &desc.transitions {
            if transition_names.contains_key(&trans.name) {
                return Err(ModelError::DuplicateTransition(trans.name.clone()));
            }
            let id = transitions.push(Transition::new(trans.name.as_str()));
            pre.push_transition();
            post.push_transition();
            inhibitor.push_transition();
            transition_names.insert(trans.name.clone(), id);

            let resolve = |place: &String| {
                place_names
                    .get(place)
                    .copied()
                    .ok_or_else(|| ModelError::UndeclaredPlace {
                        transition: trans.name.clone(),
                        place: place.clone(),
                    })
            };
            let check_weight = |place: &String, weight: Weight| {
                if weight == 0 {
                    Err(ModelError::ZeroWeight {
                        transition: trans.name.clone(),
                        place: place.clone(),
                    })
                } else {
                    Ok(weight)
                }
            };

            for (place, &weight) in &trans.preconditions {
                pre.add(resolve(place)?, id, check_weight(place, weight)?);
            }
            for (place, &weight) in &trans.postconditions {
                post.add(resolve(place)?, id, check_weight(place, weight)?);
            }
            for place in &trans.inhibitors {
                inhibitor.insert(resolve(place)?, id);
            }
        }

        log::debug!(
            "built net with {} places and {} transitions",
            places.len(),
            transitions.len()
        );

        Ok(Self {
            places,
            transitions,
            pre,
            post,
            inhibitor,
            place_names,
            transition_names,
        })
    }

    /// Converts the net back into its wire shape. `state` is left empty.
    pub fn to_description(&self) -> NetDescription {
        let name = |place: PlaceId| self.places[place].name.clone();
        NetDescription {
            places: self.places.iter().map(|p| p.name.clone()).collect(),
            transitions: self
                .transitions
                .iter_enumerated()
                .map(|(id, t)| TransitionDescription {
                    name: t.name.clone(),
                    preconditions: self.pre.column(id).iter().map(|&(p, w)| (name(p), w)).collect(),
                    postconditions: self.post.column(id).iter().map(|&(p, w)| (name(p), w)).collect(),
                    inhibitors: self.inhibitor.column(id).iter().map(|&p| name(p)).collect(),
                })
                .collect(),
            state: None,
        }
    }

    pub fn places_len(&self) -> usize {
        self.places.len()
    }

    pub fn transitions_len(&self) -> usize {
        self.transitions.len()
    }

    pub fn places(&self) -> impl Iterator<Item = (PlaceId, &Place)> {
        self.places.iter_enumerated()
    }

    pub fn transitions(&self) -> impl Iterator<Item = (TransitionId, &Transition)> {
        self.transitions.iter_enumerated()
    }

    pub fn place(&self, place: PlaceId) -> Option<&Place> {
        self.places.get(place)
    }

    pub fn transition(&self, transition: TransitionId) -> Option<&Transition> {
        self.transitions.get(transition)
    }

    pub fn place_id(&self, name: &str) -> Option<PlaceId> {
        self.place_names.get(name).copied()
    }

    pub fn transition_id(&self, name: &str) -> Option<TransitionId> {
        self.transition_names.get(name).copied()
    }

    /// Like [`Net::transition_id`], failing with [`FireError::UnknownTransition`].
    pub fn resolve_transition(&self, name: &str) -> Result<TransitionId, FireError> {
        self.transition_id(name)
            .ok_or_else(|| FireError::UnknownTransition(name.to_owned()))
    }

    /// Transition name for display; out-of-range ids render as their debug form.
    pub fn transition_name(&self, transition: TransitionId) -> String {
        self.transitions
            .get(transition)
            .map_or_else(|| format!("{transition:?}"), |t| t.name.clone())
    }

    pub fn preconditions(&self, transition: TransitionId) -> &[(PlaceId, Weight)] {
        self.pre.column(transition)
    }

    pub fn postconditions(&self, transition: TransitionId) -> &[(PlaceId, Weight)] {
        self.post.column(transition)
    }

    pub fn inhibitors(&self, transition: TransitionId) -> &[PlaceId] {
        self.inhibitor.column(transition)
    }

    /// Net token change at `place` when `transition` fires (post minus pre).
    ///
    /// Widened to `i128` so the difference of any two weights is exact.
    pub fn effect(&self, transition: TransitionId, place: PlaceId) -> i128 {
        i128::from(self.post.get(place, transition)) - i128::from(self.pre.get(place, transition))
    }

    /// Builds a full marking from a sparse name-keyed one.
    pub fn marking(&self, desc: &MarkingDescription) -> Result<Marking, ModelError> {
        let mut marking = Marking::empty(self.places_len());
        for (name, &tokens) in desc {
            let place = self
                .place_id(name)
                .ok_or_else(|| ModelError::UndeclaredMarkingPlace(name.clone()))?;
            *marking.tokens_mut(place) = tokens;
        }
        Ok(marking)
    }

    /// Name-keyed view of `marking`, every place in declaration order.
    pub fn describe_marking(&self, marking: &Marking) -> MarkingDescription {
        self.places
            .iter_enumerated()
            .map(|(id, place)| (place.name.clone(), marking.tokens(id)))
            .collect()
    }

    /// Checks that `marking` was sized for this net.
    pub fn check_marking(&self, marking: &Marking) -> Result<(), ModelError> {
        if marking.len() == self.places_len() {
            Ok(())
        } else {
            Err(ModelError::MarkingSize {
                expected: self.places_len(),
                actual: marking.len(),
            })
        }
    }

    /// All transitions enabled under `marking`, in declaration order.
    pub fn enabled_transitions(&self, marking: &Marking) -> Vec<TransitionId> {
        self.transitions
            .indices()
            .filter(|&t| self.is_enabled(marking, t))
            .collect()
    }

    /// Whether `transition` may fire under `marking`.
    ///
    /// Every precondition place must hold at least the arc weight and every inhibitor place
    /// must be empty. A precondition and an inhibitor on the same place are checked
    /// independently. Unknown transitions are never enabled.
    pub fn is_enabled(&self, marking: &Marking, transition: TransitionId) -> bool {
        if transition.index() >= self.transitions_len() {
            return false;
        }
        let inputs_covered = self
            .pre
            .column(transition)
            .iter()
            .all(|&(place, weight)| marking.tokens(place) >= weight);
        let inhibitors_empty = self
            .inhibitor
            .column(transition)
            .iter()
            .all(|&place| marking.tokens(place) == 0);
        inputs_covered && inhibitors_empty
    }

    /// Fires `transition`, returning the successor marking. `marking` is left untouched.
    ///
    /// Preconditions are subtracted before postconditions are added, so a place on both
    /// sides changes by `post - pre`.
    pub fn fire(&self, marking: &Marking, transition: TransitionId) -> Result<Marking, FireError> {
        if transition.index() >= self.transitions_len() {
            return Err(FireError::OutOfBounds(transition));
        }
        if !self.is_enabled(marking, transition) {
            return Err(FireError::NotEnabled {
                transition: self.transition_name(transition),
            });
        }

        let mut next = marking.clone();
        if next.len() < self.places_len() {
            next = Marking::new(
                self.places
                    .indices()
                    .map(|place| marking.tokens(place))
                    .collect(),
            );
        }

        for &(place, weight) in self.pre.column(transition) {
            // Enablement guarantees the subtraction cannot underflow.
            *next.tokens_mut(place) -= weight;
        }
        for &(place, weight) in self.post.column(transition) {
            let tokens = next.tokens_mut(place);
            *tokens = tokens
                .checked_add(weight)
                .ok_or_else(|| FireError::Overflow {
                    transition: self.transition_name(transition),
                    place,
                })?;
        }

        Ok(next)
    }
}
