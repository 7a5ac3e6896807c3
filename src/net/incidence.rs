//! Sparse arc tables: one column of `(place, value)` entries per transition.
use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::net::ids::{PlaceId, TransitionId};
use crate::net::index_vec::IndexVec;
use crate::net::structure::Weight;

type SmallColumn<T> = SmallVec<[T; 4]>;

/// Weighted arcs between places and transitions (either the pre or the post set).
///
/// Entries in a column keep the order they were added in, so iteration is deterministic.
/// A place appears at most once per column.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Incidence {
    columns: IndexVec<TransitionId, SmallColumn<(PlaceId, Weight)>>,
}

impl Incidence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an empty column and returns the transition it belongs to.
    pub fn push_transition(&mut self) -> TransitionId {
        self.columns.push(SmallColumn::new())
    }

    /// Adds `weight` to the arc `(place, transition)`, creating it if absent.
    pub fn add(&mut self, place: PlaceId, transition: TransitionId, weight: Weight) {
        let column = &mut self.columns[transition];
        match column.iter_mut().find(|(p, _)| *p == place) {
            Some((_, existing)) => *existing += weight,
            None => column.push((place, weight)),
        }
    }

    /// Weight of the arc `(place, transition)`, zero when there is none.
    pub fn get(&self, place: PlaceId, transition: TransitionId) -> Weight {
        self.column(transition)
            .iter()
            .find(|(p, _)| *p == place)
            .map_or(0, |(_, w)| *w)
    }

    pub fn column(&self, transition: TransitionId) -> &[(PlaceId, Weight)] {
        self.columns.get(transition).map(|c| c.as_slice()).unwrap_or_default()
    }
}

impl fmt::Debug for Incidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.columns.iter_enumerated())
            .finish()
    }
}

/// Inhibitor arcs: for each transition, the places that must be empty.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InhibitorIncidence {
    columns: IndexVec<TransitionId, SmallColumn<PlaceId>>,
}

impl InhibitorIncidence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_transition(&mut self) -> TransitionId {
        self.columns.push(SmallColumn::new())
    }

    /// Marks `place` as inhibiting `transition`. Repeated inserts are ignored.
    pub fn insert(&mut self, place: PlaceId, transition: TransitionId) {
        let column = &mut self.columns[transition];
        if !column.contains(&place) {
            column.push(place);
        }
    }

    pub fn contains(&self, place: PlaceId, transition: TransitionId) -> bool {
        self.column(transition).contains(&place)
    }

    pub fn column(&self, transition: TransitionId) -> &[PlaceId] {
        self.columns.get(transition).map(|c| c.as_slice()).unwrap_or_default()
    }
}

impl fmt::Debug for InhibitorIncidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.columns.iter_enumerated())
            .finish()
    }
}
