//! Static net elements (places, transitions) and the marking that evolves over them.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::net::ids::PlaceId;
use crate::net::index_vec::IndexVec;

/// Arc weight and token count.
pub type Weight = u64;

/// A token-holding location, identified by its name.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Debug)]
pub struct Place {
    pub name: String,
}

impl Place {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A named rule. Its arcs live in the owning net's incidence tables.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Transition {
    pub name: String,
}

impl Transition {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Transition").field(&self.name).finish()
    }
}

/// Token count at every place of a net, in place declaration order.
///
/// A marking is a value: firing produces a new one and leaves the old one intact, so
/// history snapshots never alias the present state.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Marking(pub IndexVec<PlaceId, Weight>);

impl Marking {
    pub fn new(tokens: IndexVec<PlaceId, Weight>) -> Self {
        Self(tokens)
    }

    /// All places empty.
    pub fn empty(places: usize) -> Self {
        Self(IndexVec::from_elem(0, places))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlaceId, &Weight)> {
        self.0.iter_enumerated()
    }

    /// Tokens at `place`; places outside the marking hold zero.
    pub fn tokens(&self, place: PlaceId) -> Weight {
        self.0.get(place).copied().unwrap_or(0)
    }

    pub(crate) fn tokens_mut(&mut self, place: PlaceId) -> &mut Weight {
        &mut self.0[place]
    }

    pub fn total(&self) -> Weight {
        self.0.iter().sum()
    }
}

impl fmt::Debug for Marking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (place, tokens) in self.iter() {
            map.entry(&place, tokens);
        }
        map.finish()
    }
}

impl From<Vec<Weight>> for Marking {
    fn from(tokens: Vec<Weight>) -> Self {
        Self(IndexVec::from_vec(tokens))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_place_reads_as_zero() {
        let marking = Marking::from(vec![2, 1]);
        assert_eq!(marking.tokens(PlaceId::new(0)), 2);
        assert_eq!(marking.tokens(PlaceId::new(5)), 0);
        assert_eq!(marking.total(), 3);
    }

    #[test]
    fn debug_lists_places_by_id() {
        let marking = Marking::from(vec![1, 0]);
        assert_eq!(format!("{marking:?}"), "{p#0: 1, p#1: 0}");
    }
}
