//! Ordered store of placed measurement points.
//!
//! Insertion order is significant: it defines path direction and polygon
//! winding, so points live in a `Vec` rather than a map. Ids come from a
//! monotonic counter scoped to the store, which keeps them strictly
//! increasing and collision-free regardless of how quickly toggles arrive.

use crate::geometry::LonLat;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for a placed point. Strictly increasing per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PointId(pub u64);

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A point placed during the session. Created on add, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacedPoint {
    pub id: PointId,
    pub coordinate: LonLat,
}

/// What a toggle did to the store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToggleOutcome {
    /// No existing point was hit; a new one was appended.
    Added(PointId),
    /// The hit point was removed.
    Removed(PlacedPoint),
    /// The hit-test named an id the store no longer holds. No-op.
    Ignored(PointId),
}

/// Ordered, uniquely-identified collection of placed points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointStore {
    points: Vec<PlacedPoint>,
    next_id: u64,
}

impl PointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add-or-remove at a location. The hit-test against currently rendered
    /// points is the rendering collaborator's job; its result comes in as
    /// `hit`. A hit removes that point, otherwise a new point is appended
    /// with a freshly minted id.
    pub fn toggle(&mut self, hit: Option<PointId>, coordinate: LonLat) -> ToggleOutcome {
        match hit {
            Some(id) => match self.remove(id) {
                Some(point) => ToggleOutcome::Removed(point),
                None => ToggleOutcome::Ignored(id),
            },
            None => ToggleOutcome::Added(self.push(coordinate)),
        }
    }

    /// Append a new point, minting its id.
    pub fn push(&mut self, coordinate: LonLat) -> PointId {
        let id = self.mint_id();
        self.points.push(PlacedPoint { id, coordinate });
        id
    }

    /// Remove a point by id, preserving the order of the remainder.
    /// Removing an id that is not present is a no-op.
    pub fn remove(&mut self, id: PointId) -> Option<PlacedPoint> {
        let index = self.points.iter().position(|p| p.id == id)?;
        Some(self.points.remove(index))
    }

    pub fn clear(&mut self) {
        // The id counter is deliberately not reset: ids stay unique for the
        // lifetime of the store even across clears.
        self.points.clear();
    }

    pub fn points(&self) -> &[PlacedPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn mint_id(&mut self) -> PointId {
        let id = PointId(self.next_id);
        self.next_id += 1;
        id
    }
}
