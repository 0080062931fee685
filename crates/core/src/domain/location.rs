// Location Domain Model

use std::collections::HashMap;

use super::entry::LocationId;
use super::error::{DomainError, Result};

/// A physical queue location with bounded concurrent-service capacity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub id: LocationId,
    /// Maximum simultaneous Active entries; immutable at runtime
    pub capacity: u32,
}

impl Location {
    pub fn new(id: impl Into<String>, capacity: u32) -> Result<Self> {
        let id = id.into();
        if capacity == 0 {
            return Err(DomainError::InvalidCapacity {
                location: id,
                capacity,
            });
        }
        Ok(Self { id, capacity })
    }
}

/// Static mapping `location_id -> capacity`, supplied at startup.
///
/// One Admission/Promotion engine pair runs parameterized by location;
/// capacity is data, not per-deployment constants.
#[derive(Debug, Clone, Default)]
pub struct LocationRegistry {
    locations: HashMap<LocationId, Location>,
}

impl LocationRegistry {
    pub fn new(locations: impl IntoIterator<Item = Location>) -> Self {
        Self {
            locations: locations.into_iter().map(|l| (l.id.clone(), l)).collect(),
        }
    }

    pub fn get(&self, location_id: &str) -> Option<&Location> {
        self.locations.get(location_id)
    }

    pub fn contains(&self, location_id: &str) -> bool {
        self.locations.contains_key(location_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.locations.values()
    }
}
