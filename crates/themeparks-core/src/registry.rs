//! Per-park ride registry.
//!
//! Vendor ids are only unique within one vendor, so every ride is stored
//! under a namespaced key (`<namespace>_<id>`). Rides are created on first
//! reference and live for as long as the registry does.

use std::collections::HashMap;

use chrono_tz::Tz;
use tracing::{debug, trace};

use crate::error::{CoreError, CoreResult};
use crate::ride::{Ride, RideSnapshot};

/// De-duplicated collection of rides for one park.
#[derive(Debug, Clone)]
pub struct Registry {
    namespace: String,
    timezone: Tz,
    rides: Vec<Ride>,
    index: HashMap<String, usize>,
}

impl Registry {
    /// Creates an empty registry. New rides get schedules in `timezone`.
    pub fn new(namespace: impl Into<String>, timezone: Tz) -> CoreResult<Self> {
        let namespace = namespace.into();
        if namespace.is_empty() {
            return Err(CoreError::missing("namespace"));
        }
        Ok(Self {
            namespace,
            timezone,
            rides: Vec::new(),
            index: HashMap::new(),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the internal key for a vendor id. Already-prefixed ids are
    /// returned unchanged.
    pub fn key(&self, id: &str) -> String {
        match id.strip_prefix(self.namespace.as_str()) {
            Some(rest) if rest.starts_with('_') => id.to_string(),
            _ => format!("{}_{}", self.namespace, id),
        }
    }

    /// Returns the ride for `id`, creating it if unseen.
    ///
    /// Returns `None` if either argument is empty; adapters call this while
    /// parsing partial vendor records. The name of an existing ride is never
    /// changed.
    pub fn get_or_create(&mut self, id: &str, name: &str) -> Option<&mut Ride> {
        if id.is_empty() || name.is_empty() {
            trace!(id = %id, name = %name, "Skipping ride with missing id or name");
            return None;
        }
        let key = self.key(id);
        let position = match self.index.get(&key).copied() {
            Some(position) => position,
            None => {
                let ride = Ride::new(key.clone(), name, self.timezone).ok()?;
                debug!(ride = %key, name = %name, "Registered new ride");
                self.rides.push(ride);
                self.index.insert(key, self.rides.len() - 1);
                self.rides.len() - 1
            }
        };
        self.rides.get_mut(position)
    }

    /// Looks up a ride without creating it.
    pub fn find(&self, id: &str) -> Option<&Ride> {
        let position = *self.index.get(&self.key(id))?;
        self.rides.get(position)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Ride> {
        let position = *self.index.get(&self.key(id))?;
        self.rides.get_mut(position)
    }

    /// Rides in registration order.
    pub fn rides(&self) -> &[Ride] {
        &self.rides
    }

    pub fn len(&self) -> usize {
        self.rides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rides.is_empty()
    }

    /// Serializes every ride.
    pub fn snapshots(&self) -> Vec<RideSnapshot> {
        self.rides.iter().map(Ride::snapshot).collect()
    }

    /// Applies cached snapshots, creating rides as needed.
    ///
    /// Returns the number of snapshots applied.
    pub fn apply_snapshots(&mut self, snapshots: Vec<RideSnapshot>) -> usize {
        let mut applied = 0;
        for snapshot in snapshots {
            let id = snapshot.id.clone();
            let name = snapshot.name.clone();
            if let Some(ride) = self.get_or_create(&id, &name) {
                ride.apply_snapshot(snapshot);
                applied += 1;
            }
        }
        applied
    }
}
