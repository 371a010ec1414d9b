//! In-memory persistence for the itinerary engine.
//!
//! The engine treats persistence as a collaborator with two capabilities:
//! point reads of current state, and atomic multi-entity transactions.
//! [`Database`] provides both over an id-indexed data set behind a `tokio`
//! read/write lock. A transaction stages its writes on a clone of the data
//! set and swaps it in only when the closure returns `Ok`, so a failed
//! mutation leaves nothing behind.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::domain::{
    Leg, LegId, LegStart, Location, LocationId, Stint, StintId, Stop, StopId, Trip, TripId,
};

/// Every entity the engine persists, indexed by id.
#[derive(Debug, Clone, Default)]
struct DataSet {
    trips: HashMap<TripId, Trip>,
    stints: HashMap<StintId, Stint>,
    stops: HashMap<StopId, Stop>,
    legs: HashMap<LegId, Leg>,
    locations: HashMap<LocationId, Location>,
}

impl DataSet {
    fn stints_by_trip(&self, trip: TripId) -> Vec<Stint> {
        let mut out: Vec<Stint> = self
            .stints
            .values()
            .filter(|s| s.trip_id == trip)
            .cloned()
            .collect();
        out.sort_by_key(|s| s.sequence);
        out
    }

    fn stops_by_stint(&self, stint: StintId) -> Vec<Stop> {
        let mut out: Vec<Stop> = self
            .stops
            .values()
            .filter(|s| s.stint_id == stint)
            .cloned()
            .collect();
        out.sort_by_key(|s| s.sequence);
        out
    }

    fn legs_by_stint(&self, stint: StintId) -> Vec<Leg> {
        let mut out: Vec<Leg> = self
            .legs
            .values()
            .filter(|l| l.stint_id == stint)
            .cloned()
            .collect();
        out.sort_by_key(|l| l.sequence);
        out
    }
}

/// In-memory store with atomic transactions.
#[derive(Debug, Default)]
pub struct Database {
    data: RwLock<DataSet>,
}

impl Database {
    pub fn new() -> Self {
        Database::default()
    }

    /// Run `f` against a staged copy of the data set.
    ///
    /// Writes made through the [`Txn`] become visible atomically when `f`
    /// returns `Ok`. When it returns `Err`, every staged write is discarded
    /// and the error is passed through.
    pub async fn transaction<T, E>(
        &self,
        f: impl FnOnce(&mut Txn<'_>) -> Result<T, E>,
    ) -> Result<T, E> {
        let mut guard = self.data.write().await;
        let mut staged = guard.clone();
        let result = f(&mut Txn { data: &mut staged });
        if result.is_ok() {
            *guard = staged;
        }
        result
    }

    pub async fn trip(&self, id: TripId) -> Option<Trip> {
        self.data.read().await.trips.get(&id).cloned()
    }

    pub async fn stint(&self, id: StintId) -> Option<Stint> {
        self.data.read().await.stints.get(&id).cloned()
    }

    pub async fn stop(&self, id: StopId) -> Option<Stop> {
        self.data.read().await.stops.get(&id).cloned()
    }

    pub async fn location(&self, id: LocationId) -> Option<Location> {
        self.data.read().await.locations.get(&id).cloned()
    }

    /// Stints belonging to a trip, ordered by sequence.
    pub async fn stints_by_trip(&self, trip: TripId) -> Vec<Stint> {
        self.data.read().await.stints_by_trip(trip)
    }

    /// Stops belonging to a stint, ordered by sequence.
    pub async fn stops_by_stint(&self, stint: StintId) -> Vec<Stop> {
        self.data.read().await.stops_by_stint(stint)
    }

    /// Legs belonging to a stint, ordered by sequence.
    pub async fn legs_by_stint(&self, stint: StintId) -> Vec<Leg> {
        self.data.read().await.legs_by_stint(stint)
    }
}

/// A staged view of the data set inside [`Database::transaction`].
///
/// Accessors return owned clones; mutations overwrite whole entities. This
/// keeps the API free of borrow entanglements at the cost of some copying,
/// which is fine at itinerary scale.
pub struct Txn<'a> {
    data: &'a mut DataSet,
}

impl Txn<'_> {
    pub fn trips(&mut self) -> Trips<'_> {
        Trips { data: self.data }
    }

    pub fn stints(&mut self) -> Stints<'_> {
        Stints { data: self.data }
    }

    pub fn stops(&mut self) -> Stops<'_> {
        Stops { data: self.data }
    }

    pub fn legs(&mut self) -> Legs<'_> {
        Legs { data: self.data }
    }

    pub fn locations(&mut self) -> Locations<'_> {
        Locations { data: self.data }
    }
}

/// Trip access within a transaction.
pub struct Trips<'a> {
    data: &'a mut DataSet,
}

impl Trips<'_> {
    pub fn find(&self, id: TripId) -> Option<Trip> {
        self.data.trips.get(&id).cloned()
    }

    pub fn save(&mut self, trip: Trip) {
        self.data.trips.insert(trip.id, trip);
    }
}

/// Stint access within a transaction.
pub struct Stints<'a> {
    data: &'a mut DataSet,
}

impl Stints<'_> {
    pub fn find(&self, id: StintId) -> Option<Stint> {
        self.data.stints.get(&id).cloned()
    }

    pub fn by_trip(&self, trip: TripId) -> Vec<Stint> {
        self.data.stints_by_trip(trip)
    }

    pub fn save(&mut self, stint: Stint) {
        self.data.stints.insert(stint.id, stint);
    }
}

/// Stop access within a transaction.
pub struct Stops<'a> {
    data: &'a mut DataSet,
}

impl Stops<'_> {
    pub fn find(&self, id: StopId) -> Option<Stop> {
        self.data.stops.get(&id).cloned()
    }

    pub fn by_stint(&self, stint: StintId) -> Vec<Stop> {
        self.data.stops_by_stint(stint)
    }

    pub fn save(&mut self, stop: Stop) {
        self.data.stops.insert(stop.id, stop);
    }

    pub fn remove(&mut self, id: StopId) -> Option<Stop> {
        self.data.stops.remove(&id)
    }
}

/// Leg access within a transaction.
pub struct Legs<'a> {
    data: &'a mut DataSet,
}

impl Legs<'_> {
    pub fn by_stint(&self, stint: StintId) -> Vec<Leg> {
        self.data.legs_by_stint(stint)
    }

    pub fn save(&mut self, leg: Leg) {
        self.data.legs.insert(leg.id, leg);
    }

    /// Delete every leg in a stint, ahead of a rebuild.
    pub fn remove_by_stint(&mut self, stint: StintId) -> usize {
        let before = self.data.legs.len();
        self.data.legs.retain(|_, l| l.stint_id != stint);
        before - self.data.legs.len()
    }

    /// Delete legs that start or end at the given stop.
    pub fn remove_touching_stop(&mut self, stop: StopId) -> usize {
        let before = self.data.legs.len();
        self.data
            .legs
            .retain(|_, l| l.end_stop != stop && l.start != LegStart::Stop(stop));
        before - self.data.legs.len()
    }
}

/// Location access within a transaction.
pub struct Locations<'a> {
    data: &'a mut DataSet,
}

impl Locations<'_> {
    pub fn find(&self, id: LocationId) -> Option<Location> {
        self.data.locations.get(&id).cloned()
    }

    pub fn save(&mut self, location: Location) {
        self.data.locations.insert(location.id, location);
    }
}
