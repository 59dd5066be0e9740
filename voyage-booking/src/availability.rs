use dashmap::DashMap;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;
use voyage_catalog::{SeatLayout, SeatPosition};
use voyage_core::{CoreResult, Gender, Reservation, ReservationLedger, Trip, TripCatalog};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatState {
    Available,
    Occupied { gender: Gender },
}

/// An occupied geometric neighbor of an available seat. Display hint only.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct AdjacencyHint {
    pub neighbor_seat: u32,
    pub gender: Gender,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SeatSlot {
    #[serde(flatten)]
    pub position: SeatPosition,
    #[serde(flatten)]
    pub state: SeatState,
    pub adjacent: Vec<AdjacencyHint>,
}

impl SeatSlot {
    pub fn seat_number(&self) -> u32 {
        self.position.seat_number
    }

    pub fn is_available(&self) -> bool {
        self.state == SeatState::Available
    }
}

/// Seat-by-seat occupancy for one trip, ordered by seat number.
#[derive(Debug, Clone, Serialize)]
pub struct SeatMap {
    pub trip_id: Uuid,
    pub rows: u32,
    pub seats_per_row: u32,
    pub blocks: Vec<u32>,
    pub slots: Vec<SeatSlot>,
}

impl SeatMap {
    /// Projects live reservations onto a layout. Occupancy is never stored,
    /// it is recomputed from the ledger on every read.
    pub fn compose(trip_id: Uuid, layout: &SeatLayout, reservations: &[Reservation]) -> Self {
        let mut occupants: HashMap<u32, Gender> = HashMap::with_capacity(reservations.len());
        for r in reservations {
            if r.trip_id != trip_id || layout.position(r.seat_number).is_none() {
                warn!(
                    "Ignoring reservation {} for seat {} outside trip {} geometry",
                    r.id, r.seat_number, trip_id
                );
                continue;
            }
            occupants.insert(r.seat_number, r.passenger.gender);
        }

        let slots = layout
            .positions()
            .iter()
            .map(|position| {
                let seat = position.seat_number;
                match occupants.get(&seat) {
                    Some(&gender) => SeatSlot {
                        position: *position,
                        state: SeatState::Occupied { gender },
                        adjacent: Vec::new(),
                    },
                    None => SeatSlot {
                        position: *position,
                        state: SeatState::Available,
                        adjacent: layout
                            .neighbors(seat)
                            .into_iter()
                            .filter_map(|neighbor_seat| {
                                occupants
                                    .get(&neighbor_seat)
                                    .map(|&gender| AdjacencyHint { neighbor_seat, gender })
                            })
                            .collect(),
                    },
                }
            })
            .collect();

        Self {
            trip_id,
            rows: layout.rows(),
            seats_per_row: layout.seats_per_row(),
            blocks: layout.blocks().to_vec(),
            slots,
        }
    }

    pub fn slot(&self, seat_number: u32) -> Option<&SeatSlot> {
        seat_number
            .checked_sub(1)
            .and_then(|index| self.slots.get(index as usize))
    }

    pub fn available_seats(&self) -> Vec<u32> {
        self.slots
            .iter()
            .filter(|s| s.is_available())
            .map(SeatSlot::seat_number)
            .collect()
    }

    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_available()).count()
    }
}

/// Default number of trips whose layouts are kept resolved.
pub const DEFAULT_LAYOUT_CACHE_CAPACITY: usize = 4096;

/// Resolved layouts keyed by trip id. Trips are immutable for the engine, so
/// entries never go stale; they are only evicted to stay within `capacity`.
/// Eviction picks an arbitrary entry, and an evicted trip is simply resolved
/// again on its next read.
#[derive(Clone)]
pub struct LayoutCache {
    layouts: Arc<DashMap<Uuid, Arc<SeatLayout>>>,
    capacity: usize,
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_LAYOUT_CACHE_CAPACITY)
    }
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            layouts: Arc::new(DashMap::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get_or_resolve(&self, trip: &Trip) -> CoreResult<Arc<SeatLayout>> {
        if let Some(layout) = self.layouts.get(&trip.id) {
            return Ok(Arc::clone(layout.value()));
        }

        let layout = Arc::new(SeatLayout::for_trip(trip)?);
        while self.layouts.len() >= self.capacity {
            // Copy the key out first; removing while iterating would deadlock the shard.
            let Some(victim) = self.layouts.iter().next().map(|entry| *entry.key()) else {
                break;
            };
            self.layouts.remove(&victim);
        }
        self.layouts.insert(trip.id, Arc::clone(&layout));
        Ok(layout)
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }
}

pub struct SeatAvailabilityView {
    catalog: Arc<dyn TripCatalog>,
    ledger: Arc<dyn ReservationLedger>,
    layouts: LayoutCache,
}

impl SeatAvailabilityView {
    pub fn new(catalog: Arc<dyn TripCatalog>, ledger: Arc<dyn ReservationLedger>) -> Self {
        Self::with_layout_cache(catalog, ledger, LayoutCache::new())
    }

    pub fn with_layout_cache(
        catalog: Arc<dyn TripCatalog>,
        ledger: Arc<dyn ReservationLedger>,
        layouts: LayoutCache,
    ) -> Self {
        Self { catalog, ledger, layouts }
    }

    pub async fn seat_map(&self, trip_id: Uuid) -> CoreResult<SeatMap> {
        let trip = self.catalog.get_trip(trip_id).await?;
        let layout = self.layouts.get_or_resolve(&trip)?;
        let reservations = self.ledger.list_by_trip(trip_id).await?;

        Ok(SeatMap::compose(trip_id, &layout, &reservations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, Utc};
    use voyage_catalog::InMemoryTripCatalog;
    use voyage_core::{CoreError, NewReservation, Passenger, VehicleType};
    use crate::ledger::InMemoryReservationLedger;

    fn trip(total_seats: u32, seats_per_row: u32, layout: &str) -> Trip {
        Trip {
            id: Uuid::new_v4(),
            departure: "Izmir".to_string(),
            destination: "Denizli".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 11, 14).unwrap(),
            time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            price_amount: 22000,
            vehicle_type: VehicleType::Bus,
            total_seats,
            seats_per_row,
            seat_layout: layout.to_string(),
            company_name: "Aegean Coach".to_string(),
            duration_minutes: 210,
            features: vec![],
            stops: vec![],
        }
    }

    fn reservation(trip_id: Uuid, seat_number: u32, gender: Gender) -> NewReservation {
        NewReservation {
            user_id: format!("user-{}", seat_number),
            trip_id,
            seat_number,
            passenger: Passenger {
                name: "Passenger".to_string(),
                gender,
                national_id: Default::default(),
                email: Default::default(),
                phone: Default::default(),
            },
            payment_method: "card".to_string(),
        }
    }

    fn view_for(listing: &Trip) -> (SeatAvailabilityView, Arc<InMemoryReservationLedger>) {
        let catalog = Arc::new(InMemoryTripCatalog::with_trips([listing.clone()]));
        let ledger = Arc::new(InMemoryReservationLedger::new());
        (SeatAvailabilityView::new(catalog, ledger.clone()), ledger)
    }

    #[tokio::test]
    async fn test_empty_trip_is_fully_available() {
        let listing = trip(10, 3, "2+1");
        let (view, _) = view_for(&listing);

        let map = view.seat_map(listing.id).await.unwrap();
        assert_eq!(map.slots.len(), 10);
        assert_eq!(map.available_seats(), (1..=10).collect::<Vec<u32>>());
        assert_eq!(map.occupied_count(), 0);
        assert!(map.slots.iter().all(|s| s.adjacent.is_empty()));
    }

    #[tokio::test]
    async fn test_occupied_seat_and_adjacency_hint() {
        let listing = trip(10, 3, "2+1");
        let (view, ledger) = view_for(&listing);
        ledger.try_commit(reservation(listing.id, 5, Gender::Female)).await.unwrap();

        let map = view.seat_map(listing.id).await.unwrap();
        assert_eq!(map.slot(5).unwrap().state, SeatState::Occupied { gender: Gender::Female });
        assert_eq!(map.occupied_count(), 1);
        for slot in map.slots.iter().filter(|s| s.seat_number() != 5) {
            assert_eq!(slot.state, SeatState::Available);
        }

        // Row 2 is 4, 5 | 6: seat 4 shares a block with 5, seat 6 is across the aisle.
        assert_eq!(
            map.slot(4).unwrap().adjacent,
            vec![AdjacencyHint { neighbor_seat: 5, gender: Gender::Female }]
        );
        assert!(map.slot(6).unwrap().adjacent.is_empty());
        assert!(map.slot(2).unwrap().adjacent.is_empty());
        assert!(map.slot(5).unwrap().adjacent.is_empty());
    }

    #[tokio::test]
    async fn test_middle_seat_reports_both_sides() {
        let listing = trip(6, 3, "3");
        let (view, ledger) = view_for(&listing);
        ledger.try_commit(reservation(listing.id, 1, Gender::Male)).await.unwrap();
        ledger.try_commit(reservation(listing.id, 3, Gender::Female)).await.unwrap();

        let map = view.seat_map(listing.id).await.unwrap();
        assert_eq!(
            map.slot(2).unwrap().adjacent,
            vec![
                AdjacencyHint { neighbor_seat: 1, gender: Gender::Male },
                AdjacencyHint { neighbor_seat: 3, gender: Gender::Female },
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_trip_and_bad_geometry() {
        let broken = trip(10, 3, "2+2");
        let (view, _) = view_for(&broken);

        let err = view.seat_map(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, CoreError::TripNotFound(_)));

        let err = view.seat_map(broken.id).await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidGeometry(_)));
    }

    #[test]
    fn test_compose_skips_out_of_range_rows() {
        let listing = trip(4, 2, "1+1");
        let layout = SeatLayout::for_trip(&listing).unwrap();
        let stale = reservation(listing.id, 9, Gender::Male).into_reservation(Uuid::new_v4(), Utc::now());

        let map = SeatMap::compose(listing.id, &layout, &[stale]);
        assert_eq!(map.available_seats(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_layout_cache_reuses_resolution() {
        let listing = trip(12, 4, "2+2");
        let cache = LayoutCache::new();
        let first = cache.get_or_resolve(&listing).unwrap();
        let second = cache.get_or_resolve(&listing).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);

        let invalid = trip(12, 4, "3+3");
        assert!(cache.get_or_resolve(&invalid).is_err());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_layout_cache_stays_within_capacity() {
        let cache = LayoutCache::with_capacity(2);
        let trips: Vec<Trip> = (0..5).map(|_| trip(12, 4, "2+2")).collect();
        for listing in &trips {
            cache.get_or_resolve(listing).unwrap();
            assert!(cache.len() <= 2);
        }
        assert_eq!(cache.len(), 2);

        // The most recent trip is always retained; evicted ones resolve again.
        let last = trips.last().unwrap();
        let cached = cache.get_or_resolve(last).unwrap();
        assert!(Arc::ptr_eq(&cached, &cache.get_or_resolve(last).unwrap()));
        let again = cache.get_or_resolve(&trips[0]).unwrap();
        assert_eq!(again.total_seats(), 12);
        assert_eq!(cache.len(), 2);
        assert_eq!(LayoutCache::new().capacity(), DEFAULT_LAYOUT_CACHE_CAPACITY);
    }

    #[test]
    fn test_slot_serialization() {
        let listing = trip(3, 3, "2+1");
        let layout = SeatLayout::for_trip(&listing).unwrap();
        let occupied = reservation(listing.id, 1, Gender::Female).into_reservation(Uuid::new_v4(), Utc::now());
        let map = SeatMap::compose(listing.id, &layout, &[occupied]);

        let json = serde_json::to_value(&map.slots[0]).unwrap();
        assert_eq!(json["seat_number"], 1);
        assert_eq!(json["status"], "OCCUPIED");
        assert_eq!(json["gender"], "female");

        let json = serde_json::to_value(&map.slots[1]).unwrap();
        assert_eq!(json["status"], "AVAILABLE");
        assert_eq!(json["aisle_adjacent"], true);
        assert_eq!(json["adjacent"][0]["neighbor_seat"], 1);
    }
}
