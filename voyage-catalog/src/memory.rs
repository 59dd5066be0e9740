use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;
use voyage_core::{CoreError, CoreResult, Trip, TripCatalog, TripQuery};

/// In-memory trip catalog for tests, demos and single-node deployments.
pub struct InMemoryTripCatalog {
    trips: RwLock<HashMap<Uuid, Trip>>,
}

impl InMemoryTripCatalog {
    pub fn new() -> Self {
        Self {
            trips: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_trips(trips: impl IntoIterator<Item = Trip>) -> Self {
        Self {
            trips: RwLock::new(trips.into_iter().map(|t| (t.id, t)).collect()),
        }
    }

    /// Seed or replace a listing.
    pub async fn insert(&self, trip: Trip) {
        info!("Catalog listing stored: {} {} -> {}", trip.id, trip.departure, trip.destination);
        self.trips.write().await.insert(trip.id, trip);
    }

    pub async fn len(&self) -> usize {
        self.trips.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.trips.read().await.is_empty()
    }
}

impl Default for InMemoryTripCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TripCatalog for InMemoryTripCatalog {
    async fn get_trip(&self, trip_id: Uuid) -> CoreResult<Trip> {
        self.trips
            .read()
            .await
            .get(&trip_id)
            .cloned()
            .ok_or(CoreError::TripNotFound(trip_id))
    }

    async fn search_trips(&self, query: &TripQuery) -> CoreResult<Vec<Trip>> {
        let mut matches: Vec<Trip> = self
            .trips
            .read()
            .await
            .values()
            .filter(|trip| query.matches(trip))
            .cloned()
            .collect();

        matches.sort_by_key(|trip| (trip.departs_at(), trip.id));
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use voyage_core::VehicleType;

    fn trip(hour: u32, vehicle_type: VehicleType) -> Trip {
        Trip {
            id: Uuid::new_v4(),
            departure: "Antalya".to_string(),
            destination: "Konya".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 10, 30).unwrap(),
            time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            price_amount: 28000,
            vehicle_type,
            total_seats: 30,
            seats_per_row: 3,
            seat_layout: "2+1".to_string(),
            company_name: "Taurus".to_string(),
            duration_minutes: 290,
            features: vec![],
            stops: vec!["Manavgat".to_string()],
        }
    }

    #[tokio::test]
    async fn test_get_trip() {
        let listing = trip(9, VehicleType::Bus);
        let catalog = InMemoryTripCatalog::with_trips([listing.clone()]);

        assert_eq!(catalog.get_trip(listing.id).await.unwrap(), listing);

        let missing = Uuid::new_v4();
        let err = catalog.get_trip(missing).await.unwrap_err();
        assert!(matches!(err, CoreError::TripNotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn test_search_orders_by_departure_and_filters_vehicle() {
        let catalog = InMemoryTripCatalog::new();
        let late = trip(21, VehicleType::Bus);
        let early = trip(7, VehicleType::Bus);
        let flight = trip(12, VehicleType::Plane);
        for t in [late.clone(), early.clone(), flight.clone()] {
            catalog.insert(t).await;
        }
        assert_eq!(catalog.len().await, 3);

        let mut query = TripQuery {
            from: "antalya".to_string(),
            to: "konya".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 10, 30).unwrap(),
            vehicle_type: None,
        };
        let all: Vec<Uuid> = catalog.search_trips(&query).await.unwrap().iter().map(|t| t.id).collect();
        assert_eq!(all, vec![early.id, flight.id, late.id]);

        query.vehicle_type = Some(VehicleType::Bus);
        let buses: Vec<Uuid> = catalog.search_trips(&query).await.unwrap().iter().map(|t| t.id).collect();
        assert_eq!(buses, vec![early.id, late.id]);
    }
}
