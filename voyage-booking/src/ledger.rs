use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{info, warn};
use uuid::Uuid;
use voyage_core::{CommitOutcome, CoreError, CoreResult, NewReservation, Reservation, ReservationLedger};

/// In-memory reservation ledger.
///
/// `seats` is the unique index over (trip id, seat number). Claiming a seat
/// goes through `DashMap::entry`, which write-locks only the shard holding
/// that key, so two commits for the same seat are serialized while unrelated
/// seats proceed in parallel. Every path that touches both maps locks `seats`
/// first and `reservations` second.
pub struct InMemoryReservationLedger {
    seats: DashMap<(Uuid, u32), Uuid>,
    reservations: DashMap<Uuid, Reservation>,
}

impl InMemoryReservationLedger {
    pub fn new() -> Self {
        Self {
            seats: DashMap::new(),
            reservations: DashMap::new(),
        }
    }

    /// Number of live reservations across all trips.
    pub fn live_count(&self) -> usize {
        self.reservations.len()
    }

    /// Current holder of a seat, if any.
    pub fn holder(&self, trip_id: Uuid, seat_number: u32) -> Option<Uuid> {
        self.seats.get(&(trip_id, seat_number)).map(|r| *r.value())
    }
}

impl Default for InMemoryReservationLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReservationLedger for InMemoryReservationLedger {
    async fn list_by_trip(&self, trip_id: Uuid) -> CoreResult<Vec<Reservation>> {
        Ok(self
            .reservations
            .iter()
            .filter(|r| r.trip_id == trip_id)
            .map(|r| r.value().clone())
            .collect())
    }

    async fn list_by_user(&self, user_id: &str) -> CoreResult<Vec<Reservation>> {
        let mut reservations: Vec<Reservation> = self
            .reservations
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.value().clone())
            .collect();

        reservations.sort_by(|a, b| b.reserved_at.cmp(&a.reserved_at).then(a.id.cmp(&b.id)));
        Ok(reservations)
    }

    async fn get(&self, reservation_id: Uuid) -> CoreResult<Option<Reservation>> {
        Ok(self.reservations.get(&reservation_id).map(|r| r.value().clone()))
    }

    async fn try_commit(&self, candidate: NewReservation) -> CoreResult<CommitOutcome> {
        let key = (candidate.trip_id, candidate.seat_number);

        match self.seats.entry(key) {
            Entry::Occupied(held) => {
                warn!(
                    "Seat {} on trip {} already held by reservation {}",
                    key.1,
                    key.0,
                    held.get()
                );
                Ok(CommitOutcome::Conflict)
            }
            Entry::Vacant(slot) => {
                let reservation = candidate.into_reservation(Uuid::new_v4(), Utc::now());
                self.reservations.insert(reservation.id, reservation.clone());
                slot.insert(reservation.id);
                info!(
                    "Reservation committed: {} seat {} on trip {}",
                    reservation.id, reservation.seat_number, reservation.trip_id
                );
                Ok(CommitOutcome::Committed(reservation))
            }
        }
    }

    async fn cancel(&self, reservation_id: Uuid, requesting_user_id: &str) -> CoreResult<Reservation> {
        // Clone and release the row before taking the seat lock.
        let existing = self
            .reservations
            .get(&reservation_id)
            .map(|r| r.value().clone())
            .ok_or(CoreError::ReservationNotFound(reservation_id))?;

        if existing.user_id != requesting_user_id {
            return Err(CoreError::NotOwner(reservation_id));
        }

        match self.seats.entry((existing.trip_id, existing.seat_number)) {
            Entry::Occupied(held) if *held.get() == reservation_id => {
                let removed = self.reservations.remove(&reservation_id);
                held.remove();
                info!(
                    "Reservation cancelled: {} seat {} on trip {}",
                    reservation_id, existing.seat_number, existing.trip_id
                );
                Ok(removed.map(|(_, r)| r).unwrap_or(existing))
            }
            // Lost a race with another cancel of the same reservation.
            _ => Err(CoreError::ReservationNotFound(reservation_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voyage_core::{Gender, Passenger};

    fn candidate(trip_id: Uuid, seat_number: u32, user_id: &str) -> NewReservation {
        NewReservation {
            user_id: user_id.to_string(),
            trip_id,
            seat_number,
            passenger: Passenger {
                name: format!("Passenger of {}", user_id),
                gender: Gender::Female,
                national_id: Default::default(),
                email: Default::default(),
                phone: Default::default(),
            },
            payment_method: "card".to_string(),
        }
    }

    fn committed(outcome: CommitOutcome) -> Reservation {
        match outcome {
            CommitOutcome::Committed(r) => r,
            CommitOutcome::Conflict => panic!("expected a committed reservation"),
        }
    }

    #[tokio::test]
    async fn test_commit_then_conflict() {
        let ledger = InMemoryReservationLedger::new();
        let trip_id = Uuid::new_v4();

        let first = committed(ledger.try_commit(candidate(trip_id, 7, "u1")).await.unwrap());
        assert_eq!(first.seat_number, 7);
        assert_eq!(ledger.holder(trip_id, 7), Some(first.id));

        let second = ledger.try_commit(candidate(trip_id, 7, "u2")).await.unwrap();
        assert_eq!(second, CommitOutcome::Conflict);
        assert_eq!(ledger.live_count(), 1);

        // Same seat number on another trip is independent.
        let other_trip = ledger.try_commit(candidate(Uuid::new_v4(), 7, "u2")).await.unwrap();
        assert!(matches!(other_trip, CommitOutcome::Committed(_)));
    }

    #[tokio::test]
    async fn test_cancel_frees_seat() {
        let ledger = InMemoryReservationLedger::new();
        let trip_id = Uuid::new_v4();
        let r = committed(ledger.try_commit(candidate(trip_id, 3, "u1")).await.unwrap());

        let retired = ledger.cancel(r.id, "u1").await.unwrap();
        assert_eq!(retired, r);
        assert!(ledger.holder(trip_id, 3).is_none());
        assert!(ledger.get(r.id).await.unwrap().is_none());

        let again = ledger.try_commit(candidate(trip_id, 3, "u2")).await.unwrap();
        assert!(matches!(again, CommitOutcome::Committed(_)));
    }

    #[tokio::test]
    async fn test_cancel_checks_owner_and_existence() {
        let ledger = InMemoryReservationLedger::new();
        let trip_id = Uuid::new_v4();
        let r = committed(ledger.try_commit(candidate(trip_id, 1, "owner")).await.unwrap());

        let err = ledger.cancel(r.id, "intruder").await.unwrap_err();
        assert!(matches!(err, CoreError::NotOwner(id) if id == r.id));
        assert_eq!(ledger.holder(trip_id, 1), Some(r.id));

        let missing = Uuid::new_v4();
        let err = ledger.cancel(missing, "owner").await.unwrap_err();
        assert!(matches!(err, CoreError::ReservationNotFound(id) if id == missing));

        ledger.cancel(r.id, "owner").await.unwrap();
        let err = ledger.cancel(r.id, "owner").await.unwrap_err();
        assert!(matches!(err, CoreError::ReservationNotFound(_)));
    }

    #[tokio::test]
    async fn test_list_by_trip_and_user() {
        let ledger = InMemoryReservationLedger::new();
        let trip_a = Uuid::new_v4();
        let trip_b = Uuid::new_v4();

        let older = committed(ledger.try_commit(candidate(trip_a, 1, "u1")).await.unwrap());
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let newer = committed(ledger.try_commit(candidate(trip_b, 2, "u1")).await.unwrap());
        ledger.try_commit(candidate(trip_a, 2, "u2")).await.unwrap();

        let mut seats: Vec<u32> = ledger
            .list_by_trip(trip_a)
            .await
            .unwrap()
            .iter()
            .map(|r| r.seat_number)
            .collect();
        seats.sort();
        assert_eq!(seats, vec![1, 2]);

        let mine: Vec<Uuid> = ledger.list_by_user("u1").await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(mine, vec![newer.id, older.id]);
        assert!(ledger.list_by_user("nobody").await.unwrap().is_empty());
    }
}
