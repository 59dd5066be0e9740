use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;
use voyage_core::{
    CommitOutcome, CoreError, CoreResult, NewReservation, Passenger, Reservation, ReservationLedger,
};
use voyage_shared::pii::Masked;
use crate::storage_error;

const RESERVATION_COLUMNS: &str = "id, user_id, trip_id, seat_number, passenger_name, passenger_gender, \
     national_id, email, phone, payment_method, reserved_at";

/// Postgres-backed ledger. The `uq_reservations_trip_seat` constraint is the
/// double-booking guard: the insert either claims the seat or is skipped by
/// `ON CONFLICT DO NOTHING`, with no separate read beforehand.
pub struct PostgresReservationLedger {
    pool: PgPool,
}

impl PostgresReservationLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ReservationRow {
    id: Uuid,
    user_id: String,
    trip_id: Uuid,
    seat_number: i32,
    passenger_name: String,
    passenger_gender: String,
    national_id: String,
    email: String,
    phone: String,
    payment_method: String,
    reserved_at: DateTime<Utc>,
}

impl TryFrom<ReservationRow> for Reservation {
    type Error = CoreError;

    fn try_from(row: ReservationRow) -> Result<Self, Self::Error> {
        let gender = row
            .passenger_gender
            .parse()
            .map_err(|e| CoreError::InternalError(format!("reservation {}: {}", row.id, e)))?;
        let seat_number = u32::try_from(row.seat_number).map_err(|_| {
            CoreError::InternalError(format!("reservation {}: seat {} is negative", row.id, row.seat_number))
        })?;

        Ok(Reservation {
            id: row.id,
            user_id: row.user_id,
            trip_id: row.trip_id,
            seat_number,
            passenger: Passenger {
                name: row.passenger_name,
                gender,
                national_id: Masked(row.national_id),
                email: Masked(row.email),
                phone: Masked(row.phone),
            },
            payment_method: row.payment_method,
            reserved_at: row.reserved_at,
        })
    }
}

fn into_reservations(rows: Vec<ReservationRow>) -> CoreResult<Vec<Reservation>> {
    rows.into_iter().map(Reservation::try_from).collect()
}

#[async_trait]
impl ReservationLedger for PostgresReservationLedger {
    async fn list_by_trip(&self, trip_id: Uuid) -> CoreResult<Vec<Reservation>> {
        let sql = format!("SELECT {} FROM reservations WHERE trip_id = $1", RESERVATION_COLUMNS);
        let rows: Vec<ReservationRow> = sqlx::query_as(&sql)
            .bind(trip_id)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        into_reservations(rows)
    }

    async fn list_by_user(&self, user_id: &str) -> CoreResult<Vec<Reservation>> {
        let sql = format!(
            "SELECT {} FROM reservations WHERE user_id = $1 ORDER BY reserved_at DESC, id",
            RESERVATION_COLUMNS
        );
        let rows: Vec<ReservationRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        into_reservations(rows)
    }

    async fn get(&self, reservation_id: Uuid) -> CoreResult<Option<Reservation>> {
        let sql = format!("SELECT {} FROM reservations WHERE id = $1", RESERVATION_COLUMNS);
        let row: Option<ReservationRow> = sqlx::query_as(&sql)
            .bind(reservation_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        row.map(Reservation::try_from).transpose()
    }

    async fn try_commit(&self, candidate: NewReservation) -> CoreResult<CommitOutcome> {
        let seat = i32::try_from(candidate.seat_number).map_err(|_| CoreError::SeatOutOfRange {
            seat: candidate.seat_number,
            total_seats: i32::MAX as u32,
        })?;
        let id = Uuid::new_v4();
        let trip_id = candidate.trip_id;

        let sql = format!(
            r#"
            INSERT INTO reservations (id, user_id, trip_id, seat_number, passenger_name, passenger_gender,
                                      national_id, email, phone, payment_method, reserved_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW())
            ON CONFLICT (trip_id, seat_number) DO NOTHING
            RETURNING {}
            "#,
            RESERVATION_COLUMNS
        );

        let result = sqlx::query_as::<_, ReservationRow>(&sql)
            .bind(id)
            .bind(&candidate.user_id)
            .bind(trip_id)
            .bind(seat)
            .bind(&candidate.passenger.name)
            .bind(candidate.passenger.gender.as_str())
            .bind(candidate.passenger.national_id.expose())
            .bind(candidate.passenger.email.expose())
            .bind(candidate.passenger.phone.expose())
            .bind(&candidate.payment_method)
            .fetch_optional(&self.pool)
            .await;

        match result {
            Ok(Some(row)) => {
                let reservation = Reservation::try_from(row)?;
                info!(
                    "Reservation committed: {} seat {} on trip {}",
                    reservation.id, reservation.seat_number, reservation.trip_id
                );
                Ok(CommitOutcome::Committed(reservation))
            }
            Ok(None) => {
                warn!("Seat {} on trip {} already reserved", seat, trip_id);
                Ok(CommitOutcome::Conflict)
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                warn!("Seat {} on trip {} rejected by unique constraint", seat, trip_id);
                Ok(CommitOutcome::Conflict)
            }
            Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => {
                Err(CoreError::TripNotFound(trip_id))
            }
            Err(e) => Err(storage_error(e)),
        }
    }

    async fn cancel(&self, reservation_id: Uuid, requesting_user_id: &str) -> CoreResult<Reservation> {
        let sql = format!(
            "DELETE FROM reservations WHERE id = $1 AND user_id = $2 RETURNING {}",
            RESERVATION_COLUMNS
        );
        let deleted: Option<ReservationRow> = sqlx::query_as(&sql)
            .bind(reservation_id)
            .bind(requesting_user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        if let Some(row) = deleted {
            let reservation = Reservation::try_from(row)?;
            info!(
                "Reservation cancelled: {} seat {} on trip {}",
                reservation.id, reservation.seat_number, reservation.trip_id
            );
            return Ok(reservation);
        }

        // Nothing deleted: tell "someone else's" apart from "gone".
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM reservations WHERE id = $1)")
            .bind(reservation_id)
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)?;

        if exists {
            Err(CoreError::NotOwner(reservation_id))
        } else {
            Err(CoreError::ReservationNotFound(reservation_id))
        }
    }
}
