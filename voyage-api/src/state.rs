use std::sync::Arc;
use voyage_booking::{AdjacencyPolicy, BookingCoordinator, LayoutCache, SeatAvailabilityView};
use voyage_core::{ReservationLedger, TripCatalog};
use voyage_store::{EventProducer, RedisClient};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
}

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn TripCatalog>,
    pub ledger: Arc<dyn ReservationLedger>,
    pub coordinator: Arc<BookingCoordinator>,
    pub availability: Arc<SeatAvailabilityView>,
    pub redis: Option<Arc<RedisClient>>,
    pub events: Option<Arc<EventProducer>>,
    pub auth: AuthConfig,
    pub rate_limit_per_minute: i64,
}

impl AppState {
    /// Wires the coordinator and the availability view over one catalog and
    /// ledger, sharing a single layout cache between them.
    pub fn new(
        catalog: Arc<dyn TripCatalog>,
        ledger: Arc<dyn ReservationLedger>,
        policy: AdjacencyPolicy,
        auth: AuthConfig,
    ) -> Self {
        let layouts = LayoutCache::new();
        let coordinator = BookingCoordinator::new(catalog.clone(), ledger.clone())
            .with_policy(policy)
            .with_layout_cache(layouts.clone());
        let availability = SeatAvailabilityView::with_layout_cache(catalog.clone(), ledger.clone(), layouts);

        Self {
            catalog,
            ledger,
            coordinator: Arc::new(coordinator),
            availability: Arc::new(availability),
            redis: None,
            events: None,
            auth,
            rate_limit_per_minute: 100,
        }
    }

    pub fn with_redis(mut self, redis: Arc<RedisClient>, rate_limit_per_minute: i64) -> Self {
        self.redis = Some(redis);
        self.rate_limit_per_minute = rate_limit_per_minute;
        self
    }

    pub fn with_events(mut self, events: Arc<EventProducer>) -> Self {
        self.events = Some(events);
        self
    }
}
