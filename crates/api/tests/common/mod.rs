use std::sync::Arc;

use axum_test::TestServer;
use chrono::{Datelike, Duration, NaiveDate, Utc};
use slotbook_api::{app, ApiState};
use slotbook_db::mock::MemoryStore;
use slotbook_db::store::Store;

/// Spins up a test server over a fresh in-memory store. The store handle is
/// returned too so tests can seed or inspect state directly.
pub fn test_server() -> (TestServer, MemoryStore) {
    let store = MemoryStore::new();
    let state = Arc::new(ApiState {
        store: Arc::new(store.clone()) as Arc<dyn Store>,
    });
    let server = TestServer::new(app(state)).expect("failed to build test server");
    (server, store)
}

/// A Monday at least one week out, so same-day lead-time cutoffs never apply
/// and the default weekly schedule marks it as working.
pub fn future_monday() -> NaiveDate {
    let today = Utc::now().date_naive();
    let days_ahead = 7 - i64::from(today.weekday().num_days_from_monday());
    today + Duration::days(days_ahead + 7)
}
