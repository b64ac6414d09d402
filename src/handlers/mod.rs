pub mod assistant;
pub mod daily_logs;
pub mod health;
pub mod medications;
pub mod profile;
pub mod reminders;
pub mod weekly;
pub mod ws;

use chrono::{Local, NaiveDate};

use crate::AppState;

/// The user's calendar day, in the server's local time zone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Pushes an event to every connected dashboard. A missing channel or
/// no subscribers is not an error.
pub fn broadcast(state: &AppState, payload: serde_json::Value) {
    if let Some(tx) = state.ws_tx.as_ref() {
        let _ = tx.send(payload.to_string());
    }
}
