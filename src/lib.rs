// SPDX-License-Identifier: MIT

//! Kine-Backend: automation service for the "Un Kine Amigo" appointment app.
//!
//! Reacts to Firestore document changes (appointments, chat messages,
//! subscriptions) with push notifications and plan updates, and sweeps
//! expired pending appointments on a schedule.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::FirestoreDb;
use services::FcmClient;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub fcm: FcmClient,
}
