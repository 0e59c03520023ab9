// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod appointment;
pub mod message;
pub mod subscription;
pub mod user;

pub use appointment::{Appointment, AppointmentStatus};
pub use message::Message;
pub use subscription::{Subscription, SubscriptionStatus};
pub use user::{PlanFields, PlanTier, User};
