// SPDX-License-Identifier: MIT

//! Service layer.

pub mod fcm;
pub mod notifier;

pub use fcm::{FcmClient, Notification};
