// SPDX-License-Identifier: MIT

//! Firestore client wrapper with typed operations.
//!
//! Provides the handful of document operations the trigger handlers need:
//! - Users (device tokens, plan fields)
//! - Appointments (expiry sweep)
//!
//! All user writes go through field masks so unrelated fields on the
//! documents are never clobbered.

use crate::db::collections;
use crate::error::AppError;
use crate::models::appointment::format_rfc3339_secs;
use crate::models::{Appointment, AppointmentStatus, PlanFields, User};
use chrono::{DateTime, Utc};
use futures_util::{stream, StreamExt};
use serde::{Deserialize, Serialize};

const MAX_CONCURRENT_DB_OPS: usize = 50;
// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Update mask for the staged cancellation writes.
const CANCEL_FIELDS: [&str; 2] = ["estado", "motivoCancelacion"];

/// Partial update staged for each expired appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CancelUpdate {
    estado: AppointmentStatus,
    motivo_cancelacion: String,
}

/// Partial update for the device-token repair job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeviceTokensRepair {
    device_tokens: Vec<String>,
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by document ID.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USUARIOS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Apply a plan-tier change to a user.
    ///
    /// Uses an update mask restricted to the four plan fields; re-applying
    /// the same tier is a harmless no-op, which keeps the write idempotent
    /// under trigger redelivery.
    pub async fn update_user_plan(
        &self,
        user_id: &str,
        fields: &PlanFields,
    ) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields([
                "plan".to_string(),
                "isPro".to_string(),
                "perfilDestacado".to_string(),
                "limitePacientes".to_string(),
            ])
            .in_col(collections::USUARIOS)
            .document_id(user_id)
            .object(fields)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(user_id, plan = %fields.plan, "User plan updated");
        Ok(())
    }

    // ─── Appointment Operations ──────────────────────────────────

    /// Query pending appointments whose scheduled time is strictly before
    /// `now`. Appointments without a `fechaCita` are never returned.
    pub async fn find_expired_pending(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, AppError> {
        let estado = AppointmentStatus::Pendiente.as_str().to_string();
        let cutoff = format_rfc3339_secs(now);

        self.get_client()?
            .fluent()
            .select()
            .from(collections::CITAS)
            .filter(move |q| {
                q.for_all([
                    q.field("estado").eq(estado.clone()),
                    q.field("fechaCita").less_than(cutoff.clone()),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Cancel a set of appointments with a fixed reason note.
    ///
    /// Writes are staged in transactions capped at [`BATCH_SIZE`] operations;
    /// each chunk applies atomically. Re-cancelling an already-cancelled
    /// appointment only re-writes the same two fields.
    pub async fn cancel_appointments(
        &self,
        appointment_ids: &[String],
        reason: &str,
    ) -> Result<(), AppError> {
        let client = self.get_client()?;
        let update = CancelUpdate {
            estado: AppointmentStatus::Cancelada,
            motivo_cancelacion: reason.to_string(),
        };

        for chunk in appointment_ids.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for appointment_id in chunk {
                client
                    .fluent()
                    .update()
                    .fields(CANCEL_FIELDS.map(str::to_string))
                    .in_col(collections::CITAS)
                    .document_id(appointment_id)
                    .object(&update)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add cancellation to transaction: {}",
                            e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit cancellation batch: {}", e))
            })?;

            tracing::debug!(count = chunk.len(), "Committed cancellation batch");
        }

        Ok(())
    }

    // ─── Maintenance ─────────────────────────────────────────────

    /// Initialize `deviceTokens` to an empty array on user documents that
    /// lack the field. Documents that already carry tokens are untouched.
    ///
    /// Returns the number of repaired documents.
    pub async fn init_missing_device_tokens(&self) -> Result<usize, AppError> {
        let users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USUARIOS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let missing: Vec<String> = users
            .into_iter()
            .filter(|user| user.device_tokens.is_none())
            .filter_map(|user| user.id)
            .collect();

        let client = self.get_client()?;

        stream::iter(missing.clone())
            .map(|user_id| async move {
                let _: () = client
                    .fluent()
                    .update()
                    .fields(["deviceTokens".to_string()])
                    .in_col(collections::USUARIOS)
                    .document_id(&user_id)
                    .object(&DeviceTokensRepair {
                        device_tokens: Vec::new(),
                    })
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;

                tracing::debug!(user_id = %user_id, "Initialized deviceTokens");
                Ok::<_, AppError>(())
            })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<(), AppError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<()>, AppError>>()?;

        Ok(missing.len())
    }
}
