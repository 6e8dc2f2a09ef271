//! # Settings Repository
//!
//! One business profile blob per owner, stored as JSON and read back
//! tolerantly (flat or nested under `businessDetails`).

use chrono::Utc;
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use storefront_core::document::normalize_profile;
use storefront_core::BusinessProfile;

use crate::error::DbResult;
use crate::feed::{ChangeFeed, Collection};

/// Repository for the per-owner settings blob.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
    feed: ChangeFeed,
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool, feed: ChangeFeed) -> Self {
        SettingsRepository { pool, feed }
    }

    /// Loads the profile; an owner without settings gets an empty one.
    pub async fn load(&self, owner_id: &str) -> DbResult<BusinessProfile> {
        let raw: Option<String> = sqlx::query_scalar("SELECT profile FROM settings WHERE owner_id = ?1")
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(raw.map(|r| parse_profile(owner_id, &r)).unwrap_or_default())
    }

    /// Merges `update` over the stored profile in one transaction.
    pub async fn save(&self, owner_id: &str, update: BusinessProfile) -> DbResult<BusinessProfile> {
        debug!(owner_id = %owner_id, "Saving settings");

        let mut tx = self.pool.begin().await?;

        let raw: Option<String> = sqlx::query_scalar("SELECT profile FROM settings WHERE owner_id = ?1")
            .bind(owner_id)
            .fetch_optional(&mut *tx)
            .await?;
        let mut profile = raw.map(|r| parse_profile(owner_id, &r)).unwrap_or_default();
        profile.merge(update);

        sqlx::query(
            r#"
            INSERT INTO settings (owner_id, profile, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (owner_id) DO UPDATE SET
                profile    = excluded.profile,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(owner_id)
        .bind(serde_json::to_string(&profile)?)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.feed.publish(owner_id, Collection::Settings);
        Ok(profile)
    }

    /// Merges an exported settings document (e.g. `appSettings`).
    pub async fn import(&self, owner_id: &str, document: &Value) -> DbResult<BusinessProfile> {
        self.save(owner_id, normalize_profile(document)).await
    }
}

fn parse_profile(owner_id: &str, raw: &str) -> BusinessProfile {
    match serde_json::from_str::<Value>(raw) {
        Ok(doc) => normalize_profile(&doc),
        Err(e) => {
            warn!(owner_id = %owner_id, error = %e, "Unreadable settings, using defaults");
            BusinessProfile::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use serde_json::json;

    #[tokio::test]
    async fn test_load_missing_is_empty() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let profile = db.settings().load("owner-1").await.unwrap();
        assert_eq!(profile, BusinessProfile::default());
    }

    #[tokio::test]
    async fn test_save_merges() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.settings();

        repo.save(
            "owner-1",
            BusinessProfile {
                business_name: Some("Corner Shop".to_string()),
                phone: Some("9876543210".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let merged = repo
            .save(
                "owner-1",
                BusinessProfile {
                    upi_id: Some("shop@upi".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(merged.business_name.as_deref(), Some("Corner Shop"));
        assert_eq!(merged.upi_id.as_deref(), Some("shop@upi"));
        assert_eq!(repo.load("owner-1").await.unwrap(), merged);
        assert_eq!(repo.load("owner-2").await.unwrap(), BusinessProfile::default());
    }

    #[tokio::test]
    async fn test_import_nested_settings() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let doc = json!({"businessDetails": {"businessName": "Corner Shop", "ownerName": "Ravi"}});

        let profile = db.settings().import("owner-1", &doc).await.unwrap();

        assert_eq!(profile.owner_name.as_deref(), Some("Ravi"));
    }
}
