//! Game lifecycle policy
//!
//! `actualize` runs two independent phases against the game table:
//!
//! 1. **purge**: games released at or before `now - purge_after_months` are
//!    deleted in one bulk call.
//! 2. **tag**: games released strictly between that cutoff and
//!    `now - discount_after_months`, with no discount yet, receive the
//!    configured named discount in one bulk call.
//!
//! Re-running immediately after a successful run selects nothing: purged
//! games are gone and tagged games no longer have a null discount.

use super::model::Game;
use crate::config::LifecycleConfig;
use crate::core::error::{CatalogError, CatalogResult};
use crate::core::query::Condition;
use crate::core::service::EntityStore;
use crate::entities::discount::DiscountService;
use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

/// Ids touched by one `actualize` run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActualizeSummary {
    pub removed_game_ids: Vec<Uuid>,
    pub updated_game_ids: Vec<Uuid>,
}

#[derive(Clone)]
pub struct LifecyclePolicy {
    games: EntityStore<Game>,
    discounts: DiscountService,
    config: LifecycleConfig,
}

impl LifecyclePolicy {
    pub fn new(games: EntityStore<Game>, discounts: DiscountService, config: LifecycleConfig) -> Self {
        Self {
            games,
            discounts,
            config,
        }
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    pub async fn actualize(&self) -> CatalogResult<ActualizeSummary> {
        self.actualize_at(Utc::now()).await
    }

    /// Run both phases with `now` as the reference instant
    pub async fn actualize_at(&self, now: DateTime<Utc>) -> CatalogResult<ActualizeSummary> {
        let removed_game_ids = self.remove_outdated(now).await?;
        let updated_game_ids = self.set_discount_for_obsolescent(now).await?;

        tracing::info!(
            removed = removed_game_ids.len(),
            updated = updated_game_ids.len(),
            "games actualized"
        );

        Ok(ActualizeSummary {
            removed_game_ids,
            updated_game_ids,
        })
    }

    /// Delete every game released at or before the purge cutoff
    pub async fn remove_outdated(&self, now: DateTime<Utc>) -> CatalogResult<Vec<Uuid>> {
        let cutoff = months_before(now, self.config.purge_after_months)?;
        let repository = self.games.repository();

        let outdated = repository
            .find(&[Condition::lte("releaseDate", cutoff)])
            .await?;
        let ids: Vec<Uuid> = outdated.iter().map(|g| g.id).collect();

        if !ids.is_empty() {
            repository.delete_many(&ids).await?;
            tracing::debug!(count = ids.len(), %cutoff, "outdated games removed");
        }
        Ok(ids)
    }

    /// Attach the configured discount to undiscounted games inside the window
    pub async fn set_discount_for_obsolescent(
        &self,
        now: DateTime<Utc>,
    ) -> CatalogResult<Vec<Uuid>> {
        let discount = self
            .discounts
            .get_discount_by_name(self.config.discount_name)
            .await?;
        let oldest = months_before(now, self.config.purge_after_months)?;
        let newest = months_before(now, self.config.discount_after_months)?;
        let repository = self.games.repository();

        let obsolescent = repository
            .find(&[
                Condition::gt("releaseDate", oldest),
                Condition::lt("releaseDate", newest),
                Condition::is_null("discountId"),
            ])
            .await?;
        let ids: Vec<Uuid> = obsolescent.iter().map(|g| g.id).collect();

        if !ids.is_empty() {
            repository
                .update_many(&ids, json!({ "discountId": discount.id }))
                .await?;
            tracing::debug!(count = ids.len(), discount = %discount.name, "obsolescent games discounted");
        }
        Ok(ids)
    }
}

fn months_before(now: DateTime<Utc>, months: u32) -> CatalogResult<DateTime<Utc>> {
    now.checked_sub_months(Months::new(months)).ok_or_else(|| {
        CatalogError::Internal(format!("{} months before {} is out of range", months, now))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_months_before_clamps_to_month_end() {
        let now = Utc.with_ymd_and_hms(2025, 8, 31, 12, 0, 0).unwrap();
        let cutoff = months_before(now, 18).unwrap();
        assert_eq!(cutoff, Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_summary_wire_names() {
        let summary = ActualizeSummary {
            removed_game_ids: vec![Uuid::nil()],
            updated_game_ids: vec![],
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["removedGameIds"][0], Uuid::nil().to_string());
        assert!(value["updatedGameIds"].as_array().unwrap().is_empty());
    }
}
