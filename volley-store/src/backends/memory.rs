//! In-memory campaign store backend

use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use async_trait::async_trait;
use volley_common::{Campaign, CampaignId, Recipient, RecipientId, RecipientStatus};

use crate::{StoreError, r#trait::CampaignStore, types::CampaignProgress};

/// In-memory campaign store
///
/// Campaign and recipient tables are `HashMap`s behind `RwLock`s, shared by
/// cloning. Suitable for tests and single-process runs; rows do not survive
/// a restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    campaigns: Arc<RwLock<HashMap<CampaignId, Campaign>>>,
    recipients: Arc<RwLock<HashMap<RecipientId, Recipient>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new campaign.
    ///
    /// # Errors
    /// `AlreadyExists` when the id is taken.
    pub fn insert_campaign(&self, campaign: Campaign) -> crate::Result<()> {
        let mut campaigns = self.campaigns.write()?;
        if campaigns.contains_key(&campaign.id) {
            return Err(StoreError::AlreadyExists(campaign.id));
        }
        campaigns.insert(campaign.id.clone(), campaign);
        Ok(())
    }

    /// Attach a recipient to an existing campaign.
    ///
    /// # Errors
    /// `CampaignNotFound` when the campaign is unknown, `DuplicateRecipient`
    /// when the campaign already has a recipient with this email.
    pub fn insert_recipient(&self, recipient: Recipient) -> crate::Result<()> {
        if !self.campaigns.read()?.contains_key(&recipient.campaign_id) {
            return Err(StoreError::CampaignNotFound(recipient.campaign_id));
        }

        let mut recipients = self.recipients.write()?;
        if recipients.values().any(|existing| {
            existing.campaign_id == recipient.campaign_id && existing.email == recipient.email
        }) {
            return Err(StoreError::DuplicateRecipient {
                campaign: recipient.campaign_id,
                email: recipient.email,
            });
        }
        recipients.insert(recipient.id.clone(), recipient);
        Ok(())
    }

    /// Read back one campaign row.
    ///
    /// # Errors
    /// `CampaignNotFound` when the id is unknown.
    pub fn campaign(&self, id: &CampaignId) -> crate::Result<Campaign> {
        self.campaigns
            .read()?
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::CampaignNotFound(id.clone()))
    }

    /// Read back one recipient row.
    ///
    /// # Errors
    /// `RecipientNotFound` when the id is unknown.
    pub fn recipient(&self, id: &RecipientId) -> crate::Result<Recipient> {
        self.recipients
            .read()?
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::RecipientNotFound(id.clone()))
    }

    /// Every recipient of `campaign_id`, regardless of status, in insertion
    /// order.
    ///
    /// # Errors
    /// Lock poisoning only.
    pub fn recipients(&self, campaign_id: &CampaignId) -> crate::Result<Vec<Recipient>> {
        let mut rows: Vec<Recipient> = self
            .recipients
            .read()?
            .values()
            .filter(|recipient| &recipient.campaign_id == campaign_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(rows)
    }

    /// Number of stored campaigns.
    pub fn campaign_count(&self) -> usize {
        self.campaigns
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl CampaignStore for MemoryStore {
    async fn load_campaign(&self, id: &CampaignId) -> crate::Result<Campaign> {
        self.campaigns
            .read()?
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::CampaignNotFound(id.clone()))
    }

    async fn load_pending_recipients(
        &self,
        campaign_id: &CampaignId,
    ) -> crate::Result<Vec<Recipient>> {
        if !self.campaigns.read()?.contains_key(campaign_id) {
            return Err(StoreError::CampaignNotFound(campaign_id.clone()));
        }

        let mut pending: Vec<Recipient> = self
            .recipients
            .read()?
            .values()
            .filter(|recipient| {
                &recipient.campaign_id == campaign_id && recipient.status.is_pending()
            })
            .cloned()
            .collect();
        // Ids are minted monotonically, so id order is insertion order.
        pending.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(pending)
    }

    async fn update_recipient_status(
        &self,
        id: &RecipientId,
        status: RecipientStatus,
    ) -> crate::Result<()> {
        let mut recipients = self.recipients.write()?;
        let Some(recipient) = recipients.get_mut(id) else {
            return Err(StoreError::RecipientNotFound(id.clone()));
        };

        if !recipient.status.is_pending() || !status.is_terminal() {
            return Err(StoreError::InvalidTransition(format!(
                "recipient {id} cannot move from {} to {status}",
                recipient.status,
            )));
        }

        recipient.status = status;
        Ok(())
    }

    async fn update_campaign_progress(&self, progress: &CampaignProgress) -> crate::Result<()> {
        let mut campaigns = self.campaigns.write()?;
        let Some(campaign) = campaigns.get_mut(&progress.campaign_id) else {
            return Err(StoreError::CampaignNotFound(progress.campaign_id.clone()));
        };

        if !campaign.status.accepts(progress.status) {
            return Err(StoreError::InvalidTransition(format!(
                "campaign {} cannot move from {} to {}",
                campaign.id, campaign.status, progress.status,
            )));
        }

        let settled = u64::from(progress.sent_count) + u64::from(progress.failed_count);
        if settled > u64::from(progress.total_recipients) {
            return Err(StoreError::InvalidProgress(format!(
                "sent {} + failed {} exceeds total {} for campaign {}",
                progress.sent_count,
                progress.failed_count,
                progress.total_recipients,
                campaign.id,
            )));
        }

        campaign.status = progress.status;
        campaign.total_recipients = progress.total_recipients;
        campaign.sent_count = progress.sent_count;
        campaign.failed_count = progress.failed_count;
        campaign.started_at = progress.started_at;
        campaign.completed_at = progress.completed_at;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use volley_common::CampaignStatus;

    use super::*;

    fn campaign(id: &str) -> Campaign {
        Campaign::new(CampaignId::new(id), "Hi {{name}}", "Hello {{name}}", 10)
    }

    #[test]
    fn duplicate_campaign_ids_are_rejected() {
        let store = MemoryStore::new();
        store.insert_campaign(campaign("spring")).unwrap();
        let error = store.insert_campaign(campaign("spring")).unwrap_err();
        assert!(matches!(error, StoreError::AlreadyExists(_)));
        assert_eq!(store.campaign_count(), 1);
    }

    #[test]
    fn recipients_need_an_existing_campaign() {
        let store = MemoryStore::new();
        let orphan = Recipient::new(CampaignId::new("nope"), "ada@example.org", "Ada");
        let error = store.insert_recipient(orphan).unwrap_err();
        assert!(matches!(error, StoreError::CampaignNotFound(_)));
    }

    #[test]
    fn duplicate_emails_within_a_campaign_are_rejected() {
        let store = MemoryStore::new();
        store.insert_campaign(campaign("spring")).unwrap();
        let id = CampaignId::new("spring");
        store
            .insert_recipient(Recipient::new(id.clone(), "ada@example.org", "Ada"))
            .unwrap();
        let error = store
            .insert_recipient(Recipient::new(id, "ada@example.org", "Ada again"))
            .unwrap_err();
        assert!(matches!(error, StoreError::DuplicateRecipient { .. }));

        // The same email under a different campaign is fine.
        store.insert_campaign(campaign("summer")).unwrap();
        store
            .insert_recipient(Recipient::new(
                CampaignId::new("summer"),
                "ada@example.org",
                "Ada",
            ))
            .unwrap();
    }

    #[tokio::test]
    async fn pending_recipients_come_back_in_insertion_order() {
        let store = MemoryStore::new();
        store.insert_campaign(campaign("spring")).unwrap();
        let id = CampaignId::new("spring");

        let mut inserted = Vec::new();
        for index in 0..5 {
            let recipient = Recipient::new(id.clone(), format!("user{index}@example.org"), "User");
            inserted.push(recipient.id.clone());
            store.insert_recipient(recipient).unwrap();
        }

        // Settle one; it must no longer be listed as pending.
        store
            .update_recipient_status(&inserted[2], RecipientStatus::Sent { sent_at: Utc::now() })
            .await
            .unwrap();

        let pending = store.load_pending_recipients(&id).await.unwrap();
        let pending_ids: Vec<RecipientId> = pending.into_iter().map(|r| r.id).collect();
        assert_eq!(
            pending_ids,
            vec![
                inserted[0].clone(),
                inserted[1].clone(),
                inserted[3].clone(),
                inserted[4].clone(),
            ]
        );
    }

    #[tokio::test]
    async fn recipients_settle_exactly_once() {
        let store = MemoryStore::new();
        store.insert_campaign(campaign("spring")).unwrap();
        let recipient = Recipient::new(CampaignId::new("spring"), "ada@example.org", "Ada");
        let recipient_id = recipient.id.clone();
        store.insert_recipient(recipient).unwrap();

        store
            .update_recipient_status(
                &recipient_id,
                RecipientStatus::Failed {
                    reason: "mailbox full".to_string(),
                },
            )
            .await
            .unwrap();

        // A second write, even to the same status, is a transition error.
        let error = store
            .update_recipient_status(
                &recipient_id,
                RecipientStatus::Sent { sent_at: Utc::now() },
            )
            .await
            .unwrap_err();
        assert!(matches!(error, StoreError::InvalidTransition(_)));

        let row = store.recipient(&recipient_id).unwrap();
        assert_eq!(row.status.failure_reason(), Some("mailbox full"));
    }

    #[tokio::test]
    async fn writing_pending_as_a_status_is_rejected() {
        let store = MemoryStore::new();
        store.insert_campaign(campaign("spring")).unwrap();
        let recipient = Recipient::new(CampaignId::new("spring"), "ada@example.org", "Ada");
        let recipient_id = recipient.id.clone();
        store.insert_recipient(recipient).unwrap();

        let error = store
            .update_recipient_status(&recipient_id, RecipientStatus::Pending)
            .await
            .unwrap_err();
        assert!(matches!(error, StoreError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn progress_writes_enforce_the_lifecycle() {
        let store = MemoryStore::new();
        store.insert_campaign(campaign("spring")).unwrap();
        let id = CampaignId::new("spring");

        // draft -> completed skips sending.
        let error = store
            .update_campaign_progress(&CampaignProgress {
                campaign_id: id.clone(),
                status: CampaignStatus::Completed,
                total_recipients: 0,
                sent_count: 0,
                failed_count: 0,
                started_at: None,
                completed_at: Some(Utc::now()),
            })
            .await
            .unwrap_err();
        assert!(matches!(error, StoreError::InvalidTransition(_)));

        store
            .update_campaign_progress(&CampaignProgress {
                campaign_id: id.clone(),
                status: CampaignStatus::Sending,
                total_recipients: 10,
                sent_count: 0,
                failed_count: 0,
                started_at: Some(Utc::now()),
                completed_at: None,
            })
            .await
            .unwrap();
        assert_eq!(store.campaign(&id).unwrap().status, CampaignStatus::Sending);
    }

    #[tokio::test]
    async fn progress_writes_enforce_the_count_invariant() {
        let store = MemoryStore::new();
        store.insert_campaign(campaign("spring")).unwrap();
        let id = CampaignId::new("spring");

        let error = store
            .update_campaign_progress(&CampaignProgress {
                campaign_id: id.clone(),
                status: CampaignStatus::Sending,
                total_recipients: 5,
                sent_count: 4,
                failed_count: 2,
                started_at: Some(Utc::now()),
                completed_at: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(error, StoreError::InvalidProgress(_)));

        // The failed write must not have touched the row.
        let row = store.campaign(&id).unwrap();
        assert_eq!(row.status, CampaignStatus::Draft);
        assert_eq!(row.sent_count, 0);
    }

    #[tokio::test]
    async fn unknown_campaigns_cannot_be_loaded() {
        let store = MemoryStore::new();
        let id = CampaignId::new("ghost");
        assert!(matches!(
            store.load_campaign(&id).await.unwrap_err(),
            StoreError::CampaignNotFound(_)
        ));
        assert!(matches!(
            store.load_pending_recipients(&id).await.unwrap_err(),
            StoreError::CampaignNotFound(_)
        ));
    }
}
