//! Campaign file loading
//!
//! A campaign file is RON: one campaign record plus its recipient list.
//! Importing validates every address up front and then seeds the store, so
//! a bad file never leaves a half-imported campaign behind.

use std::{collections::HashSet, path::Path};

use serde::Deserialize;
use thiserror::Error;
use volley_common::{Campaign, CampaignId, Recipient, internal};
use volley_store::{MemoryStore, StoreError};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed campaign file: {0}")]
    Malformed(#[from] ron::error::SpannedError),

    #[error("Invalid email address for {name:?}: {email:?}")]
    InvalidEmail { name: String, email: String },

    #[error("Duplicate email address for {name:?}: {email:?}")]
    DuplicateEmail { name: String, email: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Deserialize)]
struct CampaignFile {
    campaign: CampaignSpec,
    #[serde(default)]
    recipients: Vec<RecipientSpec>,
}

#[derive(Debug, Deserialize)]
struct CampaignSpec {
    id: String,
    subject: String,
    body: String,
    rate_limit_per_minute: u32,
}

#[derive(Debug, Deserialize)]
struct RecipientSpec {
    email: String,
    name: String,
}

/// Load a campaign file and seed `store` with a draft campaign and its
/// pending recipients. Returns the inserted campaign row.
///
/// # Errors
/// `Io`/`Malformed` when the file cannot be read or parsed, `InvalidEmail`
/// when an address does not parse to a single mailbox, `DuplicateEmail`
/// when the file repeats an address, `Store` when the campaign id is taken.
pub fn import_campaign_file(store: &MemoryStore, path: &Path) -> Result<Campaign, ImportError> {
    seed(store, parse_file(path)?)
}

/// Like [`import_campaign_file`], but when the store already holds the
/// file's campaign the stored row is returned as-is: settled recipients stay
/// settled and nothing is re-inserted. The resume path.
///
/// # Errors
/// As [`import_campaign_file`].
pub fn import_or_resume(store: &MemoryStore, path: &Path) -> Result<Campaign, ImportError> {
    let file = parse_file(path)?;
    match store.campaign(&CampaignId::new(file.campaign.id.as_str())) {
        Ok(existing) => {
            internal!(
                level = INFO,
                "campaign {} already imported, picking it back up",
                existing.id
            );
            Ok(existing)
        }
        Err(StoreError::CampaignNotFound(_)) => seed(store, file),
        Err(other) => Err(other.into()),
    }
}

fn parse_file(path: &Path) -> Result<CampaignFile, ImportError> {
    let content = std::fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(ron::from_str(&content)?)
}

fn seed(store: &MemoryStore, file: CampaignFile) -> Result<Campaign, ImportError> {
    // Validate and dedupe every address before touching the store.
    let mut addresses = Vec::with_capacity(file.recipients.len());
    let mut seen = HashSet::with_capacity(file.recipients.len());
    for spec in &file.recipients {
        let address =
            canonical_address(&spec.email).ok_or_else(|| ImportError::InvalidEmail {
                name: spec.name.clone(),
                email: spec.email.clone(),
            })?;
        if !seen.insert(address.clone()) {
            return Err(ImportError::DuplicateEmail {
                name: spec.name.clone(),
                email: address,
            });
        }
        addresses.push(address);
    }

    let campaign = Campaign::new(
        CampaignId::new(file.campaign.id),
        file.campaign.subject,
        file.campaign.body,
        file.campaign.rate_limit_per_minute,
    );
    let recipient_count = file.recipients.len();
    store.insert_campaign(campaign.clone())?;
    for (spec, address) in file.recipients.into_iter().zip(addresses) {
        store.insert_recipient(Recipient::new(campaign.id.clone(), address, spec.name))?;
    }

    internal!(
        level = INFO,
        "imported campaign {} ({recipient_count} recipients, {}/min)",
        campaign.id,
        campaign.rate_limit_per_minute
    );
    Ok(campaign)
}

/// Accepts a bare address or a `Name <addr>` form; anything that does not
/// parse to exactly one mailbox with a domain is rejected.
fn canonical_address(raw: &str) -> Option<String> {
    let parsed = mailparse::addrparse(raw).ok()?;
    match &parsed[..] {
        [mailparse::MailAddr::Single(single)] if single.addr.contains('@') => {
            Some(single.addr.clone())
        }
        _ => None,
    }
}
