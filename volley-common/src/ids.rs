//! Identifier types for campaigns and recipients

use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
    sync::{Arc, LazyLock, Mutex, PoisonError},
};

use serde::{Deserialize, Serialize};

/// Process-wide source of recipient ids, monotonic even within one
/// millisecond.
static RECIPIENT_IDS: LazyLock<Mutex<ulid::Generator>> =
    LazyLock::new(|| Mutex::new(ulid::Generator::new()));

/// Caller-assigned campaign identifier.
///
/// Campaign ids come from the outside (campaign definition files, APIs) and
/// are treated as opaque strings. Cloning is cheap; runs hand the id around
/// freely.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CampaignId(Arc<str>);

impl CampaignId {
    #[must_use]
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CampaignId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CampaignId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for CampaignId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

/// Store-assigned recipient identifier.
///
/// Ids come from a shared monotonic ULID generator: two ids minted in the
/// same millisecond still sort in mint order, so ordering recipients by id
/// reproduces insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecipientId {
    id: ulid::Ulid,
}

impl RecipientId {
    /// Mint a fresh identifier, strictly greater than every id minted
    /// before it by this process.
    #[must_use]
    pub fn generate() -> Self {
        let mut ids = RECIPIENT_IDS
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // The generator only errors when the random component overflows
        // within one millisecond.
        let id = ids.generate().unwrap_or_else(|_| ulid::Ulid::new());
        Self { id }
    }

    #[must_use]
    pub const fn new(id: ulid::Ulid) -> Self {
        Self { id }
    }

    #[must_use]
    pub const fn ulid(&self) -> ulid::Ulid {
        self.id
    }
}

impl Display for RecipientId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.id, f)
    }
}

impl FromStr for RecipientId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self {
            id: ulid::Ulid::from_string(s)?,
        })
    }
}

impl Serialize for RecipientId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(&self.id)
    }
}

impl<'de> Deserialize<'de> for RecipientId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn campaign_ids_compare_by_content() {
        let a = CampaignId::new("spring-launch");
        let b = CampaignId::from("spring-launch");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "spring-launch");
        assert_eq!(a.to_string(), "spring-launch");
    }

    #[test]
    fn recipient_ids_are_unique() {
        let a = RecipientId::generate();
        let b = RecipientId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn recipient_ids_round_trip_through_display() {
        let id = RecipientId::generate();
        let parsed: RecipientId = id.to_string().parse().expect("valid ULID text");
        assert_eq!(id, parsed);
    }

    #[test]
    fn recipient_ids_preserve_creation_order() {
        let first = RecipientId::generate();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = RecipientId::generate();
        assert!(first < second);
    }

    #[test]
    fn ids_minted_back_to_back_sort_in_mint_order() {
        // A tight loop mints many ids inside a single millisecond; they must
        // still come out ordered.
        let minted: Vec<RecipientId> = (0..512).map(|_| RecipientId::generate()).collect();
        let mut sorted = minted.clone();
        sorted.sort();
        assert_eq!(minted, sorted);
    }

    #[test]
    fn ids_serialize_as_strings() {
        let campaign = CampaignId::new("welcome");
        assert_eq!(ron::to_string(&campaign).unwrap(), "\"welcome\"");

        let recipient = RecipientId::generate();
        let serialized = ron::to_string(&recipient).unwrap();
        let deserialized: RecipientId = ron::from_str(&serialized).unwrap();
        assert_eq!(recipient, deserialized);
    }

    #[test]
    fn invalid_recipient_id_text_is_rejected() {
        assert!("not-a-ulid".parse::<RecipientId>().is_err());
    }
}
