use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

/// The backend writes an unset domain, logo or token as `""`.
fn empty_as_none<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(de)?;
    Ok(raw.filter(|s| !s.trim().is_empty()))
}

fn default_true() -> bool {
    true
}

/// Owner sub-object embedded in detail, listing and stats payloads. Each
/// endpoint fills a different subset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardOwner {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub company_name: Option<String>,
}

/// A visit card in any of its shapes. Reduced public shapes leave the token,
/// the counters and the owner out, so those stay optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitCard {
    pub id: u64,
    #[serde(default)]
    pub user_id: Option<u64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub logo_url: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub domain: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub telegram_bot_token: Option<String>,
    #[serde(default = "default_true")]
    pub token_valid: bool,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub token_error_message: Option<String>,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default)]
    pub bot_view_count: Option<u64>,
    #[serde(default)]
    pub user: Option<CardOwner>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

impl VisitCard {
    pub fn owner_name(&self) -> Option<&str> {
        self.user.as_ref()?.name.as_deref()
    }

    pub fn owner_company(&self) -> Option<&str> {
        self.user.as_ref()?.company_name.as_deref()
    }

    /// Set when the backend found the bot token rejected by the bot platform.
    pub fn token_problem(&self) -> Option<&str> {
        if self.telegram_bot_token.is_none() || self.token_valid {
            return None;
        }
        Some(
            self.token_error_message
                .as_deref()
                .unwrap_or("Bot token is invalid"),
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub pages: u32,
}

#[derive(Debug, Deserialize)]
pub struct CardEnvelope {
    pub visit_card: VisitCard,
}

#[derive(Debug, Deserialize)]
pub struct CardsEnvelope {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub visit_cards: Vec<VisitCard>,
}

/// One page of the public directory.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublicCardsPage {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub visit_cards: Vec<VisitCard>,
    #[serde(default)]
    pub pagination: Pagination,
}

/// Go encodes an empty slice as `null` when it was never allocated.
fn null_as_empty<'de, D, T>(de: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(de)?.unwrap_or_default())
}

/// Row of the admin statistics listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CardStatistic {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub bot_view_count: u64,
    #[serde(default)]
    pub user: Option<CardOwner>,
}

#[derive(Debug, Deserialize)]
pub struct StatsEnvelope {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub all_stats: Vec<CardStatistic>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct CardStats {
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub bot_view_count: u64,
}

#[derive(Debug, Deserialize)]
pub struct CardStatsEnvelope {
    pub stats: CardStats,
}

/// Text fields sent on create and update. Absent values go out as `""`,
/// which the backend reads as "unset".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CardPayload {
    pub title: String,
    pub description: String,
    pub domain: String,
    pub telegram_bot_token: String,
}
