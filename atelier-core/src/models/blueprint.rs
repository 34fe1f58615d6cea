//! Blueprints (the `app` schema)
//!
//! A blueprint was called a "template" before the rename; old template URLs
//! redirect to blueprint URLs.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::user::PublicProfile;
use super::validation::required_text;
use super::ValidationError;

/// Maximum length for blueprint titles
pub const MAX_TITLE_LEN: usize = 120;

/// Maximum length for blueprint descriptions
pub const MAX_DESCRIPTION_LEN: usize = 2000;

/// Kind pattern: lowercase slug, matches the `blueprints_kind_format` check
static KIND_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9_-]{0,31}$").expect("invalid kind regex"));

/// Who can see a blueprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Listed and readable by anyone
    Public,
    /// Readable by anyone with the link, never listed
    Unlisted,
    /// Readable only by the owner
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Unlisted => "unlisted",
            Self::Private => "private",
        }
    }
}

impl FromStr for Visibility {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Self::Public),
            "unlisted" => Ok(Self::Unlisted),
            "private" => Ok(Self::Private),
            other => Err(ValidationError::InvalidVariant {
                field: "visibility",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pricing tier a blueprint requires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Pro,
    Team,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
            Self::Team => "team",
        }
    }
}

impl FromStr for Tier {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Self::Free),
            "pro" => Ok(Self::Pro),
            "team" => Ok(Self::Team),
            other => Err(ValidationError::InvalidVariant {
                field: "tier",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Blueprint record from the `app` schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blueprint {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub visibility: Visibility,
    pub tier: Tier,
    pub kind: String,
    /// Id of a row in the `users` schema. Not enforced by the database.
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Blueprint {
    /// Whether `viewer` may read this blueprint by id.
    pub fn is_visible_to(&self, viewer: Option<&str>) -> bool {
        match self.visibility {
            Visibility::Public | Visibility::Unlisted => true,
            Visibility::Private => viewer == Some(self.owner_id.as_str()),
        }
    }
}

/// Blueprint joined with its owner from the `users` schema.
///
/// `owner` is `None` when the owner row no longer exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlueprintWithOwner {
    #[serde(flatten)]
    pub blueprint: Blueprint,
    pub owner: Option<PublicProfile>,
}

/// Validated input for creating a blueprint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlueprintDraft {
    pub title: String,
    pub description: Option<String>,
    pub visibility: Visibility,
    pub tier: Tier,
    pub kind: String,
}

impl BlueprintDraft {
    pub fn new(
        title: &str,
        description: Option<&str>,
        visibility: Visibility,
        tier: Tier,
        kind: &str,
    ) -> Result<Self, ValidationError> {
        let title = required_text("title", title, MAX_TITLE_LEN)?;

        let description = match description.map(str::trim) {
            None | Some("") => None,
            Some(text) if text.chars().count() > MAX_DESCRIPTION_LEN => {
                return Err(ValidationError::TooLong {
                    field: "description",
                    max: MAX_DESCRIPTION_LEN,
                })
            }
            Some(text) => Some(text.to_string()),
        };

        if kind.is_empty() {
            return Err(ValidationError::Empty { field: "kind" });
        }
        if !KIND_RE.is_match(kind) {
            return Err(ValidationError::InvalidFormat {
                field: "kind",
                reason: "must be lowercase alphanumeric with hyphens/underscores, at most 32 characters",
            });
        }

        Ok(Self {
            title,
            description,
            visibility,
            tier,
            kind: kind.to_string(),
        })
    }
}

/// Filters for listing public blueprints
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlueprintFilter {
    pub tier: Option<Tier>,
    pub kind: Option<String>,
}

impl BlueprintFilter {
    pub fn matches(&self, blueprint: &Blueprint) -> bool {
        self.tier.map_or(true, |tier| blueprint.tier == tier)
            && self
                .kind
                .as_deref()
                .map_or(true, |kind| blueprint.kind == kind)
    }
}
