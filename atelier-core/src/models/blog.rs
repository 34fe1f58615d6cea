//! Blog posts (the `blog` schema)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::PublicProfile;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub body: String,
    /// Id of a row in the `users` schema. Not enforced by the database.
    pub author_id: String,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Post joined with its author; `author` is `None` when the user is gone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostWithAuthor {
    #[serde(flatten)]
    pub post: BlogPost,
    pub author: Option<PublicProfile>,
}
