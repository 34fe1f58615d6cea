//! In-memory store implementing every schema trait
//!
//! Used by router tests and for running the server without Postgres. Honors
//! the same ordering and filtering contracts as the Postgres repositories.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use atelier_core::models::{
    BlogPost, Blueprint, BlueprintDraft, BlueprintFilter, Subscription, SupportTag, UserProfile,
    Visibility,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::repos::{
    hash_token, AppStore, BlogStore, DbError, SupportStore, UsersStore, BLUEPRINT_LIST_LIMIT,
};

#[derive(Default)]
struct Tables {
    blueprints: Vec<Blueprint>,
    users: Vec<UserProfile>,
    subscriptions: Vec<Subscription>,
    sessions: Vec<SessionRow>,
    tags: Vec<SupportTag>,
    posts: Vec<BlogPost>,
}

struct SessionRow {
    token_hash: String,
    user_id: String,
    expires_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
    failing: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic in another test thread must not wedge the store
    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(|e| e.into_inner())
    }

    fn check(&self) -> Result<(), DbError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DbError::Unavailable("simulated outage".into()));
        }
        Ok(())
    }

    /// Make every subsequent query fail until reset
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn add_blueprint(&self, blueprint: Blueprint) {
        self.write().blueprints.push(blueprint);
    }

    pub fn add_user(&self, user: UserProfile) {
        self.write().users.push(user);
    }

    /// Delete a user without touching rows that reference it from other schemas
    pub fn remove_user(&self, id: &str) {
        let mut tables = self.write();
        tables.users.retain(|u| u.id != id);
        tables.subscriptions.retain(|s| s.user_id != id);
        tables.sessions.retain(|s| s.user_id != id);
    }

    pub fn add_subscription(&self, subscription: Subscription) {
        self.write().subscriptions.push(subscription);
    }

    /// Register a session for the plain bearer `token`
    pub fn add_session(&self, token: &str, user_id: &str, expires_at: DateTime<Utc>) {
        self.write().sessions.push(SessionRow {
            token_hash: hash_token(token),
            user_id: user_id.to_string(),
            expires_at,
        });
    }

    pub fn add_tag(&self, tag: SupportTag) {
        self.write().tags.push(tag);
    }

    pub fn add_post(&self, post: BlogPost) {
        self.write().posts.push(post);
    }

    pub fn blueprint_count(&self) -> usize {
        self.read().blueprints.len()
    }
}

/// Newest first, capped like the Postgres list queries
fn newest_first(blueprints: &mut Vec<Blueprint>) {
    blueprints.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    blueprints.truncate(usize::try_from(BLUEPRINT_LIST_LIMIT).unwrap_or(usize::MAX));
}

fn is_published(post: &BlogPost, now: DateTime<Utc>) -> bool {
    post.published_at.is_some_and(|at| at <= now)
}

#[async_trait]
impl AppStore for InMemoryStore {
    async fn list_public(&self, filter: &BlueprintFilter) -> Result<Vec<Blueprint>, DbError> {
        self.check()?;
        let mut found: Vec<Blueprint> = self
            .read()
            .blueprints
            .iter()
            .filter(|b| b.visibility == Visibility::Public && filter.matches(b))
            .cloned()
            .collect();
        newest_first(&mut found);
        Ok(found)
    }

    async fn get(&self, id: &str) -> Result<Option<Blueprint>, DbError> {
        self.check()?;
        Ok(self.read().blueprints.iter().find(|b| b.id == id).cloned())
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Blueprint>, DbError> {
        self.check()?;
        let mut found: Vec<Blueprint> = self
            .read()
            .blueprints
            .iter()
            .filter(|b| b.owner_id == owner_id)
            .cloned()
            .collect();
        newest_first(&mut found);
        Ok(found)
    }

    async fn insert(&self, owner_id: &str, draft: &BlueprintDraft) -> Result<Blueprint, DbError> {
        self.check()?;
        let now = Utc::now();
        let blueprint = Blueprint {
            id: Uuid::new_v4().to_string(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            visibility: draft.visibility,
            tier: draft.tier,
            kind: draft.kind.clone(),
            owner_id: owner_id.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.write().blueprints.push(blueprint.clone());
        Ok(blueprint)
    }
}

#[async_trait]
impl UsersStore for InMemoryStore {
    async fn profiles_by_ids(&self, ids: &[String]) -> Result<Vec<UserProfile>, DbError> {
        self.check()?;
        Ok(self
            .read()
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn profile(&self, id: &str) -> Result<Option<UserProfile>, DbError> {
        self.check()?;
        Ok(self.read().users.iter().find(|u| u.id == id).cloned())
    }

    async fn subscription(&self, user_id: &str) -> Result<Option<Subscription>, DbError> {
        self.check()?;
        Ok(self
            .read()
            .subscriptions
            .iter()
            .find(|s| s.user_id == user_id)
            .cloned())
    }

    async fn user_for_token_hash(&self, token_hash: &str) -> Result<Option<UserProfile>, DbError> {
        self.check()?;
        let now = Utc::now();
        let tables = self.read();
        let Some(session) = tables
            .sessions
            .iter()
            .find(|s| s.token_hash == token_hash && s.expires_at > now)
        else {
            return Ok(None);
        };
        Ok(tables
            .users
            .iter()
            .find(|u| u.id == session.user_id)
            .cloned())
    }
}

#[async_trait]
impl SupportStore for InMemoryStore {
    async fn active_tags(&self) -> Result<Vec<SupportTag>, DbError> {
        self.check()?;
        let mut tags: Vec<SupportTag> = self
            .read()
            .tags
            .iter()
            .filter(|t| t.is_active)
            .cloned()
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }
}

#[async_trait]
impl BlogStore for InMemoryStore {
    async fn list_published(&self, limit: i64) -> Result<Vec<BlogPost>, DbError> {
        self.check()?;
        let now = Utc::now();
        let mut posts: Vec<BlogPost> = self
            .read()
            .posts
            .iter()
            .filter(|p| is_published(p, now))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        posts.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(posts)
    }

    async fn published_by_slug(&self, slug: &str) -> Result<Option<BlogPost>, DbError> {
        self.check()?;
        let now = Utc::now();
        Ok(self
            .read()
            .posts
            .iter()
            .find(|p| p.slug == slug && is_published(p, now))
            .cloned())
    }
}
