//! Cross-schema composition
//!
//! Rows in `app` and `blog` reference users by id, but the `users` schema is a
//! separate database, so the join happens here: collect the distinct foreign
//! ids, fetch exactly those users in one query, and merge in memory.
//!
//! Missing references: the row is kept and its joined field is `None`
//! (serialized as `null`). Each dangling id is logged at `warn`. The two
//! queries are not in one transaction, so a user deleted in between is
//! indistinguishable from one deleted long ago.

use std::collections::{HashMap, HashSet};

use atelier_core::models::{
    BlogPost, Blueprint, BlueprintDraft, BlueprintWithOwner, PostWithAuthor, PublicProfile,
};
use tracing::{debug, warn};

use crate::db::{AppStore, DbError, UsersStore};

/// Join `items` with `refs` by id, keeping every item in its original order.
///
/// `foreign_key` reads the referencing id from an item, `ref_id` the primary
/// id from a referenced row. Items without a match get `None`.
pub fn merge_by_id<T, R, K, I>(
    items: Vec<T>,
    refs: Vec<R>,
    foreign_key: K,
    ref_id: I,
) -> Vec<(T, Option<R>)>
where
    R: Clone,
    K: Fn(&T) -> &str,
    I: Fn(&R) -> &str,
{
    let by_id: HashMap<String, R> = refs
        .into_iter()
        .map(|r| (ref_id(&r).to_string(), r))
        .collect();

    items
        .into_iter()
        .map(|item| {
            let joined = by_id.get(foreign_key(&item)).cloned();
            (item, joined)
        })
        .collect()
}

/// Distinct foreign ids in first-seen order
fn distinct_ids<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id))
        .map(str::to_string)
        .collect()
}

/// Fetch the public profiles for `ids` from the users schema.
async fn fetch_profiles(
    users: &dyn UsersStore,
    ids: &[String],
) -> Result<Vec<PublicProfile>, DbError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let found = users.profiles_by_ids(ids).await?;
    debug!(requested = ids.len(), found = found.len(), "fetched users for composition");

    Ok(found.into_iter().map(PublicProfile::from).collect())
}

fn log_dangling<T>(joined: &[(T, Option<PublicProfile>)], key: impl Fn(&T) -> &str, what: &str) {
    for (item, profile) in joined {
        if profile.is_none() {
            warn!(user_id = key(item), "{} references a missing user", what);
        }
    }
}

/// Attach each blueprint's owner from the users schema.
pub async fn blueprints_with_owners(
    users: &dyn UsersStore,
    blueprints: Vec<Blueprint>,
) -> Result<Vec<BlueprintWithOwner>, DbError> {
    let ids = distinct_ids(blueprints.iter().map(|b| b.owner_id.as_str()));
    let profiles = fetch_profiles(users, &ids).await?;

    let joined = merge_by_id(blueprints, profiles, |b| b.owner_id.as_str(), |p| p.id.as_str());
    log_dangling(&joined, |b| b.owner_id.as_str(), "blueprint");

    Ok(joined
        .into_iter()
        .map(|(blueprint, owner)| BlueprintWithOwner { blueprint, owner })
        .collect())
}

/// Attach each post's author from the users schema.
pub async fn posts_with_authors(
    users: &dyn UsersStore,
    posts: Vec<BlogPost>,
) -> Result<Vec<PostWithAuthor>, DbError> {
    let ids = distinct_ids(posts.iter().map(|p| p.author_id.as_str()));
    let profiles = fetch_profiles(users, &ids).await?;

    let joined = merge_by_id(posts, profiles, |p| p.author_id.as_str(), |u| u.id.as_str());
    log_dangling(&joined, |p| p.author_id.as_str(), "post");

    Ok(joined
        .into_iter()
        .map(|(post, author)| PostWithAuthor { post, author })
        .collect())
}

/// Create a blueprint after verifying its owner exists in the users schema.
///
/// The check and the insert hit different databases, so a user deleted in
/// between still leaves a dangling owner; readers tolerate that via the
/// `None` policy above.
pub async fn create_blueprint_checked(
    app: &dyn AppStore,
    users: &dyn UsersStore,
    owner_id: &str,
    draft: &BlueprintDraft,
) -> Result<Blueprint, DbError> {
    if users.profile(owner_id).await?.is_none() {
        return Err(DbError::Integrity {
            reason: format!("owner '{owner_id}' does not exist in the users schema"),
        });
    }

    app.insert(owner_id, draft).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::InMemoryStore;
    use atelier_core::models::{Tier, UserProfile, Visibility};
    use chrono::{Duration, Utc};

    fn user(id: &str) -> UserProfile {
        UserProfile {
            id: id.into(),
            username: format!("{id}-name"),
            email: format!("{id}@example.com"),
            display_name: None,
            avatar_url: None,
            created_at: Utc::now(),
        }
    }

    fn blueprint(id: &str, owner: &str, age_minutes: i64) -> Blueprint {
        let at = Utc::now() - Duration::minutes(age_minutes);
        Blueprint {
            id: id.into(),
            title: format!("Blueprint {id}"),
            description: None,
            visibility: Visibility::Public,
            tier: Tier::Free,
            kind: "workflow".into(),
            owner_id: owner.into(),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn merge_keeps_order_and_nulls_missing() {
        let items = vec![("a", "u1"), ("b", "u2"), ("c", "u1")];
        let refs = vec![("u1", "Ada")];

        let merged = merge_by_id(items, refs, |i| i.1, |r| r.0);

        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0], (("a", "u1"), Some(("u1", "Ada"))));
        assert_eq!(merged[1], (("b", "u2"), None));
        assert_eq!(merged[2], (("c", "u1"), Some(("u1", "Ada"))));
    }

    #[test]
    fn distinct_ids_dedupes_in_order() {
        let ids = distinct_ids(["u2", "u1", "u2", "u3", "u1"].into_iter());
        assert_eq!(ids, vec!["u2", "u1", "u3"]);
    }

    #[tokio::test]
    async fn present_owner_is_attached() {
        let store = InMemoryStore::new();
        store.add_user(user("u1"));

        let joined = blueprints_with_owners(&store, vec![blueprint("b1", "u1", 0)])
            .await
            .unwrap();

        let owner = joined[0].owner.as_ref().expect("owner attached");
        assert_eq!(owner.username, "u1-name");
    }

    #[tokio::test]
    async fn absent_owner_is_null_and_row_kept() {
        let store = InMemoryStore::new();
        store.add_user(user("u1"));

        let joined = blueprints_with_owners(
            &store,
            vec![blueprint("b1", "u1", 0), blueprint("b2", "ghost", 1)],
        )
        .await
        .unwrap();

        assert_eq!(joined.len(), 2);
        assert!(joined[0].owner.is_some());
        assert_eq!(joined[1].blueprint.id, "b2");
        assert!(joined[1].owner.is_none());

        let value = serde_json::to_value(&joined[1]).unwrap();
        assert!(value["owner"].is_null());
    }

    #[tokio::test]
    async fn empty_input_skips_users_query() {
        let store = InMemoryStore::new();
        // A failing users store proves no query was issued
        store.set_failing(true);

        let joined = blueprints_with_owners(&store, Vec::new()).await.unwrap();
        assert!(joined.is_empty());
    }

    #[tokio::test]
    async fn users_failure_propagates() {
        let store = InMemoryStore::new();
        store.set_failing(true);

        let err = blueprints_with_owners(&store, vec![blueprint("b1", "u1", 0)])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Unavailable(_)));
    }

    #[tokio::test]
    async fn create_rejects_missing_owner() {
        let store = InMemoryStore::new();
        let draft =
            BlueprintDraft::new("Orphan", None, Visibility::Public, Tier::Free, "workflow").unwrap();

        let err = create_blueprint_checked(&store, &store, "ghost", &draft)
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Integrity { .. }));
        assert_eq!(store.blueprint_count(), 0);
    }

    #[tokio::test]
    async fn create_with_existing_owner() {
        let store = InMemoryStore::new();
        store.add_user(user("u1"));
        let draft =
            BlueprintDraft::new("Owned", None, Visibility::Private, Tier::Pro, "agent").unwrap();

        let created = create_blueprint_checked(&store, &store, "u1", &draft)
            .await
            .unwrap();

        assert_eq!(created.owner_id, "u1");
        assert_eq!(store.blueprint_count(), 1);
    }
}
