//! Application state shared across handlers

use std::sync::Arc;

use atelier_core::PublicConfig;

use crate::db::memory::InMemoryStore;
use crate::db::{
    AppStore, BlogStore, Databases, PgAppStore, PgBlogStore, PgSupportStore, PgUsersStore,
    SupportStore, UsersStore,
};

/// One store per schema
#[derive(Clone)]
pub struct Stores {
    pub app: Arc<dyn AppStore>,
    pub blog: Arc<dyn BlogStore>,
    pub support: Arc<dyn SupportStore>,
    pub users: Arc<dyn UsersStore>,
}

impl Stores {
    /// Postgres-backed stores, each holding only its own schema's pool
    pub fn postgres(databases: &Databases) -> Self {
        Self {
            app: Arc::new(PgAppStore::new(databases.app.clone())),
            blog: Arc::new(PgBlogStore::new(databases.blog.clone())),
            support: Arc::new(PgSupportStore::new(databases.support.clone())),
            users: Arc::new(PgUsersStore::new(databases.users.clone())),
        }
    }

    /// Every schema served by the same in-memory store
    pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            app: store.clone(),
            blog: store.clone(),
            support: store.clone(),
            users: store,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    stores: Stores,
    public_config: PublicConfig,
}

impl AppState {
    pub fn new(stores: Stores, public_config: PublicConfig) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                stores,
                public_config,
            }),
        }
    }

    pub fn app(&self) -> &dyn AppStore {
        self.inner.stores.app.as_ref()
    }

    pub fn blog(&self) -> &dyn BlogStore {
        self.inner.stores.blog.as_ref()
    }

    pub fn support(&self) -> &dyn SupportStore {
        self.inner.stores.support.as_ref()
    }

    pub fn users(&self) -> &dyn UsersStore {
        self.inner.stores.users.as_ref()
    }

    pub fn public_config(&self) -> &PublicConfig {
        &self.inner.public_config
    }
}
