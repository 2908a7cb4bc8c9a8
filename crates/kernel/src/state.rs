//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;

use crate::accounts::UserRegistry;
use crate::config::{Config, Site, SiteConfig};
use crate::content::{BlockStore, ContentTypeRegistry, MemoryBlockStore, PgBlockStore};
use crate::controller::BlockLifecycleController;
use crate::db;
use crate::metrics::Metrics;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// PostgreSQL connection pool, when configured.
    db: Option<PgPool>,

    /// Block persistence.
    store: Arc<dyn BlockStore>,

    /// Content type registry.
    content_types: ContentTypeRegistry,

    /// Known users and API tokens.
    users: UserRegistry,

    /// Block lifecycle controller.
    controller: BlockLifecycleController,

    /// Prometheus metrics.
    metrics: Arc<Metrics>,
}

impl AppState {
    /// Create application state from configuration.
    ///
    /// Connects to PostgreSQL when `DATABASE_URL` is set; otherwise blocks
    /// are kept in memory.
    pub async fn new(config: &Config) -> Result<Self> {
        let site = SiteConfig::load(&config.site_config)?
            .resolve()
            .context("failed to resolve site config")?;

        let (db, store): (Option<PgPool>, Arc<dyn BlockStore>) = match &config.database_url {
            Some(url) => {
                let pool = db::create_pool(url, config.database_max_connections).await?;
                info!("using PostgreSQL block store");
                (Some(pool.clone()), Arc::new(PgBlockStore::new(pool)))
            }
            None => {
                info!("DATABASE_URL not set, using in-memory block store");
                (None, Arc::new(MemoryBlockStore::new()))
            }
        };

        Self::from_parts(config, site, store, db).await
    }

    /// Build state over an existing store, seeding it with the site's
    /// sections and pages.
    pub async fn from_parts(
        config: &Config,
        site: Site,
        store: Arc<dyn BlockStore>,
        db: Option<PgPool>,
    ) -> Result<Self> {
        for section in &site.sections {
            if store.find_section_by_path(&section.path).await?.is_none() {
                store.save_section(section).await?;
            }
        }
        for page in &site.pages {
            if store.find_page(page.id).await?.is_none() {
                store.save_page(page).await?;
            }
        }
        info!(
            sections = site.sections.len(),
            pages = site.pages.len(),
            "site structure seeded"
        );

        let content_types = ContentTypeRegistry::with_types(site.content_types);
        let users = UserRegistry::with_users(site.users);
        let controller =
            BlockLifecycleController::new(store.clone()).with_page_size(config.list_page_size);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                db,
                store,
                content_types,
                users,
                controller,
                metrics: Arc::new(Metrics::new()),
            }),
        })
    }

    /// Get the database pool, if one is configured.
    pub fn db(&self) -> Option<&PgPool> {
        self.inner.db.as_ref()
    }

    pub fn store(&self) -> &Arc<dyn BlockStore> {
        &self.inner.store
    }

    pub fn content_types(&self) -> &ContentTypeRegistry {
        &self.inner.content_types
    }

    pub fn users(&self) -> &UserRegistry {
        &self.inner.users
    }

    pub fn controller(&self) -> &BlockLifecycleController {
        &self.inner.controller
    }

    pub fn metrics(&self) -> &Metrics {
        &self.inner.metrics
    }

    /// Check PostgreSQL health. Always healthy without a database.
    pub async fn postgres_healthy(&self) -> bool {
        match &self.inner.db {
            Some(pool) => db::check_health(pool).await,
            None => true,
        }
    }
}
