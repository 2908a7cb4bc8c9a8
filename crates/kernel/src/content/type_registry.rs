//! Content type registry.
//!
//! Content types are loaded from the site configuration at startup and
//! cached in memory for fast access by key and by route.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{info, warn};

use crate::models::ContentType;

/// Registry of content types.
#[derive(Clone, Default)]
pub struct ContentTypeRegistry {
    inner: Arc<ContentTypeRegistryInner>,
}

#[derive(Default)]
struct ContentTypeRegistryInner {
    /// Key -> content type.
    types: DashMap<String, ContentType>,

    /// Route segment -> key.
    routes: DashMap<String, String>,
}

impl ContentTypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the given types.
    pub fn with_types(types: impl IntoIterator<Item = ContentType>) -> Self {
        let registry = Self::new();
        for ct in types {
            registry.register(ct);
        }
        info!(count = registry.len(), "content types registered");
        registry
    }

    /// Register (or replace) a content type.
    pub fn register(&self, content_type: ContentType) {
        if let Some(previous) = self.inner.routes.get(&content_type.route) {
            if *previous != content_type.key {
                warn!(
                    route = %content_type.route,
                    previous = %*previous,
                    key = %content_type.key,
                    "content type route reassigned"
                );
            }
        }
        self.inner
            .routes
            .insert(content_type.route.clone(), content_type.key.clone());
        self.inner
            .types
            .insert(content_type.key.clone(), content_type);
    }

    /// Get a content type by key.
    pub fn get(&self, key: &str) -> Option<ContentType> {
        self.inner.types.get(key).map(|t| t.clone())
    }

    /// Get a content type by its URL segment.
    pub fn get_by_route(&self, route: &str) -> Option<ContentType> {
        let key = self.inner.routes.get(route).map(|k| k.clone())?;
        self.get(&key)
    }

    /// All content types ordered by display name.
    pub fn list(&self) -> Vec<ContentType> {
        let mut types: Vec<ContentType> =
            self.inner.types.iter().map(|t| t.value().clone()).collect();
        types.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        types
    }

    pub fn len(&self) -> usize {
        self.inner.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.types.is_empty()
    }
}
