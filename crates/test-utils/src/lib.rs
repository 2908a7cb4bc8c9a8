//! blockcms test utilities.
//!
//! Helpers for integration testing: block and user fixtures and assertion
//! utilities for JSON view documents.

use blockcms_kernel::accounts::hash_token;
use blockcms_kernel::models::{User, permission};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Create a test block submission with default values.
pub fn test_block(name: &str) -> TestBlock {
    TestBlock {
        name: name.to_string(),
        slug: None,
        category: None,
        fields: serde_json::json!({}),
        connected_page_id: None,
        publish_on_save: false,
        lock_version: None,
    }
}

/// A block submission builder for creating test fixtures.
#[derive(Debug, Clone)]
pub struct TestBlock {
    pub name: String,
    pub slug: Option<String>,
    pub category: Option<String>,
    pub fields: JsonValue,
    pub connected_page_id: Option<Uuid>,
    pub publish_on_save: bool,
    pub lock_version: Option<i32>,
}

impl TestBlock {
    /// Set an explicit slug.
    pub fn with_slug(mut self, slug: &str) -> Self {
        self.slug = Some(slug.to_string());
        self
    }

    /// Set the category.
    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    /// Add a single field.
    pub fn with_field(mut self, name: &str, value: JsonValue) -> Self {
        if let Some(obj) = self.fields.as_object_mut() {
            obj.insert(name.to_string(), value);
        }
        self
    }

    /// Set the `release_date` field used by dated permalinks.
    pub fn released_on(self, date: &str) -> Self {
        self.with_field("release_date", JsonValue::String(date.to_string()))
    }

    /// Connect the block to a page.
    pub fn on_page(mut self, page_id: Uuid) -> Self {
        self.connected_page_id = Some(page_id);
        self
    }

    /// Publish as part of saving.
    pub fn published(mut self) -> Self {
        self.publish_on_save = true;
        self
    }

    /// Submit against a specific lock version.
    pub fn at_lock_version(mut self, lock_version: i32) -> Self {
        self.lock_version = Some(lock_version);
        self
    }

    /// The submission as a JSON request body.
    pub fn json(&self) -> JsonValue {
        serde_json::json!({
            "name": self.name,
            "slug": self.slug,
            "category": self.category,
            "fields": self.fields,
            "connected_page_id": self.connected_page_id,
            "publish_on_save": self.publish_on_save,
            "lock_version": self.lock_version,
        })
    }
}

/// Create a test user holding `permissions` and the API token `token`.
pub fn test_user(name: &str, token: &str, permissions: &[&str]) -> User {
    User {
        id: Uuid::now_v7(),
        name: name.to_string(),
        is_admin: false,
        permissions: permissions.iter().map(|s| s.to_string()).collect(),
        section_ids: Vec::new(),
        token_sha256: Some(hash_token(token)),
    }
}

/// A CMS user who may edit but not publish.
pub fn editor(token: &str) -> User {
    test_user(
        "editor",
        token,
        &[
            permission::ACCESS_CMS,
            permission::ACCESS_CONTENT,
            permission::EDIT_CONTENT,
        ],
    )
}

/// A CMS user who may edit and publish.
pub fn publisher(token: &str) -> User {
    test_user(
        "publisher",
        token,
        &[
            permission::ACCESS_CMS,
            permission::ACCESS_CONTENT,
            permission::EDIT_CONTENT,
            permission::PUBLISH_CONTENT,
        ],
    )
}

/// An administrator.
pub fn admin(token: &str) -> User {
    User {
        is_admin: true,
        ..test_user("admin", token, &[])
    }
}

/// Assertion helpers for JSON view documents.
pub mod assert {
    use serde_json::Value;

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_some(),
            "Expected JSON to have key '{key}', got: {value}"
        );
    }

    /// Assert that a view document renders `view`.
    pub fn renders(document: &Value, view: &str) {
        assert_eq!(
            document["view"].as_str(),
            Some(view),
            "Expected view '{view}', got: {document}"
        );
    }

    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{needle}'\nActual: {haystack}"
        );
    }
}
