//! Content block model.
//!
//! A block row holds the draft (the mutable working copy). Versioned types
//! also keep immutable [`BlockVersion`] snapshots, numbered from 1.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

// Pattern is a literal; compilation cannot fail.
#[allow(clippy::expect_used)]
static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid slug regex"));

fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if SLUG_RE.is_match(slug) {
        Ok(())
    } else {
        let mut err = ValidationError::new("slug");
        err.message = Some("may only contain lowercase letters, digits and dashes".into());
        Err(err)
    }
}

/// Turn a display name into a URL slug ("Hello, World!" -> "hello-world").
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(c.to_ascii_lowercase());
            dash = false;
        } else {
            dash = true;
        }
    }
    slug
}

/// The versionable part of a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, sqlx::FromRow)]
pub struct BlockContent {
    #[validate(length(min = 1, max = 255, message = "can't be blank"))]
    pub name: String,

    #[validate(
        length(min = 1, max = 255, message = "can't be blank"),
        custom(function = "validate_slug")
    )]
    pub slug: String,

    #[validate(length(max = 128))]
    pub category: Option<String>,

    /// Type-specific fields (body, release_date, ...).
    pub fields: serde_json::Value,
}

/// Content block record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ContentBlock {
    /// Unique identifier (UUIDv7).
    pub id: Uuid,

    /// Content type key.
    pub content_type: String,

    /// Draft content.
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub content: BlockContent,

    pub parent_section_id: Option<Uuid>,

    pub connected_page_id: Option<Uuid>,

    /// Optimistic concurrency marker; bumped on every write.
    pub lock_version: i32,

    /// Number of the latest version record (0 when there is none).
    pub version: i32,

    /// Unix timestamp when created.
    pub created: i64,

    /// Unix timestamp when last changed.
    pub changed: i64,
}

impl ContentBlock {
    /// Build an unsaved block of the given type with empty content.
    pub fn new(content_type: &str) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            id: Uuid::now_v7(),
            content_type: content_type.to_string(),
            content: BlockContent {
                name: String::new(),
                slug: String::new(),
                category: None,
                fields: serde_json::json!({}),
            },
            parent_section_id: None,
            connected_page_id: None,
            lock_version: 0,
            version: 0,
            created: now,
            changed: now,
        }
    }

    pub fn name(&self) -> &str {
        &self.content.name
    }

    pub fn slug(&self) -> &str {
        &self.content.slug
    }

    /// Apply submitted form values on top of the current content.
    pub fn apply(&mut self, form: &BlockForm) {
        if let Some(name) = &form.name {
            self.content.name = name.trim().to_string();
        }
        if let Some(slug) = &form.slug {
            self.content.slug = slug.trim().to_string();
        }
        if let Some(category) = &form.category {
            let category = category.trim();
            self.content.category = (!category.is_empty()).then(|| category.to_string());
        }
        if let Some(fields) = &form.fields {
            self.content.fields = fields.clone();
        }
        if let Some(page) = form.connected_page_id {
            self.connected_page_id = Some(page);
        }
        if self.content.slug.is_empty() {
            self.content.slug = slugify(&self.content.name);
        }
    }

    /// Run the data rules a block must satisfy before it is stored.
    pub fn validate(&self) -> crate::error::BlockResult<()> {
        self.content.validate()?;
        Ok(())
    }

    /// A string field from `fields`, if present.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.content.fields.get(name).and_then(|v| v.as_str())
    }
}

/// Submitted block fields for create and update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockForm {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub category: Option<String>,
    pub fields: Option<serde_json::Value>,
    pub connected_page_id: Option<Uuid>,

    /// Publish as part of this save. Applies to this request only.
    pub publish_on_save: Option<bool>,

    /// Lock version the editor loaded; absent means "the one just loaded".
    pub lock_version: Option<i32>,
}

/// A fully merged update handed to the store.
#[derive(Debug, Clone)]
pub struct UpdateBlock {
    pub content: BlockContent,
    pub connected_page_id: Option<Uuid>,

    /// Store rejects the write unless this matches the stored lock version.
    pub expected_lock_version: i32,
}

/// Immutable snapshot of a versioned block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct BlockVersion {
    pub block_id: Uuid,

    /// Sequential version number starting at 1.
    pub version: i32,

    #[serde(flatten)]
    #[sqlx(flatten)]
    pub content: BlockContent,

    pub published: bool,

    /// Why this version exists ("Published", "Reverted to version 2").
    pub comment: Option<String>,

    pub created: i64,
}

/// Where a [`BlockView`] sits in the block's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Revision {
    /// Type has no version history.
    Unversioned,

    /// The working copy; `version` is the number it gets when published.
    Draft { version: i32 },

    /// A stored snapshot.
    Published { version: i32, current: bool },
}

/// A block as seen at one revision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockView {
    #[serde(flatten)]
    pub block: ContentBlock,
    pub revision: Revision,
}

impl BlockView {
    pub fn name(&self) -> &str {
        self.block.name()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::BlockError;

    #[test]
    fn slugify_names() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Q3 Results  "), "q3-results");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn apply_derives_slug_and_clears_blank_category() {
        let mut block = ContentBlock::new("NewsRelease");
        block.content.category = Some("Press".to_string());
        block.apply(&BlockForm {
            name: Some("Big News".to_string()),
            category: Some("  ".to_string()),
            ..Default::default()
        });
        assert_eq!(block.name(), "Big News");
        assert_eq!(block.slug(), "big-news");
        assert_eq!(block.content.category, None);
    }

    #[test]
    fn blank_name_fails_validation() {
        let block = ContentBlock::new("NewsRelease");
        let Err(BlockError::Validation(errors)) = block.validate() else {
            panic!("expected validation failure");
        };
        assert!(errors.iter().any(|e| e.field == "name"));
        assert!(errors.iter().any(|e| e.field == "slug"));
    }

    #[test]
    fn bad_slug_fails_validation() {
        let mut block = ContentBlock::new("NewsRelease");
        block.apply(&BlockForm {
            name: Some("Ok".to_string()),
            slug: Some("Not A Slug".to_string()),
            ..Default::default()
        });
        let Err(BlockError::Validation(errors)) = block.validate() else {
            panic!("expected validation failure");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "slug");
    }
}
