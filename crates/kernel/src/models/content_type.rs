//! Content type descriptors.
//!
//! A content type describes one kind of block (news release, text block, ...)
//! and the capabilities the lifecycle controller branches on.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Content type record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentType {
    /// Machine key (e.g., "NewsRelease").
    pub key: String,

    /// Human-readable name used in status messages (e.g., "News Release").
    pub display_name: String,

    /// URL segment (e.g., "news_releases").
    pub route: String,

    /// Blocks carry a draft plus numbered published versions.
    #[serde(default)]
    pub versioned: bool,

    /// Blocks may be bound to a page for direct viewing.
    #[serde(default)]
    pub connectable: bool,

    /// Blocks may be placed under a section.
    #[serde(default)]
    pub can_have_parent: bool,

    /// Listing supports free-text search.
    #[serde(default)]
    pub searchable: bool,

    /// Blocks carry a category.
    #[serde(default)]
    pub has_category: bool,

    /// Blocks are reachable at `/{route}/{year}/{month}/{day}/{slug}`.
    #[serde(default)]
    pub dated_permalinks: bool,

    /// Listing order when the request does not ask for one.
    #[serde(default)]
    pub default_order: Option<SortOrder>,

    /// Section path new blocks are placed under by default.
    #[serde(default)]
    pub path: Option<String>,
}

impl ContentType {
    /// Canonical CMS location of a block of this type.
    pub fn block_path(&self, id: Uuid) -> String {
        format!("/cms/{}/{id}", self.route)
    }

    /// CMS listing location for this type.
    pub fn blocks_path(&self) -> String {
        format!("/cms/{}", self.route)
    }

    /// Public location of a block by slug.
    pub fn calculate_path(&self, slug: &str) -> String {
        format!("/{}/{slug}", self.route)
    }

    /// Built-in content types used when no site configuration is present.
    pub fn defaults() -> Vec<ContentType> {
        vec![
            ContentType {
                key: "NewsRelease".to_string(),
                display_name: "News Release".to_string(),
                route: "news_releases".to_string(),
                versioned: true,
                connectable: true,
                can_have_parent: true,
                searchable: true,
                has_category: true,
                dated_permalinks: true,
                default_order: Some(SortOrder::desc(SortField::Created)),
                path: Some("/news".to_string()),
            },
            ContentType {
                key: "HtmlBlock".to_string(),
                display_name: "Text".to_string(),
                route: "html_blocks".to_string(),
                versioned: true,
                connectable: true,
                can_have_parent: false,
                searchable: true,
                has_category: false,
                dated_permalinks: false,
                default_order: Some(SortOrder::asc(SortField::Name)),
                path: None,
            },
            ContentType {
                key: "Sponsor".to_string(),
                display_name: "Sponsor".to_string(),
                route: "sponsors".to_string(),
                versioned: false,
                connectable: false,
                can_have_parent: false,
                searchable: false,
                has_category: true,
                dated_permalinks: false,
                default_order: None,
                path: None,
            },
        ]
    }
}

/// Sortable block columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Name,
    Slug,
    Category,
    Created,
    Changed,
}

impl SortField {
    /// Column name in the `content_block` table.
    pub fn column(self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Slug => "slug",
            SortField::Category => "category",
            SortField::Created => "created",
            SortField::Changed => "changed",
        }
    }
}

/// A listing order such as `"name"` or `"created desc"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SortOrder {
    pub field: SortField,
    pub descending: bool,
}

impl SortOrder {
    pub fn asc(field: SortField) -> Self {
        Self {
            field,
            descending: false,
        }
    }

    pub fn desc(field: SortField) -> Self {
        Self {
            field,
            descending: true,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = if self.descending { "desc" } else { "asc" };
        write!(f, "{} {dir}", self.field.column())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let field = match parts.next().map(str::to_ascii_lowercase).as_deref() {
            Some("name") => SortField::Name,
            Some("slug") => SortField::Slug,
            Some("category") => SortField::Category,
            Some("created") | Some("created_at") => SortField::Created,
            Some("changed") | Some("updated_at") => SortField::Changed,
            _ => return Err(format!("unsupported sort order '{s}'")),
        };
        let descending = match parts.next().map(str::to_ascii_lowercase).as_deref() {
            None | Some("asc") => false,
            Some("desc") => true,
            Some(other) => return Err(format!("unsupported sort direction '{other}'")),
        };
        if parts.next().is_some() {
            return Err(format!("unsupported sort order '{s}'"));
        }
        Ok(Self { field, descending })
    }
}

impl TryFrom<String> for SortOrder {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SortOrder> for String {
    fn from(value: SortOrder) -> Self {
        value.to_string()
    }
}
