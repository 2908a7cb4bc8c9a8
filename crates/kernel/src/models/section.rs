//! Sections and pages of the site tree.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable id for a site path.
///
/// Sections and pages are unique by path, so deriving the id from it keeps
/// ids identical across restarts and re-seeding.
pub fn path_id(path: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, path.as_bytes())
}

/// Section record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Section {
    pub id: Uuid,
    pub name: String,

    /// URL path of the section (e.g., "/news").
    pub path: String,

    /// Materialized path of section ids from the root down to and including
    /// this one, e.g. "/<root-id>/<news-id>/".
    pub ancestry: String,
}

impl Section {
    /// Build a top-level section.
    pub fn root(name: &str, path: &str) -> Self {
        let id = path_id(path);
        Self {
            id,
            name: name.to_string(),
            path: path.to_string(),
            ancestry: format!("/{id}/"),
        }
    }

    /// Build a section nested under `parent`.
    pub fn child_of(parent: &Section, name: &str, path: &str) -> Self {
        let id = path_id(path);
        Self {
            id,
            name: name.to_string(),
            path: path.to_string(),
            ancestry: format!("{}{id}/", parent.ancestry),
        }
    }

    /// Whether `other` is this section or lies beneath it.
    pub fn contains(&self, other: &Section) -> bool {
        other.ancestry.starts_with(&self.ancestry)
    }
}

/// Page record. Blocks placed on a page are its connected blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Page {
    pub id: Uuid,
    pub name: String,
    pub path: String,
    pub section_id: Option<Uuid>,
    pub block_ids: Vec<Uuid>,
}

impl Page {
    /// An empty page at `path`.
    pub fn new(name: &str, path: &str, section_id: Option<Uuid>) -> Self {
        Self {
            id: path_id(path),
            name: name.to_string(),
            path: path.to_string(),
            section_id,
            block_ids: Vec::new(),
        }
    }

    pub fn references(&self, block_id: Uuid) -> bool {
        self.block_ids.contains(&block_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtree_containment() {
        let root = Section::root("Home", "/");
        let news = Section::child_of(&root, "News", "/news");
        let archive = Section::child_of(&news, "Archive", "/news/archive");
        let about = Section::child_of(&root, "About", "/about");

        assert!(root.contains(&archive));
        assert!(news.contains(&news));
        assert!(news.contains(&archive));
        assert!(!news.contains(&about));
        assert!(!archive.contains(&news));
    }
}
