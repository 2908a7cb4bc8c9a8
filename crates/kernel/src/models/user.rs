//! CMS user and capability checks.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::ContentBlock;

/// Anonymous user UUID (nil UUID).
pub const ANONYMOUS_USER_ID: Uuid = Uuid::nil();

/// Well-known permission names.
pub mod permission {
    /// May use the `/cms` block library.
    pub const ACCESS_CMS: &str = "access cms";

    /// May view public block pages.
    pub const ACCESS_CONTENT: &str = "access content";

    /// May edit block drafts.
    pub const EDIT_CONTENT: &str = "edit content";

    /// May publish, revert, and delete blocks.
    pub const PUBLISH_CONTENT: &str = "publish content";
}

/// User record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,

    #[serde(default)]
    pub is_admin: bool,

    #[serde(default)]
    pub permissions: Vec<String>,

    /// Sections this user may edit or publish in.
    #[serde(default)]
    pub section_ids: Vec<Uuid>,

    /// Hex SHA-256 of the user's API token.
    #[serde(default, skip_serializing)]
    pub token_sha256: Option<String>,
}

impl User {
    /// The user for requests without credentials.
    pub fn anonymous() -> Self {
        Self {
            id: ANONYMOUS_USER_ID,
            name: "anonymous".to_string(),
            is_admin: false,
            permissions: vec![permission::ACCESS_CONTENT.to_string()],
            section_ids: Vec::new(),
            token_sha256: None,
        }
    }

    /// Check if this is the anonymous user.
    pub fn is_anonymous(&self) -> bool {
        self.id == ANONYMOUS_USER_ID
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.is_admin || self.permissions.iter().any(|p| p == permission)
    }

    pub fn can_access_cms(&self) -> bool {
        !self.is_anonymous() && self.has_permission(permission::ACCESS_CMS)
    }

    /// May modify the block's draft.
    pub fn can_edit(&self, block: &ContentBlock) -> bool {
        self.has_permission(permission::EDIT_CONTENT) && self.has_section_access(block)
    }

    /// May publish, revert, or delete the block.
    pub fn can_publish(&self, block: &ContentBlock) -> bool {
        self.has_permission(permission::PUBLISH_CONTENT) && self.has_section_access(block)
    }

    /// May see the block as a public page.
    pub fn can_view(&self, _block: &ContentBlock) -> bool {
        self.has_permission(permission::ACCESS_CONTENT)
    }

    fn has_section_access(&self, block: &ContentBlock) -> bool {
        match block.parent_section_id {
            None => true,
            Some(section) => self.is_admin || self.section_ids.contains(&section),
        }
    }
}
