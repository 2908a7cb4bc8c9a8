//! Permission policy for block actions.
//!
//! Access is decided by a fixed whitelist: every action belongs to one
//! [`ActionClass`], and anything outside the known read/edit/publish sets is
//! denied.

use std::fmt;

use tracing::debug;

use crate::error::{BlockError, BlockResult};
use crate::models::{ContentBlock, User};

/// A controller action on content blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    List,
    Show,
    New,
    Create,
    Edit,
    Update,
    Destroy,
    Publish,
    Revert,
    ShowVersion,
    ListVersions,
    Usages,
    ViewAsPage,
    /// Any action name the policy does not know.
    Other(String),
}

/// The capability an action requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionClass {
    /// Always allowed.
    Read,
    /// Requires `User::can_edit`.
    Edit,
    /// Requires `User::can_publish`.
    Publish,
    /// Always denied.
    Unclassified,
}

impl Action {
    pub fn class(&self) -> ActionClass {
        match self {
            Action::List
            | Action::Show
            | Action::New
            | Action::Create
            | Action::ShowVersion
            | Action::ListVersions
            | Action::Usages => ActionClass::Read,
            Action::Edit | Action::Update => ActionClass::Edit,
            Action::Destroy | Action::Publish | Action::Revert => ActionClass::Publish,
            Action::ViewAsPage | Action::Other(_) => ActionClass::Unclassified,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Action::List => "list",
            Action::Show => "show",
            Action::New => "new",
            Action::Create => "create",
            Action::Edit => "edit",
            Action::Update => "update",
            Action::Destroy => "destroy",
            Action::Publish => "publish",
            Action::Revert => "revert",
            Action::ShowVersion => "show_version",
            Action::ListVersions => "list_versions",
            Action::Usages => "usages",
            Action::ViewAsPage => "view_as_page",
            Action::Other(name) => name,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whitelist permission policy.
pub struct PermissionPolicy;

impl PermissionPolicy {
    /// Decide whether `user` may perform `action` on `block`.
    ///
    /// `block` is `None` for collection actions such as listing; edit- and
    /// publish-class actions without a block are denied.
    pub fn check(action: &Action, user: &User, block: Option<&ContentBlock>) -> BlockResult<()> {
        let allowed = match action.class() {
            ActionClass::Read => true,
            ActionClass::Edit => block.is_some_and(|b| user.can_edit(b)),
            ActionClass::Publish => block.is_some_and(|b| user.can_publish(b)),
            ActionClass::Unclassified => false,
        };

        if allowed {
            Ok(())
        } else {
            debug!(
                action = %action,
                user_id = %user.id,
                block_id = ?block.map(|b| b.id),
                "access denied"
            );
            Err(BlockError::AccessDenied)
        }
    }

    /// Decide whether `user` may see `block` as a public page.
    pub fn check_view(user: &User, block: &ContentBlock) -> BlockResult<()> {
        if user.can_view(block) {
            Ok(())
        } else {
            debug!(user_id = %user.id, block_id = %block.id, "view denied");
            Err(BlockError::AccessDenied)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::models::permission;
    use uuid::Uuid;

    fn user(permissions: &[&str]) -> User {
        User {
            id: Uuid::now_v7(),
            name: "someone".to_string(),
            is_admin: false,
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            section_ids: Vec::new(),
            token_sha256: None,
        }
    }

    const ALL: [Action; 12] = [
        Action::List,
        Action::Show,
        Action::New,
        Action::Create,
        Action::Edit,
        Action::Update,
        Action::Destroy,
        Action::Publish,
        Action::Revert,
        Action::ShowVersion,
        Action::ListVersions,
        Action::Usages,
    ];

    #[test]
    fn read_actions_always_allowed() {
        let nobody = user(&[]);
        let block = ContentBlock::new("NewsRelease");
        for action in ALL.iter().filter(|a| a.class() == ActionClass::Read) {
            assert!(PermissionPolicy::check(action, &nobody, Some(&block)).is_ok());
            assert!(PermissionPolicy::check(action, &nobody, None).is_ok());
        }
    }

    #[test]
    fn edit_class_follows_can_edit() {
        let block = ContentBlock::new("NewsRelease");
        for u in [user(&[]), user(&[permission::EDIT_CONTENT])] {
            for action in [Action::Edit, Action::Update] {
                assert_eq!(
                    PermissionPolicy::check(&action, &u, Some(&block)).is_ok(),
                    u.can_edit(&block)
                );
            }
        }
    }

    #[test]
    fn publish_class_follows_can_publish() {
        let block = ContentBlock::new("NewsRelease");
        let editor = user(&[permission::EDIT_CONTENT]);
        let publisher = user(&[permission::PUBLISH_CONTENT]);
        for action in [Action::Destroy, Action::Publish, Action::Revert] {
            assert!(matches!(
                PermissionPolicy::check(&action, &editor, Some(&block)),
                Err(BlockError::AccessDenied)
            ));
            assert!(PermissionPolicy::check(&action, &publisher, Some(&block)).is_ok());
            assert!(PermissionPolicy::check(&action, &publisher, None).is_err());
        }
    }

    #[test]
    fn unclassified_actions_denied_even_for_admins() {
        let mut admin = user(&[]);
        admin.is_admin = true;
        let block = ContentBlock::new("NewsRelease");
        for action in [
            Action::Other("export".to_string()),
            Action::Other(String::new()),
            Action::ViewAsPage,
        ] {
            assert_eq!(action.class(), ActionClass::Unclassified);
            assert!(matches!(
                PermissionPolicy::check(&action, &admin, Some(&block)),
                Err(BlockError::AccessDenied)
            ));
        }
    }

    #[test]
    fn view_requires_access_content() {
        let block = ContentBlock::new("NewsRelease");
        assert!(PermissionPolicy::check_view(&User::anonymous(), &block).is_ok());
        assert!(PermissionPolicy::check_view(&user(&[]), &block).is_err());
    }
}
