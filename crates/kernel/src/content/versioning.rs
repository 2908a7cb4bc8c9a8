//! Draft / publish / revert lifecycle of versioned blocks.
//!
//! Whether a block has history is decided by the `versioned` flag of its
//! content type. For unversioned types every operation here acts on the
//! block itself and no version records are ever written.

use std::sync::Arc;

use tracing::{info, warn};

use super::store::BlockStore;
use crate::error::{BlockError, BlockResult};
use crate::models::{BlockVersion, BlockView, ContentBlock, ContentType, Revision};

/// Versioning policy over a block store.
#[derive(Clone)]
pub struct VersioningPolicy {
    store: Arc<dyn BlockStore>,
}

impl VersioningPolicy {
    pub fn new(store: Arc<dyn BlockStore>) -> Self {
        Self { store }
    }

    pub fn is_versioned(content_type: &ContentType) -> bool {
        content_type.versioned
    }

    fn unversioned(block: ContentBlock) -> BlockView {
        BlockView {
            block,
            revision: Revision::Unversioned,
        }
    }

    fn snapshot(mut block: ContentBlock, version: BlockVersion) -> BlockView {
        let current = version.version == block.version;
        block.content = version.content;
        BlockView {
            block,
            revision: Revision::Published {
                version: version.version,
                current,
            },
        }
    }

    /// The working copy of a block.
    pub fn load_draft(&self, content_type: &ContentType, block: ContentBlock) -> BlockView {
        if !Self::is_versioned(content_type) {
            return Self::unversioned(block);
        }
        let version = block.version + 1;
        BlockView {
            block,
            revision: Revision::Draft { version },
        }
    }

    /// The block as it was at `version`.
    pub async fn load_as_of(
        &self,
        content_type: &ContentType,
        block: ContentBlock,
        version: i32,
    ) -> BlockResult<BlockView> {
        if !Self::is_versioned(content_type) {
            return Ok(Self::unversioned(block));
        }
        let snapshot = self.store.version(block.id, version).await?.ok_or_else(|| {
            BlockError::not_found(format!("version {version} of block {}", block.id))
        })?;
        Ok(Self::snapshot(block, snapshot))
    }

    /// The highest published version, if the block was ever published.
    pub async fn load_published(
        &self,
        content_type: &ContentType,
        block: ContentBlock,
    ) -> BlockResult<Option<BlockView>> {
        if !Self::is_versioned(content_type) {
            return Ok(Some(Self::unversioned(block)));
        }
        if block.version == 0 {
            return Ok(None);
        }
        let version = block.version;
        self.load_as_of(content_type, block, version).await.map(Some)
    }

    /// Version history, newest first. Empty for unversioned types.
    pub async fn list_versions(
        &self,
        content_type: &ContentType,
        block: &ContentBlock,
    ) -> BlockResult<Vec<BlockVersion>> {
        if !Self::is_versioned(content_type) {
            return Ok(Vec::new());
        }
        let mut versions = self.store.versions(block.id).await?;
        versions.reverse();
        Ok(versions)
    }

    /// Promote the draft to a new published version.
    pub async fn try_publish(
        &self,
        content_type: &ContentType,
        block: &ContentBlock,
    ) -> BlockResult<BlockView> {
        if !Self::is_versioned(content_type) {
            return Ok(Self::unversioned(block.clone()));
        }
        let (block, version) = self
            .store
            .append_version(block.id, &block.content, "Published", block.lock_version)
            .await?;
        info!(block_id = %block.id, version = version.version, "block published");
        Ok(Self::snapshot(block, version))
    }

    /// Promote the draft to a new published version, reporting failure as `false`.
    pub async fn publish(&self, content_type: &ContentType, block: &ContentBlock) -> bool {
        match self.try_publish(content_type, block).await {
            Ok(_) => true,
            Err(e) => {
                warn!(block_id = %block.id, error = ?e, "could not publish block");
                false
            }
        }
    }

    /// Append a new published version whose content equals `version`.
    ///
    /// History is never rewritten: the target stays where it is and the
    /// draft is reset to its content.
    pub async fn revert(
        &self,
        content_type: &ContentType,
        block: &ContentBlock,
        version: i32,
    ) -> BlockResult<BlockView> {
        if !Self::is_versioned(content_type) {
            return Ok(Self::unversioned(block.clone()));
        }
        let target = self.store.version(block.id, version).await?.ok_or_else(|| {
            BlockError::not_found(format!("version {version} of block {}", block.id))
        })?;
        let (block, appended) = self
            .store
            .append_version(
                block.id,
                &target.content,
                &format!("Reverted to version {version}"),
                block.lock_version,
            )
            .await?;
        info!(
            block_id = %block.id,
            from = version,
            version = appended.version,
            "block reverted"
        );
        Ok(Self::snapshot(block, appended))
    }
}
