//! Block storage abstraction.
//!
//! Everything the lifecycle controller persists goes through [`BlockStore`]:
//! blocks, their version snapshots, and the sections and pages blocks hang
//! off. Two implementations exist: [`MemoryBlockStore`](super::MemoryBlockStore)
//! and [`PgBlockStore`](super::PgBlockStore).

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::error::BlockResult;
use crate::models::{
    BlockContent, BlockVersion, ContentBlock, Page, Section, SortOrder, UpdateBlock,
};

/// Default number of blocks per listing page.
pub const DEFAULT_PER_PAGE: u32 = 15;

/// Maximum number of blocks per listing page.
pub const MAX_PER_PAGE: u32 = 100;

/// Filters for [`BlockStore::list`].
#[derive(Debug, Clone)]
pub struct ListOptions {
    pub content_type: String,

    /// Restrict to blocks whose parent section lies in this subtree.
    pub section: Option<Section>,

    /// Case-insensitive substring match on the block name.
    pub search: Option<String>,

    /// `None` lists in creation order.
    pub order: Option<SortOrder>,

    /// 1-based page number.
    pub page: u32,

    pub per_page: u32,
}

impl ListOptions {
    pub fn new(content_type: &str) -> Self {
        Self {
            content_type: content_type.to_string(),
            section: None,
            search: None,
            order: None,
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }

    pub(crate) fn offset(&self) -> u64 {
        u64::from(self.page.max(1) - 1) * u64::from(self.limit())
    }

    pub(crate) fn limit(&self) -> u32 {
        self.per_page.clamp(1, MAX_PER_PAGE)
    }
}

/// One page of a listing.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, options: &ListOptions, total: u64) -> Self {
        let per_page = options.limit();
        let total_pages = u32::try_from(total.div_ceil(u64::from(per_page))).unwrap_or(u32::MAX);
        Self {
            items,
            page: options.page.max(1),
            per_page,
            total,
            total_pages,
        }
    }
}

/// Persistence for blocks and the site tree they live in.
#[async_trait]
pub trait BlockStore: Send + Sync {
    /// Find a block by id.
    async fn find(&self, id: Uuid) -> BlockResult<Option<ContentBlock>>;

    /// Find a block of a type by slug.
    async fn find_by_slug(&self, content_type: &str, slug: &str)
    -> BlockResult<Option<ContentBlock>>;

    /// The most recently created block of a type.
    async fn latest(&self, content_type: &str) -> BlockResult<Option<ContentBlock>>;

    /// List blocks of a type.
    async fn list(&self, options: &ListOptions) -> BlockResult<Paginated<ContentBlock>>;

    /// Insert a new block.
    ///
    /// Fails with `Validation` when the slug is already taken within the type.
    async fn save(&self, block: &ContentBlock) -> BlockResult<ContentBlock>;

    /// Replace a block's draft.
    ///
    /// Fails with `EditConflict` unless `update.expected_lock_version` equals
    /// the stored lock version, and with `NotFound` if the block is gone.
    async fn update(&self, id: Uuid, update: &UpdateBlock) -> BlockResult<ContentBlock>;

    /// Delete a block and all its versions. Returns `false` if it did not exist.
    async fn delete(&self, id: Uuid) -> BlockResult<bool>;

    /// All versions of a block, oldest first.
    async fn versions(&self, block_id: Uuid) -> BlockResult<Vec<BlockVersion>>;

    /// A single version of a block.
    async fn version(&self, block_id: Uuid, version: i32) -> BlockResult<Option<BlockVersion>>;

    /// Append a published snapshot of `content` as the next version and make
    /// `content` the draft, atomically.
    ///
    /// Fails with `EditConflict` unless `expected_lock_version` equals the
    /// stored lock version, so a draft saved in the meantime is never
    /// published or overwritten unseen.
    async fn append_version(
        &self,
        block_id: Uuid,
        content: &BlockContent,
        comment: &str,
        expected_lock_version: i32,
    ) -> BlockResult<(ContentBlock, BlockVersion)>;

    async fn find_section(&self, id: Uuid) -> BlockResult<Option<Section>>;

    async fn find_section_by_path(&self, path: &str) -> BlockResult<Option<Section>>;

    async fn save_section(&self, section: &Section) -> BlockResult<()>;

    async fn find_page(&self, id: Uuid) -> BlockResult<Option<Page>>;

    async fn save_page(&self, page: &Page) -> BlockResult<()>;

    /// Pages that reference a block, ordered by name.
    async fn connected_pages(&self, block_id: Uuid) -> BlockResult<Vec<Page>>;
}
