//! In-memory block store.
//!
//! Used when no database is configured and by the test suite. All data sits
//! behind a single lock so the lock-version check and the write it guards
//! happen atomically.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use super::store::{BlockStore, ListOptions, Paginated};
use crate::error::{BlockError, BlockResult};
use crate::models::{
    BlockContent, BlockVersion, ContentBlock, Page, Section, SortField, UpdateBlock,
};

#[derive(Default)]
struct MemoryData {
    blocks: HashMap<Uuid, ContentBlock>,
    versions: HashMap<Uuid, Vec<BlockVersion>>,
    sections: HashMap<Uuid, Section>,
    pages: HashMap<Uuid, Page>,
}

impl MemoryData {
    fn slug_taken(&self, content_type: &str, slug: &str, except: Uuid) -> bool {
        self.blocks
            .values()
            .any(|b| b.id != except && b.content_type == content_type && b.content.slug == slug)
    }
}

/// Block store backed by process memory.
#[derive(Default)]
pub struct MemoryBlockStore {
    data: RwLock<MemoryData>,
}

impl MemoryBlockStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn slug_taken() -> BlockError {
    BlockError::invalid("slug", "has already been taken")
}

fn compare(a: &ContentBlock, b: &ContentBlock, field: SortField) -> Ordering {
    match field {
        SortField::Name => a.content.name.cmp(&b.content.name),
        SortField::Slug => a.content.slug.cmp(&b.content.slug),
        SortField::Category => a.content.category.cmp(&b.content.category),
        SortField::Created => a.created.cmp(&b.created),
        SortField::Changed => a.changed.cmp(&b.changed),
    }
}

#[async_trait]
impl BlockStore for MemoryBlockStore {
    async fn find(&self, id: Uuid) -> BlockResult<Option<ContentBlock>> {
        Ok(self.data.read().blocks.get(&id).cloned())
    }

    async fn find_by_slug(
        &self,
        content_type: &str,
        slug: &str,
    ) -> BlockResult<Option<ContentBlock>> {
        Ok(self
            .data
            .read()
            .blocks
            .values()
            .find(|b| b.content_type == content_type && b.content.slug == slug)
            .cloned())
    }

    async fn latest(&self, content_type: &str) -> BlockResult<Option<ContentBlock>> {
        Ok(self
            .data
            .read()
            .blocks
            .values()
            .filter(|b| b.content_type == content_type)
            .max_by(|a, b| a.created.cmp(&b.created).then(a.id.cmp(&b.id)))
            .cloned())
    }

    async fn list(&self, options: &ListOptions) -> BlockResult<Paginated<ContentBlock>> {
        let data = self.data.read();
        let needle = options
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut matches: Vec<&ContentBlock> = data
            .blocks
            .values()
            .filter(|b| b.content_type == options.content_type)
            .filter(|b| match &options.section {
                None => true,
                Some(scope) => b
                    .parent_section_id
                    .and_then(|id| data.sections.get(&id))
                    .is_some_and(|s| scope.contains(s)),
            })
            .filter(|b| match &needle {
                None => true,
                Some(n) => b.content.name.to_lowercase().contains(n),
            })
            .collect();

        matches.sort_by(|a, b| {
            let primary = match options.order {
                Some(order) if order.descending => compare(b, a, order.field),
                Some(order) => compare(a, b, order.field),
                None => Ordering::Equal,
            };
            let tie = a.created.cmp(&b.created).then(a.id.cmp(&b.id));
            match options.order {
                Some(order) if order.descending => primary.then(tie.reverse()),
                _ => primary.then(tie),
            }
        });

        let total = matches.len() as u64;
        let offset = usize::try_from(options.offset()).unwrap_or(usize::MAX);
        let items = matches
            .into_iter()
            .skip(offset)
            .take(options.limit() as usize)
            .cloned()
            .collect();

        Ok(Paginated::new(items, options, total))
    }

    async fn save(&self, block: &ContentBlock) -> BlockResult<ContentBlock> {
        let mut data = self.data.write();
        if data.slug_taken(&block.content_type, &block.content.slug, block.id) {
            return Err(slug_taken());
        }
        data.blocks.insert(block.id, block.clone());
        Ok(block.clone())
    }

    async fn update(&self, id: Uuid, update: &UpdateBlock) -> BlockResult<ContentBlock> {
        let mut data = self.data.write();
        let Some(stored) = data.blocks.get(&id) else {
            return Err(BlockError::not_found(format!("block {id}")));
        };
        if stored.lock_version != update.expected_lock_version {
            return Err(BlockError::EditConflict {
                id,
                expected: update.expected_lock_version,
                found: stored.lock_version,
            });
        }
        let content_type = stored.content_type.clone();
        if data.slug_taken(&content_type, &update.content.slug, id) {
            return Err(slug_taken());
        }

        let Some(block) = data.blocks.get_mut(&id) else {
            return Err(BlockError::not_found(format!("block {id}")));
        };
        block.content = update.content.clone();
        block.connected_page_id = update.connected_page_id;
        block.lock_version += 1;
        block.changed = chrono::Utc::now().timestamp();
        Ok(block.clone())
    }

    async fn delete(&self, id: Uuid) -> BlockResult<bool> {
        let mut data = self.data.write();
        data.versions.remove(&id);
        for page in data.pages.values_mut() {
            page.block_ids.retain(|b| *b != id);
        }
        Ok(data.blocks.remove(&id).is_some())
    }

    async fn versions(&self, block_id: Uuid) -> BlockResult<Vec<BlockVersion>> {
        Ok(self
            .data
            .read()
            .versions
            .get(&block_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn version(&self, block_id: Uuid, version: i32) -> BlockResult<Option<BlockVersion>> {
        Ok(self
            .data
            .read()
            .versions
            .get(&block_id)
            .and_then(|vs| vs.iter().find(|v| v.version == version))
            .cloned())
    }

    async fn append_version(
        &self,
        block_id: Uuid,
        content: &BlockContent,
        comment: &str,
        expected_lock_version: i32,
    ) -> BlockResult<(ContentBlock, BlockVersion)> {
        let mut data = self.data.write();
        let now = chrono::Utc::now().timestamp();

        let Some(block) = data.blocks.get_mut(&block_id) else {
            return Err(BlockError::not_found(format!("block {block_id}")));
        };
        if block.lock_version != expected_lock_version {
            return Err(BlockError::EditConflict {
                id: block_id,
                expected: expected_lock_version,
                found: block.lock_version,
            });
        }
        block.version += 1;
        block.lock_version += 1;
        block.content = content.clone();
        block.changed = now;
        let block = block.clone();

        let version = BlockVersion {
            block_id,
            version: block.version,
            content: content.clone(),
            published: true,
            comment: Some(comment.to_string()),
            created: now,
        };
        data.versions
            .entry(block_id)
            .or_default()
            .push(version.clone());

        Ok((block, version))
    }

    async fn find_section(&self, id: Uuid) -> BlockResult<Option<Section>> {
        Ok(self.data.read().sections.get(&id).cloned())
    }

    async fn find_section_by_path(&self, path: &str) -> BlockResult<Option<Section>> {
        Ok(self
            .data
            .read()
            .sections
            .values()
            .find(|s| s.path == path)
            .cloned())
    }

    async fn save_section(&self, section: &Section) -> BlockResult<()> {
        self.data
            .write()
            .sections
            .insert(section.id, section.clone());
        Ok(())
    }

    async fn find_page(&self, id: Uuid) -> BlockResult<Option<Page>> {
        Ok(self.data.read().pages.get(&id).cloned())
    }

    async fn save_page(&self, page: &Page) -> BlockResult<()> {
        self.data.write().pages.insert(page.id, page.clone());
        Ok(())
    }

    async fn connected_pages(&self, block_id: Uuid) -> BlockResult<Vec<Page>> {
        let mut pages: Vec<Page> = self
            .data
            .read()
            .pages
            .values()
            .filter(|p| p.references(block_id))
            .cloned()
            .collect();
        pages.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(pages)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::models::{BlockForm, SortOrder};

    fn block(content_type: &str, name: &str) -> ContentBlock {
        let mut block = ContentBlock::new(content_type);
        block.apply(&BlockForm {
            name: Some(name.to_string()),
            ..Default::default()
        });
        block
    }

    fn update_of(block: &ContentBlock, name: &str) -> UpdateBlock {
        let mut content = block.content.clone();
        content.name = name.to_string();
        UpdateBlock {
            content,
            connected_page_id: block.connected_page_id,
            expected_lock_version: block.lock_version,
        }
    }

    #[tokio::test]
    async fn duplicate_slug_rejected_within_type_only() {
        let store = MemoryBlockStore::new();
        store.save(&block("NewsRelease", "Launch")).await.unwrap();
        store.save(&block("HtmlBlock", "Launch")).await.unwrap();

        let err = store.save(&block("NewsRelease", "Launch")).await.unwrap_err();
        assert!(matches!(err, BlockError::Validation(_)));
    }

    #[tokio::test]
    async fn stale_lock_version_conflicts() {
        let store = MemoryBlockStore::new();
        let saved = store.save(&block("NewsRelease", "Launch")).await.unwrap();

        let first = store.update(saved.id, &update_of(&saved, "A")).await.unwrap();
        assert_eq!(first.lock_version, saved.lock_version + 1);

        let err = store
            .update(saved.id, &update_of(&saved, "B"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BlockError::EditConflict { expected: 0, found: 1, .. }
        ));
        assert_eq!(store.find(saved.id).await.unwrap().unwrap().name(), "A");
    }

    #[tokio::test]
    async fn append_version_numbers_sequentially() {
        let store = MemoryBlockStore::new();
        let saved = store.save(&block("NewsRelease", "Launch")).await.unwrap();

        let (published, v1) = store
            .append_version(saved.id, &saved.content, "Published", saved.lock_version)
            .await
            .unwrap();
        let (after, v2) = store
            .append_version(saved.id, &saved.content, "Published", published.lock_version)
            .await
            .unwrap();

        assert_eq!((v1.version, v2.version), (1, 2));
        assert_eq!(after.version, 2);
        assert_eq!(store.versions(saved.id).await.unwrap().len(), 2);
        assert!(store.version(saved.id, 3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_removes_versions() {
        let store = MemoryBlockStore::new();
        let saved = store.save(&block("NewsRelease", "Launch")).await.unwrap();
        store
            .append_version(saved.id, &saved.content, "Published", saved.lock_version)
            .await
            .unwrap();

        assert!(store.delete(saved.id).await.unwrap());
        assert!(store.versions(saved.id).await.unwrap().is_empty());
        assert!(!store.delete(saved.id).await.unwrap());
    }

    #[tokio::test]
    async fn append_version_rejects_stale_lock_version() {
        let store = MemoryBlockStore::new();
        let saved = store.save(&block("NewsRelease", "Launch")).await.unwrap();
        store.update(saved.id, &update_of(&saved, "Edited")).await.unwrap();

        let err = store
            .append_version(saved.id, &saved.content, "Published", saved.lock_version)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BlockError::EditConflict { expected: 0, found: 1, .. }
        ));
        assert!(store.versions(saved.id).await.unwrap().is_empty());
        assert_eq!(store.find(saved.id).await.unwrap().unwrap().name(), "Edited");
    }

    #[tokio::test]
    async fn delete_removes_page_placements() {
        let store = MemoryBlockStore::new();
        let saved = store.save(&block("HtmlBlock", "Footer")).await.unwrap();
        let kept = store.save(&block("HtmlBlock", "Header")).await.unwrap();
        let page = Page {
            id: Uuid::now_v7(),
            name: "Home".to_string(),
            path: "/home".to_string(),
            section_id: None,
            block_ids: vec![saved.id, kept.id],
        };
        store.save_page(&page).await.unwrap();

        assert!(store.delete(saved.id).await.unwrap());
        let page = store.find_page(page.id).await.unwrap().unwrap();
        assert_eq!(page.block_ids, vec![kept.id]);
    }

    #[tokio::test]
    async fn descending_order_breaks_ties_descending() {
        let store = MemoryBlockStore::new();
        let first = store.save(&block("NewsRelease", "First")).await.unwrap();
        let mut second = block("NewsRelease", "Second");
        second.created = first.created;
        let second = store.save(&second).await.unwrap();

        let mut options = ListOptions::new("NewsRelease");
        options.order = Some(SortOrder::desc(SortField::Created));
        let page = store.list(&options).await.unwrap();
        let ids: Vec<_> = page.items.iter().map(|b| b.id).collect();
        let mut expected = vec![first.id, second.id];
        expected.sort_by(|a, b| b.cmp(a));
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn list_filters_sorts_and_paginates() {
        let store = MemoryBlockStore::new();
        let root = Section::root("Home", "/");
        let news = Section::child_of(&root, "News", "/news");
        let about = Section::child_of(&root, "About", "/about");
        for s in [&root, &news, &about] {
            store.save_section(s).await.unwrap();
        }

        for (name, section) in [
            ("Alpha release", Some(news.id)),
            ("Beta release", Some(news.id)),
            ("Gamma notice", Some(about.id)),
            ("Delta release", None),
        ] {
            let mut b = block("NewsRelease", name);
            b.parent_section_id = section;
            store.save(&b).await.unwrap();
        }

        let mut options = ListOptions::new("NewsRelease");
        options.search = Some("RELEASE".to_string());
        options.order = Some(SortOrder::desc(SortField::Name));
        let page = store.list(&options).await.unwrap();
        let names: Vec<_> = page.items.iter().map(|b| b.name().to_string()).collect();
        assert_eq!(names, ["Delta release", "Beta release", "Alpha release"]);

        options.section = Some(news.clone());
        options.per_page = 1;
        options.page = 2;
        let page = store.list(&options).await.unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items[0].name(), "Alpha release");
    }

    #[tokio::test]
    async fn connected_pages_sorted_by_name() {
        let store = MemoryBlockStore::new();
        let saved = store.save(&block("HtmlBlock", "Footer")).await.unwrap();
        for name in ["Zeta", "Alpha"] {
            store
                .save_page(&Page {
                    id: Uuid::now_v7(),
                    name: name.to_string(),
                    path: format!("/{}", name.to_lowercase()),
                    section_id: None,
                    block_ids: vec![saved.id],
                })
                .await
                .unwrap();
        }
        let pages = store.connected_pages(saved.id).await.unwrap();
        assert_eq!(pages[0].name, "Alpha");
        assert_eq!(pages.len(), 2);
    }
}
