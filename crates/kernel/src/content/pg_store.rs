//! PostgreSQL block store.

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::store::{BlockStore, ListOptions, Paginated};
use crate::error::{BlockError, BlockResult};
use crate::models::{BlockContent, BlockVersion, ContentBlock, Page, Section, UpdateBlock};

const BLOCK_COLUMNS: &str = "id, content_type, name, slug, category, fields, parent_section_id, connected_page_id, lock_version, version, created, changed";

const VERSION_COLUMNS: &str =
    "block_id, version, name, slug, category, fields, published, comment, created";

const PAGE_SELECT: &str = r#"
    SELECT p.id, p.name, p.path, p.section_id,
           COALESCE(array_agg(pb.block_id) FILTER (WHERE pb.block_id IS NOT NULL), '{}') AS block_ids
    FROM cms_page p
    LEFT JOIN cms_page_block pb ON pb.page_id = p.id
"#;

/// Block store backed by PostgreSQL.
#[derive(Clone)]
pub struct PgBlockStore {
    pool: PgPool,
}

impl PgBlockStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map a unique-constraint violation on the slug to a validation error.
fn map_write_error(e: sqlx::Error, what: &'static str) -> BlockError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return BlockError::invalid("slug", "has already been taken");
        }
    }
    BlockError::Unexpected(anyhow::Error::new(e).context(what))
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, options: &ListOptions) {
    qb.push(" WHERE b.content_type = ");
    qb.push_bind(options.content_type.clone());

    if let Some(section) = &options.section {
        qb.push(" AND s.ancestry LIKE ");
        qb.push_bind(format!("{}%", section.ancestry));
    }

    if let Some(search) = options.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let escaped = search
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        qb.push(" AND b.name ILIKE ");
        qb.push_bind(format!("%{escaped}%"));
    }
}

#[async_trait]
impl BlockStore for PgBlockStore {
    async fn find(&self, id: Uuid) -> BlockResult<Option<ContentBlock>> {
        let block = sqlx::query_as::<_, ContentBlock>(&format!(
            "SELECT {BLOCK_COLUMNS} FROM content_block WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch block by id")?;

        Ok(block)
    }

    async fn find_by_slug(
        &self,
        content_type: &str,
        slug: &str,
    ) -> BlockResult<Option<ContentBlock>> {
        let block = sqlx::query_as::<_, ContentBlock>(&format!(
            "SELECT {BLOCK_COLUMNS} FROM content_block WHERE content_type = $1 AND slug = $2"
        ))
        .bind(content_type)
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch block by slug")?;

        Ok(block)
    }

    async fn latest(&self, content_type: &str) -> BlockResult<Option<ContentBlock>> {
        let block = sqlx::query_as::<_, ContentBlock>(&format!(
            "SELECT {BLOCK_COLUMNS} FROM content_block WHERE content_type = $1 ORDER BY created DESC, id DESC LIMIT 1"
        ))
        .bind(content_type)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch latest block")?;

        Ok(block)
    }

    async fn list(&self, options: &ListOptions) -> BlockResult<Paginated<ContentBlock>> {
        let from = " FROM content_block b LEFT JOIN cms_section s ON s.id = b.parent_section_id";

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*)");
        count.push(from);
        push_filters(&mut count, options);
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .context("failed to count blocks")?;

        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT b.id, b.content_type, b.name, b.slug, b.category, b.fields, b.parent_section_id, b.connected_page_id, b.lock_version, b.version, b.created, b.changed",
        );
        qb.push(from);
        push_filters(&mut qb, options);

        // Column names come from a closed enum, never from the request.
        qb.push(" ORDER BY ");
        let direction = match options.order {
            Some(order) if order.descending => "DESC",
            _ => "ASC",
        };
        if let Some(order) = options.order {
            qb.push(format!("b.{} {direction}, ", order.field.column()));
        }
        qb.push(format!("b.created {direction}, b.id {direction} LIMIT "));
        qb.push_bind(i64::from(options.limit()));
        qb.push(" OFFSET ");
        qb.push_bind(i64::try_from(options.offset()).unwrap_or(i64::MAX));

        let items = qb
            .build_query_as::<ContentBlock>()
            .fetch_all(&self.pool)
            .await
            .context("failed to list blocks")?;

        Ok(Paginated::new(
            items,
            options,
            u64::try_from(total).unwrap_or_default(),
        ))
    }

    async fn save(&self, block: &ContentBlock) -> BlockResult<ContentBlock> {
        sqlx::query(&format!(
            "INSERT INTO content_block ({BLOCK_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"
        ))
        .bind(block.id)
        .bind(&block.content_type)
        .bind(&block.content.name)
        .bind(&block.content.slug)
        .bind(&block.content.category)
        .bind(&block.content.fields)
        .bind(block.parent_section_id)
        .bind(block.connected_page_id)
        .bind(block.lock_version)
        .bind(block.version)
        .bind(block.created)
        .bind(block.changed)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "failed to insert block"))?;

        self.find(block.id)
            .await?
            .ok_or_else(|| BlockError::Unexpected(anyhow::anyhow!("failed to fetch created block")))
    }

    async fn update(&self, id: Uuid, update: &UpdateBlock) -> BlockResult<ContentBlock> {
        let now = chrono::Utc::now().timestamp();

        let updated = sqlx::query_as::<_, ContentBlock>(&format!(
            r#"
            UPDATE content_block SET
                name = $1,
                slug = $2,
                category = $3,
                fields = $4,
                connected_page_id = $5,
                lock_version = lock_version + 1,
                changed = $6
            WHERE id = $7 AND lock_version = $8
            RETURNING {BLOCK_COLUMNS}
            "#
        ))
        .bind(&update.content.name)
        .bind(&update.content.slug)
        .bind(&update.content.category)
        .bind(&update.content.fields)
        .bind(update.connected_page_id)
        .bind(now)
        .bind(id)
        .bind(update.expected_lock_version)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "failed to update block"))?;

        if let Some(block) = updated {
            return Ok(block);
        }

        // Nothing matched: either the block is gone or someone else saved first.
        match self.find(id).await? {
            Some(current) => Err(BlockError::EditConflict {
                id,
                expected: update.expected_lock_version,
                found: current.lock_version,
            }),
            None => Err(BlockError::not_found(format!("block {id}"))),
        }
    }

    async fn delete(&self, id: Uuid) -> BlockResult<bool> {
        // Versions and page placements are deleted via CASCADE
        let result = sqlx::query("DELETE FROM content_block WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("failed to delete block")?;

        Ok(result.rows_affected() > 0)
    }

    async fn versions(&self, block_id: Uuid) -> BlockResult<Vec<BlockVersion>> {
        let versions = sqlx::query_as::<_, BlockVersion>(&format!(
            "SELECT {VERSION_COLUMNS} FROM content_block_version WHERE block_id = $1 ORDER BY version ASC"
        ))
        .bind(block_id)
        .fetch_all(&self.pool)
        .await
        .context("failed to fetch block versions")?;

        Ok(versions)
    }

    async fn version(&self, block_id: Uuid, version: i32) -> BlockResult<Option<BlockVersion>> {
        let version = sqlx::query_as::<_, BlockVersion>(&format!(
            "SELECT {VERSION_COLUMNS} FROM content_block_version WHERE block_id = $1 AND version = $2"
        ))
        .bind(block_id)
        .bind(version)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch block version")?;

        Ok(version)
    }

    async fn append_version(
        &self,
        block_id: Uuid,
        content: &BlockContent,
        comment: &str,
        expected_lock_version: i32,
    ) -> BlockResult<(ContentBlock, BlockVersion)> {
        let now = chrono::Utc::now().timestamp();
        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to start transaction")?;

        // Row lock serializes concurrent publishes of the same block.
        let block = sqlx::query_as::<_, ContentBlock>(&format!(
            r#"
            UPDATE content_block SET
                name = $1,
                slug = $2,
                category = $3,
                fields = $4,
                version = version + 1,
                lock_version = lock_version + 1,
                changed = $5
            WHERE id = $6 AND lock_version = $7
            RETURNING {BLOCK_COLUMNS}
            "#
        ))
        .bind(&content.name)
        .bind(&content.slug)
        .bind(&content.category)
        .bind(&content.fields)
        .bind(now)
        .bind(block_id)
        .bind(expected_lock_version)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, "failed to advance block version"))?;

        let Some(block) = block else {
            tx.rollback().await.context("failed to roll back transaction")?;
            return match self.find(block_id).await? {
                Some(current) => Err(BlockError::EditConflict {
                    id: block_id,
                    expected: expected_lock_version,
                    found: current.lock_version,
                }),
                None => Err(BlockError::not_found(format!("block {block_id}"))),
            };
        };

        let version = sqlx::query_as::<_, BlockVersion>(&format!(
            r#"
            INSERT INTO content_block_version ({VERSION_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, TRUE, $7, $8)
            RETURNING {VERSION_COLUMNS}
            "#
        ))
        .bind(block_id)
        .bind(block.version)
        .bind(&content.name)
        .bind(&content.slug)
        .bind(&content.category)
        .bind(&content.fields)
        .bind(comment)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .context("failed to insert block version")?;

        tx.commit().await.context("failed to commit transaction")?;

        Ok((block, version))
    }

    async fn find_section(&self, id: Uuid) -> BlockResult<Option<Section>> {
        let section = sqlx::query_as::<_, Section>(
            "SELECT id, name, path, ancestry FROM cms_section WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch section")?;

        Ok(section)
    }

    async fn find_section_by_path(&self, path: &str) -> BlockResult<Option<Section>> {
        let section = sqlx::query_as::<_, Section>(
            "SELECT id, name, path, ancestry FROM cms_section WHERE path = $1",
        )
        .bind(path)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch section by path")?;

        Ok(section)
    }

    async fn save_section(&self, section: &Section) -> BlockResult<()> {
        sqlx::query(
            r#"
            INSERT INTO cms_section (id, name, path, ancestry)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                path = EXCLUDED.path,
                ancestry = EXCLUDED.ancestry
            "#,
        )
        .bind(section.id)
        .bind(&section.name)
        .bind(&section.path)
        .bind(&section.ancestry)
        .execute(&self.pool)
        .await
        .context("failed to save section")?;

        Ok(())
    }

    async fn find_page(&self, id: Uuid) -> BlockResult<Option<Page>> {
        let page = sqlx::query_as::<_, Page>(&format!("{PAGE_SELECT} WHERE p.id = $1 GROUP BY p.id"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("failed to fetch page")?;

        Ok(page)
    }

    async fn save_page(&self, page: &Page) -> BlockResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to start transaction")?;

        sqlx::query(
            r#"
            INSERT INTO cms_page (id, name, path, section_id)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                path = EXCLUDED.path,
                section_id = EXCLUDED.section_id
            "#,
        )
        .bind(page.id)
        .bind(&page.name)
        .bind(&page.path)
        .bind(page.section_id)
        .execute(&mut *tx)
        .await
        .context("failed to save page")?;

        sqlx::query("DELETE FROM cms_page_block WHERE page_id = $1")
            .bind(page.id)
            .execute(&mut *tx)
            .await
            .context("failed to clear page blocks")?;

        sqlx::query(
            "INSERT INTO cms_page_block (page_id, block_id) SELECT $1, unnest($2::uuid[])",
        )
        .bind(page.id)
        .bind(&page.block_ids)
        .execute(&mut *tx)
        .await
        .context("failed to save page blocks")?;

        tx.commit().await.context("failed to commit transaction")?;

        Ok(())
    }

    async fn connected_pages(&self, block_id: Uuid) -> BlockResult<Vec<Page>> {
        let pages = sqlx::query_as::<_, Page>(&format!(
            r#"{PAGE_SELECT}
            WHERE p.id IN (SELECT page_id FROM cms_page_block WHERE block_id = $1)
            GROUP BY p.id
            ORDER BY p.name"#
        ))
        .bind(block_id)
        .fetch_all(&self.pool)
        .await
        .context("failed to fetch connected pages")?;

        Ok(pages)
    }
}
