//! Block lifecycle controller.
//!
//! One method per action. Each loads or builds a block through the store,
//! runs the permission gate, applies the versioning policy where relevant,
//! and returns an [`Outcome`] for the HTTP layer to render or redirect.
//!
//! The acting user, the content type, and any caller-supplied redirect
//! target travel in an explicit [`ActionContext`].

mod outcome;

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::content::store::DEFAULT_PER_PAGE;
use crate::content::{BlockStore, ListOptions, VersioningPolicy};
use crate::error::{BlockError, BlockResult, FieldError};
use crate::models::{
    BlockForm, BlockView, ContentBlock, ContentType, Section, SortOrder, UpdateBlock, User,
};
use crate::permissions::{Action, PermissionPolicy};

pub use outcome::{Flash, FormState, Outcome, ToolbarTab, View, ViewModel};

/// Per-request inputs every action needs.
#[derive(Debug, Clone, Copy)]
pub struct ActionContext<'a> {
    pub user: &'a User,
    pub content_type: &'a ContentType,

    /// Caller-supplied post-action location (`_redirect_to`).
    pub redirect_to: Option<&'a str>,
}

impl<'a> ActionContext<'a> {
    pub fn new(user: &'a User, content_type: &'a ContentType) -> Self {
        Self {
            user,
            content_type,
            redirect_to: None,
        }
    }

    pub fn with_redirect(mut self, redirect_to: Option<&'a str>) -> Self {
        self.redirect_to = redirect_to;
        self
    }

    /// The caller's redirect target if it is a usable local path, else `default`.
    pub fn redirect_or(&self, default: String) -> String {
        match self.redirect_to.map(str::trim) {
            Some(target) if is_local_path(target) => target.to_string(),
            Some(target) if !target.is_empty() => {
                warn!(target = %target, "ignoring non-local redirect target");
                default
            }
            _ => default,
        }
    }
}

/// Only same-site absolute paths are accepted as redirect targets.
fn is_local_path(target: &str) -> bool {
    target.starts_with('/') && !target.starts_with("//") && !target.contains('\\')
}

/// Query parameters for listing blocks.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    /// Section id, or "all".
    pub section_id: Option<String>,
    pub search: Option<String>,
    pub order: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Orchestrates store, versioning, and permission checks per action.
#[derive(Clone)]
pub struct BlockLifecycleController {
    store: Arc<dyn BlockStore>,
    versioning: VersioningPolicy,
    per_page: u32,
}

impl BlockLifecycleController {
    pub fn new(store: Arc<dyn BlockStore>) -> Self {
        Self {
            versioning: VersioningPolicy::new(store.clone()),
            store,
            per_page: DEFAULT_PER_PAGE,
        }
    }

    /// Set the default listing page size.
    pub fn with_page_size(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    pub fn store(&self) -> &Arc<dyn BlockStore> {
        &self.store
    }

    // ------------------------------------------------------------------
    // Read actions
    // ------------------------------------------------------------------

    /// List blocks of the context's type.
    pub async fn list(&self, ctx: &ActionContext<'_>, query: ListQuery) -> BlockResult<Outcome> {
        let ct = ctx.content_type;
        let mut options = ListOptions::new(&ct.key);
        options.page = query.page.unwrap_or(1).max(1);
        options.per_page = query.per_page.unwrap_or(self.per_page);

        if let Some(raw) = query
            .section_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && *s != "all")
        {
            options.section = Some(self.find_section(raw).await?);
        }

        if ct.searchable {
            options.search = query.search.filter(|s| !s.trim().is_empty());
        }

        options.order = ct.default_order;
        if let Some(raw) = query.order.as_deref().filter(|s| !s.trim().is_empty()) {
            match raw.parse::<SortOrder>() {
                Ok(order) => options.order = Some(order),
                Err(e) => warn!(order = %raw, error = %e, "ignoring listing order"),
            }
        }

        let blocks = self.store.list(&options).await?;
        PermissionPolicy::check(&Action::List, ctx.user, None)?;

        let mut model = ViewModel::library(ct, ctx.user);
        model.blocks = Some(blocks);
        Ok(Outcome::render(View::Index, model))
    }

    /// Show the draft of a block.
    pub async fn show(&self, ctx: &ActionContext<'_>, id: Uuid) -> BlockResult<Outcome> {
        let view = self.load_draft(ctx, id).await?;
        PermissionPolicy::check(&Action::Show, ctx.user, Some(&view.block))?;

        let model = ViewModel::library(ctx.content_type, ctx.user).with_block(view);
        Ok(Outcome::render(View::Show, model))
    }

    /// Show a block as of a version, or its draft when no version is given.
    pub async fn show_version(
        &self,
        ctx: &ActionContext<'_>,
        id: Uuid,
        version: Option<i32>,
    ) -> BlockResult<Outcome> {
        let block = self.load(ctx, id).await?;
        let view = match version {
            Some(v) => {
                self.versioning
                    .load_as_of(ctx.content_type, block, v)
                    .await?
            }
            None => self.versioning.load_draft(ctx.content_type, block),
        };
        PermissionPolicy::check(&Action::ShowVersion, ctx.user, Some(&view.block))?;

        let model = ViewModel::library(ctx.content_type, ctx.user).with_block(view);
        Ok(Outcome::render(View::Show, model))
    }

    /// Version history of a block. Unversioned types have none to show.
    pub async fn list_versions(&self, ctx: &ActionContext<'_>, id: Uuid) -> BlockResult<Outcome> {
        if !VersioningPolicy::is_versioned(ctx.content_type) {
            return Ok(Outcome::NotImplemented);
        }

        let block = self.load(ctx, id).await?;
        PermissionPolicy::check(&Action::ListVersions, ctx.user, Some(&block))?;
        let versions = self
            .versioning
            .list_versions(ctx.content_type, &block)
            .await?;

        let mut model = ViewModel::library(ctx.content_type, ctx.user)
            .with_block(self.versioning.load_draft(ctx.content_type, block));
        model.versions = Some(versions);
        Ok(Outcome::render(View::Versions, model))
    }

    /// Pages that reference a block.
    pub async fn usages(&self, ctx: &ActionContext<'_>, id: Uuid) -> BlockResult<Outcome> {
        let view = self.load_draft(ctx, id).await?;
        PermissionPolicy::check(&Action::Usages, ctx.user, Some(&view.block))?;
        let pages = self.store.connected_pages(view.block.id).await?;

        let mut model = ViewModel::library(ctx.content_type, ctx.user).with_block(view);
        model.pages = Some(pages);
        Ok(Outcome::render(View::Usages, model))
    }

    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Blank form for a new block.
    ///
    /// The category is copied from the most recently created block of the
    /// same type.
    pub async fn new_block(
        &self,
        ctx: &ActionContext<'_>,
        parent: Option<Uuid>,
    ) -> BlockResult<Outcome> {
        let ct = ctx.content_type;
        let default_parent = self.default_parent(ct).await?;

        let mut block = ContentBlock::new(&ct.key);
        block.parent_section_id = default_parent.as_ref().map(|s| s.id);
        self.assign_parent(&mut block, parent).await?;
        self.set_default_category(ct, &mut block).await?;
        PermissionPolicy::check(&Action::New, ctx.user, Some(&block))?;

        let mut model = ViewModel::library(ct, ctx.user)
            .with_block(self.versioning.load_draft(ct, block));
        model.parent = default_parent;
        Ok(Outcome::render(View::New, model))
    }

    /// Create a block from submitted fields.
    ///
    /// Access denials propagate. Every other failure re-renders the form;
    /// failures that are not validation errors are logged first.
    pub async fn create(
        &self,
        ctx: &ActionContext<'_>,
        form: BlockForm,
        parent: Option<Uuid>,
    ) -> BlockResult<Outcome> {
        let mut block = ContentBlock::new(&ctx.content_type.key);

        let err = match self.create_block(ctx, &mut block, &form, parent).await {
            Ok(saved) => return Ok(self.after_create_on_success(ctx, saved).await),
            Err(e) => e,
        };

        match err {
            BlockError::AccessDenied => Err(BlockError::AccessDenied),
            BlockError::Validation(errors) => Ok(self.after_create_on_failure(ctx, block, errors)),
            e => {
                error!(
                    content_type = %ctx.content_type.key,
                    error = ?e,
                    "unexpected error creating block"
                );
                Ok(self.after_create_on_failure(ctx, block, Vec::new()))
            }
        }
    }

    async fn create_block(
        &self,
        ctx: &ActionContext<'_>,
        block: &mut ContentBlock,
        form: &BlockForm,
        parent: Option<Uuid>,
    ) -> BlockResult<Saved> {
        let ct = ctx.content_type;
        let publish = form.publish_on_save.unwrap_or(false);
        block.apply(form);
        self.assign_parent(block, parent).await?;
        PermissionPolicy::check(&Action::Create, ctx.user, Some(block))?;

        block.validate()?;
        self.check_connected_page(block).await?;

        let saved = self.store.save(block).await?;
        info!(block_id = %saved.id, content_type = %ct.key, "block created");

        // The block exists from here on; follow-up failures are reported, not raised.
        let mut saved = Saved::complete(saved);
        if ct.connectable {
            if let Err(e) = self.connect_to_page(&saved.block).await {
                error!(block_id = %saved.block.id, error = ?e, "could not place block on its page");
                saved.unfinished = Some("placed on its page");
            }
        }
        if publish {
            self.publish_after_save(ct, &mut saved).await;
        }
        Ok(saved)
    }

    async fn publish_after_save(&self, ct: &ContentType, saved: &mut Saved) {
        if !VersioningPolicy::is_versioned(ct) {
            return;
        }
        match self.versioning.try_publish(ct, &saved.block).await {
            Ok(view) => saved.block = view.block,
            Err(e) => {
                error!(block_id = %saved.block.id, error = ?e, "could not publish block on save");
                saved.unfinished.get_or_insert("published");
            }
        }
    }

    async fn after_create_on_success(&self, ctx: &ActionContext<'_>, saved: Saved) -> Outcome {
        let ct = ctx.content_type;
        let flash = saved.flash(ct, "created");
        let block = saved.block;

        if ct.connectable {
            if let Some(page_id) = block.connected_page_id {
                match self.store.find_page(page_id).await {
                    Ok(Some(page)) => return Outcome::redirect(page.path, flash),
                    Ok(None) => {}
                    Err(e) => warn!(block_id = %block.id, error = ?e, "could not load connected page"),
                }
            }
        }

        Outcome::redirect(ctx.redirect_or(ct.block_path(block.id)), flash)
    }

    fn after_create_on_failure(
        &self,
        ctx: &ActionContext<'_>,
        block: ContentBlock,
        errors: Vec<FieldError>,
    ) -> Outcome {
        let mut model = ViewModel::library(ctx.content_type, ctx.user)
            .with_block(self.versioning.load_draft(ctx.content_type, block));
        model.form_state = FormState::Invalid;
        model.errors = errors;
        Outcome::render(View::New, model)
    }

    // ------------------------------------------------------------------
    // Edit / update
    // ------------------------------------------------------------------

    /// Edit form for a block's draft.
    pub async fn edit(&self, ctx: &ActionContext<'_>, id: Uuid) -> BlockResult<Outcome> {
        let view = self.load_draft(ctx, id).await?;
        PermissionPolicy::check(&Action::Edit, ctx.user, Some(&view.block))?;

        let mut model = ViewModel::library(ctx.content_type, ctx.user).with_block(view);
        model.parent = self.default_parent(ctx.content_type).await?;
        Ok(Outcome::render(View::Edit, model))
    }

    /// Apply submitted fields to a block's draft.
    ///
    /// A stale `lock_version` yields the edit form in conflict state with the
    /// stored block alongside. Access denials propagate; a block that cannot
    /// be loaded at all propagates its error; every other failure re-renders
    /// the edit form.
    pub async fn update(
        &self,
        ctx: &ActionContext<'_>,
        id: Uuid,
        form: BlockForm,
    ) -> BlockResult<Outcome> {
        let mut loaded: Option<ContentBlock> = None;

        let err = match self.update_block(ctx, id, &form, &mut loaded).await {
            Ok(saved) => return Ok(self.after_update_on_success(ctx, saved)),
            Err(e) => e,
        };

        let Some(block) = loaded else {
            return Err(err);
        };

        match err {
            BlockError::AccessDenied => Err(BlockError::AccessDenied),
            BlockError::EditConflict {
                expected, found, ..
            } => {
                info!(block_id = %id, expected, found, "edit conflict");
                Ok(self.after_update_on_edit_conflict(ctx, block).await)
            }
            BlockError::Validation(errors) => Ok(self.after_update_on_failure(ctx, block, errors)),
            e => {
                error!(block_id = %id, error = ?e, "unexpected error updating block");
                Ok(self.after_update_on_failure(ctx, block, Vec::new()))
            }
        }
    }

    async fn update_block(
        &self,
        ctx: &ActionContext<'_>,
        id: Uuid,
        form: &BlockForm,
        loaded: &mut Option<ContentBlock>,
    ) -> BlockResult<Saved> {
        let ct = ctx.content_type;
        let block = self.load(ctx, id).await?;
        *loaded = Some(block.clone());
        PermissionPolicy::check(&Action::Update, ctx.user, Some(&block))?;

        let expected_lock_version = form.lock_version.unwrap_or(block.lock_version);
        let mut edited = block;
        edited.apply(form);
        *loaded = Some(edited.clone());

        edited.validate()?;
        self.check_connected_page(&edited).await?;

        let updated = self
            .store
            .update(
                id,
                &UpdateBlock {
                    content: edited.content,
                    connected_page_id: edited.connected_page_id,
                    expected_lock_version,
                },
            )
            .await?;
        info!(block_id = %id, lock_version = updated.lock_version, "block updated");

        let mut saved = Saved::complete(updated);
        if form.publish_on_save.unwrap_or(false) {
            self.publish_after_save(ct, &mut saved).await;
        }
        Ok(saved)
    }

    fn after_update_on_success(&self, ctx: &ActionContext<'_>, saved: Saved) -> Outcome {
        let ct = ctx.content_type;
        let flash = saved.flash(ct, "updated");
        Outcome::redirect(ctx.redirect_or(ct.block_path(saved.block.id)), flash)
    }

    fn after_update_on_failure(
        &self,
        ctx: &ActionContext<'_>,
        block: ContentBlock,
        errors: Vec<FieldError>,
    ) -> Outcome {
        let mut model = ViewModel::library(ctx.content_type, ctx.user)
            .with_block(self.versioning.load_draft(ctx.content_type, block));
        model.form_state = FormState::Invalid;
        model.errors = errors;
        Outcome::render(View::Edit, model)
    }

    async fn after_update_on_edit_conflict(
        &self,
        ctx: &ActionContext<'_>,
        block: ContentBlock,
    ) -> Outcome {
        let other_version = match self.store.find(block.id).await {
            Ok(current) => current,
            Err(e) => {
                error!(block_id = %block.id, error = ?e, "could not reload block after edit conflict");
                None
            }
        };

        let mut model = ViewModel::library(ctx.content_type, ctx.user)
            .with_block(self.versioning.load_draft(ctx.content_type, block));
        model.form_state = FormState::Conflict;
        model.other_version = other_version;
        Outcome::render(View::Edit, model)
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Delete a block and its history.
    pub async fn destroy(&self, ctx: &ActionContext<'_>, id: Uuid) -> BlockResult<Outcome> {
        let block = self.load_for_command(ctx, &Action::Destroy, id).await?;

        let ok = match self.store.delete(block.id).await {
            Ok(deleted) => deleted,
            Err(e) => {
                warn!(block_id = %block.id, error = ?e, "could not delete block");
                false
            }
        };
        if ok {
            info!(block_id = %block.id, "block deleted");
        }

        let flash = command_flash(ctx.content_type, &block, ok, "deleted");
        Ok(Outcome::redirect(
            ctx.redirect_or(ctx.content_type.blocks_path()),
            flash,
        ))
    }

    /// Publish a block's draft.
    pub async fn publish(&self, ctx: &ActionContext<'_>, id: Uuid) -> BlockResult<Outcome> {
        let block = self.load_for_command(ctx, &Action::Publish, id).await?;
        let ok = self.versioning.publish(ctx.content_type, &block).await;

        let flash = command_flash(ctx.content_type, &block, ok, "published");
        Ok(Outcome::redirect(
            ctx.redirect_or(ctx.content_type.block_path(block.id)),
            flash,
        ))
    }

    /// Revert a block to an earlier version.
    ///
    /// Revert failures are reported in the status message, never raised.
    pub async fn revert_to(
        &self,
        ctx: &ActionContext<'_>,
        id: Uuid,
        version: i32,
    ) -> BlockResult<Outcome> {
        let block = self.load_for_command(ctx, &Action::Revert, id).await?;

        let ok = match self.versioning.revert(ctx.content_type, &block, version).await {
            Ok(_) => true,
            Err(e) => {
                warn!(
                    block_id = %block.id,
                    version,
                    error = ?e,
                    "could not revert block"
                );
                false
            }
        };

        let flash = command_flash(
            ctx.content_type,
            &block,
            ok,
            &format!("reverted to version {version}"),
        );
        Ok(Outcome::redirect(
            ctx.redirect_or(ctx.content_type.block_path(block.id)),
            flash,
        ))
    }

    async fn load_for_command(
        &self,
        ctx: &ActionContext<'_>,
        action: &Action,
        id: Uuid,
    ) -> BlockResult<ContentBlock> {
        let block = self.load(ctx, id).await?;
        PermissionPolicy::check(action, ctx.user, Some(&block))?;
        Ok(block)
    }

    // ------------------------------------------------------------------
    // Public pages
    // ------------------------------------------------------------------

    /// Render a block found by slug as a page.
    ///
    /// Users who may edit the block get the editing chrome unless they asked
    /// for `view_mode`; everyone else gets the published page.
    pub async fn view_as_page(
        &self,
        ctx: &ActionContext<'_>,
        slug: &str,
        view_mode: bool,
    ) -> BlockResult<Outcome> {
        let ct = ctx.content_type;
        let block = self.find_by_slug(ct, slug).await?;

        if ctx.user.can_edit(&block) && !view_mode {
            let draft = self.versioning.load_draft(ct, block);
            let mut model = ViewModel::library(ct, ctx.user);
            model.toolbar_tab = None;
            model.page_title = Some(draft.name().to_string());
            return Ok(Outcome::render(View::BlockEditor, model.with_block(draft)));
        }

        let view = self.public_view(ct, ctx.user, block, slug).await?;
        Ok(self.page(ctx, view))
    }

    /// Render a block at `/{route}/{year}/{month}/{day}/{slug}`.
    ///
    /// The published `release_date` field must match the date in the path.
    pub async fn view_dated_page(
        &self,
        ctx: &ActionContext<'_>,
        date: (i32, u32, u32),
        slug: &str,
    ) -> BlockResult<Outcome> {
        let ct = ctx.content_type;
        let not_found = || BlockError::not_found(format!("No Content at {}", ct.calculate_path(slug)));
        if !ct.dated_permalinks {
            return Err(not_found());
        }
        let (year, month, day) = date;
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(not_found)?;

        let block = self.find_by_slug(ct, slug).await?;
        let view = self.public_view(ct, ctx.user, block, slug).await?;

        let released = view
            .block
            .field_str("release_date")
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());
        if released != Some(date) {
            return Err(not_found());
        }
        Ok(self.page(ctx, view))
    }

    async fn public_view(
        &self,
        ct: &ContentType,
        user: &User,
        block: ContentBlock,
        slug: &str,
    ) -> BlockResult<BlockView> {
        PermissionPolicy::check_view(user, &block)?;
        self.versioning
            .load_published(ct, block)
            .await?
            .ok_or_else(|| BlockError::not_found(format!("No Content at {}", ct.calculate_path(slug))))
    }

    fn page(&self, ctx: &ActionContext<'_>, view: BlockView) -> Outcome {
        let mut model = ViewModel::library(ctx.content_type, ctx.user);
        model.toolbar_tab = None;
        model.page_title = Some(view.name().to_string());
        Outcome::render(View::Page, model.with_block(view))
    }

    // ------------------------------------------------------------------
    // Loading helpers
    // ------------------------------------------------------------------

    /// Load a block of the context's type.
    async fn load(&self, ctx: &ActionContext<'_>, id: Uuid) -> BlockResult<ContentBlock> {
        self.store
            .find(id)
            .await?
            .filter(|b| b.content_type == ctx.content_type.key)
            .ok_or_else(|| {
                BlockError::not_found(format!("{} {id}", ctx.content_type.display_name))
            })
    }

    async fn load_draft(&self, ctx: &ActionContext<'_>, id: Uuid) -> BlockResult<BlockView> {
        let block = self.load(ctx, id).await?;
        Ok(self.versioning.load_draft(ctx.content_type, block))
    }

    async fn find_by_slug(&self, ct: &ContentType, slug: &str) -> BlockResult<ContentBlock> {
        self.store
            .find_by_slug(&ct.key, slug)
            .await?
            .ok_or_else(|| BlockError::not_found(format!("No Content at {}", ct.calculate_path(slug))))
    }

    async fn find_section(&self, raw: &str) -> BlockResult<Section> {
        let not_found = || BlockError::not_found(format!("section {raw}"));
        let id: Uuid = raw.parse().map_err(|_| not_found())?;
        self.store.find_section(id).await?.ok_or_else(not_found)
    }

    /// The section blocks of this type go under by default.
    async fn default_parent(&self, ct: &ContentType) -> BlockResult<Option<Section>> {
        match (&ct.path, ct.can_have_parent) {
            (Some(path), true) => self.store.find_section_by_path(path).await,
            _ => Ok(None),
        }
    }

    async fn assign_parent(&self, block: &mut ContentBlock, parent: Option<Uuid>) -> BlockResult<()> {
        if let Some(id) = parent {
            let section = self
                .store
                .find_section(id)
                .await?
                .ok_or_else(|| BlockError::not_found(format!("section {id}")))?;
            block.parent_section_id = Some(section.id);
        }
        Ok(())
    }

    // TODO: confirm with product whether new blocks should inherit the
    // category of the last block created, or start blank.
    async fn set_default_category(
        &self,
        ct: &ContentType,
        block: &mut ContentBlock,
    ) -> BlockResult<()> {
        if !ct.has_category {
            return Ok(());
        }
        if let Some(last) = self.store.latest(&ct.key).await? {
            block.content.category = last.content.category;
        }
        Ok(())
    }

    /// Place a newly created block on the page it was created for.
    async fn connect_to_page(&self, block: &ContentBlock) -> BlockResult<()> {
        let Some(page_id) = block.connected_page_id else {
            return Ok(());
        };
        let Some(mut page) = self.store.find_page(page_id).await? else {
            return Ok(());
        };
        if !page.references(block.id) {
            page.block_ids.push(block.id);
            self.store.save_page(&page).await?;
            info!(block_id = %block.id, page = %page.path, "block connected to page");
        }
        Ok(())
    }

    async fn check_connected_page(&self, block: &ContentBlock) -> BlockResult<()> {
        if let Some(page_id) = block.connected_page_id {
            if self.store.find_page(page_id).await?.is_none() {
                return Err(BlockError::invalid("connected_page_id", "does not exist"));
            }
        }
        Ok(())
    }
}

/// A block that reached the store, and the follow-up step that failed after
/// it did, if any.
struct Saved {
    block: ContentBlock,
    unfinished: Option<&'static str>,
}

impl Saved {
    fn complete(block: ContentBlock) -> Self {
        Self {
            block,
            unfinished: None,
        }
    }

    fn flash(&self, ct: &ContentType, result: &str) -> Flash {
        let (display, name) = (&ct.display_name, self.block.name());
        match self.unfinished {
            None => Flash::Notice(format!("{display} '{name}' was {result}")),
            Some(step) => Flash::Error(format!(
                "{display} '{name}' was {result} but could not be {step}"
            )),
        }
    }
}

/// Status message for a command's result.
fn command_flash(ct: &ContentType, block: &ContentBlock, ok: bool, result: &str) -> Flash {
    if ok {
        Flash::Notice(format!("{} '{}' was {result}", ct.display_name, block.name()))
    } else {
        Flash::Error(format!(
            "{} '{}' could not be {result}",
            ct.display_name,
            block.name()
        ))
    }
}
