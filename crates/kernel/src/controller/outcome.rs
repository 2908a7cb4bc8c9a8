//! What a controller action asks the HTTP layer to do.

use serde::{Deserialize, Serialize};

use crate::content::Paginated;
use crate::error::FieldError;
use crate::models::{BlockVersion, BlockView, ContentBlock, ContentType, Page, Section, User};

/// Logical view to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Index,
    Show,
    New,
    Edit,
    Versions,
    Usages,
    /// A block rendered as a page inside the editing chrome.
    BlockEditor,
    /// A block rendered as a standalone public page.
    Page,
}

impl View {
    pub fn template(self) -> &'static str {
        match self {
            View::Index => "cms/blocks/index",
            View::Show => "cms/blocks/show",
            View::New => "cms/blocks/new",
            View::Edit => "cms/blocks/edit",
            View::Versions => "cms/blocks/versions",
            View::Usages => "cms/blocks/usages",
            View::BlockEditor => "cms/blocks/view_as_page",
            View::Page => "cms/blocks/view",
        }
    }

    pub fn layout(self) -> &'static str {
        match self {
            View::BlockEditor => "cms/block_editor",
            View::Page => "templates/default",
            _ => "cms/content_library",
        }
    }
}

/// Admin toolbar tab highlighted by a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolbarTab {
    ContentLibrary,
}

/// State of a create/edit form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormState {
    /// Not a form, or a form shown for the first time.
    #[default]
    Fresh,
    /// Submitted values were rejected.
    Invalid,
    /// Someone else saved the block since it was loaded.
    Conflict,
}

/// One-shot status message shown after a redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "level", content = "message", rename_all = "snake_case")]
pub enum Flash {
    Notice(String),
    Error(String),
}

impl Flash {
    pub fn message(&self) -> &str {
        match self {
            Flash::Notice(m) | Flash::Error(m) => m,
        }
    }
}

/// Data handed to a view.
#[derive(Debug, Clone, Serialize)]
pub struct ViewModel {
    pub content_type: ContentType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub toolbar_tab: Option<ToolbarTab>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<BlockView>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Paginated<ContentBlock>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub versions: Option<Vec<BlockVersion>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<Vec<Page>>,

    /// Default parent section offered by new/edit forms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<Section>,

    /// The stored block, when an update hit an edit conflict.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_version: Option<ContentBlock>,

    pub form_state: FormState,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,

    /// Name of the user the view is rendered for.
    pub current_user: String,
}

impl ViewModel {
    /// An empty model for views in the CMS content library.
    pub fn library(content_type: &ContentType, user: &User) -> Self {
        Self {
            content_type: content_type.clone(),
            toolbar_tab: Some(ToolbarTab::ContentLibrary),
            page_title: None,
            block: None,
            blocks: None,
            versions: None,
            pages: None,
            parent: None,
            other_version: None,
            form_state: FormState::Fresh,
            errors: Vec::new(),
            current_user: user.name.clone(),
        }
    }

    pub fn with_block(mut self, block: BlockView) -> Self {
        self.block = Some(block);
        self
    }
}

/// Result of a controller action.
#[derive(Debug, Clone)]
pub enum Outcome {
    Render { view: View, model: Box<ViewModel> },
    Redirect {
        location: String,
        flash: Option<Flash>,
    },
    /// The action does not apply to this content type.
    NotImplemented,
}

impl Outcome {
    pub fn render(view: View, model: ViewModel) -> Self {
        Outcome::Render {
            view,
            model: Box::new(model),
        }
    }

    pub fn redirect(location: String, flash: Flash) -> Self {
        Outcome::Redirect {
            location,
            flash: Some(flash),
        }
    }

    /// Short label used for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Render { model, .. } => match model.form_state {
                FormState::Fresh => "render",
                FormState::Invalid => "invalid",
                FormState::Conflict => "conflict",
            },
            Outcome::Redirect {
                flash: Some(Flash::Error(_)),
                ..
            } => "failed",
            Outcome::Redirect { .. } => "redirect",
            Outcome::NotImplemented => "not_implemented",
        }
    }
}
