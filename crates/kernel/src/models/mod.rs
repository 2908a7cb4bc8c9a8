//! Content models.

pub mod block;
pub mod content_type;
pub mod section;
pub mod user;

pub use block::{
    BlockContent, BlockForm, BlockVersion, BlockView, ContentBlock, Revision, UpdateBlock,
    slugify,
};
pub use content_type::{ContentType, SortField, SortOrder};
pub use section::{Page, Section, path_id};
pub use user::{User, permission};
