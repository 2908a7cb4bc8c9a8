//! HTTP route handlers.

pub mod blocks;
mod helpers;
pub mod health;
pub mod metrics;
pub mod pages;

pub use helpers::SESSION_FLASH;
