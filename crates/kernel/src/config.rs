//! Configuration loaded from environment variables and the site file.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::content::store::DEFAULT_PER_PAGE;
use crate::models::{ContentType, Page, Section, User};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// PostgreSQL connection URL. When None, blocks are kept in memory.
    pub database_url: Option<String>,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// Path to the site bootstrap file (default: ./site.toml).
    pub site_config: PathBuf,

    /// CORS allowed origins (comma-separated, default: "*").
    pub cors_allowed_origins: Vec<String>,

    /// Default number of blocks per listing page (default: 15).
    pub list_page_size: u32,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let database_url = env::var("DATABASE_URL").ok().filter(|v| !v.trim().is_empty());

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let site_config = env::var("SITE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./site.toml"));

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_else(|_| vec!["*".to_string()]);

        let list_page_size: u32 = env::var("LIST_PAGE_SIZE")
            .unwrap_or_else(|_| DEFAULT_PER_PAGE.to_string())
            .parse()
            .context("LIST_PAGE_SIZE must be a valid u32")?;
        if list_page_size == 0 {
            bail!("LIST_PAGE_SIZE must be at least 1");
        }

        Ok(Self {
            port,
            database_url,
            database_max_connections,
            site_config,
            cors_allowed_origins,
            list_page_size,
        })
    }

    /// Configuration for tests and embedding: in-memory store, defaults.
    pub fn in_memory() -> Self {
        Self {
            port: 0,
            database_url: None,
            database_max_connections: 10,
            site_config: PathBuf::from("./site.toml"),
            cors_allowed_origins: vec!["*".to_string()],
            list_page_size: DEFAULT_PER_PAGE,
        }
    }
}

/// Site bootstrap: content types, users, sections and pages.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    #[serde(default, rename = "content_type")]
    pub content_types: Vec<ContentType>,

    #[serde(default, rename = "user")]
    pub users: Vec<UserEntry>,

    #[serde(default, rename = "section")]
    pub sections: Vec<SectionEntry>,

    #[serde(default, rename = "page")]
    pub pages: Vec<PageEntry>,
}

/// A `[[user]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct UserEntry {
    /// Fixed id; generated when omitted.
    pub id: Option<Uuid>,
    pub name: String,

    #[serde(default)]
    pub is_admin: bool,

    #[serde(default)]
    pub permissions: Vec<String>,

    /// Paths of sections the user is granted.
    #[serde(default)]
    pub sections: Vec<String>,

    /// Hex SHA-256 of the user's API token.
    pub token_sha256: Option<String>,
}

/// A `[[section]]` entry. Parents must be listed before their children.
#[derive(Debug, Clone, Deserialize)]
pub struct SectionEntry {
    pub name: String,
    pub path: String,

    /// Path of the parent section.
    pub parent: Option<String>,
}

/// A `[[page]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct PageEntry {
    pub name: String,
    pub path: String,

    /// Path of the section the page lives in.
    pub section: Option<String>,
}

/// Site data resolved into models.
#[derive(Debug, Clone, Default)]
pub struct Site {
    pub content_types: Vec<ContentType>,
    pub users: Vec<User>,
    pub sections: Vec<Section>,
    pub pages: Vec<Page>,
}

impl SiteConfig {
    /// Read the site file, or built-in defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "site config not found, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let site = Self::parse(&raw).with_context(|| format!("invalid {}", path.display()))?;
        info!(path = %path.display(), "site config loaded");
        Ok(site)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("failed to parse site config")
    }

    /// Resolve section and page references by path.
    ///
    /// Content types fall back to the built-in set when none are configured.
    pub fn resolve(self) -> Result<Site> {
        let mut sections: Vec<Section> = Vec::with_capacity(self.sections.len());
        for entry in self.sections {
            let section = match &entry.parent {
                None => Section::root(&entry.name, &entry.path),
                Some(parent) => {
                    let parent = sections
                        .iter()
                        .find(|s| &s.path == parent)
                        .with_context(|| {
                            format!("section {}: unknown parent {parent}", entry.path)
                        })?;
                    Section::child_of(parent, &entry.name, &entry.path)
                }
            };
            sections.push(section);
        }

        let section_id = |path: &str| -> Result<Uuid> {
            sections
                .iter()
                .find(|s| s.path == path)
                .map(|s| s.id)
                .with_context(|| format!("unknown section {path}"))
        };

        let pages = self
            .pages
            .into_iter()
            .map(|entry| {
                let section = entry.section.as_deref().map(section_id).transpose()?;
                Ok(Page::new(&entry.name, &entry.path, section))
            })
            .collect::<Result<Vec<_>>>()?;

        let users = self
            .users
            .into_iter()
            .map(|entry| {
                Ok(User {
                    id: entry.id.unwrap_or_else(Uuid::now_v7),
                    name: entry.name,
                    is_admin: entry.is_admin,
                    permissions: entry.permissions,
                    section_ids: entry
                        .sections
                        .iter()
                        .map(|p| section_id(p))
                        .collect::<Result<Vec<_>>>()?,
                    token_sha256: entry.token_sha256,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let content_types = if self.content_types.is_empty() {
            ContentType::defaults()
        } else {
            self.content_types
        };

        Ok(Site {
            content_types,
            users,
            sections,
            pages,
        })
    }
}
