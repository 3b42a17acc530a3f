//! Data layer for a hierarchical, multilingual website.
//!
//! Pages form a forest: each page has at most one parent and a unique slug.
//! Each page carries language-tagged content blocks (a title and a body per
//! language). The store resolves, for a requested page and language, the
//! right language variant (with fallback), the effective display template
//! (inherited from the nearest ancestor that defines one) and the canonical
//! nested URL derived from the tree position.
//!
//! # Example
//!
//! ```
//! use page_store::{ContentKind, Database, LanguageRequest, NewPage};
//!
//! # fn main() -> page_store::Result<()> {
//! let db = Database::in_memory()?;
//! db.add_language("en", "english")?;
//!
//! let root = db.create_page(NewPage::new("docs", 1))?;
//! let page = db.create_page(NewPage::new("intro", 1).parent(root.id))?;
//! db.upsert_content(page.id, "en", ContentKind::Body, "Welcome")?;
//!
//! let lang = db.resolve_language(&LanguageRequest::default(), Some(&page))?;
//! assert_eq!(lang.id, "en");
//! assert_eq!(db.absolute_url(&page)?, "/pages/docs/intro/");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod language;
pub mod page;
pub mod slug;

pub use config::Config;
pub use content::{Content, ContentKind};
pub use db::Database;
pub use error::{Result, StoreError};
pub use language::{Language, LanguageRequest};
pub use page::{NewPage, Page, PageStatus};
