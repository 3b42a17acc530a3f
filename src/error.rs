use thiserror::Error;

/// Errors produced by the page store.
///
/// Content lookups never produce `NotFound` — a missing content block is
/// `None`, not an error. Explicit language and page lookups do.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("language '{0}' not found")]
    LanguageNotFound(String),

    #[error("no languages registered")]
    NoLanguages,

    #[error("page {0} not found")]
    PageNotFound(i64),

    #[error("page {0} cannot be its own ancestor")]
    ParentCycle(i64),

    #[error("page {page} still has {children} child page(s)")]
    HasChildren { page: i64, children: usize },

    #[error(transparent)]
    Db(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
