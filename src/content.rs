//! Language-tagged content blocks attached to pages.
//!
//! A page carries at most one block per (language, kind) pair; the pair is a
//! hard uniqueness constraint in the schema and writes go through an upsert.
//! Retrieval is fallback-aware: when the requested language has no block,
//! the caller may accept the same kind in any other language.

use rusqlite::{params, OptionalExtension};
use serde::Serialize;
use tracing::debug;

use crate::db::Database;
use crate::error::Result;

/// What a content block holds: the page title or its body text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ContentKind {
    Title,
    Body,
}

impl ContentKind {
    pub(crate) fn as_i64(self) -> i64 {
        match self {
            ContentKind::Title => 0,
            ContentKind::Body => 1,
        }
    }
}

/// A stored content block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Content {
    pub id: i64,
    pub language_id: String,
    pub page_id: i64,
    pub kind: ContentKind,
    pub body: String,
}

impl Database {
    /// Store a content block, replacing the body of an existing block for
    /// the same (page, language, kind). Returns the stored row.
    pub fn upsert_content(
        &self,
        page_id: i64,
        language_id: &str,
        kind: ContentKind,
        body: &str,
    ) -> Result<Content> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO contents (language_id, page_id, kind, body)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(page_id, language_id, kind) DO UPDATE SET body = excluded.body",
            params![language_id, page_id, kind.as_i64(), body],
        )?;
        debug!(page = page_id, language = language_id, "content stored");

        let id: i64 = conn.query_row(
            "SELECT id FROM contents WHERE page_id = ?1 AND language_id = ?2 AND kind = ?3",
            params![page_id, language_id, kind.as_i64()],
            |row| row.get(0),
        )?;

        Ok(Content {
            id,
            language_id: language_id.to_string(),
            page_id,
            kind,
            body: body.to_string(),
        })
    }

    /// Fetch a content block's body.
    ///
    /// Returns the exact (page, language, kind) match when present. With
    /// `fallback` set, a miss returns the same kind in any other language
    /// instead, lowest content id first. Absence is `None`, never an error.
    pub fn content(
        &self,
        page_id: i64,
        language_id: &str,
        kind: ContentKind,
        fallback: bool,
    ) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();

        let exact: Option<String> = conn
            .query_row(
                "SELECT body FROM contents
                 WHERE page_id = ?1 AND language_id = ?2 AND kind = ?3",
                params![page_id, language_id, kind.as_i64()],
                |row| row.get(0),
            )
            .optional()?;

        if exact.is_some() || !fallback {
            return Ok(exact);
        }

        let other: Option<String> = conn
            .query_row(
                "SELECT body FROM contents
                 WHERE page_id = ?1 AND kind = ?2
                 ORDER BY id LIMIT 1",
                params![page_id, kind.as_i64()],
                |row| row.get(0),
            )
            .optional()?;

        Ok(other)
    }

    /// The page's title in the given language, falling back to any language.
    pub fn page_title(&self, page_id: i64, language_id: &str) -> Result<Option<String>> {
        self.content(page_id, language_id, ContentKind::Title, true)
    }

    /// The page's body in the given language, falling back to any language.
    pub fn page_body(&self, page_id: i64, language_id: &str) -> Result<Option<String>> {
        self.content(page_id, language_id, ContentKind::Body, true)
    }
}
