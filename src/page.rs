//! The hierarchical page tree.
//!
//! Pages form a forest: each page has at most one parent, stored as an
//! optional identifier rather than a direct reference, and every walk is a
//! repeated lookup. Acyclicity is checked on save, so the walks in `url` and
//! `template` always terminate.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use tracing::{debug, info};

use crate::db::Database;
use crate::error::{Result, StoreError};
use crate::slug::slugify;

/// Draft/published lifecycle state. Draft is the initial state and the only
/// modeled transition is Draft to Published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PageStatus {
    Draft,
    Published,
}

impl PageStatus {
    fn as_i64(self) -> i64 {
        match self {
            PageStatus::Draft => 0,
            PageStatus::Published => 1,
        }
    }

    fn from_i64(value: i64) -> Self {
        if value == 1 {
            PageStatus::Published
        } else {
            PageStatus::Draft
        }
    }
}

/// A node in the site's page tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub id: i64,
    /// URL segment, unique across the whole tree and shared by every
    /// language variant of the page.
    pub slug: String,
    pub author_id: i64,
    pub parent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    /// Stamped the first time the page is published, never moved afterwards.
    pub published_at: Option<DateTime<Utc>>,
    pub status: PageStatus,
    pub template: Option<String>,
}

/// Fields supplied when creating a page; the store fills in the rest.
#[derive(Debug, Clone)]
pub struct NewPage {
    pub slug: String,
    pub author_id: i64,
    pub parent_id: Option<i64>,
    pub status: PageStatus,
    pub template: Option<String>,
}

impl NewPage {
    pub fn new(slug: &str, author_id: i64) -> Self {
        Self {
            slug: slug.to_string(),
            author_id,
            parent_id: None,
            status: PageStatus::Draft,
            template: None,
        }
    }

    pub fn parent(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn template(mut self, template: &str) -> Self {
        self.template = Some(template.to_string());
        self
    }

    pub fn status(mut self, status: PageStatus) -> Self {
        self.status = status;
        self
    }
}

fn parse_timestamp(column: usize, value: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                column,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

fn page_from_row(row: &Row<'_>) -> rusqlite::Result<Page> {
    let created_at = parse_timestamp(4, row.get::<_, String>(4)?)?;
    let published_at = match row.get::<_, Option<String>>(5)? {
        Some(value) => Some(parse_timestamp(5, value)?),
        None => None,
    };

    Ok(Page {
        id: row.get(0)?,
        slug: row.get(1)?,
        author_id: row.get(2)?,
        parent_id: row.get(3)?,
        created_at,
        published_at,
        status: PageStatus::from_i64(row.get(6)?),
        template: row.get(7)?,
    })
}

const PAGE_COLUMNS: &str =
    "id, slug, author_id, parent_id, created_at, published_at, status, template";

/// Walk upward from `start` looking for `page_id` in the ancestor chain.
fn chain_contains(conn: &Connection, page_id: i64, start: i64) -> rusqlite::Result<bool> {
    let mut current = Some(start);
    while let Some(id) = current {
        if id == page_id {
            return Ok(true);
        }
        current = conn
            .query_row(
                "SELECT parent_id FROM pages WHERE id = ?1",
                params![id],
                |row| row.get::<_, Option<i64>>(0),
            )
            .optional()?
            .flatten();
    }
    Ok(false)
}

impl Database {
    /// Create a page. The slug is normalized, `created_at` is stamped now,
    /// and a page created directly as Published gets its publication
    /// timestamp immediately.
    pub fn create_page(&self, new: NewPage) -> Result<Page> {
        let conn = self.conn.lock().unwrap();

        if let Some(parent_id) = new.parent_id {
            // Parent must exist; a fresh page cannot form a cycle
            let exists: Option<i64> = conn
                .query_row(
                    "SELECT id FROM pages WHERE id = ?1",
                    params![parent_id],
                    |row| row.get(0),
                )
                .optional()?;
            if exists.is_none() {
                return Err(StoreError::PageNotFound(parent_id));
            }
        }

        let slug = slugify(&new.slug);
        let now = Utc::now();
        let published_at = match new.status {
            PageStatus::Published => Some(now),
            PageStatus::Draft => None,
        };

        conn.execute(
            "INSERT INTO pages (slug, author_id, parent_id, created_at, published_at, status, template)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                slug,
                new.author_id,
                new.parent_id,
                now.to_rfc3339(),
                published_at.map(|dt| dt.to_rfc3339()),
                new.status.as_i64(),
                new.template,
            ],
        )?;
        let id = conn.last_insert_rowid();
        info!(page = id, slug = %slug, "page created");

        Ok(Page {
            id,
            slug,
            author_id: new.author_id,
            parent_id: new.parent_id,
            created_at: now,
            published_at,
            status: new.status,
            template: new.template,
        })
    }

    /// Look up a page by id.
    pub fn page(&self, id: i64) -> Result<Page> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            &format!("SELECT {PAGE_COLUMNS} FROM pages WHERE id = ?1"),
            params![id],
            page_from_row,
        )
        .optional()?
        .ok_or(StoreError::PageNotFound(id))
    }

    /// Persist edits to a page.
    ///
    /// Normalizes the slug, refuses a parent assignment that would make the
    /// page its own ancestor, and stamps `published_at` exactly once on the
    /// first save with Published status. `created_at` is never touched.
    /// Returns the page as stored.
    pub fn save_page(&self, page: &Page) -> Result<Page> {
        let conn = self.conn.lock().unwrap();

        if let Some(parent_id) = page.parent_id {
            if chain_contains(&conn, page.id, parent_id)? {
                return Err(StoreError::ParentCycle(page.id));
            }
        }

        let slug = slugify(&page.slug);
        let published_at = match (page.status, page.published_at) {
            (PageStatus::Published, None) => Some(Utc::now()),
            (_, existing) => existing,
        };

        let updated = conn.execute(
            "UPDATE pages
             SET slug = ?1, author_id = ?2, parent_id = ?3, published_at = ?4,
                 status = ?5, template = ?6
             WHERE id = ?7",
            params![
                slug,
                page.author_id,
                page.parent_id,
                published_at.map(|dt| dt.to_rfc3339()),
                page.status.as_i64(),
                page.template,
                page.id,
            ],
        )?;
        if updated == 0 {
            return Err(StoreError::PageNotFound(page.id));
        }
        debug!(page = page.id, slug = %slug, "page saved");

        Ok(Page {
            slug,
            published_at,
            ..page.clone()
        })
    }

    /// Delete a page and its content blocks.
    ///
    /// Refused while child pages exist: callers must delete or reparent the
    /// children first.
    pub fn delete_page(&self, id: i64) -> Result<()> {
        let conn = self.conn.lock().unwrap();

        let children: i64 = conn.query_row(
            "SELECT COUNT(*) FROM pages WHERE parent_id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        if children > 0 {
            return Err(StoreError::HasChildren {
                page: id,
                children: children as usize,
            });
        }

        conn.execute("DELETE FROM contents WHERE page_id = ?1", params![id])?;
        let deleted = conn.execute("DELETE FROM pages WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(StoreError::PageNotFound(id));
        }
        info!(page = id, "page deleted");

        Ok(())
    }

    /// Nested URL path for a page: each ancestor's slug root-to-leaf, every
    /// segment followed by `/` (e.g. `grandparent/parent/child/`).
    pub fn url(&self, page: &Page) -> Result<String> {
        let conn = self.conn.lock().unwrap();

        let mut url = format!("{}/", page.slug);
        let mut current = page.parent_id;
        while let Some(id) = current {
            let (slug, parent_id): (String, Option<i64>) = conn.query_row(
                "SELECT slug, parent_id FROM pages WHERE id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;
            url = format!("{}/{}", slug, url);
            current = parent_id;
        }

        Ok(url)
    }

    /// Public URL for a page, rooted under `/pages/`.
    pub fn absolute_url(&self, page: &Page) -> Result<String> {
        Ok(format!("/pages/{}", self.url(page)?))
    }

    /// Effective display template: the page's own if set, else the nearest
    /// ancestor's, else `None`.
    pub fn template(&self, page: &Page) -> Result<Option<String>> {
        if page.template.is_some() {
            return Ok(page.template.clone());
        }

        let conn = self.conn.lock().unwrap();
        let mut current = page.parent_id;
        while let Some(id) = current {
            let (template, parent_id): (Option<String>, Option<i64>) = conn.query_row(
                "SELECT template, parent_id FROM pages WHERE id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;
            if template.is_some() {
                return Ok(template);
            }
            current = parent_id;
        }

        Ok(None)
    }

    /// Languages the page has body content for, ordered by language code.
    pub fn languages_available(&self, page_id: i64) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT DISTINCT language_id FROM contents
             WHERE page_id = ?1 AND kind = 1
             ORDER BY language_id",
        )?;

        let languages = stmt
            .query_map(params![page_id], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;

        Ok(languages)
    }

    /// Admin listing label: `parent.slug :: page.slug`, or the slug alone
    /// for a root page. Not the public URL.
    pub fn display(&self, page: &Page) -> Result<String> {
        match page.parent_id {
            Some(parent_id) => {
                let conn = self.conn.lock().unwrap();
                let parent_slug: String = conn.query_row(
                    "SELECT slug FROM pages WHERE id = ?1",
                    params![parent_id],
                    |row| row.get(0),
                )?;
                Ok(format!("{} :: {}", parent_slug, page.slug))
            }
            None => Ok(page.slug.clone()),
        }
    }

    /// All published pages, ordered by id.
    pub fn published(&self) -> Result<Vec<Page>> {
        self.pages_with_status(PageStatus::Published)
    }

    /// All draft pages, ordered by id.
    pub fn drafts(&self) -> Result<Vec<Page>> {
        self.pages_with_status(PageStatus::Draft)
    }

    fn pages_with_status(&self, status: PageStatus) -> Result<Vec<Page>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {PAGE_COLUMNS} FROM pages WHERE status = ?1 ORDER BY id"
        ))?;

        let pages = stmt
            .query_map(params![status.as_i64()], page_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(pages)
    }
}
