//! Language reference data and request-driven resolution.
//!
//! Languages are admin-managed reference rows keyed by a short code
//! ("en", "fr"). Resolution picks the language for a request from explicit
//! selections first, then the negotiated locale, then whatever the current
//! page or the registry can offer.

use rusqlite::{params, OptionalExtension};
use serde::Serialize;
use tracing::debug;

use crate::db::Database;
use crate::error::{Result, StoreError};
use crate::page::Page;

/// A language reference row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Language {
    /// Short language code, the primary key (e.g. "en").
    pub id: String,
    pub name: String,
}

impl Language {
    /// Human-readable label: the name with its first letter uppercased.
    pub fn label(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => String::new(),
        }
    }
}

/// Language selection values carried by a request.
///
/// Every field is an explicit parameter; there is no ambient "current
/// request" state. `query` and `form` are user selections and must name an
/// existing language; `locale` is the negotiated locale code and is only a
/// hint.
#[derive(Debug, Clone, Copy, Default)]
pub struct LanguageRequest<'a> {
    pub query: Option<&'a str>,
    pub form: Option<&'a str>,
    pub locale: Option<&'a str>,
}

impl Database {
    /// Insert a language, replacing the name if the code already exists.
    pub fn add_language(&self, id: &str, name: &str) -> Result<Language> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO languages (id, name) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name",
            params![id, name],
        )?;
        debug!(language = id, "language added");

        Ok(Language {
            id: id.to_string(),
            name: name.to_string(),
        })
    }

    /// Look up a language by code.
    pub fn language(&self, id: &str) -> Result<Language> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, name FROM languages WHERE id = ?1",
            params![id],
            |row| {
                Ok(Language {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
        .optional()?
        .ok_or_else(|| StoreError::LanguageNotFound(id.to_string()))
    }

    /// Delete a language reference row.
    pub fn remove_language(&self, id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM languages WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// All languages, ordered by code.
    pub fn languages(&self) -> Result<Vec<Language>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT id, name FROM languages ORDER BY id")?;

        let languages = stmt
            .query_map([], |row| {
                Ok(Language {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(languages)
    }

    /// The most recently added language, by code ordering of the primary key.
    pub fn latest_language(&self) -> Result<Language> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, name FROM languages ORDER BY id DESC LIMIT 1",
            [],
            |row| {
                Ok(Language {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
        .optional()?
        .ok_or(StoreError::NoLanguages)
    }

    /// Resolve the language for a request.
    ///
    /// Precedence: explicit query selection, explicit form selection,
    /// negotiated locale (only if such a language exists), the first
    /// language the current page has body content for, then the latest
    /// registered language. Explicit selections naming an unknown code fail
    /// with `LanguageNotFound`; an empty registry at the final step fails
    /// with `NoLanguages`.
    pub fn resolve_language(
        &self,
        request: &LanguageRequest<'_>,
        current_page: Option<&Page>,
    ) -> Result<Language> {
        if let Some(code) = request.query {
            return self.language(code);
        }
        if let Some(code) = request.form {
            return self.language(code);
        }

        if let Some(code) = request.locale {
            match self.language(code) {
                Ok(lang) => return Ok(lang),
                Err(StoreError::LanguageNotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }

        if let Some(page) = current_page {
            let available = self.languages_available(page.id)?;
            if let Some(code) = available.first() {
                return self.language(code);
            }
        }

        self.latest_language()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::NewPage;

    fn create_test_db() -> Database {
        Database::in_memory().expect("Failed to create database")
    }

    // ==================== CRUD Tests ====================

    #[test]
    fn test_add_and_get_language() {
        let db = create_test_db();

        db.add_language("en", "english").expect("add");

        let lang = db.language("en").expect("get");
        assert_eq!(lang.id, "en");
        assert_eq!(lang.name, "english");
    }

    #[test]
    fn test_get_unknown_language_fails() {
        let db = create_test_db();

        let result = db.language("xx");
        assert!(matches!(result, Err(StoreError::LanguageNotFound(code)) if code == "xx"));
    }

    #[test]
    fn test_add_language_replaces_name() {
        let db = create_test_db();

        db.add_language("en", "english").expect("add");
        db.add_language("en", "english (updated)").expect("re-add");

        let languages = db.languages().expect("list");
        assert_eq!(languages.len(), 1);
        assert_eq!(languages[0].name, "english (updated)");
    }

    #[test]
    fn test_remove_language() {
        let db = create_test_db();

        db.add_language("en", "english").expect("add");
        db.remove_language("en").expect("remove");

        assert!(db.language("en").is_err());
    }

    #[test]
    fn test_languages_ordered_by_code() {
        let db = create_test_db();

        db.add_language("fr", "french").expect("add");
        db.add_language("de", "german").expect("add");
        db.add_language("en", "english").expect("add");

        let codes: Vec<String> = db
            .languages()
            .expect("list")
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(codes, vec!["de", "en", "fr"]);
    }

    #[test]
    fn test_latest_language() {
        let db = create_test_db();

        db.add_language("de", "german").expect("add");
        db.add_language("fr", "french").expect("add");
        db.add_language("en", "english").expect("add");

        // Greatest code wins, insertion order does not matter
        let latest = db.latest_language().expect("latest");
        assert_eq!(latest.id, "fr");
    }

    #[test]
    fn test_latest_language_empty_registry() {
        let db = create_test_db();

        let result = db.latest_language();
        assert!(matches!(result, Err(StoreError::NoLanguages)));
    }

    // ==================== Label Tests ====================

    #[test]
    fn test_label_capitalizes_first_letter() {
        let lang = Language {
            id: "en".to_string(),
            name: "english".to_string(),
        };
        assert_eq!(lang.label(), "English");
    }

    #[test]
    fn test_label_empty_name() {
        let lang = Language {
            id: "xx".to_string(),
            name: String::new(),
        };
        assert_eq!(lang.label(), "");
    }

    #[test]
    fn test_label_leaves_rest_untouched() {
        let lang = Language {
            id: "pt-br".to_string(),
            name: "brazilian Portuguese".to_string(),
        };
        assert_eq!(lang.label(), "Brazilian Portuguese");
    }

    // ==================== Resolution Tests ====================

    #[test]
    fn test_resolve_query_wins_over_form() {
        let db = create_test_db();
        db.add_language("de", "german").expect("add");
        db.add_language("fr", "french").expect("add");

        let request = LanguageRequest {
            query: Some("de"),
            form: Some("fr"),
            locale: None,
        };

        let lang = db.resolve_language(&request, None).expect("resolve");
        assert_eq!(lang.id, "de");
    }

    #[test]
    fn test_resolve_form_wins_over_locale() {
        let db = create_test_db();
        db.add_language("fr", "french").expect("add");
        db.add_language("en", "english").expect("add");

        let request = LanguageRequest {
            query: None,
            form: Some("fr"),
            locale: Some("en"),
        };

        let lang = db.resolve_language(&request, None).expect("resolve");
        assert_eq!(lang.id, "fr");
    }

    #[test]
    fn test_resolve_explicit_unknown_code_fails() {
        let db = create_test_db();
        db.add_language("en", "english").expect("add");

        // Explicit selections are not fallback-protected
        let request = LanguageRequest {
            query: Some("xx"),
            ..Default::default()
        };
        assert!(db.resolve_language(&request, None).is_err());

        let request = LanguageRequest {
            form: Some("xx"),
            ..Default::default()
        };
        assert!(db.resolve_language(&request, None).is_err());
    }

    #[test]
    fn test_resolve_locale_match() {
        let db = create_test_db();
        db.add_language("en", "english").expect("add");
        db.add_language("fr", "french").expect("add");

        let request = LanguageRequest {
            locale: Some("en"),
            ..Default::default()
        };

        let lang = db.resolve_language(&request, None).expect("resolve");
        assert_eq!(lang.id, "en");
    }

    #[test]
    fn test_resolve_unknown_locale_falls_through() {
        let db = create_test_db();
        db.add_language("en", "english").expect("add");

        let request = LanguageRequest {
            locale: Some("xx"),
            ..Default::default()
        };

        // Unknown locale is only a hint: falls through to the registry
        let lang = db.resolve_language(&request, None).expect("resolve");
        assert_eq!(lang.id, "en");
    }

    #[test]
    fn test_resolve_uses_page_languages() {
        let db = create_test_db();
        db.add_language("de", "german").expect("add");
        db.add_language("fr", "french").expect("add");
        db.add_language("zz", "zulu-ish").expect("add");

        let page = db
            .create_page(NewPage::new("about", 1))
            .expect("create page");
        db.upsert_content(page.id, "fr", crate::content::ContentKind::Body, "bonjour")
            .expect("upsert");

        let request = LanguageRequest {
            locale: Some("xx"),
            ..Default::default()
        };

        // Page has French body content, so French beats the latest language
        let lang = db.resolve_language(&request, Some(&page)).expect("resolve");
        assert_eq!(lang.id, "fr");
    }

    #[test]
    fn test_resolve_falls_back_to_latest() {
        let db = create_test_db();
        db.add_language("de", "german").expect("add");
        db.add_language("fr", "french").expect("add");

        let page = db
            .create_page(NewPage::new("about", 1))
            .expect("create page");

        // No content on the page, no locale: latest language wins
        let lang = db
            .resolve_language(&LanguageRequest::default(), Some(&page))
            .expect("resolve");
        assert_eq!(lang.id, "fr");
    }

    #[test]
    fn test_resolve_empty_registry_fails() {
        let db = create_test_db();

        let result = db.resolve_language(&LanguageRequest::default(), None);
        assert!(matches!(result, Err(StoreError::NoLanguages)));
    }
}
