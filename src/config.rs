use anyhow::Result;

#[derive(Debug, Clone)]
pub struct Config {
    // Storage
    pub database_path: String,

    // Locale negotiated by the (external) request layer
    pub default_locale: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "pages.db".to_string()),

            default_locale: std::env::var("DEFAULT_LOCALE").unwrap_or_else(|_| "en".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        // Only checks defaults when the variables are unset in the test env
        if std::env::var("DATABASE_PATH").is_err() && std::env::var("DEFAULT_LOCALE").is_err() {
            let config = Config::from_env().expect("Should load config");
            assert_eq!(config.database_path, "pages.db");
            assert_eq!(config.default_locale, "en");
        }
    }
}
