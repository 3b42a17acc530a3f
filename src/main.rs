use anyhow::Result;
use tracing::info;

use page_store::{Config, Database, LanguageRequest};

/// Prints the published site tree: one line per page with its public URL,
/// resolved title and effective template. Handy for inspecting a store
/// without the web layer.
fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("page_store=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;
    info!("Opening page store at {}", config.database_path);

    let db = Database::new(&config.database_path)?;
    let request = LanguageRequest {
        locale: Some(&config.default_locale),
        ..Default::default()
    };

    let published = db.published()?;
    info!("{} published page(s)", published.len());

    for page in &published {
        let language = db.resolve_language(&request, Some(page))?;
        let title = db
            .page_title(page.id, &language.id)?
            .unwrap_or_else(|| page.slug.clone());
        let template = db.template(page)?.unwrap_or_else(|| "-".to_string());

        println!(
            "{}  [{}]  {}  ({})",
            db.absolute_url(page)?,
            language.label(),
            title,
            template
        );
    }

    Ok(())
}
