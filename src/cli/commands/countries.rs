//! One-shot fetch commands.

use console::style;

use crate::config::Settings;
use crate::server::AppState;

/// Fetch and print the normalized country list.
pub async fn cmd_countries(settings: &Settings) -> anyhow::Result<()> {
    let state = AppState::from_settings(settings)?;
    let countries = state.source.refresh_directory().await?;

    println!("{}", serde_json::to_string_pretty(&countries)?);
    eprintln!(
        "{} {} countries",
        style("✓").green(),
        countries.len()
    );
    Ok(())
}

/// Build the directory, then fetch and print one country.
pub async fn cmd_country(settings: &Settings, identifier: &str) -> anyhow::Result<()> {
    let state = AppState::from_settings(settings)?;
    state.source.refresh_directory().await?;

    match state.source.country(identifier).await {
        Ok(country) => {
            println!("{}", serde_json::to_string_pretty(&country)?);
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", style("✗").red(), e);
            Err(e.into())
        }
    }
}
