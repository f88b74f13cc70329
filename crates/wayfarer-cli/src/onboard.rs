//! `wayfarer onboard`: initialize configuration and workspace.
//!
//! - Creates `~/.wayfarer/config.json` with defaults
//! - Creates the workspace and REPL history directories
//! - Writes a sample travel catalog and points `tools.catalogPath` at it

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use wayfarer_core::config::{load_config, save_config, Config};
use wayfarer_core::utils::{get_data_path, get_default_workspace_path, get_history_path};

const CATALOG_FILE: &str = "catalog.json";

/// Run the onboard command.
pub fn run() -> Result<()> {
    println!();
    println!("{}", "🧭 Wayfarer — Setup".cyan().bold());
    println!();

    let data_dir = get_data_path();
    let config_path = data_dir.join("config.json");

    // 1. Sample catalog
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create {}", data_dir.display()))?;
    let catalog_path = data_dir.join(CATALOG_FILE);
    create_template(&catalog_path, CATALOG_TEMPLATE)?;

    // 2. Config, pointing at the sample catalog
    if config_path.exists() {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            config_path.display()
        );
    } else {
        let config = initial_config(load_config(None), &catalog_path);
        save_config(&config, Some(&config_path))
            .with_context(|| format!("failed to write {}", config_path.display()))?;
        println!(
            "  {} created config at {}",
            "✓".green(),
            config_path.display()
        );
    }

    // 3. Workspace + history
    let workspace = get_default_workspace_path();
    std::fs::create_dir_all(&workspace)?;
    println!("  {} workspace at {}", "✓".green(), workspace.display());
    std::fs::create_dir_all(get_history_path())?;

    println!();
    println!(
        "{}",
        "  Setup complete! Add your apiKey to the config, then run `wayfarer plan -m \"...\"`."
            .green()
    );
    println!();

    Ok(())
}

/// Defaults plus the sample catalog, unless a catalog is already configured.
fn initial_config(mut config: Config, catalog_path: &Path) -> Config {
    if config.tools.catalog_path.is_none() {
        config.tools.catalog_path = Some(catalog_path.display().to_string());
    }
    config
}

/// Create a template file if it doesn't exist.
fn create_template(path: &Path, content: &str) -> Result<()> {
    let name = path.file_name().unwrap_or_default().to_string_lossy();
    if path.exists() {
        println!("  {} {} already exists", "✓".green(), name);
    } else {
        std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("  {} created {}", "✓".green(), name);
    }
    Ok(())
}

// ─────────────────────────────────────────────
// Templates
// ─────────────────────────────────────────────

const CATALOG_TEMPLATE: &str = r#"{
  "flights": [
    {
      "id": "sample-mu5131",
      "airline": "China Eastern",
      "flightNumber": "MU5131",
      "origin": "SHA",
      "destination": "HGH",
      "departureDate": "2026-12-01",
      "departureTime": "08:00",
      "arrivalTime": "09:05",
      "price": 480,
      "durationMinutes": 65,
      "stops": 0,
      "freeBaggage": true,
      "baggageInfo": "20kg checked"
    }
  ],
  "hotels": [
    {
      "id": "sample-westlake",
      "name": "West Lake Garden Hotel",
      "city": "Hangzhou",
      "address": "1 Beishan Road",
      "starRating": 4,
      "rating": 4.6,
      "reviewCount": 1280,
      "pricePerNight": 620,
      "amenities": ["wifi", "breakfast"],
      "nearestMetro": "Longxiangqiao",
      "distanceKm": 1.2
    }
  ]
}
"#;

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use wayfarer_agent::tools::travel::Catalog;

    #[test]
    fn test_create_template_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CATALOG_FILE);
        create_template(&path, "{}").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn test_create_template_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CATALOG_FILE);
        std::fs::write(&path, "original").unwrap();
        create_template(&path, "new content").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "original");
    }

    #[test]
    fn test_catalog_template_parses() {
        let catalog = Catalog::from_json(CATALOG_TEMPLATE).unwrap();
        assert_eq!(catalog.flights.len(), 1);
        assert_eq!(catalog.hotels[0].city, "Hangzhou");
    }

    #[test]
    fn test_initial_config_points_at_catalog() {
        let config = initial_config(Config::default(), Path::new("/data/catalog.json"));
        assert_eq!(config.tools.catalog_path.as_deref(), Some("/data/catalog.json"));

        let mut existing = Config::default();
        existing.tools.catalog_path = Some("/elsewhere.json".into());
        let config = initial_config(existing, Path::new("/data/catalog.json"));
        assert_eq!(config.tools.catalog_path.as_deref(), Some("/elsewhere.json"));
    }
}
