// CLI Command Implementations
// Offline commands that do not start the server

use super::{error, info, success, warning, Commands};
use basket_server::catalog::seed::CatalogSeed;
use basket_server::config::BasketServerConfig;
use colored::*;
use std::path::Path;

/// Execute a non-serving CLI command
pub async fn execute(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Validate { file } => validate_command(file),
        Commands::Catalog { file } => catalog_command(file),
        Commands::Serve { .. } => {
            anyhow::bail!("serve is handled by the daemon entry point")
        }
    }
}

/// Validate a configuration file
fn validate_command(file: String) -> anyhow::Result<()> {
    info(&format!("Validating {}", file.bright_white()));

    // `load` falls back to defaults for a missing file, which would pass here
    if !Path::new(&file).exists() {
        error(&format!("Configuration file not found: {}", file));
        anyhow::bail!("configuration file {} does not exist", file);
    }

    let config = match BasketServerConfig::load(&file) {
        Ok(config) => config,
        Err(e) => {
            error(&format!("{:#}", e));
            return Err(e);
        }
    };

    success("Configuration is valid");
    println!("  {} {}:{}", "Listen:".bright_white(), config.server.bind_addr, config.server.port);
    println!("  {} {}", "Cookie:".bright_white(), config.session.cookie_name);
    println!("  {} {:?}", "Totals:".bright_white(), config.basket.total_source);
    println!("  {} {:?}", "Unresolved:".bright_white(), config.basket.unresolved_policy());

    match &config.catalog.seed_file {
        Some(seed) => {
            let seed = CatalogSeed::load(seed)?;
            success(&format!("Catalog seed holds {} products", seed.products.len()));
        }
        None => warning("No catalog seed configured, the catalog will start empty"),
    }

    Ok(())
}

/// Print every product of a seed file with its aggregated stock
fn catalog_command(file: String) -> anyhow::Result<()> {
    let catalog = CatalogSeed::load(&file)?.into_catalog();

    println!();
    println!(
        "  {:<8} {:<32} {:>10} {:>8}",
        "ID".bright_white(),
        "NAME".bright_white(),
        "PRICE".bright_white(),
        "STOCK".bright_white()
    );
    for record in catalog.records() {
        let stock = if record.stock_amount == 0 {
            record.stock_amount.to_string().red()
        } else {
            record.stock_amount.to_string().green()
        };
        println!(
            "  {:<8} {:<32} {:>10} {:>8}",
            record.id.as_str(),
            record.name,
            record.price.to_string(),
            stock
        );
    }
    println!();

    Ok(())
}
