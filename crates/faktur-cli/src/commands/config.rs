//! Config command - manage configuration.

use std::fs;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use faktur_core::invoice::registry::FIELDS;
use faktur_core::{ExtractorRegistry, FakturConfig};

use super::{default_config_path, load_config};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Initialize a new configuration file
    Init(InitArgs),

    /// Get a configuration value
    Get {
        /// Dotted key (e.g., "filing.vat_rate")
        key: String,
    },

    /// Set a configuration value in the configuration file (--config, or the
    /// user configuration file)
    Set {
        /// Dotted key
        key: String,
        /// New value (JSON, or a plain string)
        value: String,
    },

    /// Show the extraction rules that run for each field
    Rules,

    /// Show configuration file path
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Output path for configuration file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(config_path),
        ConfigCommand::Init(init_args) => init_config(init_args),
        ConfigCommand::Get { key } => get_config(config_path, &key),
        ConfigCommand::Set { key, value } => set_config(config_path, &key, &value),
        ConfigCommand::Rules => show_rules(config_path),
        ConfigCommand::Path => show_path(),
    }
}

fn show_config(config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn init_config(args: InitArgs) -> anyhow::Result<()> {
    let output_path = args.output.unwrap_or_else(default_config_path);

    if output_path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            output_path.display()
        );
    }

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    FakturConfig::default().save(&output_path)?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        output_path.display()
    );

    Ok(())
}

fn get_config(config_path: Option<&str>, key: &str) -> anyhow::Result<()> {
    let json = serde_json::to_value(load_config(config_path)?)?;
    let value = lookup(&json, key)
        .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;

    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn set_config(config_path: Option<&str>, key: &str, value: &str) -> anyhow::Result<()> {
    let config_path = config_path.map_or_else(default_config_path, PathBuf::from);

    let config = if config_path.exists() {
        FakturConfig::from_file(&config_path)?
    } else {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        FakturConfig::default()
    };

    let parsed_value: Value =
        serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));

    let mut json = serde_json::to_value(&config)?;
    assign(&mut json, key, parsed_value.clone())?;

    // Round-trip through the typed config so bad values are rejected.
    let config: FakturConfig = serde_json::from_value(json)
        .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e))?;
    config.save(&config_path)?;

    println!(
        "{} Set {} = {}",
        style("✓").green(),
        key,
        serde_json::to_string(&parsed_value)?
    );

    Ok(())
}

fn show_rules(config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let registry = ExtractorRegistry::from_config(&config.extraction);

    let chains = [
        registry.transaction_date.rule_names(),
        registry.document_code.rule_names(),
        registry.reference.rule_names(),
        registry.buyer.rule_names(),
        registry.seller.rule_names(),
        registry.line_items.rule_names(),
        registry.totals.rule_names(),
    ];

    for (field, rules) in FIELDS.iter().zip(chains.iter()) {
        println!("{:<18} {}", style(field).cyan(), rules.join(" -> "));
    }

    Ok(())
}

fn show_path() -> anyhow::Result<()> {
    let config_path = default_config_path();

    println!("Configuration file: {}", config_path.display());

    if config_path.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!();
        println!("Run 'faktur config init' to create a configuration file.");
    }

    Ok(())
}

/// Follow a dotted key through nested objects.
fn lookup<'a>(json: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(json, |current, part| current.get(part))
}

/// Set a dotted key; every parent must already exist as an object.
fn assign(json: &mut Value, key: &str, value: Value) -> anyhow::Result<()> {
    let (parents, last) = match key.rsplit_once('.') {
        Some((parents, last)) => (Some(parents), last),
        None => (None, key),
    };

    let mut current = json;
    if let Some(parents) = parents {
        for part in parents.split('.') {
            current = current
                .get_mut(part)
                .ok_or_else(|| anyhow::anyhow!("Configuration path not found: {}", key))?;
        }
    }

    match current.as_object_mut() {
        Some(obj) => {
            obj.insert(last.to_string(), value);
            Ok(())
        }
        None => anyhow::bail!("Cannot set value at non-object path: {}", key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_nested_key() {
        let json = serde_json::to_value(FakturConfig::default()).unwrap();
        assert_eq!(lookup(&json, "filing.id_tku_length"), Some(&json!(22)));
        assert_eq!(lookup(&json, "filing.missing"), None);
    }

    #[test]
    fn test_assign_nested_key() {
        let mut json = serde_json::to_value(FakturConfig::default()).unwrap();
        assign(&mut json, "filing.seller_tin", json!("0012345678901000")).unwrap();

        let config: FakturConfig = serde_json::from_value(json).unwrap();
        assert_eq!(config.filing.seller_tin.as_deref(), Some("0012345678901000"));
    }

    #[test]
    fn test_assign_rejects_unknown_parent() {
        let mut json = serde_json::to_value(FakturConfig::default()).unwrap();
        assert!(assign(&mut json, "nope.value", json!(1)).is_err());
        assert!(assign(&mut json, "filing.id_tku_length.deep", json!(1)).is_err());
    }
}
