//! Flagscope - Scope-Aware Feature Flag CLI
//!
//! The `flagscope` command manages persisted feature flags keyed by
//! `(name, scope)`, with resolution falling back to the `global` scope.
//!
//! ## Commands
//!
//! - `enable`: Turn a flag on, optionally attaching a value payload
//! - `disable`: Turn a flag off and clear its stored value
//! - `remove`: Delete a flag record entirely
//! - `list`: Show every flag recorded for a scope
//! - `get`: Resolve a flag's value with global fallback
//! - `check`: Resolve a flag's on/off state with global fallback
//! - `copy`: Duplicate one scope's flag records into another

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use flagscope_core::{DefinitionRegistry, Features, SurrealFeatureStore};
use serde_json::Value;
use std::sync::Arc;
use tracing::Level;

#[derive(Parser)]
#[command(name = "flagscope")]
#[command(author = "Flagscope Maintainers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Scope-aware feature flag management", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Turn a flag on, optionally attaching a value payload
    Enable {
        /// Flag name
        name: String,

        /// Scope to write the flag under
        #[arg(short, long, default_value = "global")]
        scope: String,

        /// Value payload, parsed as JSON (kept as a raw string when parsing fails)
        #[arg(long)]
        value: Option<String>,
    },

    /// Turn a flag off and clear any stored value
    Disable {
        /// Flag name
        name: String,

        /// Scope to write the flag under
        #[arg(short, long, default_value = "global")]
        scope: String,
    },

    /// Delete a flag record entirely
    Remove {
        /// Flag name
        name: String,

        /// Scope to delete the flag from
        #[arg(short, long, default_value = "global")]
        scope: String,
    },

    /// Show every flag recorded for a scope
    List {
        /// Scope to list
        #[arg(short, long, default_value = "global")]
        scope: String,

        /// Emit a JSON array instead of terminal text
        #[arg(long)]
        output_json: bool,
    },

    /// Resolve a flag's value, falling back to the global scope
    Get {
        /// Flag name
        name: String,

        /// Scope to resolve against
        #[arg(short, long, default_value = "global")]
        scope: String,

        /// Default when no record carries a value, parsed as JSON
        #[arg(long)]
        default: Option<String>,
    },

    /// Resolve a flag's on/off state, falling back to the global scope
    Check {
        /// Flag name
        name: String,

        /// Scope to resolve against
        #[arg(short, long, default_value = "global")]
        scope: String,
    },

    /// Copy one scope's flag records into another
    Copy {
        /// Source scope
        from: String,

        /// Destination scope
        to: String,

        /// Replace records that already exist in the destination
        #[arg(long)]
        overwrite: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    flagscope_core::init_tracing(cli.json, level);

    // Initialize database connection
    let store = SurrealFeatureStore::from_env()
        .await
        .context("Failed to connect to the flag store")?;
    let features = Features::new(Arc::new(store), Arc::new(DefinitionRegistry::new()));

    match cli.command {
        Commands::Enable { name, scope, value } => {
            cmd_enable(&features, &name, &scope, value.as_deref()).await
        }
        Commands::Disable { name, scope } => cmd_disable(&features, &name, &scope).await,
        Commands::Remove { name, scope } => cmd_remove(&features, &name, &scope).await,
        Commands::List { scope, output_json } => cmd_list(&features, &scope, output_json).await,
        Commands::Get {
            name,
            scope,
            default,
        } => cmd_get(&features, &name, &scope, default.as_deref()).await,
        Commands::Check { name, scope } => cmd_check(&features, &name, &scope).await,
        Commands::Copy {
            from,
            to,
            overwrite,
        } => cmd_copy(&features, &from, &to, overwrite).await,
    }
}

/// Parse a `--value`/`--default` argument as JSON, keeping the raw text as a
/// string when it is not valid JSON.
fn parse_value_arg(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Turn a flag on, optionally attaching a value payload
async fn cmd_enable(
    features: &Features,
    name: &str,
    scope: &str,
    raw_value: Option<&str>,
) -> Result<()> {
    let value = raw_value.map(parse_value_arg);
    let display = value.as_ref().map(|v| v.to_string());

    features
        .for_scope(scope)
        .enable(name, value)
        .await
        .with_context(|| format!("Failed to enable '{}' in scope '{}'", name, scope))?;

    match display {
        Some(v) => println!("Enabled '{}' in scope '{}' with value {}", name, scope, v),
        None => println!("Enabled '{}' in scope '{}'", name, scope),
    }

    Ok(())
}

/// Turn a flag off and clear any stored value
async fn cmd_disable(features: &Features, name: &str, scope: &str) -> Result<()> {
    features
        .for_scope(scope)
        .disable(name)
        .await
        .with_context(|| format!("Failed to disable '{}' in scope '{}'", name, scope))?;

    println!("Disabled '{}' in scope '{}'", name, scope);

    Ok(())
}

/// Delete a flag record entirely
async fn cmd_remove(features: &Features, name: &str, scope: &str) -> Result<()> {
    let removed = features
        .for_scope(scope)
        .remove(name)
        .await
        .with_context(|| format!("Failed to remove '{}' from scope '{}'", name, scope))?;

    if removed == 0 {
        println!("No record of '{}' in scope '{}'", name, scope);
    } else {
        println!("Removed '{}' from scope '{}'", name, scope);
    }

    Ok(())
}

/// Show every flag recorded for a scope
async fn cmd_list(features: &Features, scope: &str, output_json: bool) -> Result<()> {
    let records = features
        .for_scope(scope)
        .list_all()
        .await
        .with_context(|| format!("Failed to list flags for scope '{}'", scope))?;

    if output_json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No flags recorded for scope '{}'", scope);
        return Ok(());
    }

    for record in records {
        let state = if record.enabled { "on " } else { "off" };
        match record.value {
            Some(value) => println!("  {} {} = {}", state, record.name, value),
            None => println!("  {} {}", state, record.name),
        }
    }

    Ok(())
}

/// Resolve a flag's value, falling back to the global scope
async fn cmd_get(
    features: &Features,
    name: &str,
    scope: &str,
    default: Option<&str>,
) -> Result<()> {
    let fallback = default.map(parse_value_arg).unwrap_or(Value::Null);

    let value = features
        .for_scope(scope)
        .get_value(name, fallback)
        .await
        .with_context(|| format!("Failed to resolve '{}' in scope '{}'", name, scope))?;

    println!("{}", value);

    Ok(())
}

/// Resolve a flag's on/off state, falling back to the global scope
///
/// The exit code reflects storage failures only; a flag that resolves to
/// off still exits zero.
async fn cmd_check(features: &Features, name: &str, scope: &str) -> Result<()> {
    let enabled = features
        .for_scope(scope)
        .is_enabled(name)
        .await
        .with_context(|| format!("Failed to resolve '{}' in scope '{}'", name, scope))?;

    if enabled {
        println!("'{}' is enabled in scope '{}'", name, scope);
    } else {
        println!("'{}' is disabled in scope '{}'", name, scope);
    }

    Ok(())
}

/// Copy one scope's flag records into another
async fn cmd_copy(features: &Features, from: &str, to: &str, overwrite: bool) -> Result<()> {
    let copied = features
        .for_scope(from)
        .copy_to(to, overwrite)
        .await
        .with_context(|| format!("Failed to copy scope '{}' into '{}'", from, to))?;

    println!("Copied {} flag(s) from '{}' to '{}'", copied, from, to);

    Ok(())
}
