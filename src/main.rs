// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! picasa2shotwell: move Picasa tags, captions, ratings and folder events
//! into a Shotwell library.

use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use picasa2shotwell::config::{EmbeddedConfig, MigrationConfig};
use picasa2shotwell::embed::{DryRunWriter, ExiftoolWriter, MetadataWriter};
use picasa2shotwell::events::EventNamer;
use picasa2shotwell::migrate::Migrator;
use picasa2shotwell::sources::{PicasaIni, SnapshotDb};
use picasa2shotwell::target::ShotwellDb;
use picasa2shotwell::{MigrationError, Result};

/// picasa2shotwell CLI - Picasa to Shotwell metadata migration
#[derive(Parser, Debug)]
#[command(name = "picasa2shotwell")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version)]
#[command(about = "Migrate Picasa tags, captions, ratings and events into Shotwell", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (JSON format)
    #[arg(short, long, default_value = "config.json", global = true)]
    config: PathBuf,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Output format for results
    #[arg(long, global = true, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Migrate one or more Picasa folders into the Shotwell database
    Migrate {
        /// Source folders to walk
        #[arg(required = true)]
        roots: Vec<PathBuf>,

        /// Dry run mode (roll back database changes, embed nothing)
        #[arg(long)]
        dry_run: bool,

        /// Shotwell database (overrides config)
        #[arg(long)]
        db: Option<PathBuf>,

        /// Picasa database snapshot in JSON form (overrides config)
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Do not write metadata into the media files
        #[arg(long)]
        no_embed: bool,

        /// Also save the run report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Show the event title a folder would get
    EventName {
        /// Folders to name
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Show what a Picasa INI file says about each file
    InspectIni {
        /// INI file to read
        file: PathBuf,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Generate default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config.json")]
        output: PathBuf,
    },

    /// Validate configuration file
    Validate,
}

/// Options of the migrate command
#[derive(Debug)]
struct MigrateArgs {
    roots: Vec<PathBuf>,
    dry_run: bool,
    db: Option<PathBuf>,
    snapshot: Option<PathBuf>,
    no_embed: bool,
    report: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if !cli.quiet {
        info!("picasa2shotwell v{}", env!("CARGO_PKG_VERSION"));
    }

    // Load configuration
    let config = MigrationConfig::load(&cli.config)?;

    match cli.command {
        Commands::Migrate { roots, dry_run, db, snapshot, no_embed, report } => {
            let args = MigrateArgs { roots, dry_run, db, snapshot, no_embed, report };
            run_migrate(config, args, &cli.format)
        }
        Commands::EventName { paths } => run_event_name(&config, &paths, &cli.format),
        Commands::InspectIni { file } => run_inspect_ini(&file, &cli.format),
        Commands::Config { action } => run_config_command(config, action, &cli.config),
    }
}

/// Run a migration over every root inside one transaction
fn run_migrate(mut config: MigrationConfig, args: MigrateArgs, format: &str) -> Result<()> {
    if let Some(db) = args.db {
        config.target.database = db;
    }
    if let Some(snapshot) = args.snapshot {
        config.source.snapshot = Some(snapshot);
    }
    if args.no_embed {
        config.embedded.enabled = false;
    }

    let home = config.source.home_dir();
    let source = match &config.source.snapshot {
        Some(path) => {
            let snapshot = SnapshotDb::load(path, &home)
                .map_err(|e| MigrationError::Setup(format!("Cannot read snapshot {:?}: {}", path, e)))?;
            info!("Loaded {} Picasa database entries from {:?}", snapshot.len(), path);
            snapshot
        }
        None => {
            warn!("No Picasa database snapshot configured, only INI files will be read");
            SnapshotDb::default()
        }
    };
    let ini = PicasaIni::new(config.source.ini_name.clone());

    let mut writer = select_writer(&mut config.embedded, args.dry_run);

    let mut target = ShotwellDb::open(&config.target.database)?;
    info!("Shotwell database: {:?}", config.target.database);
    if args.dry_run {
        warn!("DRY RUN MODE - database changes will be rolled back");
    }

    target.begin()?;
    let mut migrator = Migrator::new(config);
    migrator.record_rejected(source.rejected());

    for root in &args.roots {
        if let Err(e) = migrator.run(root, &source, &ini, &mut target, writer.as_mut()) {
            error!("Migration aborted: {}", e);
            if let Err(rb) = target.rollback() {
                warn!("Rollback failed: {}", rb);
            }
            return Err(e);
        }
    }

    if args.dry_run {
        target.rollback()?;
        info!("DRY RUN: rolled back all database changes");
    } else {
        target.commit()?;
        let stats = target.get_stats()?;
        info!(
            "Shotwell now holds {} photos, {} videos, {} tags, {} events",
            stats.photo_count, stats.video_count, stats.tag_count, stats.event_count
        );
    }

    let report = migrator.finish();
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report);
    }

    if let Some(path) = args.report {
        report.save(&path)?;
        info!("Report saved to {:?}", path);
    }

    Ok(())
}

/// Pick the embedded-metadata writer.
///
/// A missing exiftool turns embedding off in both modes, so a dry run routes
/// video tags exactly as the real run would.
fn select_writer(embedded: &mut EmbeddedConfig, dry_run: bool) -> Box<dyn MetadataWriter> {
    let exiftool = ExiftoolWriter::new(embedded.exiftool.clone());
    if embedded.enabled && !exiftool.available() {
        warn!(
            "'{}' not found, embedded metadata will not be written and video tags go to the report",
            embedded.exiftool
        );
        embedded.enabled = false;
    }

    if dry_run {
        Box::new(DryRunWriter::new(exiftool.supports_video()))
    } else {
        Box::new(exiftool)
    }
}

/// Print the event title each folder would receive
fn run_event_name(config: &MigrationConfig, paths: &[PathBuf], format: &str) -> Result<()> {
    let namer = EventNamer::from_config(&config.events);

    let mut named = Vec::new();
    for path in paths {
        // Name the folder as a file inside it would see it
        let title = namer.event_title(&path.join("_")).unwrap_or_default();
        named.push((path, title));
    }

    if format == "json" {
        let entries: Vec<_> = named
            .iter()
            .map(|(path, title)| json!({ "folder": path, "title": title }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for (path, title) in named {
            println!("{}\t{}", path.display(), title);
        }
    }
    Ok(())
}

/// Print the parsed entries of one INI file
fn run_inspect_ini(file: &Path, format: &str) -> Result<()> {
    let text = std::fs::read_to_string(file)?;
    let entries = PicasaIni::parse(&text, file)?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("{} ({} files):", file.display(), entries.len());
    for (name, entry) in &entries {
        println!("  [{}]", name);
        if let Some(rating) = &entry.rating {
            println!("    rating: {}", rating);
        }
        if !entry.tags.is_empty() {
            println!("    keywords: {}", entry.tags.join(", "));
        }
        if let Some(caption) = &entry.caption {
            println!("    caption: {}", caption);
        }
        if entry.starred {
            println!("    starred");
        }
    }
    Ok(())
}

/// Run config commands
fn run_config_command(config: MigrationConfig, action: ConfigCommands, config_path: &Path) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let json = serde_json::to_string_pretty(&config)?;
            println!("{}", json);
        }
        ConfigCommands::Generate { output } => {
            let default_config = MigrationConfig::default();
            default_config.save(&output)?;
            println!("Generated config at {:?}", output);
        }
        ConfigCommands::Validate => {
            config.validate()?;
            println!("Configuration at {:?} is valid", config_path);
            println!("  Shotwell database: {:?}", config.target.database);
            println!("  Snapshot: {:?}", config.source.snapshot);
            println!("  Rating keywords: {:?}", config.ratings.keywords);
            println!("  Embedded metadata: {}", if config.embedded.enabled { "on" } else { "off" });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_requires_a_command() {
        assert!(Cli::try_parse_from(["picasa2shotwell"]).is_err());
    }

    #[test]
    fn test_cli_migrate_command() {
        let cli = Cli::try_parse_from([
            "picasa2shotwell", "migrate", "/photos/2011", "/photos/2012", "--dry-run", "--db", "/tmp/photo.db",
        ])
        .unwrap();

        match cli.command {
            Commands::Migrate { roots, dry_run, db, no_embed, .. } => {
                assert!(dry_run);
                assert!(!no_embed);
                assert_eq!(roots, vec![PathBuf::from("/photos/2011"), PathBuf::from("/photos/2012")]);
                assert_eq!(db, Some(PathBuf::from("/tmp/photo.db")));
            }
            _ => panic!("Expected Migrate command"),
        }
    }

    #[test]
    fn test_cli_migrate_needs_a_root() {
        assert!(Cli::try_parse_from(["picasa2shotwell", "migrate"]).is_err());
    }

    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::try_parse_from([
            "picasa2shotwell", "event-name", "2011-07-04_Family-Picnic", "--format", "json", "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.format, "json");
        assert!(matches!(cli.command, Commands::EventName { .. }));
    }

    #[test]
    fn test_missing_exiftool_disables_embedding_in_dry_run_too() {
        for dry_run in [true, false] {
            let mut embedded = EmbeddedConfig {
                enabled: true,
                exiftool: "/nonexistent/exiftool-for-tests".to_string(),
                ..EmbeddedConfig::default()
            };
            let writer = select_writer(&mut embedded, dry_run);
            assert!(!embedded.enabled, "dry_run = {}", dry_run);
            assert!(writer.supports_video());
        }
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["picasa2shotwell", "config", "show", "--format", "xml"]).is_err());
    }
}
