use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono::{TimeZone, Utc};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use image_vault::database::models::ImageFilter;
use image_vault::database::repo::{SETTING_LAST_SCAN, SETTING_ROOT_DIR};
use image_vault::utils::config::{Config, Overrides};
use image_vault::{Catalog, ScanOptions, Scanner};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Index a folder of images into a taggable catalog",
    long_about = None
)]
struct Args {
    /// Catalog database file.
    #[arg(short, long, global = true)]
    db_path: Option<PathBuf>,

    /// Vault root directory.
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Index the vault.
    Scan {
        /// Remove catalog entries whose files are gone.
        #[arg(long)]
        cleanup: bool,
        /// Do not derive tags from folder names.
        #[arg(long)]
        no_auto_tag: bool,
        /// Drop the whole catalog before scanning.
        #[arg(long)]
        reset: bool,
        #[arg(long)]
        json: bool,
    },
    /// List images, newest first.
    Images {
        /// Filename substring.
        #[arg(short, long)]
        query: Option<String>,
        /// Required tag (repeatable).
        #[arg(short, long = "tag")]
        tags: Vec<String>,
        /// Excluded tag (repeatable).
        #[arg(short = 'x', long = "exclude")]
        exclude: Vec<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u32).range(1..=500))]
        page_size: u32,
        #[arg(long)]
        json: bool,
    },
    /// Show one image and its tags.
    Show { id: i64 },
    /// Manage tags.
    Tags {
        #[command(subcommand)]
        action: TagAction,
    },
    /// Attach a tag to images, creating the tag if needed.
    Tag {
        name: String,
        #[arg(required = true)]
        ids: Vec<i64>,
    },
    /// Detach a tag from images.
    Untag {
        name: String,
        #[arg(required = true)]
        ids: Vec<i64>,
    },
    /// Delete images from the catalog and from disk.
    Rm {
        #[arg(required = true)]
        ids: Vec<i64>,
        /// Only forget the catalog rows.
        #[arg(long)]
        keep_files: bool,
    },
    /// Show settings and catalog totals.
    Status,
    /// Write the resolved configuration to .env.
    Init,
}

#[derive(Subcommand, Debug)]
enum TagAction {
    List {
        #[arg(long)]
        json: bool,
    },
    Create {
        name: String,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Update {
        id: i64,
        name: String,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Delete { id: i64 },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let env_file = Path::new(".env");
    let config = Config::resolve(
        Overrides {
            db_path: args.db_path.clone(),
            root_dir: args.root.clone(),
        },
        env_file,
    )?;

    if let Command::Init = args.command {
        return config.save_to_env(env_file);
    }

    let mut catalog = Catalog::open(&config.db_path)
        .with_context(|| format!("Failed to open catalog {:?}", config.db_path))?;

    match args.command {
        Command::Scan { cleanup, no_auto_tag, reset, json } => {
            let options = ScanOptions {
                cleanup,
                auto_tag: !no_auto_tag,
            };
            run_scan(&mut catalog, &config, options, reset, json)
        }
        Command::Images { query, tags, exclude, page, page_size, json } => {
            let filter = ImageFilter {
                query,
                tags,
                exclude_tags: exclude,
            };
            let result = catalog.list_images(&filter, page, page_size)?;
            if json {
                return print_json(&result);
            }
            println!(
                "{} images (page {} of {})",
                result.total,
                result.page,
                page_count(result.total, page_size)
            );
            for image in &result.items {
                println!("{:>6}  {}x{}  {}", image.id, image.width, image.height, image.path);
            }
            Ok(())
        }
        Command::Show { id } => {
            let image = catalog.get_image(id)?.ok_or_else(|| anyhow!("Image {} not found", id))?;
            let tags = catalog.image_tags(id)?;
            println!("{}", image.path);
            println!("  size:     {} bytes", image.size);
            println!("  pixels:   {}x{}", image.width, image.height);
            println!("  hash:     {}", image.file_hash.as_deref().unwrap_or("-"));
            println!("  updated:  {}", image.updated_at.format("%Y-%m-%d %H:%M"));
            let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
            println!("  tags:     {}", names.join(", "));
            Ok(())
        }
        Command::Tags { action } => run_tag_action(&mut catalog, action),
        Command::Tag { name, ids } => {
            for id in ids {
                catalog.assign_tag(id, &name)?;
            }
            Ok(())
        }
        Command::Untag { name, ids } => {
            let tag = catalog
                .find_tag(name.trim())?
                .ok_or_else(|| anyhow!("Tag {:?} not found", name))?;
            for id in ids {
                catalog.remove_tag(id, tag.id)?;
            }
            Ok(())
        }
        Command::Rm { ids, keep_files } => {
            let root = if keep_files { None } else { vault_root(&catalog, &config)? };
            let removed = catalog.delete_images(&ids, root.as_deref())?;
            info!("Deleted {} images", removed);
            Ok(())
        }
        Command::Status => {
            let root = catalog.get_setting(SETTING_ROOT_DIR)?;
            let last_scan = catalog
                .get_setting(SETTING_LAST_SCAN)?
                .and_then(|v| v.parse::<i64>().ok())
                .and_then(|ts| Utc.timestamp_opt(ts, 0).single());
            let summary = catalog.summary()?;
            println!("root:      {}", root.as_deref().unwrap_or("(not set)"));
            match last_scan {
                Some(ts) => println!("last scan: {}", ts.format("%Y-%m-%d %H:%M UTC")),
                None => println!("last scan: never"),
            }
            println!("images:    {} ({} bytes)", summary.images, summary.total_bytes);
            println!("tags:      {}", summary.tags);
            Ok(())
        }
        Command::Init => unreachable!("handled before the catalog is opened"),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run_scan(
    catalog: &mut Catalog,
    config: &Config,
    options: ScanOptions,
    reset: bool,
    json: bool,
) -> Result<()> {
    let root = vault_root(catalog, config)?
        .ok_or_else(|| anyhow!("No vault root: pass --root or set IMAGE_VAULT_ROOT"))?;

    if reset {
        catalog.reset()?;
    }
    catalog.set_setting(SETTING_ROOT_DIR, &root.to_string_lossy())?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {pos} files  {wide_msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(120));

    let scanner = Scanner::new();
    let stats = scanner.scan_with_progress(catalog, &root, options, |path| {
        spinner.inc(1);
        spinner.set_message(path.display().to_string());
    });
    spinner.finish_and_clear();
    let stats = stats.with_context(|| format!("Scan of {:?} failed", root))?;

    catalog.set_setting(SETTING_LAST_SCAN, &Utc::now().timestamp().to_string())?;

    if json {
        return print_json(&stats);
    }
    println!(
        "Scanned: added {} updated {} unchanged {}{}",
        stats.added,
        stats.updated,
        stats.unchanged,
        if stats.removed > 0 { format!(" removed {}", stats.removed) } else { String::new() }
    );
    Ok(())
}

fn run_tag_action(catalog: &mut Catalog, action: TagAction) -> Result<()> {
    match action {
        TagAction::List { json } => {
            let tags = catalog.list_tags()?;
            if json {
                return print_json(&tags);
            }
            for entry in tags {
                println!(
                    "{:>4}  {:<28} {:>6}  {}",
                    entry.tag.id,
                    entry.tag.name,
                    entry.image_count,
                    entry.tag.color.as_deref().unwrap_or("")
                );
            }
        }
        TagAction::Create { name, color, description } => {
            let tag = catalog.create_tag(&name, color.as_deref(), description.as_deref())?;
            println!("{}  {}", tag.id, tag.name);
        }
        TagAction::Update { id, name, color, description } => {
            catalog.update_tag(id, &name, color.as_deref(), description.as_deref())?;
        }
        TagAction::Delete { id } => catalog.delete_tag(id)?,
    }
    Ok(())
}

/// Flag or environment first, then the root recorded by the last scan.
fn vault_root(catalog: &Catalog, config: &Config) -> Result<Option<PathBuf>> {
    if let Some(root) = &config.root_dir {
        return Ok(Some(root.clone()));
    }
    Ok(catalog.get_setting(SETTING_ROOT_DIR)?.map(PathBuf::from))
}

fn page_count(total: u64, page_size: u32) -> u64 {
    total.div_ceil(u64::from(page_size)).max(1)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
