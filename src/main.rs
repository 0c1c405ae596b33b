use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use righter::browse::{FilterSpec, LoopBrowser, TempoRange};
use righter::catalog::cache::{CacheStatus, CatalogCache};
use righter::catalog::fetch::HttpCatalogSource;
use righter::catalog::{LoopRecord, title};
use righter::config::AppConfig;
use righter::{download, generate, placements};

#[derive(Parser)]
#[command(name = "righter", version, about = "itsrighter guitar loop catalog")]
struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the loop catalog with filters and pagination
    Browse {
        /// Substring match against the full title
        #[arg(short, long)]
        search: Option<String>,

        /// Note letter (A-G)
        #[arg(long)]
        note: Option<String>,

        /// Key fragment, e.g. "minor" or "F#"
        #[arg(long)]
        key: Option<String>,

        /// Tempo range "min-max", e.g. "80-100" (min inclusive, max exclusive)
        #[arg(long)]
        tempo: Option<TempoRange>,

        /// Exact pack number
        #[arg(long)]
        pack: Option<u32>,

        /// Zero-based page of 7 results
        #[arg(short, long, default_value = "0")]
        page: usize,
    },

    /// List the published pack numbers
    Packs,

    /// Show catalog statistics
    Stats,

    /// Download a loop by title (substring match), or the producer tag
    Download {
        /// Loop title to search for
        query: Option<String>,

        /// Download the producer tag archive instead
        #[arg(long)]
        tag: bool,

        /// Destination directory (default: config download_dir)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },

    /// Scan a directory of new loops and emit the combined catalog JSON
    Generate {
        /// Directory holding the new loop audio files
        directory: PathBuf,

        /// Pack number for the new release
        pack_number: u32,
    },

    /// List song placements featuring the loops
    Placements,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load config file (optional, defaults if missing)
    let config = AppConfig::load();
    let cache = CatalogCache::new(Box::new(HttpCatalogSource::new(config.catalog_url.clone())));

    match cli.command {
        Commands::Browse { search, note, key, tempo, pack, page } => {
            let catalog = cache.load();
            if let CacheStatus::Failed = cache.status() {
                anyhow::bail!("Failed to load loops data. Please try again later.");
            }

            let mut browser = LoopBrowser::new(&catalog);
            browser.set_filters(FilterSpec { search, note, key, tempo, pack });
            browser.set_page(page);

            println!("Results ({})", browser.filtered().len());
            println!();
            print_loop_table(browser.visible(), &browser);
            println!();
            if browser.page_count() > 1 {
                println!("Page {} of {}", browser.page() + 1, browser.page_count());
            }
        }

        Commands::Packs => {
            let catalog = cache.load();
            if let CacheStatus::Failed = cache.status() {
                anyhow::bail!("Failed to load loops data. Please try again later.");
            }

            let newest = catalog.newest_pack();
            for number in catalog.pack_numbers() {
                if Some(number) == newest {
                    println!("Pack {number}  (newest)");
                } else {
                    println!("Pack {number}");
                }
            }
        }

        Commands::Stats => {
            let catalog = cache.load();
            if let CacheStatus::Failed = cache.status() {
                anyhow::bail!("Failed to load loops data. Please try again later.");
            }

            println!("Catalog Statistics");
            println!("==================");
            println!("Total packs: {}", catalog.packs.len());
            println!("Total loops: {}", catalog.loop_count());
            if let Some(newest) = catalog.newest_pack() {
                println!("Newest pack: {newest}");
            }
            println!();

            if !catalog.packs.is_empty() {
                println!("Loops per pack:");
                for pack in &catalog.packs {
                    println!("  Pack {:<6} {}", pack.pack_number, pack.loops.len());
                }
            }
        }

        Commands::Download { query, tag, out_dir } => {
            let dest_dir = out_dir.unwrap_or_else(|| config.download_dir.clone());

            if tag {
                // Network failures here are reported, not retried
                match download::save_tag(&dest_dir, &config) {
                    Ok(path) => println!("Saved {}", path.display()),
                    Err(e) => log::error!("Error downloading: {e}"),
                }
                return Ok(());
            }

            let query = query.context("Pass a loop title to search for, or --tag")?;
            let catalog = cache.load();
            if let CacheStatus::Failed = cache.status() {
                anyhow::bail!("Failed to load loops data. Please try again later.");
            }

            let needle = query.to_lowercase();
            let found = catalog
                .all_loops()
                .into_iter()
                .find(|l| l.title.to_lowercase().contains(&needle));

            match found {
                Some(record) => match download::save_loop(&record, &dest_dir, &config) {
                    Ok(path) => println!("Saved {}", path.display()),
                    Err(e) => log::error!("Error downloading: {e}"),
                },
                None => println!("No loop matching \"{query}\"."),
            }
        }

        Commands::Generate { directory, pack_number } => {
            let source = HttpCatalogSource::new(config.catalog_url.clone());
            let result = generate::run(&directory, pack_number, &source, &config)
                .context("Generate failed")?;

            println!();
            println!(
                "Success! Combined loop data saved to '{}'",
                result.output.display()
            );
            println!("Total packs: {}", result.total_packs);
            println!(
                "New pack {pack_number} added with {} loops",
                result.new_loops
            );
        }

        Commands::Placements => {
            println!("Placements");
            println!();
            for video in placements::VIDEOS {
                println!("{:<50} {}", video.title, placements::embed_url(video));
            }
        }
    }

    Ok(())
}

/// Print a table of loops with derived fields, flagging the newest pack.
fn print_loop_table(loops: &[LoopRecord], browser: &LoopBrowser) {
    println!(
        "{:<28} {:>5} {:<10} {:>5}  {}",
        "Title", "BPM", "Key", "Pack", ""
    );
    println!("{}", "-".repeat(60));

    for record in loops {
        let derived = title::derive_fields(record);
        let display = title::display_title(&record.title);

        // Truncate long titles
        let title_display: String = if display.len() > 28 {
            format!("{}...", &display[..25])
        } else {
            display
        };

        println!(
            "{:<28} {:>5} {:<10} {:>5}  {}",
            title_display,
            derived.tempo,
            derived.key.as_deref().unwrap_or("-"),
            derived.pack_number,
            if browser.is_newest(record) { "NEW" } else { "" }
        );
    }
}
