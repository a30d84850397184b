//! wxr2md: convert a WordPress export into Markdown files.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use wxr2md::package::{write_zip, UniqueNames};
use wxr2md::stream::{count_items, open_export};
use wxr2md::{ConversionStore, ConvertOptions, Converter, FilteringOptions, MemoryStore};

#[derive(Parser)]
#[command(name = "wxr2md")]
#[command(about = "Convert WordPress exports (WXR) to Markdown with content-quality filtering")]
#[command(version)]
struct Cli {
    /// Verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an export to Markdown files
    Convert(ConvertArgs),

    /// Count the items in an export
    Count {
        /// Export file (.xml or .xml.gz)
        input: PathBuf,
    },
}

#[derive(Args)]
struct ConvertArgs {
    /// Export file (.xml or .xml.gz)
    input: PathBuf,

    /// Directory for the Markdown files
    #[arg(short, long, default_value = "markdown")]
    output: PathBuf,

    /// Also write a ZIP archive of the converted posts
    #[arg(long)]
    zip: Option<PathBuf>,

    /// JSON file with filtering options (camelCase keys)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable the content-quality filter
    #[arg(long)]
    filter: bool,

    /// Minimum word count for a post to be kept
    #[arg(long)]
    min_words: Option<usize>,

    /// Minimum text-to-markup ratio, between 0 and 1
    #[arg(long)]
    min_ratio: Option<f64>,

    /// Keep draft posts
    #[arg(long)]
    keep_drafts: bool,

    /// Drop posts without images
    #[arg(long)]
    require_images: bool,

    /// Start documents with a title heading instead of YAML front matter
    #[arg(long)]
    no_front_matter: bool,

    /// Skip the counting pass; the total is reported at the end
    #[arg(long)]
    single_pass: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Convert(args) => convert(&args),
        Commands::Count { input } => {
            let mut reader = open_export(&input).with_context(|| format!("opening {}", input.display()))?;
            let total = count_items(&mut reader).context("counting items")?;
            println!("{total}");
            Ok(())
        }
    }
}

fn convert(args: &ConvertArgs) -> Result<()> {
    let options = convert_options(args)?;
    let store = MemoryStore::new();
    let converter = Converter::new(options, &store)?;

    let summary = converter
        .convert_path(&args.input)
        .with_context(|| format!("converting {}", args.input.display()))?;

    let written = write_markdown(&store, summary.conversion_id, &args.output)?;
    info!(files = written, dir = %args.output.display(), "wrote markdown files");

    if let Some(zip_path) = &args.zip {
        let file = File::create(zip_path).with_context(|| format!("creating {}", zip_path.display()))?;
        write_zip(&store, summary.conversion_id, BufWriter::new(file))?;
        info!(path = %zip_path.display(), "wrote zip archive");
    }

    println!(
        "processed {}, accepted {}, skipped {}, incomplete {}",
        summary.processed,
        summary.accepted,
        summary.skipped.len(),
        summary.incomplete
    );
    for skipped in &summary.skipped {
        println!("  skipped \"{}\": {}", skipped.title, skipped.reason);
    }
    Ok(())
}

fn convert_options(args: &ConvertArgs) -> Result<ConvertOptions> {
    let mut filtering = match &args.config {
        Some(path) => {
            let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            FilteringOptions::from_json(&json)?
        }
        None => FilteringOptions::default(),
    };

    if args.filter {
        filtering.filter_enabled = true;
    }
    if let Some(words) = args.min_words {
        filtering.min_word_count = words;
    }
    if let Some(ratio) = args.min_ratio {
        filtering.min_text_to_markup_ratio = ratio;
    }
    if args.keep_drafts {
        filtering.exclude_draft_posts = false;
    }
    if args.require_images {
        filtering.exclude_no_images = true;
    }

    let mut options = ConvertOptions {
        filtering,
        single_pass: args.single_pass,
        ..ConvertOptions::default()
    };
    options.markdown.include_front_matter = !args.no_front_matter;
    Ok(options)
}

fn write_markdown(store: &dyn ConversionStore, conversion_id: u64, dir: &Path) -> Result<usize> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let posts = store.list_posts(conversion_id)?;
    let mut names = UniqueNames::default();
    for post in &posts {
        let path = dir.join(names.claim(&post.post.file_name));
        fs::write(&path, &post.post.markdown).with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(posts.len())
}
