use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

// Import from regionkit-core
use regionkit_core::{
    dump_stages, frame_preview, DocumentSource, EditorConfig, LoadOutcome, LoadSession,
    ManagedPage, MemorySource, PageProcessor, Workspace,
};

// Import CLI utilities
use regionkit::HttpSource;

const BASE_URL_ENV: &str = "REGIONKIT_BASE_URL";

#[derive(Parser)]
#[command(name = "regionkit")]
#[command(about = "Inspect the managed regions of a page and render a sandboxed preview")]
struct Args {
    /// Managed page to load, by label or path (default: first configured page)
    #[arg(short, long)]
    page: Option<String>,

    /// Path to custom config file (YAML format)
    /// Defaults to <config dir>/regionkit/config.yaml when present
    #[arg(short, long)]
    config: Option<String>,

    /// Read the page markup from a local file instead of the page API
    #[arg(short, long)]
    input: Option<String>,

    /// Base URL of the page API (overrides config and REGIONKIT_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Output format for the block list: text or json
    #[arg(short = 'f', long, default_value = "text")]
    output_format: String,

    /// Write the composed preview document to this file
    #[arg(long)]
    preview_out: Option<String>,

    /// Write the sandboxed host page embedding the preview instead of the bare document
    #[arg(long)]
    framed: bool,

    /// List the managed pages and exit
    #[arg(long)]
    show_pages: bool,

    /// Dump all intermediate pipeline stage outputs to a directory
    /// Captures: source markup, regions, blocks, preview and a summary
    #[arg(long)]
    dump_stages: bool,

    /// Directory for stage dump output (default: test_outputs/stages)
    #[arg(long, default_value = "test_outputs/stages")]
    stages_dir: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    println!("🧩 Regionkit Page Inspector");

    let config_path = resolve_config_path(args.config.as_deref());
    let mut config = EditorConfig::load_with_fallback(config_path.as_deref());
    if let Some(path) = &config_path {
        println!("📋 Loaded config from: {}", path);
    } else {
        println!("📋 Using default config");
    }

    if args.show_pages {
        show_pages(&config);
        return Ok(());
    }

    // Apply CLI overrides to config
    if let Some(base_url) = args.base_url.clone().or_else(|| std::env::var(BASE_URL_ENV).ok()) {
        if !base_url.trim().is_empty() {
            config.source.base_url = Some(base_url);
        }
    }

    let page = match &args.page {
        Some(key) => config.find_page(key)?.clone(),
        None => config.default_page()?.clone(),
    };

    let processor = PageProcessor::new(&config)?;
    let source = create_source(&args, &config, &page)?;

    println!("📄 Loading: {} ({}) via {}", page.label, page.path, source.name());

    let mut workspace = Workspace::new();
    match processor.load(&mut workspace, &page, source.as_ref()) {
        LoadOutcome::Installed => {}
        LoadOutcome::Failed { message } => {
            eprintln!("❌ Load failed");
            eprintln!("   {message}");
            std::process::exit(1);
        }
        LoadOutcome::Stale { generation, latest } => {
            return Err(anyhow!(
                "load {generation} was superseded by load {latest}"
            ));
        }
    }

    let session = workspace
        .current()
        .ok_or_else(|| anyhow!("no session installed after load"))?;

    println!("✅ Loaded page");
    if let Some(warning) = &session.warning {
        println!("⚠️  {}", warning);
    }
    println!("📊 Blocks: {}", session.blocks.len());

    print_listing(session, &args.output_format)?;

    if let Some(preview_out) = &args.preview_out {
        save_preview(session, &config, preview_out, args.framed)?;
    }

    if args.dump_stages {
        println!("\n🔬 Pipeline stage dump mode");
        for path in dump_stages(session, &args.stages_dir)? {
            println!("  💾 {}", path.display());
        }
        println!("\n✅ All stages dumped to: {}", args.stages_dir);
    }

    Ok(())
}

/// Explicit `--config` wins; otherwise use the per-user config file if it exists.
fn resolve_config_path(explicit: Option<&str>) -> Option<String> {
    if let Some(path) = explicit {
        return Some(path.to_string());
    }
    let default_path: PathBuf = dirs::config_dir()?.join("regionkit").join("config.yaml");
    default_path
        .is_file()
        .then(|| default_path.to_string_lossy().into_owned())
}

/// Local file input when `--input` is given, otherwise the page API.
fn create_source(
    args: &Args,
    config: &EditorConfig,
    page: &ManagedPage,
) -> Result<Box<dyn DocumentSource>> {
    if let Some(input) = &args.input {
        if !Path::new(input).exists() {
            return Err(anyhow!("input file not found: {}", input));
        }
        let text = fs::read_to_string(input)
            .with_context(|| format!("failed to read input file {}", input))?;
        return Ok(Box::new(MemorySource::new().with_page(&page.path, &text)));
    }

    let base_url = config.source.base_url.as_deref().ok_or_else(|| {
        anyhow!(
            "No page API configured!\n\
             Pass --base-url, set {BASE_URL_ENV}, or use --input <file>"
        )
    })?;
    Ok(Box::new(HttpSource::new(
        base_url,
        &config.source.endpoint,
        config.source.timeout_secs,
    )))
}

fn show_pages(config: &EditorConfig) {
    println!("\n📋 Managed pages:");
    if config.pages.is_empty() {
        println!("  (none configured)");
    }
    for page in &config.pages {
        println!("  {:<12} {}", page.label, page.path);
    }

    println!("\n📝 Usage Examples:");
    println!("  regionkit --base-url https://cms.example.com --page about");
    println!("  regionkit -i saved/index.html -f json");
    println!("  regionkit -p gallery --preview-out preview.html --framed");
}

fn print_listing(session: &LoadSession, format: &str) -> Result<()> {
    let listing = session.listing();
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&listing)?),
        "text" => print!("{}", listing.to_text_table()),
        other => {
            println!("⚠️  Unknown output format '{}', using text", other);
            print!("{}", listing.to_text_table());
        }
    }
    Ok(())
}

fn save_preview(
    session: &LoadSession,
    config: &EditorConfig,
    output_path: &str,
    framed: bool,
) -> Result<()> {
    let contents = if framed {
        frame_preview(&session.preview, &config.sandbox, &config.preview.title)
    } else {
        session.preview.clone()
    };
    fs::write(output_path, contents)
        .with_context(|| format!("failed to write preview to {}", output_path))?;

    if framed {
        println!("💾 Sandboxed preview saved to: {}", output_path);
    } else {
        println!("💾 Preview document saved to: {}", output_path);
    }
    Ok(())
}
