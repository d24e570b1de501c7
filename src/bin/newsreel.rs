use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use newsreel::article::feed::DEFAULT_LISTING_CAP;
use newsreel::{
    CpuSurface, Deck, FfmpegEncoder, FixedStepClock, FontSet, FrameRenderer, FrameScheduler,
    HttpImageLoader, NewsItem, PacedClock, RecordingController, SessionSettings, SessionState,
    SlideContext, Surface, VideoConfig,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "newsreel", version)]
struct Cli {
    /// Video configuration JSON (defaults apply to missing fields).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List articles from a feed.
    List(ListArgs),
    /// Print the slide deck and total duration of one article as JSON.
    Deck(ItemArgs),
    /// Render one slide as a PNG.
    Frame(FrameArgs),
    /// Record the article video as webm (requires `ffmpeg` on PATH).
    Render(RenderArgs),
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Feed listing JSON: a local path or an http(s) URL.
    #[arg(long)]
    feed: String,

    /// Only show items matching this text.
    #[arg(long)]
    query: Option<String>,

    /// Maximum items kept after normalization.
    #[arg(long, default_value_t = DEFAULT_LISTING_CAP)]
    cap: usize,
}

#[derive(Args, Debug)]
struct ItemArgs {
    /// Single article JSON file.
    #[arg(long, conflicts_with = "feed", required_unless_present = "feed")]
    item: Option<PathBuf>,

    /// Feed listing to pick the article from (local path or http(s) URL).
    #[arg(long)]
    feed: Option<String>,

    /// Position of the article in the normalized feed.
    #[arg(long, default_value_t = 0)]
    index: usize,
}

#[derive(Args, Debug)]
struct FontArgs {
    /// Regular-weight font file (overrides the config).
    #[arg(long)]
    font: Option<PathBuf>,

    /// Bold font file (overrides the config).
    #[arg(long)]
    font_bold: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    item: ItemArgs,

    #[command(flatten)]
    fonts: FontArgs,

    /// Slide index (0-based).
    #[arg(long)]
    slide: usize,

    /// Animation time in milliseconds (moves the background grid).
    #[arg(long, default_value_t = 0.0)]
    time_ms: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    item: ItemArgs,

    #[command(flatten)]
    fonts: FontArgs,

    /// Output webm path. Defaults to the configured `file_name` in the current directory.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Pace frames in real time instead of rendering as fast as possible.
    #[arg(long)]
    realtime: bool,

    /// Frame rate override.
    #[arg(long)]
    fps: Option<u32>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => VideoConfig::from_path(path)?,
        None => VideoConfig::default(),
    };
    match cli.cmd {
        Command::List(args) => cmd_list(args),
        Command::Deck(args) => cmd_deck(args),
        Command::Frame(args) => cmd_frame(args, config),
        Command::Render(args) => cmd_render(args, config),
    }
}

fn cmd_list(args: ListArgs) -> anyhow::Result<()> {
    let listing = newsreel::load_listing(&args.feed)?;
    let items = newsreel::normalize_listing(listing.items, args.cap);
    let hits = newsreel::search(&items, args.query.as_deref().unwrap_or(""));
    for (i, it) in hits.iter().enumerate() {
        println!("{i:>3}  {}  [{}]  {}", it.date_label(), it.source, it.title);
    }
    eprintln!("{} of {} items", hits.len(), items.len());
    Ok(())
}

fn read_item(args: &ItemArgs) -> anyhow::Result<NewsItem> {
    if let Some(path) = &args.item {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read article '{}'", path.display()))?;
        return serde_json::from_str(&text).with_context(|| "parse article JSON");
    }
    let feed = args
        .feed
        .as_deref()
        .context("either --item or --feed is required")?;
    let listing = newsreel::load_listing(feed)?;
    let mut items = newsreel::normalize_listing(listing.items, DEFAULT_LISTING_CAP);
    anyhow::ensure!(
        args.index < items.len(),
        "feed has {} items, index {} is out of range",
        items.len(),
        args.index
    );
    Ok(items.swap_remove(args.index))
}

fn cmd_deck(args: ItemArgs) -> anyhow::Result<()> {
    let item = read_item(&args)?;
    let deck = newsreel::build_deck(&item)?;
    let out = serde_json::json!({
        "slides": deck.slides(),
        "total_duration_secs": deck.total_duration_secs(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn make_surface(config: &VideoConfig, fonts: &FontArgs) -> anyhow::Result<CpuSurface> {
    let mut config = config.clone();
    if fonts.font.is_some() {
        config.font = fonts.font.clone();
    }
    if fonts.font_bold.is_some() {
        config.font_bold = fonts.font_bold.clone();
    }
    let (regular, bold) = config.resolve_fonts()?;
    tracing::debug!(regular = %regular.display(), bold = %bold.display(), "fonts");
    Ok(CpuSurface::new(
        config.canvas(),
        FontSet::from_paths(&regular, &bold)?,
    )?)
}

fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs, config: VideoConfig) -> anyhow::Result<()> {
    config.validate()?;
    let item = read_item(&args.item)?;
    let deck: Deck = newsreel::build_deck(&item)?;
    let slide = deck.get(args.slide).with_context(|| {
        format!(
            "slide {} out of range (deck has {})",
            args.slide,
            deck.len()
        )
    })?;

    let mut surface = make_surface(&config, &args.fonts)?;
    let mut renderer = FrameRenderer::new(
        SlideContext::for_item(&item, config.badge_label.clone()),
        HttpImageLoader::new(config.image_timeout()),
    );
    renderer.render(&mut surface, slide, args.time_ms)?;
    let frame = surface.current_frame();

    ensure_parent_dir(&args.out)?;
    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs, mut config: VideoConfig) -> anyhow::Result<()> {
    if let Some(fps) = args.fps {
        config.fps = fps;
    }
    config.validate()?;
    let item = read_item(&args.item)?;
    let fps = config.fps()?;

    let surface = make_surface(&config, &args.fonts)?;
    let mut controller = RecordingController::new(
        surface,
        FfmpegEncoder::new(),
        HttpImageLoader::new(config.image_timeout()),
        SessionSettings::from_config(&config),
    );
    controller.set_progress_observer(|_, pct| eprint!("\rprogress: {pct:>3}%"));

    controller.start_article(&item, fps)?;
    let mut scheduler: Box<dyn FrameScheduler> = if args.realtime {
        Box::new(PacedClock::new(fps))
    } else {
        Box::new(FixedStepClock::for_fps(fps))
    };
    let state = controller.run(scheduler.as_mut());
    eprintln!();

    match state {
        SessionState::Finished(artifact) => {
            let out = args
                .out
                .clone()
                .unwrap_or_else(|| PathBuf::from(&artifact.file_name));
            ensure_parent_dir(&out)?;
            std::fs::write(&out, &artifact.bytes)
                .with_context(|| format!("write video '{}'", out.display()))?;
            eprintln!(
                "wrote {} ({}, {} bytes)",
                out.display(),
                artifact.mime,
                artifact.bytes.len()
            );
            Ok(())
        }
        SessionState::Failed(msg) => anyhow::bail!("recording failed: {msg}"),
        other => anyhow::bail!("recording ended in unexpected state {other:?}"),
    }
}
