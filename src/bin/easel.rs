use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
    rc::Rc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use easel::Clock as _;
use tracing_subscriber::EnvFilter;

/// Headless viewport used when a document is opened for processing.
const VIEWPORT: (f64, f64) = (1400.0, 1000.0);
const FRAME_MS: u64 = 16;

#[derive(Parser, Debug)]
#[command(name = "easel", version)]
struct Cli {
    /// Session config JSON (timings, frame layout, service).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a document containing the drawing frame.
    Init(InitArgs),
    /// Export the drawing frame and its unlocked contents as PNG.
    Export(ExportArgs),
    /// Reveal a candidate image to completion and commit it.
    Reveal(RevealArgs),
    /// Print the generation request for a prompt.
    Request(RequestArgs),
    /// Send a generation request and save the returned image.
    #[cfg(feature = "http")]
    Generate(GenerateArgs),
}

#[derive(Parser, Debug)]
struct InitArgs {
    /// Output document JSON.
    #[arg(long)]
    out: PathBuf,

    #[arg(long, default_value_t = VIEWPORT.0)]
    viewport_width: f64,

    #[arg(long, default_value_t = VIEWPORT.1)]
    viewport_height: f64,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Input document JSON.
    #[arg(long)]
    doc: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RevealArgs {
    /// Input document JSON.
    #[arg(long)]
    doc: PathBuf,

    /// Candidate image (PNG or JPEG).
    #[arg(long)]
    candidate: PathBuf,

    /// Also write the before image here.
    #[arg(long)]
    before: Option<PathBuf>,

    /// Also write the staged after image here.
    #[arg(long)]
    after: Option<PathBuf>,

    /// Output document JSON (defaults to overwriting `--doc`).
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RequestArgs {
    /// Input document JSON.
    #[arg(long)]
    doc: PathBuf,

    #[arg(long)]
    project_id: String,

    #[arg(long)]
    prompt: String,
}

#[cfg(feature = "http")]
#[derive(Parser, Debug)]
struct GenerateArgs {
    #[command(flatten)]
    request: RequestArgs,

    /// Output path for the generated image.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_deref())?;
    match cli.cmd {
        Command::Init(args) => cmd_init(&cfg, args),
        Command::Export(args) => cmd_export(&cfg, args),
        Command::Reveal(args) => cmd_reveal(&cfg, args),
        Command::Request(args) => cmd_request(&cfg, args),
        #[cfg(feature = "http")]
        Command::Generate(args) => cmd_generate(&cfg, args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<easel::EaselConfig> {
    let cfg = match path {
        Some(path) => easel::EaselConfig::load(path)?,
        None => easel::EaselConfig::default(),
    };
    Ok(cfg.with_env_overrides())
}

fn read_doc(path: &Path, clock: &easel::ManualClock) -> anyhow::Result<easel::MemoryCanvas> {
    let f = File::open(path).with_context(|| format!("open document '{}'", path.display()))?;
    let doc: easel::Document =
        serde_json::from_reader(BufReader::new(f)).with_context(|| "parse document JSON")?;
    let viewport = easel::Size::new(VIEWPORT.0, VIEWPORT.1);
    Ok(easel::MemoryCanvas::from_document(
        doc,
        viewport,
        Rc::new(clock.clone()),
    )?)
}

fn write_doc(path: &Path, canvas: &easel::MemoryCanvas) -> anyhow::Result<()> {
    create_parent(path)?;
    let f = File::create(path).with_context(|| format!("create document '{}'", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(f), canvas.document())
        .with_context(|| format!("write document '{}'", path.display()))?;
    Ok(())
}

fn write_bytes(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    create_parent(path)?;
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))
}

fn create_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn drawing_area(
    canvas: &easel::MemoryCanvas,
    cfg: &easel::EaselConfig,
) -> anyhow::Result<easel::Region> {
    let id = easel::find_frame(canvas, &cfg.frame.label)
        .with_context(|| format!("document has no frame named '{}'", cfg.frame.label))?;
    Ok(easel::Region::new(id))
}

fn cmd_init(cfg: &easel::EaselConfig, args: InitArgs) -> anyhow::Result<()> {
    let clock = easel::ManualClock::default();
    let viewport = easel::Size::new(args.viewport_width, args.viewport_height);
    let mut canvas = easel::MemoryCanvas::new(viewport, Rc::new(clock));
    let region = easel::find_or_create_frame(&mut canvas, &cfg.frame)?;
    write_doc(&args.out, &canvas)?;
    eprintln!("wrote {} (frame {})", args.out.display(), region.container());
    Ok(())
}

fn cmd_export(cfg: &easel::EaselConfig, args: ExportArgs) -> anyhow::Result<()> {
    let canvas = read_doc(&args.doc, &easel::ManualClock::default())?;
    let region = drawing_area(&canvas, cfg)?;
    let snapshot = easel::export_snapshot(&canvas, &region)?
        .context("drawing area disappeared during export")?;
    write_bytes(&args.out, snapshot.png())?;
    eprintln!(
        "wrote {} ({}x{}, {} shapes)",
        args.out.display(),
        snapshot.width(),
        snapshot.height(),
        snapshot.shape_count()
    );
    Ok(())
}

fn cmd_reveal(cfg: &easel::EaselConfig, args: RevealArgs) -> anyhow::Result<()> {
    let clock = easel::ManualClock::default();
    let mut canvas = read_doc(&args.doc, &clock)?;
    let region = drawing_area(&canvas, cfg)?;

    let bytes = std::fs::read(&args.candidate)
        .with_context(|| format!("read candidate '{}'", args.candidate.display()))?;
    let mut reveal = easel::RevealController::new(
        region,
        cfg.reveal.clone(),
        cfg.staging.clone(),
    );
    reveal.offer(easel::CandidateImage::from_bytes(bytes)?)?;
    reveal.accept(&mut canvas, clock.now())?;

    if let Some(overlay) = reveal.overlay() {
        if let Some(path) = &args.before {
            write_bytes(path, overlay.before.png())?;
        }
        if let (Some(path), Some(after)) = (&args.after, overlay.after) {
            write_bytes(path, after.png())?;
        }
    }

    let limit = cfg.reveal.duration_ms + cfg.reveal.completion_grace_ms + FRAME_MS;
    let shape = loop {
        let now = clock.advance(FRAME_MS);
        if let Some(easel::RevealEvent::Completed { shape, .. }) = reveal.tick(&mut canvas, now)? {
            break shape;
        }
        anyhow::ensure!(now.0 <= limit, "reveal did not complete within {limit}ms");
    };

    let out = args.out.as_deref().unwrap_or(&args.doc);
    write_doc(out, &canvas)?;
    eprintln!("committed {shape}; wrote {}", out.display());
    Ok(())
}

fn cmd_request(cfg: &easel::EaselConfig, args: RequestArgs) -> anyhow::Result<()> {
    let canvas = read_doc(&args.doc, &easel::ManualClock::default())?;
    let region = drawing_area(&canvas, cfg)?;
    let request =
        easel::build_generation_request(&canvas, &region, &args.project_id, &args.prompt)?;
    println!("{}", serde_json::to_string_pretty(&request)?);
    Ok(())
}

#[cfg(feature = "http")]
fn cmd_generate(cfg: &easel::EaselConfig, args: GenerateArgs) -> anyhow::Result<()> {
    use easel::GenerationService as _;

    let canvas = read_doc(&args.request.doc, &easel::ManualClock::default())?;
    let region = drawing_area(&canvas, cfg)?;
    let request = easel::build_generation_request(
        &canvas,
        &region,
        &args.request.project_id,
        &args.request.prompt,
    )?;
    let backend = easel::HttpBackend::new(&cfg.service)?;
    let response = backend.generate(&request)?;
    if let Some(text) = &response.text_response {
        tracing::info!(text = %text, "model response");
    }
    let candidate = response.candidate()?;
    write_bytes(&args.out, candidate.bytes())?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}
