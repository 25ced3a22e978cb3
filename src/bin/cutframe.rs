use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cutframe", version)]
struct Cli {
    /// Engine config JSON. `CUTFRAME_*` environment variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Cut the subject out of a photo and write it as a PNG.
    Segment(SegmentArgs),
    /// Print the initial subject transform for a theme as JSON.
    Place(PlaceArgs),
    /// Compose a preview (PNG) or export (JPEG) frame.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct SegmentArgs {
    /// Input photo.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// ONNX segmentation model. Defaults to the configured model path.
    #[arg(long)]
    model: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct PlaceArgs {
    /// Theme JSON.
    #[arg(long)]
    theme: PathBuf,

    /// Cut-out image.
    #[arg(long)]
    subject: PathBuf,

    /// Editing-stage width in pixels.
    #[arg(long)]
    stage_width: u32,

    /// Editing-stage height in pixels.
    #[arg(long)]
    stage_height: u32,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Theme JSON.
    #[arg(long)]
    theme: PathBuf,

    /// Cut-out image.
    #[arg(long)]
    subject: PathBuf,

    /// Edit document JSON (transform, adjustments, strokes, stage).
    #[arg(long)]
    edits: Option<PathBuf>,

    /// Directory theme layer references resolve against. Defaults to the theme's directory.
    #[arg(long)]
    layers: Option<PathBuf>,

    /// Output fidelity.
    #[arg(long, value_enum, default_value_t = ModeChoice::Preview)]
    mode: ModeChoice,

    /// Fail when a layer image cannot be loaded instead of omitting it.
    #[arg(long)]
    strict_layers: bool,

    /// Output path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeChoice {
    Preview,
    Export,
}

impl From<ModeChoice> for cutframe::RenderMode {
    fn from(m: ModeChoice) -> Self {
        match m {
            ModeChoice::Preview => cutframe::RenderMode::Preview,
            ModeChoice::Export => cutframe::RenderMode::Export,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    match cli.cmd {
        Command::Segment(args) => cmd_segment(args, config),
        Command::Place(args) => cmd_place(args),
        Command::Render(args) => cmd_render(args, config),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<cutframe::EngineConfig> {
    let mut config = match path {
        Some(p) => cutframe::EngineConfig::from_path(p)?,
        None => cutframe::EngineConfig::default(),
    };
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

fn read_subject(path: &Path) -> anyhow::Result<cutframe::ImageRgba8> {
    let bytes = std::fs::read(path).with_context(|| format!("read subject '{}'", path.display()))?;
    Ok(cutframe::decode_image(&bytes)?)
}

fn write_output(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))
}

fn cmd_segment(args: SegmentArgs, config: cutframe::EngineConfig) -> anyhow::Result<()> {
    let model = args
        .model
        .or_else(|| config.model_path.clone())
        .context("no segmentation model: pass --model or set CUTFRAME_MODEL_PATH")?;
    let photo = std::fs::read(&args.in_path)
        .with_context(|| format!("read photo '{}'", args.in_path.display()))?;

    let segmenter = cutframe::Segmenter::new(cutframe::global_engine(&model), config);
    let result = segmenter.segment(&photo);
    let cutout = result.into_result()?;

    let png = cutframe::encode_png_image(&cutout)?;
    write_output(&args.out, &png.bytes)?;
    eprintln!(
        "wrote {}x{} cut-out to {}",
        png.width,
        png.height,
        args.out.display()
    );
    Ok(())
}

fn cmd_place(args: PlaceArgs) -> anyhow::Result<()> {
    let theme = cutframe::Theme::from_path(&args.theme)?;
    let subject = read_subject(&args.subject)?;
    let stage = cutframe::Canvas::new(args.stage_width, args.stage_height)?;
    let transform = cutframe::initial_transform(&theme.placement, stage, subject.canvas())?;
    println!("{}", serde_json::to_string_pretty(&transform)?);
    Ok(())
}

fn cmd_render(args: RenderArgs, config: cutframe::EngineConfig) -> anyhow::Result<()> {
    let theme = cutframe::Theme::from_path(&args.theme)?;
    let subject = read_subject(&args.subject)?;
    let doc = match &args.edits {
        Some(p) => {
            let text = std::fs::read_to_string(p)
                .with_context(|| format!("read edits '{}'", p.display()))?;
            cutframe::EditDocument::from_json_str(&text)?
        }
        None => cutframe::EditDocument::default(),
    };

    let mode = cutframe::RenderMode::from(args.mode);
    let layers_root = args
        .layers
        .clone()
        .or_else(|| args.theme.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));
    let compositor = cutframe::Compositor::new(
        config,
        std::sync::Arc::new(cutframe::DirLayerSource::new(layers_root)),
    );

    let stage = doc
        .stage
        .unwrap_or_else(|| compositor.output_canvas(theme.native, mode));
    let transform = match doc.transform {
        Some(t) => t,
        None => cutframe::initial_transform(&theme.placement, stage, subject.canvas())?,
    };

    let req = cutframe::RenderRequest::new(&theme, &subject, transform)
        .with_adjustments(doc.adjustments)
        .with_strokes(&doc.strokes)
        .with_stage(stage)
        .with_mode(mode)
        .strict(args.strict_layers);

    let encoded = match compositor.render(&req)? {
        cutframe::RenderOutput::Preview(frame) => cutframe::encode_png(&frame)?,
        cutframe::RenderOutput::Export(image) => image,
    };
    write_output(&args.out, &encoded.bytes)?;
    eprintln!(
        "wrote {}x{} {} to {}",
        encoded.width,
        encoded.height,
        encoded.format.extension(),
        args.out.display()
    );
    Ok(())
}
