use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "ctaforge", version, about = "Render and export animated subscribe overlays")]
struct Cli {
    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the default configuration as JSON.
    Init(InitArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Export one animation cycle as video.
    Export(ExportArgs),
    /// Open a live preview window (requires the `preview` feature).
    Preview(PreviewArgs),
}

#[derive(Parser, Debug)]
struct InitArgs {
    /// Output JSON path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Configuration JSON; defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Absolute animation time in milliseconds.
    #[arg(long, default_value_t = 2600.0)]
    time_ms: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Configuration JSON; defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output file.
    #[arg(long)]
    out: PathBuf,

    /// Container; inferred from `--out` or the configuration when omitted.
    #[arg(long, value_enum)]
    format: Option<FormatChoice>,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Configuration JSON; defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Window width in pixels; height follows the layout's aspect.
    #[arg(long, default_value_t = 960)]
    width: u32,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Mov,
    Webm,
    Apng,
}

impl From<FormatChoice> for ctaforge::ExportFormat {
    fn from(f: FormatChoice) -> Self {
        match f {
            FormatChoice::Mov => Self::Mov,
            FormatChoice::Webm => Self::Webm,
            FormatChoice::Apng => Self::Apng,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.json_logs);
    match cli.cmd {
        Command::Init(args) => cmd_init(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Export(args) => cmd_export(args),
        Command::Preview(args) => cmd_preview(args),
    }
}

fn init_logging(level: &str, json: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    if json {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
}

/// Configuration plus the directory its relative asset paths resolve against.
fn load_config(path: Option<&Path>) -> anyhow::Result<(ctaforge::CtaConfig, PathBuf)> {
    match path {
        Some(p) => {
            let cfg = ctaforge::CtaConfig::from_path(p)
                .with_context(|| format!("load configuration '{}'", p.display()))?;
            let base = p
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            Ok((cfg, base))
        }
        None => Ok((ctaforge::CtaConfig::default(), PathBuf::from("."))),
    }
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_init(args: InitArgs) -> anyhow::Result<()> {
    ensure_parent(&args.out)?;
    let json = ctaforge::CtaConfig::default().to_json_pretty()?;
    std::fs::write(&args.out, json)
        .with_context(|| format!("write configuration '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let (cfg, base) = load_config(args.config.as_deref())?;
    cfg.validate()?;
    let assets = ctaforge::RenderAssets::load(&cfg, &base)?;

    let fps = ctaforge::Fps::new(ctaforge::EXPORT_FPS, 1)?;
    let frame = ctaforge::render_still(&cfg, &assets, args.time_ms, fps)?;

    ensure_parent(&args.out)?;
    image::save_buffer_with_format(
        &args.out,
        &frame.to_straight_rgba8(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let (mut cfg, base) = load_config(args.config.as_deref())?;
    cfg.output.format = args
        .format
        .map(Into::into)
        .or_else(|| ctaforge::ExportFormat::from_extension(&args.out))
        .unwrap_or(cfg.output.format);
    cfg.validate()?;
    let assets = ctaforge::RenderAssets::load(&cfg, &base)?;

    let sink = ctaforge::default_sink_for(cfg.output.format, &cfg.output);
    let (observer, events) = ctaforge::ChannelObserver::new();
    let handle = ctaforge::ExportJob::spawn(
        cfg,
        assets,
        ctaforge::FixedDestination::new(&args.out),
        sink,
        observer,
    )?;

    let mut stderr = std::io::stderr();
    for ev in events {
        if let ctaforge::ExportEvent::Progress { done, total } = ev {
            let _ = write!(stderr, "\rrendering {done}/{total}");
            let _ = stderr.flush();
        }
    }
    let _ = writeln!(stderr);

    match handle.join()? {
        ctaforge::ExportOutcome::Completed { frames, path } => {
            eprintln!("wrote {} ({frames} frames)", path.display());
        }
        ctaforge::ExportOutcome::SaveCancelled => eprintln!("save cancelled"),
    }
    Ok(())
}

#[cfg(feature = "preview")]
fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let (cfg, base) = load_config(args.config.as_deref())?;
    cfg.validate()?;
    let assets = ctaforge::RenderAssets::load(&cfg, &base)?;

    let canvas = cfg.physical_size();
    let width = args.width.max(16);
    let height = ((u64::from(width) * u64::from(canvas.height)) / u64::from(canvas.width)).max(1);
    let height = u32::try_from(height).context("preview height overflow")?;

    let mut presenter =
        ctaforge::MinifbPresenter::new("ctaforge preview", width as usize, height as usize)?;
    let mut driver = ctaforge::PreviewDriver::new(cfg, assets, width, height)?;
    driver.run(&mut presenter)?;
    Ok(())
}

#[cfg(not(feature = "preview"))]
fn cmd_preview(_args: PreviewArgs) -> anyhow::Result<()> {
    anyhow::bail!("this build has no preview window; rebuild with `--features preview`")
}
