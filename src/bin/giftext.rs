use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use giftext::{GifTextError, HolePolicy, JobConfig, PaletteKind};

#[derive(Parser, Debug)]
#[command(name = "giftext", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a captioned GIF.
    Render(RenderArgs),
    /// Print the per-frame tokens of a caption.
    Segment(SegmentArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Job JSON. When given, image/caption flags are ignored.
    #[arg(long = "in", conflicts_with_all = ["images", "caption"])]
    in_path: Option<PathBuf>,

    /// Source image, once per frame, in display order.
    #[arg(long = "image")]
    images: Vec<PathBuf>,

    /// Caption with one status glyph per frame.
    #[arg(long)]
    caption: Option<String>,

    /// Output GIF path.
    #[arg(long)]
    out: PathBuf,

    /// Frame delay in hundredths of a second.
    #[arg(long, default_value_t = 100)]
    delay: u16,

    /// Output frame width (before the caption band).
    #[arg(long, default_value_t = 300)]
    width: u32,

    /// Output frame height (before the caption band).
    #[arg(long, default_value_t = 300)]
    height: u32,

    /// Directory holding icon assets. Defaults to the first image's directory.
    #[arg(long)]
    icon_dir: Option<PathBuf>,

    /// Extra font file or directory for caption text (repeatable).
    #[arg(long = "font")]
    fonts: Vec<PathBuf>,

    /// Keep going when some frames fail.
    #[arg(long)]
    lenient: bool,

    #[arg(long, value_enum, default_value_t = PaletteChoice::Plan9)]
    palette: PaletteChoice,

    /// Worker threads.
    #[arg(long)]
    threads: Option<usize>,

    /// Cancel the batch if no frame completes within this many milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,
}

#[derive(Parser, Debug)]
struct SegmentArgs {
    caption: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PaletteChoice {
    Plan9,
    Websafe,
}

impl From<PaletteChoice> for PaletteKind {
    fn from(c: PaletteChoice) -> Self {
        match c {
            PaletteChoice::Plan9 => PaletteKind::Plan9,
            PaletteChoice::Websafe => PaletteKind::WebSafe,
        }
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let res = match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Segment(args) => cmd_segment(args),
    };

    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<GifTextError>() {
                Some(e) => eprintln!("giftext: {} stage failed: {e}", e.kind().stage()),
                None => eprintln!("giftext: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn job_from_args(args: &RenderArgs) -> anyhow::Result<JobConfig> {
    if let Some(path) = &args.in_path {
        return Ok(JobConfig::load(path)?);
    }

    let caption = args
        .caption
        .clone()
        .context("--caption is required without --in")?;
    let job = JobConfig {
        images: args.images.clone(),
        caption,
        delay_cs: args.delay,
        width: args.width,
        height: args.height,
        icons: None,
        icon_dir: args.icon_dir.clone(),
        font_files: args.fonts.clone(),
        hole_policy: if args.lenient {
            HolePolicy::Lenient
        } else {
            HolePolicy::Strict
        },
        palette: args.palette.into(),
        threads: args.threads,
        unit_timeout_ms: args.timeout_ms,
        style: Default::default(),
    };
    job.validate()?;
    Ok(job)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let job = job_from_args(&args)?;
    let images = job.read_images()?;

    let fontdb = giftext::build_fontdb(&job.font_files);
    let icons = Arc::new(giftext::DirIconSource::new(job.icon_root()));
    let pipeline =
        giftext::GifPipeline::new(job.pipeline_opts()?, job.glyph_map(), icons, fontdb)?;

    let started = std::time::Instant::now();
    let run = pipeline.run(images, &job.caption)?;
    giftext::write_gif(&args.out, &run.bytes)?;

    for hole in &run.holes {
        eprintln!("skipped frame {}: {}", hole.index, hole.failure.message);
    }
    eprintln!(
        "wrote {} ({} frames, {} bytes, {:.2?})",
        args.out.display(),
        run.frame_count,
        run.bytes.len(),
        started.elapsed()
    );
    Ok(())
}

fn cmd_segment(args: SegmentArgs) -> anyhow::Result<()> {
    for (i, token) in giftext::segment_caption(&args.caption).iter().enumerate() {
        let glyph = if token.glyph.is_empty() {
            "<none>"
        } else {
            token.glyph.as_str()
        };
        println!("{i}\t{}\t{glyph}", token.text);
    }
    Ok(())
}
