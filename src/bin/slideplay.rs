use std::{
    cell::RefCell,
    io::{BufWriter, Write as _},
    path::{Path, PathBuf},
    rc::Rc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use slideplay::animation::{NodeKind, NodeState};
use slideplay::transition::known_transitions;
use slideplay::{
    Attribute, ElementSnapshot, ManualTimeSource, MetaPresentation, PresentationInfo,
    RecordingSurface, SlideShow, SlideShowConfig, SurfaceRef, TransitionFrame, TransitionKind,
};

#[derive(Parser, Debug)]
#[command(name = "slideplay", version)]
struct Cli {
    /// Log filter, e.g. `debug` or `slideplay::activity=trace`.
    #[arg(long, global = true, default_value = "warn")]
    log: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the slide index, transitions and effect nodes of a presentation.
    Inspect(InspectArgs),
    /// Play a presentation on a simulated clock and print one JSON line per tick.
    Simulate(SimulateArgs),
    /// List every supported transition type/subtype pair.
    Transitions,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Input presentation JSON.
    input: PathBuf,

    /// Slide show settings JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct SimulateArgs {
    /// Input presentation JSON.
    input: PathBuf,

    /// Slide show settings JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Simulated ticks per second [default: the config's preferred rate].
    #[arg(long)]
    fps: Option<f64>,

    /// Stop after this many simulated seconds.
    #[arg(long, default_value_t = 30.0)]
    seconds: f64,

    /// Slide to start from (0-based, hidden slides excluded).
    #[arg(long, default_value_t = 0)]
    start: usize,

    /// Show slides without their transitions.
    #[arg(long)]
    no_transitions: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log)?;
    match cli.cmd {
        Command::Inspect(args) => cmd_inspect(args),
        Command::Simulate(args) => cmd_simulate(args),
        Command::Transitions => cmd_transitions(),
    }
}

fn init_logging(filter: &str) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(filter).with_context(|| format!("parse log filter '{filter}'"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn read_presentation(path: &Path) -> anyhow::Result<PresentationInfo> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read presentation '{}'", path.display()))?;
    PresentationInfo::from_json(&text)
        .with_context(|| format!("parse presentation '{}'", path.display()))
}

fn read_config(path: Option<&Path>) -> anyhow::Result<SlideShowConfig> {
    let Some(path) = path else {
        return Ok(SlideShowConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config '{}'", path.display()))?;
    SlideShowConfig::from_json(&text).with_context(|| format!("parse config '{}'", path.display()))
}

#[derive(Serialize)]
struct SlideSummary<'a> {
    index: usize,
    hash: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    transition: Option<TransitionSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_slide_duration: Option<f64>,
    shapes: usize,
    nodes: Vec<NodeSummary<'a>>,
}

#[derive(Serialize)]
struct TransitionSummary {
    kind: TransitionKind,
    duration: f64,
    valid: bool,
}

#[derive(Serialize)]
struct NodeSummary<'a> {
    id: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    kind: Option<NodeKind>,
    attribute: Option<Attribute>,
    state: NodeState,
    #[serde(skip_serializing_if = "Option::is_none")]
    invalid_reason: Option<&'a str>,
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let info = read_presentation(&args.input)?;
    let config = read_config(args.config.as_deref())?;

    let master = Rc::new(slideplay::ElapsedTime::new(Rc::new(ManualTimeSource::new(0.0))));
    let mut presentation = MetaPresentation::new();
    presentation.update(&info, &master, config.minimum_frames_per_second);

    let slides: Vec<SlideSummary<'_>> = presentation
        .slides()
        .map(|slide| SlideSummary {
            index: slide.index(),
            hash: slide.hash(),
            transition: slide.transition().map(|t| TransitionSummary {
                kind: t.kind(),
                duration: t.duration(),
                valid: t.is_valid(),
            }),
            next_slide_duration: slide.next_slide_duration(),
            shapes: slide.info().shapes.len(),
            nodes: slide
                .animations()
                .nodes()
                .iter()
                .map(|node| NodeSummary {
                    id: node.id(),
                    name: node.name(),
                    kind: node.kind(),
                    attribute: node.attribute(),
                    state: node.state(),
                    invalid_reason: node.invalid_reason(),
                })
                .collect(),
        })
        .collect();

    let json = serde_json::to_string_pretty(&slides).context("serialize slide index")?;
    println!("{json}");
    eprintln!(
        "{} of {} slides shown",
        presentation.number_of_slides(),
        info.slides.len()
    );
    Ok(())
}

#[derive(Serialize)]
struct TickRecord<'a> {
    time: f64,
    index: Option<usize>,
    slide: Option<&'a str>,
    transition: bool,
    effects: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    frames: Vec<TransitionFrame>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    elements: Vec<ElementSnapshot>,
}

fn cmd_simulate(args: SimulateArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        args.seconds.is_finite() && args.seconds >= 0.0,
        "--seconds must be a non-negative number"
    );

    let info = read_presentation(&args.input)?;
    let mut config = read_config(args.config.as_deref())?;
    if args.no_transitions {
        config.slide_transitions = false;
    }
    let fps = args.fps.unwrap_or(config.preferred_frames_per_second);
    anyhow::ensure!(fps.is_finite() && fps > 0.0, "--fps must be a positive number");

    let source = Rc::new(ManualTimeSource::new(0.0));
    let surface = Rc::new(RefCell::new(RecordingSurface::new()));
    let surface_ref: SurfaceRef = surface.clone();
    let mut show = SlideShow::new(config, source.clone(), surface_ref);
    show.load(&info);

    let slides = show.presentation().number_of_slides();
    anyhow::ensure!(slides > 0, "presentation has no visible slides");
    if !show.start(args.start) {
        anyhow::bail!("start slide {} is out of range (0..{slides})", args.start);
    }

    let step = 1.0 / fps;
    let mut out = BufWriter::new(std::io::stdout().lock());
    let mut tick: u64 = 0;
    loop {
        let time = tick as f64 * step;
        if tick > 0 {
            source.set(time);
            show.update();
        }

        let frames = surface.borrow_mut().take();
        let effects = show.is_animation_playing();
        let record = TickRecord {
            time,
            index: show.current_index(),
            slide: show.presentation().current_slide_hash(),
            transition: show.is_transition_playing(),
            effects,
            frames,
            elements: if effects { show.snapshot() } else { Vec::new() },
        };
        serde_json::to_writer(&mut out, &record).context("write tick record")?;
        writeln!(out).context("write tick record")?;

        if !show.is_running() {
            // Idle slide: advance the way a click would.
            if show.next_slide() {
                tracing::info!(time, slide = ?show.current_index(), "advanced after idle slide");
            } else {
                tracing::info!(time, "last slide settled");
                break;
            }
        }
        if time >= args.seconds {
            break;
        }
        tick += 1;
    }
    out.flush().context("flush output")?;
    Ok(())
}

fn cmd_transitions() -> anyhow::Result<()> {
    let mut out = BufWriter::new(std::io::stdout().lock());
    for (ty, subtype, kind) in known_transitions() {
        writeln!(out, "{:<22} {:<26} {kind}", ty.name(), subtype.name())
            .context("write transition list")?;
    }
    out.flush().context("flush output")?;
    Ok(())
}
