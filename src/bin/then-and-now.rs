use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use then_and_now::{
    ArrowColor, ArrowStyle, AspectRatio, DeviceClass, SlotId, Upload, Workspace, WorkspaceOpts,
    WriteOutcome,
};

#[derive(Parser, Debug)]
#[command(name = "then-and-now", version, about = "Before/after photo compositor")]
struct Cli {
    /// Directory for stored images and records. Defaults to the platform data directory.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// JSON config file (`WorkspaceOpts`).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// TrueType/OpenType font for labels.
    #[arg(long, global = true)]
    font: Option<PathBuf>,

    /// Device class selecting upload limits: mobile or desktop (also read from THEN_AND_NOW_DEVICE).
    #[arg(long, global = true)]
    device: Option<DeviceClass>,

    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Store an image in a slot.
    Upload {
        /// `before` or `after`.
        slot: SlotId,
        /// Image file (JPEG, PNG, WebP).
        path: PathBuf,
    },
    /// Clear a slot.
    Remove {
        /// `before` or `after`.
        slot: SlotId,
    },
    /// Set a slot's pan position (percent).
    Position {
        /// `before` or `after`.
        slot: SlotId,
        /// Horizontal position, 0..=100.
        x: f64,
        /// Vertical position, 0..=100.
        y: f64,
    },
    /// Change a slot's zoom.
    Zoom(ZoomArgs),
    /// Center and unzoom a slot.
    Reset {
        /// `before` or `after`.
        slot: SlotId,
    },
    /// Show or change composite settings.
    Settings(SettingsArgs),
    /// Show slot status.
    Status,
    /// Render a size-capped preview PNG.
    Preview {
        /// Output PNG path.
        #[arg(long)]
        out: PathBuf,
    },
    /// Render the full-resolution composite as `then_and_now_<ms>.png`.
    Export {
        /// Output directory.
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Load demo images into both slots for this session only, then write a preview.
    Samples {
        /// Image for the first slot.
        before: PathBuf,
        /// Image for the second slot.
        after: PathBuf,
        /// Output PNG path for the preview.
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Args, Debug)]
struct ZoomArgs {
    /// `before` or `after`.
    slot: SlotId,
    /// Step in by 0.1.
    #[arg(long = "in", conflicts_with_all = ["out", "set"])]
    zoom_in: bool,
    /// Step out by 0.1.
    #[arg(long, conflicts_with = "set")]
    out: bool,
    /// Absolute zoom, 1..=3.
    #[arg(long)]
    set: Option<f64>,
}

#[derive(Args, Debug)]
struct SettingsArgs {
    /// Output aspect ratio: auto, 16:9, 9:16, 21:9, 3:4, 4:3.
    #[arg(long)]
    aspect: Option<AspectRatio>,
    /// Label on the first half.
    #[arg(long)]
    before_label: Option<String>,
    /// Label on the second half.
    #[arg(long)]
    after_label: Option<String>,
    /// Arrow style: classic, modern, minimal, none.
    #[arg(long)]
    arrow_style: Option<ArrowStyle>,
    /// Arrow color: white, black, red.
    #[arg(long)]
    arrow_color: Option<ArrowColor>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let opts = resolve_opts(&cli)?;
    let mut ws = Workspace::open(opts)?;
    let result = run(&mut ws, cli.cmd);
    ws.close();
    result
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_opts(cli: &Cli) -> anyhow::Result<WorkspaceOpts> {
    let mut opts = match &cli.config {
        Some(path) => WorkspaceOpts::from_path(path)?,
        None => WorkspaceOpts::default(),
    }
    .with_device_from_env();

    if let Some(dir) = &cli.data_dir {
        opts.data_dir = Some(dir.clone());
    } else if opts.data_dir.is_none() {
        opts.data_dir = then_and_now::config::default_data_dir();
    }
    if let Some(font) = &cli.font {
        opts.font_path = Some(font.clone());
    }
    if let Some(device) = cli.device {
        opts.device_class = device;
    }
    Ok(opts)
}

fn run(ws: &mut Workspace, cmd: Command) -> anyhow::Result<()> {
    match cmd {
        Command::Upload { slot, path } => {
            let outcome = ws.upload(slot, Upload::from_path(&path)?)?;
            report_write(&format!("{slot} image"), outcome);
            print_status(ws);
        }
        Command::Remove { slot } => {
            ws.remove(slot);
            print_status(ws);
        }
        Command::Position { slot, x, y } => {
            let vp = ws.slots_mut().set_position(slot, x, y);
            println!("{slot}: x={:.1} y={:.1} zoom={:.2}", vp.x_pos, vp.y_pos, vp.zoom);
        }
        Command::Zoom(args) => {
            let slots = ws.slots_mut();
            let vp = match (args.zoom_in, args.out, args.set) {
                (_, _, Some(z)) => slots.set_zoom(args.slot, z),
                (true, _, None) => slots.zoom_in(args.slot),
                (false, true, None) => slots.zoom_out(args.slot),
                (false, false, None) => anyhow::bail!("pass one of --in, --out or --set"),
            };
            println!("{}: zoom={:.2}", args.slot, vp.zoom);
        }
        Command::Reset { slot } => {
            ws.slots_mut().reset(slot);
            println!("{slot}: reset");
        }
        Command::Settings(args) => {
            let mut settings = ws.settings().clone();
            let changed = args.aspect.is_some()
                || args.before_label.is_some()
                || args.after_label.is_some()
                || args.arrow_style.is_some()
                || args.arrow_color.is_some();
            if let Some(v) = args.aspect {
                settings.aspect_ratio = v;
            }
            if let Some(v) = args.before_label {
                settings.before_label = v;
            }
            if let Some(v) = args.after_label {
                settings.after_label = v;
            }
            if let Some(v) = args.arrow_style {
                settings.arrow_style = v;
            }
            if let Some(v) = args.arrow_color {
                settings.arrow_color = v;
            }
            if changed {
                let outcome = ws.update_settings(settings);
                report_write("settings", outcome);
            }
            println!(
                "{}",
                serde_json::to_string_pretty(ws.settings()).context("format settings")?
            );
        }
        Command::Status => print_status(ws),
        Command::Preview { out } => write_preview(ws, &out)?,
        Command::Export { dir } => {
            let path = ws.export_png(&dir)?;
            eprintln!("wrote {}", path.display());
        }
        Command::Samples { before, after, out } => {
            ws.load_samples(Upload::from_path(&before)?, Upload::from_path(&after)?)?;
            write_preview(ws, &out)?;
        }
    }
    Ok(())
}

fn write_preview(ws: &mut Workspace, out: &Path) -> anyhow::Result<()> {
    let frame = ws.render_preview()?;
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    frame.write_png(out)?;
    eprintln!("wrote {} ({}x{})", out.display(), frame.width, frame.height);
    Ok(())
}

fn report_write(what: &str, outcome: WriteOutcome) {
    if !outcome.is_persisted() {
        eprintln!("note: {what} kept for this session only (storage unavailable)");
    }
}

fn print_status(ws: &Workspace) {
    for s in ws.status() {
        let size = s
            .size
            .map(|(w, h)| format!("{w}x{h}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}: {:?} size={} stored={} x={:.1} y={:.1} zoom={:.2}",
            s.slot,
            s.phase,
            size,
            s.has_stored_content,
            s.viewport.x_pos,
            s.viewport.y_pos,
            s.viewport.zoom
        );
    }
}
