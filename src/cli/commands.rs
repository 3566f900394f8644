//! Subcommand handlers.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use camframe::buffer::{LengthPolicy, PixelBuffer};
use camframe::characteristics::{FrameRate, VideoCharacteristics};
use camframe::config::{default_path, Config, ConfigError};
use camframe::error::FrameError;
use camframe::format;
use camframe::session::CaptureSession;
use camframe::source::{SourceError, TestPatternSource};
use camframe::synth;

use super::args::{Args, Command, ConfigAction};
use super::enums::RowOrderArg;

/// Global flag to track if Ctrl+C was pressed.
static CTRLC_RECEIVED: AtomicBool = AtomicBool::new(false);

/// How often `stream` prints statistics.
const STATS_INTERVAL: Duration = Duration::from_secs(1);

/// Errors surfaced to the user by a subcommand.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Failed to install Ctrl+C handler: {0}")]
    Signal(#[from] ctrlc::Error),

    #[error("Config file already exists: {}\nUse 'camframe config show' to view current settings.", .0.display())]
    ConfigExists(PathBuf),
}

/// Dispatch parsed arguments to their handler.
pub fn run(args: Args) -> Result<(), CommandError> {
    let config_path = args.config.as_deref();
    let load_config = || -> Result<Config, CommandError> {
        let mut config = Config::load(config_path)?;
        if let Some(workers) = args.workers {
            config.conversion.workers = workers;
        }
        if args.zero_fill {
            config.conversion.length_policy = LengthPolicy::ZeroFill;
        }
        Ok(config)
    };

    match &args.command {
        Command::Formats => {
            list_formats();
            Ok(())
        }
        Command::Convert {
            input,
            format,
            width,
            height,
            row_order,
            output,
        } => convert_file(
            &load_config()?,
            input,
            format,
            *width,
            *height,
            *row_order,
            output,
        ),
        Command::Pattern {
            format,
            width,
            height,
            phase,
            output,
        } => write_pattern(format, *width, *height, *phase, output),
        Command::Stream {
            format,
            width,
            height,
            fps,
            frames,
            snapshot,
        } => {
            let config = load_config()?;
            let mut stream = config.stream.clone();
            stream.format = format.clone().unwrap_or(stream.format);
            stream.width = width.unwrap_or(stream.width);
            stream.height = height.unwrap_or(stream.height);
            stream.fps = fps.unwrap_or(stream.fps);
            let mode = Arc::new(stream.characteristics()?);
            let snapshot = snapshot.clone().or_else(|| {
                config
                    .output
                    .directory
                    .as_ref()
                    .map(|dir| dir.join("snapshot.png"))
            });
            run_stream(&config, mode, *frames, snapshot.as_deref())
        }
        Command::Config {
            action: ConfigAction::Show,
        } => show_config(&load_config()?, &config_file(config_path)),
        Command::Config {
            action: ConfigAction::Init,
        } => init_config(&config_file(config_path)),
    }
}

/// The file `config` subcommands act on: `--config` if given, else the default.
fn config_file(explicit: Option<&Path>) -> PathBuf {
    explicit.map_or_else(default_path, Path::to_path_buf)
}

/// Print the format registry.
fn list_formats() {
    println!(
        "{:<8} {:<13} {:>4}  {:<17} {}",
        "NAME", "COMPRESSION", "BPP", "LAYOUT", "ROWS"
    );
    for fmt in format::all() {
        println!(
            "{:<8} {:<13} {:>4}  {:<17} {}",
            fmt.name,
            fmt.compression_label(),
            fmt.bits_per_pixel,
            fmt.layout.to_string(),
            fmt.row_order
        );
    }
}

/// Ingest a raw frame file through a pixel buffer and save it as PNG.
fn convert_file(
    config: &Config,
    input: &Path,
    format_name: &str,
    width: u32,
    height: u32,
    row_order: RowOrderArg,
    output: &Path,
) -> Result<(), CommandError> {
    let format = format::resolve(format_name)?;
    let mode = Arc::new(
        VideoCharacteristics::new(width, height, FrameRate::default(), format)?
            .with_row_order(row_order.resolve(format)),
    );

    let data = std::fs::read(input).map_err(|e| CommandError::Io {
        path: input.to_path_buf(),
        source: e,
    })?;

    let mut buffer =
        PixelBuffer::with_options(config.conversion.length_policy, config.conversion.workers);
    buffer.capture(&data, Duration::ZERO, &mode)?;

    let started = Instant::now();
    let image = buffer.extract_image()?;
    log::debug!("Converted {} in {:?}", mode, started.elapsed());

    save_png(output, width, height, image)?;
    println!("Wrote {}x{} image to {}", width, height, output.display());
    Ok(())
}

/// Encode color bars in a raw format and write them to disk.
fn write_pattern(
    format_name: &str,
    width: u32,
    height: u32,
    phase: u32,
    output: &Path,
) -> Result<(), CommandError> {
    let format = format::resolve(format_name)?;
    let rgb = synth::color_bars_rgb(width, height, phase);
    let raw = synth::encode(format, &rgb, width, height, format.row_order)?;

    std::fs::write(output, &raw).map_err(|e| CommandError::Io {
        path: output.to_path_buf(),
        source: e,
    })?;
    println!(
        "Wrote {} bytes of {} {}x{} ({}) to {}",
        raw.len(),
        format.name,
        width,
        height,
        format.row_order,
        output.display()
    );
    Ok(())
}

/// Run the test-pattern source until the frame limit or Ctrl+C.
fn run_stream(
    config: &Config,
    mode: Arc<VideoCharacteristics>,
    frames: Option<u64>,
    snapshot: Option<&Path>,
) -> Result<(), CommandError> {
    setup_ctrlc_handler()?;

    let mut source = TestPatternSource::new(vec![Arc::clone(&mode)]);
    if let Some(limit) = frames {
        source = source.with_frame_limit(limit);
    }

    let mut session = CaptureSession::open(Box::new(source), mode, config.session_settings())?;
    session.start()?;
    println!("Streaming {} (Ctrl+C to stop)", session.mode());

    let mut last_report = Instant::now();
    while session.is_running() && !CTRLC_RECEIVED.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(50));
        if last_report.elapsed() >= STATS_INTERVAL {
            let stats = session.stats();
            println!(
                "  delivered: {}  rejected: {}",
                stats.delivered, stats.rejected
            );
            last_report = Instant::now();
        }
    }
    session.stop();

    let stats = session.stats();
    println!(
        "Stopped. delivered: {}  rejected: {}",
        stats.delivered, stats.rejected
    );

    if let Some(path) = snapshot {
        let image = session.latest_image()?;
        save_png(path, session.mode().width(), session.mode().height(), image)?;
        println!("Saved last frame to {}", path.display());
    }
    Ok(())
}

/// Print the effective configuration and where it was read from.
fn show_config(config: &Config, path: &Path) -> Result<(), CommandError> {
    println!("Current configuration:");
    println!();
    print!("{}", config.to_toml()?);
    println!();
    if path.exists() {
        println!("Config file: {} (exists)", path.display());
    } else {
        println!("Config file: {} (not found)", path.display());
    }
    Ok(())
}

/// Write a default config file, refusing to overwrite an existing one.
fn init_config(path: &Path) -> Result<(), CommandError> {
    if path.exists() {
        return Err(CommandError::ConfigExists(path.to_path_buf()));
    }
    Config::default().save(path)?;
    println!("Created config file: {}", path.display());
    Ok(())
}

/// Save a top-down RGB24 image as PNG.
fn save_png(path: &Path, width: u32, height: u32, rgb: Vec<u8>) -> Result<(), CommandError> {
    let actual = rgb.len();
    let image = image::RgbImage::from_raw(width, height, rgb).ok_or(FrameError::TruncatedFrame {
        expected: width as usize * height as usize * 3,
        actual,
    })?;
    image.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

/// Set up the Ctrl+C handler.
fn setup_ctrlc_handler() -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        CTRLC_RECEIVED.store(true, Ordering::SeqCst);
        eprintln!("\nReceived Ctrl+C, shutting down...");
    })
}
