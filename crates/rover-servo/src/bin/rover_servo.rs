use std::collections::BTreeMap;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use clap::{Parser, Subcommand, ValueEnum};
use log::{info, LevelFilter};
use rover_servo::approach::{ActuatorChannel, Command, CommandSink, LoggingSink, TcpActuators};
use rover_servo::core::{prepare_frame, GrayImage, PixelPos};
use rover_servo::vision::{locate_marker, FrameEstimate, NavigationEstimator};
use rover_servo::{load_frame, ControlLoop, ImageSequence, ServoConfig};
use serde::Serialize;

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "rover-servo")]
#[command(about = "Overhead-camera visual servo for a forklift rover", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    log_level: LevelFilter,

    /// Emit per-cycle tracing spans instead of plain log lines; `RUST_LOG` overrides `--log-level`
    #[cfg(feature = "tracing")]
    #[arg(long, global = true)]
    tracing: bool,

    /// JSON tracing output
    #[cfg(feature = "tracing")]
    #[arg(long, global = true, requires = "tracing")]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the control loop over a directory of frames
    Run {
        /// Directory of PNG/JPEG frames, replayed in file-name order
        #[arg(long)]
        frames: PathBuf,

        /// Configuration file path
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Restart from the first frame when the directory is exhausted
        #[arg(long = "loop")]
        looping: bool,

        /// Log commands instead of connecting to the rover
        #[arg(long)]
        dry_run: bool,

        /// Stop after this many cycles
        #[arg(long)]
        max_cycles: Option<u64>,
    },

    /// Localize rover and target in one image and print a JSON report
    Locate {
        #[arg(long)]
        image: PathBuf,

        #[arg(long, short)]
        config: Option<PathBuf>,
    },

    /// Write the binary threshold mask of one profile
    Mask {
        #[arg(long)]
        image: PathBuf,

        /// Marker profile name, or `target` for the value mask
        #[arg(long)]
        profile: String,

        #[arg(long)]
        out: PathBuf,

        #[arg(long, short)]
        config: Option<PathBuf>,
    },

    /// Send a single command to the rover
    Send {
        #[arg(long, value_enum)]
        channel: ChannelArg,

        #[arg(long, allow_negative_numbers = true)]
        value: f64,

        #[arg(long, short)]
        config: Option<PathBuf>,
    },

    /// Print the default configuration as JSON
    DefaultConfig,
}

#[derive(Clone, Copy, ValueEnum)]
enum ChannelArg {
    Angular,
    Linear,
    Fork,
}

impl From<ChannelArg> for ActuatorChannel {
    fn from(arg: ChannelArg) -> Self {
        match arg {
            ChannelArg::Angular => ActuatorChannel::Angular,
            ChannelArg::Linear => ActuatorChannel::Linear,
            ChannelArg::Fork => ActuatorChannel::Fork,
        }
    }
}

#[derive(Serialize)]
struct LocateReport {
    image: PathBuf,
    markers: BTreeMap<String, Option<PixelPos>>,
    #[serde(flatten)]
    estimate: FrameEstimate,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match init_logging(&cli).and_then(|()| dispatch(cli.command)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            let mut source = err.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn dispatch(command: Commands) -> CliResult<()> {
    match command {
        Commands::Run {
            frames,
            config,
            looping,
            dry_run,
            max_cycles,
        } => run(&frames, config.as_deref(), looping, dry_run, max_cycles),
        Commands::Locate { image, config } => locate(&image, config.as_deref()),
        Commands::Mask {
            image,
            profile,
            out,
            config,
        } => mask(&image, &profile, &out, config.as_deref()),
        Commands::Send {
            channel,
            value,
            config,
        } => send(channel.into(), value, config.as_deref()),
        Commands::DefaultConfig => {
            println!("{}", ServoConfig::default().to_json_pretty()?);
            Ok(())
        }
    }
}

fn init_logging(cli: &Cli) -> CliResult<()> {
    #[cfg(feature = "tracing")]
    {
        if cli.tracing {
            rover_servo::core::init_tracing(cli.json, cli.log_level);
            return Ok(());
        }
    }
    rover_servo::core::init_with_level(cli.log_level)?;
    Ok(())
}

/// Set `stop` on Ctrl-C from a background signal runtime.
fn watch_interrupt(stop: Arc<AtomicBool>) -> CliResult<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    thread::Builder::new()
        .name("ctrl-c".into())
        .spawn(move || {
            rt.block_on(async {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("interrupt received, shutting down");
                    stop.store(true, Ordering::Relaxed);
                }
            })
        })?;
    Ok(())
}

fn run(
    frames: &Path,
    config: Option<&Path>,
    looping: bool,
    dry_run: bool,
    max_cycles: Option<u64>,
) -> CliResult<()> {
    let cfg = ServoConfig::load_or_default(config)?;
    let source = ImageSequence::open(frames)?.looping(looping);

    let sink: Box<dyn CommandSink> = if dry_run {
        Box::new(LoggingSink)
    } else {
        Box::new(TcpActuators::connect(&cfg.actuators)?)
    };

    let stop = Arc::new(AtomicBool::new(false));
    watch_interrupt(Arc::clone(&stop))?;

    let mut servo = ControlLoop::new(&cfg, source, sink).with_max_cycles(max_cycles);
    let summary = servo.run(&stop)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn locate(image: &Path, config: Option<&Path>) -> CliResult<()> {
    let cfg = ServoConfig::load_or_default(config)?;
    let frame = load_frame(image)?;
    let estimator = NavigationEstimator::new(cfg.localizer);
    let hsv = prepare_frame(&frame.view(), &estimator.params().blur);

    let markers = estimator
        .params()
        .markers
        .iter()
        .map(|p| (p.name.clone(), locate_marker(&hsv, p).ok()))
        .collect();
    let report = LocateReport {
        image: image.to_path_buf(),
        markers,
        estimate: estimator.estimate_prepared(&hsv),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn mask(image: &Path, profile: &str, out: &Path, config: Option<&Path>) -> CliResult<()> {
    let cfg = ServoConfig::load_or_default(config)?;
    let params = &cfg.localizer;
    let profile = if profile == "target" {
        params.target.profile()
    } else {
        params
            .markers
            .by_name(profile)
            .cloned()
            .ok_or_else(|| format!("unknown profile `{profile}`"))?
    };

    let frame = load_frame(image)?;
    let hsv = prepare_frame(&frame.view(), &params.blur);
    let GrayImage {
        width,
        height,
        data,
    } = profile.mask(&hsv);
    let set = data.iter().filter(|&&v| v != 0).count();
    let img = image::GrayImage::from_raw(width as u32, height as u32, data)
        .ok_or("mask buffer does not match its dimensions")?;
    img.save(out)?;
    info!("{} mask: {set} px set, wrote {}", profile.name, out.display());
    Ok(())
}

fn send(channel: ActuatorChannel, value: f64, config: Option<&Path>) -> CliResult<()> {
    let cfg = ServoConfig::load_or_default(config)?;
    let mut sink = TcpActuators::connect(&cfg.actuators)?;
    sink.send(Command::new(channel, value))?;
    sink.close()?;
    println!(
        "sent {value} on {channel} ({}:{})",
        cfg.actuators.host,
        cfg.actuators.port(channel)
    );
    Ok(())
}
