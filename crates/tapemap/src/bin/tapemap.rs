//! Offline replay of recorded overhead frames.
//!
//! ```bash
//! tapemap -v replay frames/*.png --out map.png --origin 120,80 --scan-out scan.json
//! tapemap scan --map map.png --origin 120,80
//! tapemap default-config --out tapemap.json
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use nalgebra::Point2;
use tapemap::grid::{OccupancyMap, RayMarchScanner};
use tapemap::{PngSink, ScanResult, TapeMapConfig, TapeMapError, TapeMapSession};

#[cfg(not(feature = "tracing"))]
use log::{info, warn};
#[cfg(feature = "tracing")]
use tracing::{info, warn};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "tapemap")]
#[command(about = "Build a tape occupancy map from overhead frames and run synthetic scans")]
#[command(version)]
struct Cli {
    /// JSON config; missing fields take their defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines
    #[cfg(feature = "tracing")]
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Feed frames through a session in order, then save the map
    Replay(ReplayArgs),

    /// Scan a previously saved map PNG
    Scan {
        /// Mono8 map written by `replay`
        #[arg(long)]
        map: PathBuf,

        /// Scan origin in map pixels, `x,y`
        #[arg(long, value_parser = parse_point)]
        origin: Point2<f32>,

        /// Write the scan here instead of stdout
        #[arg(long)]
        scan_out: Option<PathBuf>,
    },

    /// Write the default config as JSON
    DefaultConfig {
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Args)]
struct ReplayArgs {
    /// Frames in replay order
    #[arg(required = true)]
    frames: Vec<PathBuf>,

    /// Final map as mono8 PNG
    #[arg(long)]
    out: PathBuf,

    /// Debug layer of the last accepted frame
    #[arg(long)]
    debug_out: Option<PathBuf>,

    /// Also publish every intermediate map into this directory
    #[arg(long)]
    publish_dir: Option<PathBuf>,

    /// Scan origin in map pixels, `x,y`
    #[arg(long, value_parser = parse_point, conflicts_with = "tags")]
    origin: Option<Point2<f32>>,

    /// Tag positions as a JSON object `{"id": [x, y]}`
    #[arg(long, requires = "target")]
    tags: Option<PathBuf>,

    /// Tag id to scan from
    #[arg(long, requires = "tags")]
    target: Option<String>,

    /// Write the scan here instead of stdout
    #[arg(long)]
    scan_out: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

#[cfg(not(feature = "tracing"))]
fn init_logging(cli: &Cli) {
    let _ = tapemap::core::init_with_level(tapemap::core::level_from_verbosity(cli.verbose));
}

#[cfg(feature = "tracing")]
fn init_logging(cli: &Cli) {
    tapemap::core::init_tracing(cli.log_json);
    // library crates log through the `log` facade
    let _ = tracing_log::LogTracer::init();
}

fn run(cli: Cli) -> CliResult<()> {
    let config = match &cli.config {
        Some(path) => TapeMapConfig::load_json(path)?,
        None => TapeMapConfig::default(),
    };

    match cli.command {
        Command::Replay(args) => replay(config, &args),
        Command::Scan {
            map,
            origin,
            scan_out,
        } => {
            config.validate()?;
            let map = OccupancyMap::from_gray_image(&image::open(&map)?.to_luma8())?;
            let scan = RayMarchScanner::new(config.scan)?.scan(&map, Some(origin))?;
            write_scan(&scan, scan_out.as_deref())
        }
        Command::DefaultConfig { out } => {
            TapeMapConfig::default().write_json(&out)?;
            info!("wrote default config to {}", out.display());
            Ok(())
        }
    }
}

#[cfg_attr(feature = "tracing", tracing::instrument(level = "info", skip_all))]
fn replay(config: TapeMapConfig, args: &ReplayArgs) -> CliResult<()> {
    let mut session = TapeMapSession::new(config)?;
    if let Some(dir) = &args.publish_dir {
        session = session.with_sink(PngSink::new(dir, true)?);
    }

    let mut accepted = 0usize;
    let mut last_frame = None;
    for path in &args.frames {
        let bytes = fs::read(path)?;
        match session.on_frame_encoded(&bytes) {
            Ok(report) => {
                info!(
                    "{}: {} regions kept of {} contours",
                    path.display(),
                    report.stats.kept,
                    report.stats.found
                );
                accepted += 1;
                last_frame = Some(path);
            }
            Err(TapeMapError::InvalidInput { reason }) => {
                warn!("{}: skipped ({reason})", path.display());
            }
            Err(e) => return Err(e.into()),
        }
    }

    let map = session
        .map_snapshot()
        .ok_or("no frame was accepted; nothing to write")?;
    map.to_gray_image().save(&args.out)?;
    info!(
        "merged {accepted}/{} frames into {}",
        args.frames.len(),
        args.out.display()
    );

    if let (Some(out), Some(frame)) = (&args.debug_out, last_frame) {
        write_debug_layer(&session, frame, out)?;
    }

    let origin_scan = match (&args.origin, &args.tags, &args.target) {
        (Some(origin), _, _) => Some(session.scan_from(*origin)?),
        (None, Some(tags), Some(target)) => {
            session.on_tag_update(load_tags(tags)?);
            Some(session.request_scan(target)?)
        }
        _ => None,
    };
    if let Some(scan) = origin_scan {
        info!("scan: {}/{} rays hit", scan.hits(), scan.ranges.len());
        write_scan(&scan, args.scan_out.as_deref())?;
    }
    Ok(())
}

/// Re-run detection on `frame` against a scratch copy of the final map and
/// save the annotated layer.
fn write_debug_layer(session: &TapeMapSession, frame: &Path, out: &Path) -> CliResult<()> {
    let config = session.config();
    let frame = image::open(frame)?.to_rgb8();
    let mask = tapemap::detect::ColorMaskSegmenter::new(config.segment.clone())?.segment(&frame)?;
    let regions = tapemap::detect::ContourShapeFilter::new(config.contours.clone())?.extract(&mask);

    let mut scratch = session
        .map_snapshot()
        .ok_or("map vanished while writing the debug layer")?;
    let debug = tapemap::grid::OccupancyAccumulator::new(config.accumulate.clone())?
        .merge_with_debug(&mut scratch, &mask, &regions)?;
    debug.save(out)?;
    Ok(())
}

fn load_tags(path: &Path) -> CliResult<Vec<(String, Point2<f32>)>> {
    let raw = fs::read_to_string(path)?;
    let tags: HashMap<String, [f32; 2]> = serde_json::from_str(&raw)?;
    Ok(tags
        .into_iter()
        .map(|(id, [x, y])| (id, Point2::new(x, y)))
        .collect())
}

fn write_scan(scan: &ScanResult, out: Option<&Path>) -> CliResult<()> {
    let json = serde_json::to_string_pretty(scan)?;
    match out {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}

fn parse_point(s: &str) -> Result<Point2<f32>, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got {s:?}"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f32>()
            .map_err(|e| format!("bad coordinate {v:?}: {e}"))
    };
    Ok(Point2::new(parse(x)?, parse(y)?))
}
