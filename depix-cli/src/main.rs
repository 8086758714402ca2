use clap::{Args, Parser, Subcommand};
use depix::block::filter::remove_moot_colors;
use depix::block::segment::segment;
use depix::block::sizes::SizeIndex;
use depix::boxes::{render_boxes, DEFAULT_ENHANCE, OUTLINE};
use depix::image::io::{load_image, save_grid, ColorMode};
use depix::pipeline::size_warning_limit;
use depix::{
    depixelize, pixelate, AveragingMode, Color, DepixConfig, MatchConfig, PixelationMode, Rect,
    RunReport, TracingSink,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

const DEFAULT_OUTPUT: &str = "output.png";
const LARGE_BLOCK_SIZE: usize = 100;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser, Debug)]
#[command(author, version, about = "Recover plaintext from pixelated screenshots")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
    /// Print the JSON schema of the recover config and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example recover config and exit.
    #[arg(long)]
    print_example: bool,
    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recover a pixelated image by searching a reference rendering.
    Recover(RecoverArgs),
    /// Pixelate an image to produce test input.
    Pixelate(PixelateArgs),
    /// Draw the detected blocks over an enlarged copy of a pixelated image.
    Boxes(BoxesArgs),
}

#[derive(Args, Debug)]
struct RecoverArgs {
    /// Path to the pixelated image.
    #[arg(short = 'p', long = "pixelimage", value_name = "PATH")]
    pixel_image: Option<PathBuf>,
    /// Path to the search image (De Bruijn sequence rendering).
    #[arg(short = 's', long = "searchimage", value_name = "PATH")]
    search_image: Option<PathBuf>,
    /// Type of RGB averaging: gammacorrected or linear.
    #[arg(short = 'a', long = "averagetype", value_name = "MODE")]
    averaging: Option<AveragingMode>,
    /// Background color to ignore.
    #[arg(short = 'b', long = "backgroundcolor", value_name = "R,G,B")]
    background: Option<Color>,
    /// Path to the output image [default: output.png].
    #[arg(short = 'o', long = "outputimage", value_name = "PATH")]
    output: Option<PathBuf>,
    /// JSON config; command-line flags take precedence.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Write a JSON run report.
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,
    /// Keep only the first best location per block.
    #[arg(long)]
    no_ties: bool,
    /// Match blocks on all cores.
    #[arg(long)]
    parallel: bool,
    /// Only segment this part of the pixelated image.
    #[arg(long, value_name = "X,Y,W,H", value_parser = parse_region)]
    region: Option<Rect>,
}

#[derive(Args, Debug)]
struct PixelateArgs {
    /// Path to the image to pixelate.
    #[arg(short = 'i', long = "image", value_name = "PATH")]
    image: PathBuf,
    /// Path to the output image.
    #[arg(
        short = 'o',
        long = "outputimage",
        value_name = "PATH",
        default_value = "output_pixelated.png"
    )]
    output: PathBuf,
    /// Size of pixelation blocks.
    #[arg(short = 'b', long = "blocksize", value_name = "N", default_value_t = 5)]
    block_size: usize,
    /// Averaging method: gamma or linear.
    #[arg(short = 'm', long = "method", value_name = "METHOD", default_value = "gamma")]
    method: PixelationMode,
}

#[derive(Args, Debug)]
struct BoxesArgs {
    /// Path to the pixelated image.
    #[arg(short = 'p', long = "pixelimage", value_name = "PATH")]
    pixel_image: PathBuf,
    /// Background color to ignore.
    #[arg(short = 'b', long = "backgroundcolor", value_name = "R,G,B")]
    background: Option<Color>,
    /// Enhancement factor.
    #[arg(short = 'e', long = "enhance", value_name = "N", default_value_t = DEFAULT_ENHANCE)]
    enhance: usize,
    /// Path to save the visualization.
    #[arg(short = 'o', long = "outputimage", value_name = "PATH")]
    output: PathBuf,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
struct RegionJson {
    x: usize,
    y: usize,
    width: usize,
    height: usize,
}

impl From<RegionJson> for Rect {
    fn from(value: RegionJson) -> Self {
        Rect::new(value.x, value.y, value.width, value.height)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RecoverConfig {
    pixel_image: Option<PathBuf>,
    search_image: Option<PathBuf>,
    output: Option<PathBuf>,
    averaging: Option<String>,
    background: Option<String>,
    region: Option<RegionJson>,
    detect_ties: Option<bool>,
    tie_tolerance: Option<f64>,
    max_candidates: Option<usize>,
    parallel: Option<bool>,
}

#[derive(Debug, Serialize)]
struct ReportJson {
    pixel_image: String,
    search_image: String,
    output: String,
    averaging: String,
    background: Option<String>,
    region: Option<RegionJson>,
    detect_ties: bool,
    segmented: usize,
    surviving: usize,
    sizes: usize,
    matched: usize,
    unmatched: usize,
    skipped: usize,
    direct: usize,
    averaged: usize,
}

/// Fully merged recover settings.
#[derive(Debug)]
struct RecoverPlan {
    pixel_image: PathBuf,
    search_image: PathBuf,
    output: PathBuf,
    report: Option<PathBuf>,
    depix: DepixConfig,
}

fn parse_region(s: &str) -> Result<Rect, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 4 {
        return Err(format!("expected X,Y,W,H, got {s:?}"));
    }
    let mut values = [0usize; 4];
    for (slot, part) in values.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .map_err(|_| format!("{part:?} is not a non-negative integer"))?;
    }
    if values[2] == 0 || values[3] == 0 {
        return Err("region width and height must be at least 1".to_string());
    }
    Ok(Rect::new(values[0], values[1], values[2], values[3]))
}

fn check_file(path: &Path) -> CliResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(format!("file {} does not exist", path.display()).into())
    }
}

fn init_logging(quiet: bool) -> CliResult<()> {
    let level = if quiet { "depix=warn" } else { "depix=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.parse()?))
        .with_target(false)
        .init();
    Ok(())
}

impl RecoverArgs {
    /// Merges flags over the optional JSON config and validates the result.
    fn into_plan(self) -> CliResult<RecoverPlan> {
        let file: RecoverConfig = match &self.config {
            Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
            None => RecoverConfig::default(),
        };

        let pixel_image = self
            .pixel_image
            .or(file.pixel_image)
            .ok_or("a pixelated image is required (-p or pixel_image)")?;
        let search_image = self
            .search_image
            .or(file.search_image)
            .ok_or("a search image is required (-s or search_image)")?;
        check_file(&pixel_image)?;
        check_file(&search_image)?;

        let averaging = match (self.averaging, file.averaging) {
            (Some(mode), _) => mode,
            (None, Some(name)) => name.parse()?,
            (None, None) => AveragingMode::default(),
        };
        let background = match (self.background, file.background) {
            (Some(color), _) => Some(color),
            (None, Some(text)) => Some(text.parse::<Color>()?),
            (None, None) => None,
        };
        let region = self.region.or(file.region.map(Rect::from));

        let defaults = MatchConfig::default();
        let matching = MatchConfig {
            averaging,
            detect_ties: !self.no_ties && file.detect_ties.unwrap_or(defaults.detect_ties),
            tie_tolerance: file.tie_tolerance.unwrap_or(defaults.tie_tolerance),
            max_candidates: file.max_candidates.unwrap_or(defaults.max_candidates),
            parallel: self.parallel || file.parallel.unwrap_or(defaults.parallel),
        };
        if matching.max_candidates == 0 {
            return Err("max_candidates must be at least 1".into());
        }
        if matching.tie_tolerance.is_nan() || matching.tie_tolerance < 0.0 {
            return Err("tie_tolerance must be a non-negative number".into());
        }

        Ok(RecoverPlan {
            pixel_image,
            search_image,
            output: self
                .output
                .or(file.output)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
            report: self.report,
            depix: DepixConfig {
                background,
                region,
                matching,
            },
        })
    }
}

fn report_json(plan: &RecoverPlan, report: &RunReport) -> ReportJson {
    let cfg = &plan.depix;
    ReportJson {
        pixel_image: plan.pixel_image.display().to_string(),
        search_image: plan.search_image.display().to_string(),
        output: plan.output.display().to_string(),
        averaging: cfg.matching.averaging.to_string(),
        background: cfg.background.map(|c| c.to_string()),
        region: cfg.region.map(|r| RegionJson {
            x: r.x,
            y: r.y,
            width: r.width,
            height: r.height,
        }),
        detect_ties: cfg.matching.detect_ties,
        segmented: report.segmented,
        surviving: report.surviving,
        sizes: report.sizes,
        matched: report.matched,
        unmatched: report.unmatched,
        skipped: report.skipped,
        direct: report.direct,
        averaged: report.averaged,
    }
}

fn run_recover(args: RecoverArgs) -> CliResult<()> {
    let plan = args.into_plan()?;

    info!("loading pixelated image from {}", plan.pixel_image.display());
    let pixelated = load_image(&plan.pixel_image)?;
    info!("loading search image from {}", plan.search_image.display());
    let search = load_image(&plan.search_image)?;

    let result = depixelize(&pixelated.grid, &search.grid, &plan.depix, &TracingSink)?;

    pixelated.save_like(result.canvas.as_grid(), &plan.output)?;
    info!("saved output image to {}", plan.output.display());

    if let Some(path) = &plan.report {
        let json = serde_json::to_string_pretty(&report_json(&plan, &result.report))?;
        fs::write(path, json)?;
        info!("wrote run report to {}", path.display());
    }
    Ok(())
}

fn run_pixelate(args: PixelateArgs) -> CliResult<()> {
    if args.block_size == 0 {
        return Err("block size must be at least 1".into());
    }
    if args.block_size > LARGE_BLOCK_SIZE {
        warn!(
            "block size {} is very large; consider a smaller value",
            args.block_size
        );
    }
    check_file(&args.image)?;

    info!("loading image from {}", args.image.display());
    let loaded = load_image(&args.image)?;
    let (width, height) = (loaded.grid.width(), loaded.grid.height());
    info!("image size: {width}x{height}");

    info!(
        "pixelating with block size {} using {} method",
        args.block_size, args.method
    );
    let pixelated = pixelate(&loaded.grid, args.block_size, args.method)?;
    loaded.save_like(&pixelated, &args.output)?;
    info!("saved pixelated image to {}", args.output.display());

    let blocks_x = width.div_ceil(args.block_size);
    let blocks_y = height.div_ceil(args.block_size);
    let total_blocks = blocks_x * blocks_y;
    info!("original pixels: {}", width * height);
    info!("pixelated blocks: {total_blocks} ({blocks_x}x{blocks_y})");
    info!(
        "compression ratio: {:.2}x",
        (width * height) as f64 / total_blocks as f64
    );
    Ok(())
}

fn run_boxes(args: BoxesArgs) -> CliResult<()> {
    check_file(&args.pixel_image)?;
    info!("loading pixelated image from {}", args.pixel_image.display());
    let loaded = load_image(&args.pixel_image)?;
    let grid = &loaded.grid;

    let blocks = segment(grid.view())?;
    info!("found {} same color blocks", blocks.len());
    let blocks = remove_moot_colors(blocks, args.background);
    info!("{} blocks left after moot color filter", blocks.len());

    let sizes = SizeIndex::build(&blocks).len();
    info!("found {sizes} different block sizes");
    if sizes > size_warning_limit(grid.width() * grid.height()) {
        warn!("too many block size variants; re-cropping the image might help");
    }

    info!("drawing blocks with {}x enhancement", args.enhance);
    let enhanced = render_boxes(grid, &blocks, args.enhance, OUTLINE)?;
    save_grid(&enhanced, &args.output, ColorMode::Rgb, None)?;
    info!("saved visualization to {}", args.output.display());
    Ok(())
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    init_logging(cli.quiet)?;

    match cli.command {
        Some(Command::Recover(args)) => run_recover(args),
        Some(Command::Pixelate(args)) => run_pixelate(args),
        Some(Command::Boxes(args)) => run_boxes(args),
        None => Err("a subcommand is required (recover, pixelate or boxes)".into()),
    }
}
