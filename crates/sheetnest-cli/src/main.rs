use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use sheetnest_core::config::{GaConfig, MainPolygonRule, NestConfig, Strategy};
use sheetnest_core::export::{layout_to_svg, results_to_json};
use sheetnest_core::job::{spawn_nest_job, JobEvent};
use sheetnest_core::model::{Design, NestingResult, Point, SheetPreset};
use sheetnest_core::presets::{preset_by_id, sheet_presets};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "sheetnest",
    about = "Nest copies of an irregular design onto rectangular sheets",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show a progress bar (disable with --progress=false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Nest a design across sheets and rank them by utilisation
    Nest(NestArgs),
    /// List the built-in sheet presets
    Presets,
}

#[derive(Parser, Debug, Clone)]
struct NestArgs {
    // Input/Output
    /// Design file: JSON {"id", "name", "polygons": [[[x, y], ...], ...]}
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Write ranked results as JSON to this path
    #[arg(long, help_heading = "Input/Output")]
    json_out: Option<PathBuf>,
    /// Write an SVG of the best sheet's layout to this path
    #[arg(long, help_heading = "Input/Output")]
    svg_out: Option<PathBuf>,

    // Sheets
    /// Preset ids to nest onto (default: the whole catalogue)
    #[arg(long, help_heading = "Sheets")]
    preset: Vec<String>,
    /// Extra custom sheet, WIDTHxHEIGHT in mm (repeatable), e.g. 600x400
    #[arg(long, help_heading = "Sheets")]
    sheet: Vec<String>,

    // Layout
    /// Margin between parts and to the sheet edge (mm)
    #[arg(long, default_value_t = 3.0, help_heading = "Layout")]
    margin: f64,
    /// Rotation step in degrees for the BLF sweep (must divide 360)
    #[arg(long, default_value_t = 90, help_heading = "Layout")]
    rotation_step: u32,
    /// Base candidate-grid step (mm); defaults to the margin
    #[arg(long, help_heading = "Layout")]
    grid_step: Option<f64>,
    /// Collision ring for multi-ring designs: largest_area | most_vertices
    #[arg(long, default_value = "largest_area", help_heading = "Layout")]
    main_polygon: String,

    // Algorithms
    /// Strategy portfolio: fast | nfp | nfp-ga
    #[arg(long, value_parser = ["fast", "nfp", "nfp-ga"], default_value = "nfp", help_heading = "Algorithms")]
    algorithm: String,
    /// GA population size
    #[arg(long, default_value_t = 30, help_heading = "Genetic search")]
    population: usize,
    /// GA generations
    #[arg(long, default_value_t = 50, help_heading = "Genetic search")]
    generations: usize,
    /// GA RNG seed for reproducible layouts
    #[arg(long, help_heading = "Genetic search")]
    seed: Option<u64>,
    /// Evaluate sheets in parallel (requires the `parallel` feature)
    #[arg(long, default_value_t = false, help_heading = "Algorithms")]
    parallel: bool,
}

/// On-disk design document.
#[derive(Debug, Deserialize)]
struct DesignFile {
    id: Option<String>,
    name: Option<String>,
    polygons: Vec<Vec<[f64; 2]>>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match &cli.command {
        Commands::Presets => {
            println!("{:<10} {:<18} {:>8} {:>8}  {}", "ID", "NAME", "W(mm)", "H(mm)", "CATEGORY");
            for p in sheet_presets() {
                println!(
                    "{:<10} {:<18} {:>8.0} {:>8.0}  {}",
                    p.id, p.name, p.width, p.height, p.category
                );
            }
            Ok(())
        }
        Commands::Nest(args) => run_nest(args, cli.progress && !cli.quiet),
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

fn run_nest(args: &NestArgs, show_progress: bool) -> anyhow::Result<()> {
    let design = load_design(&args.input)?;
    let sheets = collect_sheets(args)?;
    anyhow::ensure!(!sheets.is_empty(), "no sheets selected");
    let cfg = build_config(args)?;

    info!(
        design = %design.id,
        sheets = sheets.len(),
        algorithm = ?cfg.algorithm,
        "starting nesting job"
    );

    let bar = if show_progress {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::with_template("{bar:40.cyan/blue} {pos:>3}% {msg}")
                .expect("static template"),
        );
        Some(bar)
    } else {
        None
    };

    let (handle, events) = spawn_nest_job(design.clone(), sheets, cfg);
    let mut results: Option<Vec<NestingResult>> = None;
    loop {
        match events.recv_timeout(Duration::from_secs(600)) {
            Ok(JobEvent::Progress(event)) => {
                if let Some(bar) = &bar {
                    bar.set_position(event.percent as u64);
                    bar.set_message(event.message);
                }
            }
            Ok(JobEvent::Complete(r)) => {
                results = Some(r);
                break;
            }
            Ok(JobEvent::Cancelled) => anyhow::bail!("nesting job was cancelled"),
            Ok(JobEvent::Error(msg)) => anyhow::bail!("nesting failed: {msg}"),
            Err(err) => anyhow::bail!("nesting job stalled: {err}"),
        }
    }
    handle.join();
    if let Some(bar) = &bar {
        bar.finish_and_clear();
    }
    let results = results.expect("loop exits with results");

    if results.is_empty() {
        println!("no sheet could hold a single copy of '{}'", design.name);
        return Ok(());
    }

    println!(
        "{:<18} {:>6} {:>10} {:>12} {:>12}  {}",
        "SHEET", "COUNT", "EFF(%)", "USED(mm2)", "WASTE(mm2)", "NOTE"
    );
    for r in &results {
        println!(
            "{:<18} {:>6} {:>10.1} {:>12.0} {:>12.0}  {}",
            r.sheet.name,
            r.count,
            r.efficiency,
            r.used_area,
            r.wasted_area,
            if r.edge_warning { "near-edge" } else { "" }
        );
    }

    if let Some(path) = &args.json_out {
        fs::write(path, results_to_json(&results)?)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "wrote JSON results");
    }
    if let Some(path) = &args.svg_out {
        let best = &results[0];
        fs::write(path, layout_to_svg(&design, best))
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), sheet = %best.sheet.name, "wrote SVG layout");
    }
    Ok(())
}

fn load_design(path: &PathBuf) -> anyhow::Result<Design> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading design file {}", path.display()))?;
    let doc: DesignFile =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
    let polygons = doc
        .polygons
        .iter()
        .map(|ring| ring.iter().map(|&[x, y]| Point::new(x, y)).collect())
        .collect();
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "design".to_string());
    let id = doc.id.unwrap_or_else(|| stem.clone());
    let name = doc.name.unwrap_or(stem);
    Design::new(id, name, polygons).map_err(Into::into)
}

fn collect_sheets(args: &NestArgs) -> anyhow::Result<Vec<SheetPreset>> {
    let mut sheets = Vec::new();
    if args.preset.is_empty() && args.sheet.is_empty() {
        sheets = sheet_presets();
    }
    for id in &args.preset {
        let preset = preset_by_id(id)
            .with_context(|| format!("unknown sheet preset '{id}' (see `sheetnest presets`)"))?;
        sheets.push(preset);
    }
    for (i, spec) in args.sheet.iter().enumerate() {
        let (w, h) = spec
            .split_once(['x', 'X'])
            .with_context(|| format!("sheet '{spec}' is not WIDTHxHEIGHT"))?;
        let width: f64 = w.trim().parse().with_context(|| format!("bad width in '{spec}'"))?;
        let height: f64 = h.trim().parse().with_context(|| format!("bad height in '{spec}'"))?;
        anyhow::ensure!(width > 0.0 && height > 0.0, "sheet '{spec}' must be positive");
        sheets.push(SheetPreset::new(
            format!("custom-{i}"),
            format!("{width:.0}x{height:.0}"),
            width,
            height,
            "custom",
        ));
    }
    Ok(sheets)
}

fn build_config(args: &NestArgs) -> anyhow::Result<NestConfig> {
    let algorithm: Strategy = args
        .algorithm
        .parse()
        .ok()
        .context("algorithm must be fast | nfp | nfp-ga")?;
    let main_polygon: MainPolygonRule = args
        .main_polygon
        .parse()
        .ok()
        .context("main_polygon must be largest_area | most_vertices")?;
    let cfg = NestConfig::builder()
        .margin(args.margin)
        .rotation_step(args.rotation_step)
        .grid_step(args.grid_step)
        .algorithm(algorithm)
        .main_polygon(main_polygon)
        .ga(GaConfig {
            population_size: args.population,
            generations: args.generations,
            seed: args.seed,
            ..GaConfig::default()
        })
        .parallel(args.parallel)
        .build();
    cfg.validate()?;
    Ok(cfg)
}
