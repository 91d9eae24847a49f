use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use nyc_sales_map::palette::build_palette;
use nyc_sales_map::stats::{self, YearSummary};
use nyc_sales_map::viz::{self, ColorScale, FigureLayout};
use nyc_sales_map::{MapConfig, YearRange, YearSeries};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "nycmap",
    version,
    about = "Render NYC zipcode property-sale averages as a yearly choropleth"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one figure per year (or a single --year) to SVG or PNG.
    Render(RenderArgs),
    /// Print per-year join and value statistics.
    Summary(InputArgs),
    /// Print the 512 palette colors, one `index hex` pair per line.
    Palette,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ImageFormat {
    Png,
    Svg,
}

impl ImageFormat {
    fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }
}

#[derive(Args, Debug)]
struct InputArgs {
    /// JSON config file; command-line flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Wide CSV of yearly averages (borough/year rows, zipcode columns).
    #[arg(long)]
    records: Option<PathBuf>,
    /// Zipcode boundaries (.shp, .geojson or .json).
    #[arg(long)]
    shapes: Option<PathBuf>,
    /// Geometry attribute holding the zipcode.
    #[arg(long)]
    id_field: Option<String>,
    /// First and last year as YYYY:YYYY (default 2005:2019).
    #[arg(long)]
    years: Option<String>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Directory receiving nyc_sales_<year>.<ext>.
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,
    #[arg(long, value_enum, default_value_t = ImageFormat::Png)]
    format: ImageFormat,
    /// Render only this year.
    #[arg(long)]
    year: Option<i32>,
    /// Width of the map area (default from config, 600).
    #[arg(long)]
    width: Option<u32>,
    /// Height of the map area (default from config, 600).
    #[arg(long)]
    height: Option<u32>,
    /// Print per-year statistics to stdout.
    #[arg(long, default_value_t = false)]
    stats: bool,
}

fn parse_years(s: &str) -> Option<YearRange> {
    if let Some((a, b)) = s.split_once(':') {
        let start = a.trim().parse::<i32>().ok()?;
        let end = b.trim().parse::<i32>().ok()?;
        Some(YearRange::new(start, end))
    } else {
        s.trim().parse::<i32>().ok().map(|y| YearRange::new(y, y))
    }
}

fn load_config(input: &InputArgs) -> Result<MapConfig> {
    let mut cfg = match &input.config {
        Some(path) => MapConfig::from_json_file(path)?,
        None => MapConfig::default(),
    };
    if let Some(p) = &input.records {
        cfg.records = p.clone();
    }
    if let Some(p) = &input.shapes {
        cfg.shapes = p.clone();
    }
    if let Some(f) = &input.id_field {
        cfg.id_field = f.clone();
    }
    if let Some(s) = &input.years {
        cfg.years = parse_years(s)
            .ok_or_else(|| anyhow::anyhow!("invalid --years, expected YYYY or YYYY:YYYY"))?;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => viz::format_price(x),
        _ => "NA".to_string(),
    }
}

fn print_summaries(summaries: &[YearSummary]) {
    for s in summaries {
        println!(
            "{}  regions={} with_data={} defaulted={} conflicts={}  min={} max={} mean={} median={}",
            s.year,
            s.regions,
            s.with_data,
            s.defaulted,
            s.conflicts,
            fmt_opt(s.min),
            fmt_opt(s.max),
            fmt_opt(s.mean),
            fmt_opt(s.median)
        );
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Summary(input) => cmd_summary(input),
        Command::Palette => cmd_palette(),
    }
}

fn cmd_render(args: RenderArgs) -> Result<()> {
    let mut cfg = load_config(&args.input)?;
    if let Some(w) = args.width {
        cfg.map_width = w;
    }
    if let Some(h) = args.height {
        cfg.map_height = h;
    }
    cfg.validate()?;

    let series = YearSeries::from_config(&cfg)?;
    let scale = Arc::new(ColorScale::from_config(&cfg, build_palette()?)?);
    let layout = FigureLayout::with_map_size(cfg.map_width, cfg.map_height);

    let years: Vec<i32> = match args.year {
        Some(y) => {
            series.get(y)?;
            vec![y]
        }
        None => series.range().years().collect(),
    };

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;

    let figures = series.figures(&scale, layout);
    for (entry, figure) in series.iter().zip(&figures) {
        if !years.contains(&entry.year) {
            continue;
        }
        let path = args.out_dir.join(format!(
            "nyc_sales_{}.{}",
            entry.year,
            args.format.extension()
        ));
        viz::render_to_path(figure, &entry.geometry, &path)?;
        eprintln!("Wrote {} to {}", figure.title, path.display());
    }

    if args.stats {
        print_summaries(&stats::year_summaries(&series));
    }
    Ok(())
}

fn cmd_summary(input: InputArgs) -> Result<()> {
    let cfg = load_config(&input)?;
    let series = YearSeries::from_config(&cfg)?;
    eprintln!(
        "Joined {} years over {}",
        series.len(),
        cfg.shapes.display()
    );
    print_summaries(&stats::year_summaries(&series));
    Ok(())
}

fn cmd_palette() -> Result<()> {
    let palette = build_palette()?;
    for (i, hex) in palette.colors().iter().enumerate() {
        println!("{i} {hex}");
    }
    Ok(())
}
