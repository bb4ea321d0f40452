use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use dashviz::aggregate::{Aggregation, SortOrder};
use dashviz::config::DashboardConfig;
use dashviz::controller::{load_dataset, Dashboard, DataFormat, SalesDashboard, TrailsDashboard};
use dashviz::graph::render_page;
use dashviz::parser::{self, ControlChange, Event};
use dashviz::profile::{DashboardKind, Profile};
use dashviz::session::{self, Outcome};
use dashviz::OutputFormat;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "dashviz", version)]
#[command(about = "Render the video-game sales and Vancouver trails dashboards from CSV data", long_about = None)]
struct Args {
    #[command(subcommand)]
    dashboard: Option<DashboardCommand>,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_config: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Errors only
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum DashboardCommand {
    /// Bar chart or scatterplot of video-game sales
    Sales(RunArgs),
    /// Trail counts by difficulty, cross-filtering a time scatterplot
    Trails(RunArgs),
}

#[derive(ClapArgs, Debug)]
struct RunArgs {
    /// Data file (stdin when omitted)
    #[arg(long, env = "DASHVIZ_DATA")]
    data: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = DataFormat::Csv)]
    data_format: DataFormat,

    /// Image file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML file overriding chart geometry and rendering
    #[arg(long, env = "DASHVIZ_CONFIG")]
    config: Option<PathBuf>,

    /// X attribute
    #[arg(short = 'x', long)]
    x: Option<String>,

    /// Y attribute
    #[arg(short = 'y', long)]
    y: Option<String>,

    #[arg(long)]
    aggregation: Option<Aggregation>,

    #[arg(long)]
    sort: Option<SortOrder>,

    /// Bar categories to select before the script runs (repeatable)
    #[arg(long)]
    select: Vec<String>,

    /// Interaction script, e.g. 'toggle(Easy) | hover(Easy)'
    #[arg(long, conflicts_with = "script_file")]
    script: Option<String>,

    #[arg(long)]
    script_file: Option<PathBuf>,

    /// Output encoding (overrides the config file)
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Skip axis labels, titles and legend text
    #[arg(long)]
    no_labels: bool,
}

impl Args {
    fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

impl RunArgs {
    fn control_change(&self) -> ControlChange {
        ControlChange {
            x: self.x.clone(),
            y: self.y.clone(),
            aggregation: self.aggregation,
            sort: self.sort,
        }
    }

    fn script_source(&self) -> Result<Option<String>> {
        match (&self.script, &self.script_file) {
            (Some(text), _) => Ok(Some(text.clone())),
            (None, Some(path)) => std::fs::read_to_string(path)
                .map(Some)
                .with_context(|| format!("Failed to read script '{}'", path.display())),
            (None, None) => Ok(None),
        }
    }

    fn load_config(&self) -> Result<DashboardConfig> {
        let mut config = match &self.config {
            Some(path) => DashboardConfig::load(path)?,
            None => DashboardConfig::default(),
        };
        if let Some(format) = self.format {
            config.render.format = format;
        }
        if self.no_labels {
            config.render.labels = false;
        }
        Ok(config)
    }
}

/// Logs go to stderr; stdout carries the image
fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_level().to_string()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

fn main() {
    let args = Args::parse();

    if args.print_config {
        match DashboardConfig::default_toml() {
            Ok(text) => print!("{}", text),
            Err(e) => {
                eprintln!("Error: {:#}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    init_logging(&args);
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let (run_args, profile) = match args.dashboard {
        Some(DashboardCommand::Sales(run_args)) => (run_args, Profile::sales()),
        Some(DashboardCommand::Trails(run_args)) => (run_args, Profile::trails()),
        None => bail!("No dashboard given; use `dashviz sales` or `dashviz trails`"),
    };

    let config = run_args.load_config()?;
    // parse before loading so a bad script fails fast
    let script = run_args.script_source()?.map(|s| parser::parse(&s)).transpose()?;

    let dataset = load_dataset(run_args.data.as_deref(), run_args.data_format, &profile)?;
    let render = config.render.clone();
    let mut dashboard: Box<dyn Dashboard> = match profile.kind {
        DashboardKind::Sales => Box::new(SalesDashboard::new(dataset, config)?),
        DashboardKind::Trails => Box::new(TrailsDashboard::new(dataset, config)?),
    };

    let change = run_args.control_change();
    if !change.is_empty() {
        session::apply(dashboard.as_mut(), &Event::Controls(change)).context("Failed to apply controls")?;
    }
    for category in &run_args.select {
        session::apply(dashboard.as_mut(), &Event::Toggle(category.clone()))?;
    }
    if let Some(script) = script {
        let outcomes = session::replay(dashboard.as_mut(), &script)?;
        report(&outcomes)?;
    }

    info!(summary = %dashboard.summary());
    let bytes = render_page(&dashboard.page(), &render).context("Failed to render dashboard")?;
    write_output(run_args.output.as_deref(), &bytes)
}

/// One JSON line per script outcome on stderr
fn report(outcomes: &[Outcome]) -> Result<()> {
    let stderr = io::stderr();
    let mut handle = stderr.lock();
    for outcome in outcomes {
        let line = serde_json::to_string(outcome).context("Failed to serialize outcome")?;
        writeln!(handle, "{}", line).context("Failed to write to stderr")?;
    }
    Ok(())
}

fn write_output(path: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, bytes).with_context(|| format!("Failed to write '{}'", path.display()))?;
            info!(path = %path.display(), "image written");
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(bytes).context("Failed to write image to stdout")?;
            handle.flush().context("Failed to flush stdout")?;
        }
    }
    Ok(())
}
