use clap::Parser;
use colored::Colorize;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

use ofbizdeadcode::config::DetectionConfig;
use ofbizdeadcode::{
    report, BarMonitor, Config, Error, MatchPolicy, ProgressMonitor, Reporter, ScanCancellation,
};

/// Exit status of an interrupted run
const EXIT_CANCELLED: i32 = 130;

/// OfbizDeadCode - Find unreferenced services, views, screens, templates and scripts
#[derive(Parser, Debug)]
#[command(name = "ofbizdeadcode")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the project directory to analyze
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "terminal")]
    format: OutputFormat,

    /// Output file (for json/sarif formats)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Patterns to exclude (can be specified multiple times)
    #[arg(short, long)]
    exclude: Vec<String>,

    /// Path prefixes stripped to form component paths (can be specified multiple times)
    #[arg(long = "component-root", value_name = "DIR")]
    component_roots: Vec<String>,

    /// Patterns to retain - never report (can be specified multiple times)
    #[arg(short, long)]
    retain: Vec<String>,

    /// What to do when a finding's text occurs several times
    #[arg(long, value_enum)]
    match_policy: Option<PolicyArg>,

    /// Analyzer passes to run (comma-separated: service-candidates, services,
    /// templates, scripts, views, screens)
    #[arg(long)]
    detect: Option<String>,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only output results
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug, Default)]
enum OutputFormat {
    #[default]
    Terminal,
    Json,
    Sarif,
}

impl From<OutputFormat> for report::ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Terminal => report::ReportFormat::Terminal,
            OutputFormat::Json => report::ReportFormat::Json,
            OutputFormat::Sarif => report::ReportFormat::Sarif,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum PolicyArg {
    /// Report only when exactly one match exists
    Unique,
    /// Report at the first match
    First,
}

impl From<PolicyArg> for MatchPolicy {
    fn from(policy: PolicyArg) -> Self {
        match policy {
            PolicyArg::Unique => MatchPolicy::UniqueOrSuppress,
            PolicyArg::First => MatchPolicy::FirstMatch,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    info!("OfbizDeadCode v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli)?;

    if !cli.path.is_dir() {
        miette::bail!("Not a directory: {}", cli.path.display());
    }

    let cancellation = ScanCancellation::new();
    let handler = cancellation.clone();
    ctrlc::set_handler(move || handler.cancel()).into_diagnostic()?;

    let bar = if cli.quiet || cli.no_progress {
        None
    } else {
        Some(BarMonitor::new(cancellation.clone()))
    };
    let monitor: &dyn ProgressMonitor = match &bar {
        Some(bar) => bar,
        None => &cancellation,
    };

    let start_time = Instant::now();
    let outcome = ofbizdeadcode::run(&cli.path, &config, monitor);
    if let Some(bar) = &bar {
        bar.finish();
    }

    let analysis = match outcome {
        Ok(analysis) => analysis,
        Err(Error::Cancelled) => {
            eprintln!("{}", "Analysis cancelled, no findings reported.".yellow());
            std::process::exit(EXIT_CANCELLED);
        }
        Err(e) => return Err(e).into_diagnostic(),
    };

    for path in &analysis.skipped {
        warn!("Skipped unparseable file {}", path.display());
    }

    let reporter = Reporter::new(cli.format.clone().into(), cli.output.clone());
    reporter.report(&analysis.findings)?;

    info!(
        "Analysis completed in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else {
        // Try to load from default locations
        Config::from_default_locations(&cli.path)?
    };

    // Override with CLI arguments
    if !cli.exclude.is_empty() {
        config.exclude.extend(cli.exclude.clone());
    }
    if !cli.component_roots.is_empty() {
        config.component_roots = cli.component_roots.clone();
    }
    if !cli.retain.is_empty() {
        config.retain_patterns.extend(cli.retain.clone());
    }
    if let Some(policy) = cli.match_policy {
        config.match_policy = policy.into();
    }
    if let Some(detect) = &cli.detect {
        config.detection = DetectionConfig::only(detect)?;
    }

    Ok(config)
}
