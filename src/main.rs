//! FlowRunner CLI Entry Point
//!
//! Runs a demonstration workflow: words in each text partition are counted
//! in parallel, a human approval gate suspends the run, and once approved
//! the counts are aggregated.
//!
//! # Usage
//!
//! ```bash
//! # Count words in two default partitions; stops at the approval gate
//! flowrunner
//!
//! # Approve and resume in the same process
//! flowrunner --approve "the quick fox" "jumps over" "the lazy dog"
//!
//! # Pool settings from a YAML file, overridden on the command line
//! flowrunner --config pool.yaml --workers 8
//! ```

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use colored::Colorize;
use log::{info, warn};

use flowrunner::config::{load_config, PoolConfig};
use flowrunner::work::{FnWork, HumanWork, Report, WorkExt, WorkUnit};
use flowrunner::{Context, Engine, Instance, ParallelFlow, SequentialFlow, Status, WorkerPool};
use flowrunner::{APP_NAME, VERSION};

/// Name of the demonstration flow.
const DEMO_FLOW: &str = "word-count";

/// Name of the approval step.
const APPROVAL_STEP: &str = "approval";

/// Partitions used when none are given.
const DEFAULT_PARTITIONS: &[&str] = &["hello foo", "hello bar"];

/// Command-line configuration parsed from arguments.
#[derive(Debug, Default)]
struct Config {
    partitions: Vec<String>,
    config_path: Option<String>,
    workers: Option<usize>,
    approve: bool,
    verbose: bool,
}

/// Configures the logging system with appropriate formatting.
fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            use std::io::Write;

            match record.level() {
                log::Level::Warn | log::Level::Error => {
                    writeln!(buf, "[{}] {}", record.level(), record.args())
                }
                _ => writeln!(buf, "{}", record.args()),
            }
        })
        .init();
}

/// Prints the application banner with version information.
fn print_banner() {
    println!();
    println!("{} v{}", APP_NAME, VERSION);
    println!("Composable Workflow Execution Engine");
    println!();
}

/// Prints usage information.
fn print_usage() {
    println!("Usage: flowrunner [OPTIONS] [TEXT...]");
    println!();
    println!("Arguments:");
    println!("  [TEXT...]           Text partitions to count words in");
    println!();
    println!("Options:");
    println!("  --config PATH       Load worker pool settings from a YAML file");
    println!("  --workers N         Number of worker threads");
    println!("  --approve           Approve the waiting step and resume the run");
    println!("  --verbose           Enable debug logging");
    println!("  --help              Show this help message");
    println!("  --version           Show version information");
    println!();
    println!("Examples:");
    println!("  flowrunner");
    println!("  flowrunner --approve \"the quick fox\" \"jumps over\"");
    println!("  flowrunner --config pool.yaml --workers 8");
}

/// Parses command-line arguments into a Config struct.
fn parse_arguments(args: &[String]) -> Result<Config, String> {
    let mut config = Config::default();
    let mut i = 1; // Skip program name

    while i < args.len() {
        let arg = &args[i];

        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("{} {}", APP_NAME, VERSION);
                std::process::exit(0);
            }
            "--approve" => {
                config.approve = true;
            }
            "--verbose" | "-v" => {
                config.verbose = true;
            }
            "--config" => {
                i += 1;
                if i >= args.len() {
                    return Err("--config requires a path argument".to_string());
                }
                config.config_path = Some(args[i].clone());
            }
            "--workers" => {
                i += 1;
                if i >= args.len() {
                    return Err("--workers requires a number argument".to_string());
                }
                let workers: usize = args[i]
                    .parse()
                    .map_err(|_| format!("Invalid workers value: {}", args[i]))?;
                if workers == 0 {
                    return Err("--workers must be at least 1".to_string());
                }
                config.workers = Some(workers);
            }
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown option: {}", arg));
            }
            _ => config.partitions.push(arg.clone()),
        }
        i += 1;
    }

    if config.partitions.is_empty() {
        config.partitions = DEFAULT_PARTITIONS.iter().map(|p| p.to_string()).collect();
    }

    Ok(config)
}

/// Resolves pool settings from the optional file and command-line override.
fn resolve_pool_config(config: &Config) -> Result<PoolConfig, Box<dyn std::error::Error>> {
    let mut pool_config = match &config.config_path {
        Some(path) => load_config(path)?,
        None => PoolConfig::default(),
    };

    if let Some(workers) = config.workers {
        pool_config = pool_config.with_workers(workers);
    }

    Ok(pool_config)
}

/// Counts the words of one partition into `wordCount{index}`.
fn count_words(index: usize) -> WorkUnit {
    FnWork::new(format!("count-partition-{}", index), move |ctx| {
        let key = format!("partition{}", index);
        let Some(text) = ctx.get(&key).and_then(|v| v.as_str().map(str::to_string)) else {
            return Report::failed(ctx, format!("missing input '{}'", key));
        };
        ctx.put(format!("wordCount{}", index), text.split_whitespace().count());
        Report::completed(ctx)
    })
    .resumable()
    .into_unit()
}

/// Sums every per-partition count into `totalCount`.
fn aggregate_counts() -> WorkUnit {
    FnWork::new("aggregate-counts", |ctx| {
        let total: u64 = ctx
            .values()
            .iter()
            .filter(|(key, _)| key.starts_with("wordCount"))
            .filter_map(|(_, value)| value.as_u64())
            .sum();
        ctx.put("totalCount", total);
        Report::completed(ctx)
    })
    .resumable()
    .into_unit()
}

/// Builds the demonstration workflow.
fn build_workflow(
    partitions: usize,
    pool: Arc<WorkerPool>,
) -> Result<SequentialFlow, Box<dyn std::error::Error>> {
    let counts = ParallelFlow::builder()
        .named("count-partitions")
        .execute_all((0..partitions).map(count_words).collect())
        .with(pool)
        .build_unit()?;

    let workflow = SequentialFlow::builder()
        .named(DEMO_FLOW)
        .execute(counts)
        .then(HumanWork::new(APPROVAL_STEP).into_unit())
        .then(aggregate_counts())
        .build()?;

    Ok(workflow)
}

/// Prints the final status and context.
fn print_outcome(status: Option<Status>, context: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let label = match status {
        Some(Status::Completed) => "COMPLETED".green().bold(),
        Some(Status::Waiting) => "WAITING".yellow().bold(),
        Some(Status::Failed) => "FAILED".red().bold(),
        None => "NO REPORT".dimmed(),
    };

    println!();
    println!("Workflow status: {}", label);
    println!();
    println!("{}", serde_json::to_string_pretty(&context.snapshot())?);
    Ok(())
}

/// Main application entry point.
fn run() -> Result<Option<Status>, Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    // Parse arguments
    let config = parse_arguments(&args).map_err(|e| {
        eprintln!("Error: {}", e);
        eprintln!();
        print_usage();
        e
    })?;

    // Setup logging
    setup_logging(config.verbose);

    // Print banner
    print_banner();

    // The pool belongs to this function; flows only borrow it
    let pool_config = resolve_pool_config(&config)?;
    let pool = Arc::new(WorkerPool::from_config(&pool_config)?);
    info!("Worker pool: {} threads", pool.size());

    let engine = Engine::new();
    engine.add(Arc::new(build_workflow(config.partitions.len(), pool.clone())?));

    let instance = Instance::new(DEMO_FLOW);
    for (index, text) in config.partitions.iter().enumerate() {
        instance.context().put(format!("partition{}", index), text.as_str());
    }

    info!("Starting instance {}", instance.id());
    let mut report = engine.run_instance(&instance)?;

    if report.as_ref().map(|r| r.status()) == Some(Status::Waiting) {
        if config.approve {
            info!("Approving '{}' and resuming", APPROVAL_STEP);
            instance.context().set_status(APPROVAL_STEP, Status::Completed);
            report = engine.run_instance(&instance)?;
        } else {
            warn!("Run is waiting on '{}'; pass --approve to resume", APPROVAL_STEP);
        }
    }

    let status = report.as_ref().map(|r| r.status());
    if let Some(error) = report.as_ref().and_then(|r| r.error()) {
        warn!("Workflow reported an error: {}", error);
    }
    print_outcome(status, instance.context())?;

    pool.shutdown();
    Ok(status)
}

fn main() -> ExitCode {
    match run() {
        Ok(Some(Status::Failed)) => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!();
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
