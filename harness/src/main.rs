use clap::{Parser, Subcommand};
use harness::{catalogue, HarnessConfig, HarnessResult, RunReport, TestEnvironment, TestRegistry};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "case-e2e")]
#[command(about = "End-to-end tests against a case-management engine")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Base URL of the engine, overrides file and environment
    #[arg(long, global = true)]
    engine_url: Option<String>,
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the selected tests; no names runs every default test
    Run {
        /// Test names, group names or `*`
        tests: Vec<String>,
    },
    /// List known tests and groups
    List,
    /// Check that the engine is reachable
    Health,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match dispatch(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(cli: Cli) -> HarnessResult<bool> {
    let registry = catalogue()?;

    if let Commands::List = cli.command {
        list_tests(&registry);
        return Ok(true);
    }

    let mut config = HarnessConfig::load(cli.config.as_deref())?;
    if let Some(url) = cli.engine_url {
        config = config.with_engine_url(url);
        config.validate()?;
    }
    let env = TestEnvironment::connect(config)?;

    match cli.command {
        Commands::Run { tests } => run_tests(&registry, &env, &tests).await,
        Commands::Health => health_check(&env).await,
        Commands::List => Ok(true),
    }
}

async fn run_tests(
    registry: &TestRegistry,
    env: &TestEnvironment,
    tests: &[String],
) -> HarnessResult<bool> {
    let runners = registry.create_runners(tests)?;
    if runners.is_empty() {
        info!("Nothing to run");
    }

    let report = RunReport::execute(runners, env).await;
    println!("\n{}", report);
    Ok(report.all_passed())
}

async fn health_check(env: &TestEnvironment) -> HarnessResult<bool> {
    let engine = env.engine();
    println!(
        "Checking {} engine at {}...",
        engine.engine_name(),
        env.config().engine.base_url
    );

    match engine.health_check().await {
        Ok(()) => {
            println!("✓ Engine is healthy");
            Ok(true)
        }
        Err(e) => {
            println!("✗ Engine health check failed: {}", e);
            Ok(false)
        }
    }
}

fn list_tests(registry: &TestRegistry) {
    println!("Tests:");
    for descriptor in registry.descriptors() {
        let marker = match descriptor.instantiate() {
            Ok(unit) if unit.is_default_test() => "",
            Ok(_) => " (run only when named)",
            Err(_) => " (cannot be constructed)",
        };
        println!("  {}{}", descriptor.name(), marker);
    }

    println!("\nGroups:");
    for (group, members) in registry.groups() {
        let names: Vec<&str> = members.iter().map(|d| d.name()).collect();
        println!("  {}: {}", group, names.join(", "));
    }
}
