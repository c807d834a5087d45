//! `tck` command line runner

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::future::Future;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tck_harness::{
    ConsoleObserver, HarnessConfig, HarnessRunner, EXIT_CONFIG_ERROR, EXIT_SUCCESS,
};
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    let config_arg = Arg::new("config")
        .long("config")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("Harness configuration (TOML); defaults to every reference dialect");

    Command::new("tck")
        .version(tck_harness::VERSION)
        .about("Run behavior scenarios across front-end variants")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("run")
                .about("Run the configured plan and print the report")
                .arg(config_arg.clone())
                .arg(
                    Arg::new("extended")
                        .long("extended")
                        .env("TCK_EXTENDED")
                        .action(ArgAction::SetTrue)
                        .help("Also run extended-tier bindings"),
                )
                .arg(
                    Arg::new("concurrency")
                        .long("concurrency")
                        .value_parser(value_parser!(usize))
                        .help("Maximum scenarios in flight"),
                )
                .arg(
                    Arg::new("timeout-ms")
                        .long("timeout-ms")
                        .value_parser(value_parser!(u64))
                        .help("Per-scenario timeout in milliseconds"),
                )
                .arg(
                    Arg::new("filter")
                        .long("filter")
                        .value_name("REGEX")
                        .help("Only run scenarios whose name matches"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the report as JSON"),
                )
                .arg(
                    Arg::new("verbose")
                        .long("verbose")
                        .short('v')
                        .action(ArgAction::SetTrue)
                        .help("Show passing outcomes while running"),
                )
                .arg(
                    Arg::new("log-json")
                        .long("log-json")
                        .action(ArgAction::SetTrue)
                        .help("Emit logs as JSON lines"),
                ),
        )
        .subcommand(
            Command::new("list")
                .about("List bindings and scenarios")
                .arg(config_arg),
        )
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(err) = installed {
        eprintln!("warning: logging disabled: {err}");
    }
}

fn load_config(args: &ArgMatches) -> anyhow::Result<HarnessConfig> {
    match args.get_one::<PathBuf>("config") {
        Some(path) => Ok(HarnessConfig::load(path)?),
        None => Ok(tck_reference::default_config()),
    }
}

async fn run(args: &ArgMatches) -> anyhow::Result<i32> {
    let config = load_config(args)?;
    let catalog = tck_reference::catalog().context("building scenario catalog")?;
    let registry = Arc::new(tck_reference::registry().context("building backend registry")?);
    let plan = config.to_plan(&catalog, &registry)?;

    let mut run_config = config.run_config();
    if args.get_flag("extended") {
        run_config = run_config.with_extended(true);
    }
    if let Some(limit) = args.get_one::<usize>("concurrency") {
        run_config = run_config.with_concurrency(*limit);
    }
    if let Some(ms) = args.get_one::<u64>("timeout-ms") {
        run_config = run_config.with_timeout(Duration::from_millis(*ms));
    }
    if let Some(pattern) = args.get_one::<String>("filter") {
        run_config = run_config.with_filter(pattern.as_str());
    }

    let runner = HarnessRunner::new(plan, run_config)?;
    let mut observer = ConsoleObserver::new().verbose(args.get_flag("verbose"));
    let report = runner.run_with(&mut observer).await;

    if args.get_flag("json") {
        println!("{}", report.to_json().context("serializing report")?);
    } else {
        print!("{}", report.generate_text());
    }
    Ok(report.exit_code())
}

fn list(args: &ArgMatches) -> anyhow::Result<i32> {
    let config = load_config(args)?;
    let catalog = tck_reference::catalog().context("building scenario catalog")?;
    let registry = Arc::new(tck_reference::registry().context("building backend registry")?);
    let plan = config.to_plan(&catalog, &registry)?;

    println!("Bindings:");
    for binding in plan.iter() {
        let descriptor = binding.descriptor();
        println!(
            "  {:<12} {:<9} {:<10} [{}] {}/{} runnable",
            binding.name(),
            binding.tier(),
            descriptor.id(),
            descriptor.capabilities(),
            binding.runnable_count(),
            binding.scenarios().len(),
        );
    }
    println!();
    println!("Scenarios:");
    for scenario in catalog.iter() {
        println!("  {:<24} [{}]", scenario.name(), scenario.required_capabilities());
    }
    Ok(EXIT_SUCCESS)
}

/// How long shutdown waits for abandoned blocking work
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// Drive `future` on a fresh runtime, then shut it down without waiting for
/// scenario bodies that outlived their timeout
fn block_on_bounded<F: Future>(future: F) -> std::io::Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    let output = runtime.block_on(future);
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
    Ok(output)
}

async fn dispatch(matches: &ArgMatches) -> anyhow::Result<i32> {
    match matches.subcommand() {
        Some(("run", args)) => {
            init_logging(args.get_flag("log-json"));
            run(args).await
        }
        Some(("list", args)) => {
            init_logging(false);
            list(args)
        }
        _ => Ok(EXIT_CONFIG_ERROR),
    }
}

fn main() -> ExitCode {
    let matches = cli().get_matches();

    let result = block_on_bounded(dispatch(&matches))
        .context("starting async runtime")
        .and_then(|result| result);

    let code = match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            EXIT_CONFIG_ERROR
        }
    };
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
