//! Taskprobe CLI: run the todo application's browser scenarios
//!
//! ## Usage
//!
//! ```bash
//! taskprobe run                           # All scenarios on Chromium
//! taskprobe run --backend simulated       # No browser needed
//! taskprobe run --filter search -j 2      # Filter and run concurrently
//! taskprobe list                          # Show scenarios
//! taskprobe config --config suite.yaml    # Show effective configuration
//! ```

use clap::Parser;
use std::process::ExitCode;
use taskprobe::{scenarios, Reporter};
use taskprobe_cli::{
    load_suite_config, logging, Cli, CliConfig, CliError, CliResult, ColorChoice, Commands,
    ConfigArgs, ListArgs, RunArgs, TestRunner, Verbosity,
};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    let config = build_config(&cli);
    console::set_colors_enabled(config.color.should_color());
    logging::init(&config);

    match cli.command {
        Commands::Run(args) => run_scenarios(config, &args),
        Commands::List(args) => {
            run_list(&args);
            Ok(())
        }
        Commands::Config(args) => run_config(&args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let color: ColorChoice = cli.color.into();
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(color)
}

fn run_scenarios(config: CliConfig, args: &RunArgs) -> CliResult<()> {
    let suite = args.apply(load_suite_config(args.config.as_deref())?);
    let runtime = tokio::runtime::Runtime::new()?;
    let mut runner = TestRunner::new(config);
    let results = runtime.block_on(runner.run(&suite, args.backend, args.filter.as_deref()))?;

    let reporter = Reporter::new(&results);
    if let Some(ref path) = args.report_json {
        reporter.write_json(path)?;
    }
    if let Some(ref path) = args.report_junit {
        reporter.write_junit(path)?;
    }

    if results.all_passed() {
        Ok(())
    } else {
        Err(CliError::test_execution(format!(
            "{} of {} scenarios failed",
            results.failed_count(),
            results.total()
        )))
    }
}

fn run_list(args: &ListArgs) {
    for scenario in scenarios::filter(args.filter.as_deref()) {
        println!("{:<20} {}", scenario.id, scenario.name);
    }
}

fn run_config(args: &ConfigArgs) -> CliResult<()> {
    let suite = load_suite_config(args.config.as_deref())?;
    print!("{}", suite.to_yaml()?);
    Ok(())
}
