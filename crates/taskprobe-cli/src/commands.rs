//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use taskprobe::SuiteConfig;

/// Taskprobe: browser scenarios for the todo application
#[derive(Parser, Debug)]
#[command(name = "taskprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run scenarios
    Run(RunArgs),

    /// List scenarios
    List(ListArgs),

    /// Show the effective suite configuration
    Config(ConfigArgs),
}

/// Where pages come from
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Backend {
    /// A real Chromium over CDP
    #[default]
    Chromium,
    /// The in-memory todo application
    Simulated,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct RunArgs {
    /// Only run scenarios whose id or name contains this
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Number of scenarios run concurrently
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Skip remaining scenarios after the first failure
    #[arg(long)]
    pub fail_fast: bool,

    /// Page backend
    #[arg(short, long, value_enum, default_value_t = Backend::Chromium)]
    pub backend: Backend,

    /// Scheme and host of the application
    #[arg(long, env = "TASKPROBE_BASE_URL")]
    pub base_url: Option<String>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Auto-wait timeout in milliseconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Whole-scenario timeout in milliseconds
    #[arg(long)]
    pub scenario_timeout: Option<u64>,

    /// Suite configuration file (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write a JSON report here
    #[arg(long)]
    pub report_json: Option<PathBuf>,

    /// Write a JUnit XML report here
    #[arg(long)]
    pub report_junit: Option<PathBuf>,

    /// Save failure screenshots into this directory
    #[arg(long)]
    pub artifacts: Option<PathBuf>,

    /// Chromium executable
    #[arg(long)]
    pub chromium_path: Option<PathBuf>,

    /// Disable the Chromium sandbox
    #[arg(long)]
    pub no_sandbox: bool,
}

impl RunArgs {
    /// Layer the command-line overrides on top of `config`
    #[must_use]
    pub fn apply(&self, mut config: SuiteConfig) -> SuiteConfig {
        if let Some(ref base_url) = self.base_url {
            config.base_url.clone_from(base_url);
        }
        if let Some(jobs) = self.jobs {
            config.jobs = jobs;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_ms = timeout;
        }
        if let Some(timeout) = self.scenario_timeout {
            config.scenario_timeout_ms = timeout;
        }
        if let Some(ref dir) = self.artifacts {
            config.artifacts_dir = Some(dir.clone());
        }
        config.fail_fast |= self.fail_fast;
        if let Some(ref path) = self.chromium_path {
            config.browser = config.browser.with_chromium_path(path.clone());
        }
        if self.headed {
            config.browser = config.browser.with_headless(false);
        }
        if self.no_sandbox {
            config.browser = config.browser.with_no_sandbox();
        }
        config
    }
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Only list scenarios whose id or name contains this
    #[arg(short, long)]
    pub filter: Option<String>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Suite configuration file (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Color argument
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
