use clap::{Parser, Subcommand};
use std::path::PathBuf;

use wa_tester::report::Reporter;
use wa_tester::runner::{self, CancelFlag, Harness, RunOutcome};
use wa_tester::utils::config::{HarnessConfig, DEFAULT_BASE_URL, DEFAULT_FIXTURES_DIR};
use wa_tester::ApiClient;

#[derive(Parser)]
#[command(name = "wa-tester")]
#[command(version)]
#[command(about = "Exercise a WhatsApp-sending HTTP API", long_about = None)]
struct Cli {
    /// Base URL of the WhatsApp service
    #[arg(long, env = "API_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    base_url: String,

    /// Target phone number, international format without '+'
    #[arg(long, env = "TARGET_PHONE_NUMBER", global = true)]
    phone: Option<String>,

    /// Directory for generated test files
    #[arg(long, env = "FIXTURES_DIR", default_value = DEFAULT_FIXTURES_DIR, global = true)]
    fixtures_dir: PathBuf,

    /// Write a JSON run report to this path
    #[arg(long, env = "REPORT_PATH", global = true)]
    report: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Full exercise: status, text message, file uploads, completion message (default)
    Run,

    /// Quick status check and a single in-memory upload
    Smoke,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let Some(phone) = cli.phone.filter(|p| !p.trim().is_empty()) else {
        anyhow::bail!("Target phone number is required (--phone or TARGET_PHONE_NUMBER)");
    };

    let cancel = CancelFlag::new();
    cancel.install_ctrlc_handler()?;

    let mut reporter = Reporter::stdout();

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let config = HarnessConfig {
                fixtures_dir: cli.fixtures_dir,
                report_path: cli.report,
                ..HarnessConfig::new(&cli.base_url, &phone)
            };
            let harness = Harness::new(config, cancel)?;
            let report = harness.run(&mut reporter).await?;

            if report.outcome == RunOutcome::NotReady {
                log::warn!("Service at {} is not ready", cli.base_url);
            }
        }

        Commands::Smoke => {
            let client = ApiClient::new(&cli.base_url)?;
            runner::smoke::run_smoke(&client, &phone, &cancel, &mut reporter).await?;
        }
    }

    Ok(())
}
