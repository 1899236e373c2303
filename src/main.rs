use anyhow::Context as _;
use clap::Parser;
use std::process::ExitCode;
use storefront_e2e::deploy::SystemRunner;
use storefront_e2e::metrics::RunMetrics;
use storefront_e2e::{Config, Pipeline};
use tracing::{error, info, warn};

mod cli;

use cli::{Cli, Command, DeployArgs, LogFormat, TestArgs};

/// Exit status for infrastructure failures (commands, readiness, resolution)
const EXIT_FATAL: u8 = 2;

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn apply_deploy_args(config: &mut Config, args: &DeployArgs) {
    config.deploy.skip_build |= args.skip_build;
    config.deploy.skip_push |= args.skip_push;
    if let Some(image) = &args.image {
        config.deploy.image = image.clone();
    }
}

fn apply_test_args(config: &mut Config, args: &TestArgs) {
    if let Some(username) = &args.username {
        config.suite.username = username.clone();
    }
}

async fn execute(
    command: &Command,
    pipeline: &Pipeline<'_>,
) -> Result<ExitCode, storefront_e2e::PipelineError> {
    match command {
        Command::Deploy(_) => {
            info!("Deploying application");
            let url = pipeline.deploy().await?;
            println!("{}", url);
            Ok(ExitCode::SUCCESS)
        }
        Command::Test(args) => {
            let url = match &args.base_url {
                Some(url) => url.clone(),
                None => pipeline.discover().await?,
            };
            info!(url = %url, "Running tests");
            let report = pipeline.test(&url).await?;
            println!("{}", report);
            Ok(ExitCode::from(report.exit_code()))
        }
        Command::Run(_) => {
            info!("Deploying application");
            let url = pipeline.deploy().await?;
            info!(url = %url, "Running tests");
            let report = pipeline.test(&url).await?;
            println!("{}", report);
            Ok(ExitCode::from(report.exit_code()))
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    match &cli.command {
        Command::Deploy(args) | Command::Run(args) => apply_deploy_args(&mut config, args),
        Command::Test(args) => apply_test_args(&mut config, args),
    }

    let metrics = RunMetrics::new().context("Failed to create metrics registry")?;
    let runner = SystemRunner;
    let pipeline = Pipeline::new(&config, &runner, metrics);

    let result = execute(&cli.command, &pipeline).await;

    // Written even when the run failed
    if let Some(path) = &config.metrics_file {
        match pipeline.metrics().write_textfile(path) {
            Ok(()) => info!(path = %path.display(), "Metrics written"),
            Err(e) => warn!(error = %e, path = %path.display(), "Failed to write metrics"),
        }
    }

    Ok(result?)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %format!("{:#}", e), "Run aborted");
            ExitCode::from(EXIT_FATAL)
        }
    }
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
