//! Command-line interface

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "storefront-e2e",
    version,
    about = "Deploy the storefront to minikube and run its API checks"
)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, short, global = true, env = "STOREFRONT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Deploy, wait for the service and print its URL
    Deploy(DeployArgs),
    /// Run the API checks against a deployed storefront
    Test(TestArgs),
    /// Deploy, then run the API checks against the fresh deployment
    Run(DeployArgs),
}

#[derive(Debug, Clone, Default, clap::Args)]
pub struct DeployArgs {
    /// Reuse an existing image instead of running `docker build`
    #[arg(long)]
    pub skip_build: bool,

    /// Do not push the image (local minikube registry)
    #[arg(long)]
    pub skip_push: bool,

    /// Image tag to build, push and deploy
    #[arg(long)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, clap::Args)]
pub struct TestArgs {
    /// Storefront URL; resolved from the cluster when omitted
    #[arg(long)]
    pub base_url: Option<String>,

    /// Username registered by the suite
    #[arg(long)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}
