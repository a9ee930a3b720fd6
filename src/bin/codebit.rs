// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use codebit::{
    config::Settings,
    fetch::{Fetcher, HttpTransport},
    path::{default_config_path, matching_files},
    prompt::{AssumeYes, InquirePrompter, Prompter},
    sync::{read_local, Syncer},
};

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::{env::current_dir, path::PathBuf, process::exit};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "codebit [options] <codebit-command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Report every step taken for each file.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    async fn run(self) -> Result<()> {
        let config_path = match self.config {
            Some(path) => path,
            None => default_config_path()?,
        };
        let settings = Settings::load(config_path)?;

        match self.command {
            Command::Get(opts) => run_get(settings, opts).await,
            Command::Update(opts) => run_update(settings, opts).await,
            Command::Check(opts) => run_check(settings, opts).await,
            Command::Show(opts) => run_show(settings, opts),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Retrieve CodeBit from its master copy for the first time.
    #[command(override_usage = "codebit get [options] <url>...")]
    Get(GetOptions),

    /// Update local CodeBits whose master copy is newer.
    #[command(override_usage = "codebit update [options] <pattern>")]
    Update(UpdateOptions),

    /// Report whether local CodeBits are up to date without changing them.
    #[command(override_usage = "codebit check [options] <pattern>")]
    Check(CheckOptions),

    /// Show metadata of local CodeBits.
    #[command(override_usage = "codebit show [options] <pattern>")]
    Show(ShowOptions),
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct GetOptions {
    /// URL of master copy to retrieve into current directory.
    #[arg(required = true, value_name = "url")]
    pub urls: Vec<String>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct UpdateOptions {
    /// Path to local CodeBits, possibly containing wildcards.
    #[arg(required = true, value_name = "pattern")]
    pub pattern: String,

    /// Match pattern in subdirectories too.
    #[arg(short, long)]
    pub recursive: bool,

    /// Apply updates without asking for confirmation.
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct CheckOptions {
    /// Path to local CodeBits, possibly containing wildcards.
    #[arg(required = true, value_name = "pattern")]
    pub pattern: String,

    /// Match pattern in subdirectories too.
    #[arg(short, long)]
    pub recursive: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct ShowOptions {
    /// Path to local CodeBits, possibly containing wildcards.
    #[arg(required = true, value_name = "pattern")]
    pub pattern: String,

    /// Match pattern in subdirectories too.
    #[arg(short, long)]
    pub recursive: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .without_time();
    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = cli.run().await {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

async fn run_get(settings: Settings, opts: GetOptions) -> Result<()> {
    let fetcher = Fetcher::new(HttpTransport::new(&settings.fetch)?);
    let syncer = Syncer::new(fetcher, InquirePrompter);
    let summary = syncer.retrieve_all(opts.urls, current_dir()?).await;
    info!("{summary}");

    Ok(())
}

async fn run_update(settings: Settings, opts: UpdateOptions) -> Result<()> {
    let recursive = opts.recursive || settings.update.recursive;
    let paths = matching_files(&opts.pattern, recursive)?;
    if paths.is_empty() {
        warn!("no files match {:?}", opts.pattern);
        return Ok(());
    }

    let prompter: Box<dyn Prompter> = if opts.yes || settings.update.assume_yes {
        Box::new(AssumeYes)
    } else {
        Box::new(InquirePrompter)
    };
    let fetcher = Fetcher::new(HttpTransport::new(&settings.fetch)?);
    let mut syncer = Syncer::new(fetcher, prompter);
    let summary = syncer.update_all(paths).await;
    info!("{summary}");

    Ok(())
}

async fn run_check(settings: Settings, opts: CheckOptions) -> Result<()> {
    let recursive = opts.recursive || settings.update.recursive;
    let paths = matching_files(&opts.pattern, recursive)?;
    if paths.is_empty() {
        warn!("no files match {:?}", opts.pattern);
        return Ok(());
    }

    let fetcher = Fetcher::new(HttpTransport::new(&settings.fetch)?);
    let syncer = Syncer::new(fetcher, InquirePrompter);
    let summary = syncer.check_all(paths).await;
    info!("{summary}");

    Ok(())
}

fn run_show(settings: Settings, opts: ShowOptions) -> Result<()> {
    let recursive = opts.recursive || settings.update.recursive;
    let paths = matching_files(&opts.pattern, recursive)?;
    if paths.is_empty() {
        warn!("no files match {:?}", opts.pattern);
        return Ok(());
    }

    for path in paths {
        match read_local(&path) {
            Ok(descriptor) => println!("{}\n{descriptor}\n", path.display()),
            Err(err) if err.is_not_a_codebit() => warn!("skip {}: {err}", path.display()),
            Err(err) => error!("{}: {err}", path.display()),
        }
    }

    Ok(())
}
