use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use blupd8::{commands, core::config::Config};

#[derive(Parser)]
#[clap(name = "blupd8")]
#[clap(about = "Keeps a local install up to date from a release listing server")]
#[clap(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[clap(flatten)]
    overrides: Overrides,

    /// Log every stage (same as RUST_LOG=debug)
    #[clap(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Commands,
}

/// One-off overrides for values stored in ~/.blupd8/config.json
#[derive(Args)]
struct Overrides {
    /// Listing page that holds one folder per release
    #[clap(long, global = true)]
    releases_url: Option<String>,
    /// Project name as it appears in the release folder names
    #[clap(long, global = true)]
    project: Option<String>,
    /// Directory receiving one <project>-<version> folder per install
    #[clap(long, global = true)]
    install_root: Option<PathBuf>,
    /// Substring the package name must contain (e.g. windows64)
    #[clap(long, global = true)]
    platform: Option<String>,
    /// Suffix the package name must end with (e.g. zip)
    #[clap(long, global = true)]
    package_type: Option<String>,
    /// Directory holding downloaded packages before extraction
    #[clap(long, global = true)]
    scratch_dir: Option<PathBuf>,
    /// User-Agent header sent to the release server
    #[clap(long, global = true)]
    user_agent: Option<String>,
    /// Keep the downloaded package after a successful install
    #[clap(long, global = true)]
    keep_downloads: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Download and install the latest release if it is missing
    Update {
        /// Install this version instead of the latest
        #[clap(long)]
        version: Option<String>,
    },
    /// List versions published on the release server
    Available,
    /// List packages published for a version (default: latest)
    Packages {
        version: Option<String>,
    },
    /// List installed versions
    List,
    /// Show the effective configuration
    Config,
}

impl Overrides {
    fn apply(self, config: &mut Config) {
        if let Some(url) = self.releases_url {
            config.releases_url = url;
        }
        if let Some(project) = self.project {
            config.project = project.to_lowercase();
        }
        if let Some(root) = self.install_root {
            config.install_root = root;
        }
        if let Some(platform) = self.platform {
            config.platform = platform;
        }
        if let Some(package_type) = self.package_type {
            config.package_type = package_type;
        }
        if let Some(scratch_dir) = self.scratch_dir {
            config.scratch_dir = scratch_dir;
        }
        if let Some(user_agent) = self.user_agent {
            config.user_agent = user_agent;
        }
        if self.keep_downloads {
            config.keep_downloads = true;
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "blupd8=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(overrides: Overrides) -> blupd8::error::Result<Config> {
    let mut config = Config::load()?;
    overrides.apply(&mut config);
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = load_config(cli.overrides).and_then(|config| match cli.command {
        Commands::Update { version } => commands::update::run_update(config, version.as_deref()),
        Commands::Available => commands::available::list_available_versions(config),
        Commands::Packages { version } => {
            commands::packages::list_packages(config, version.as_deref())
        }
        Commands::List => commands::list::list_versions(&config),
        Commands::Config => commands::config::show_config(&config),
    });

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    Ok(())
}
