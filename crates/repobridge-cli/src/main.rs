//! RepoBridge - Markdown from GitHub and GitLab repositories
//!
//! Usage:
//!   repobridge list --owner o --repo r          # List Markdown files
//!   repobridge get --owner o --repo r --path p  # Print a file verbatim
//!   repobridge render --local-id id             # Print a saved macro's file
//!   repobridge macro save --local-id id ...     # Save a macro configuration

mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use repobridge_core::config::ConfigStore;
use repobridge_core::macro_store::{MacroConfig, MacroStore};
use repobridge_core::resolver::RepositoryResolver;
use repobridge_core::service::MacroService;
use repobridge_core::types::{ConnectionParameters, Provider};

#[derive(Parser)]
#[command(name = "repobridge")]
#[command(about = "Markdown from GitHub and GitLab repositories", long_about = None)]
struct Cli {
    /// Resolver config file (default: <config dir>/repobridge/repobridge.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding saved macro configs and tokens
    #[arg(long, global = true)]
    store_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List Markdown files in a repository
    List {
        #[command(flatten)]
        repo: RepoArgs,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Print the raw content of a file
    Get {
        #[command(flatten)]
        repo: RepoArgs,

        /// Repository-relative file path
        #[arg(long)]
        path: String,
    },

    /// Print the file configured for a saved macro
    Render {
        /// Macro instance identifier
        #[arg(long)]
        local_id: String,
    },

    /// Manage stored access tokens
    Token(TokenArgs),

    /// Manage saved macro configurations
    #[command(name = "macro")]
    Macro(MacroArgs),
}

#[derive(Args)]
struct RepoArgs {
    /// Hosting provider (github, gitlab); unrecognized values use github
    #[arg(long, default_value = "github")]
    provider: String,

    /// Host for self-hosted instances (e.g. gitlab.example.com)
    #[arg(long)]
    host: Option<String>,

    /// Repository owner or namespace
    #[arg(long)]
    owner: String,

    /// Repository name
    #[arg(long)]
    repo: String,

    /// Branch (GitHub: repository default; GitLab: main)
    #[arg(long)]
    branch: Option<String>,

    /// Access token (overrides any stored token)
    #[arg(long)]
    token: Option<String>,

    /// Use the token stored for this macro instance
    #[arg(long)]
    local_id: Option<String>,
}

impl RepoArgs {
    fn to_params(&self) -> ConnectionParameters {
        ConnectionParameters {
            provider: parse_provider(&self.provider),
            host: self.host.clone(),
            owner: self.owner.clone(),
            repo: self.repo.clone(),
            branch: self.branch.clone(),
            token: self.token.clone(),
        }
    }
}

#[derive(Args)]
struct TokenArgs {
    #[command(subcommand)]
    command: TokenSubcommand,
}

#[derive(Subcommand)]
enum TokenSubcommand {
    /// Store the access token for a macro instance
    Save {
        #[arg(long)]
        local_id: String,

        #[arg(long)]
        token: String,
    },
}

#[derive(Args)]
struct MacroArgs {
    #[command(subcommand)]
    command: MacroSubcommand,
}

#[derive(Subcommand)]
enum MacroSubcommand {
    /// Save the configuration of a macro instance
    Save {
        #[arg(long)]
        local_id: String,

        #[arg(long, default_value = "github")]
        provider: String,

        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        owner: String,

        #[arg(long)]
        repo: String,

        #[arg(long)]
        branch: Option<String>,

        #[arg(long)]
        path: Option<String>,
    },

    /// Show the saved configuration of a macro instance
    Show {
        #[arg(long)]
        local_id: String,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Delete the configuration and token of a macro instance
    #[command(alias = "rm")]
    Delete {
        #[arg(long)]
        local_id: String,
    },
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub(crate) enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("{} {:#}", console::style("error:").red().bold(), err);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "repobridge=debug,repobridge_core=debug,info"
    } else {
        "repobridge=info,repobridge_core=info,warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let store = match cli.store_dir {
        Some(dir) => MacroStore::new(dir),
        None => MacroStore::from_default_dir()?,
    };

    match cli.command {
        Commands::List { repo, format } => {
            let service = MacroService::new(build_resolver(cli.config)?, store);
            let result = service
                .list_files(repo.to_params(), repo.local_id.as_deref())
                .await?;
            output::print_file_list(&result, format)?;
        }
        Commands::Get { repo, path } => {
            let service = MacroService::new(build_resolver(cli.config)?, store);
            let result = service
                .get_file(repo.to_params(), &path, repo.local_id.as_deref())
                .await?;
            output::print_content(&result.content)?;
        }
        Commands::Render { local_id } => {
            let service = MacroService::new(build_resolver(cli.config)?, store);
            let result = service.render(&local_id).await?;
            output::print_content(&result.content)?;
        }
        Commands::Token(args) => run_token(&store, args.command)?,
        Commands::Macro(args) => run_macro(&store, args.command)?,
    }
    Ok(())
}

fn build_resolver(config_path: Option<PathBuf>) -> Result<RepositoryResolver> {
    let config_store = match config_path {
        Some(path) => ConfigStore::from_path(path),
        None => ConfigStore::from_default_dir()?,
    };
    let config = config_store.load()?;
    tracing::debug!(path = %config_store.config_path().display(), scheme = config.scheme.as_str(), "Loaded resolver config");

    let span = tracing::info_span!("repobridge");
    Ok(RepositoryResolver::with_parent_span(&config, &span)?)
}

fn run_token(store: &MacroStore, command: TokenSubcommand) -> Result<()> {
    match command {
        TokenSubcommand::Save { local_id, token } => {
            store.save_token(&local_id, &token)?;
            println!("✓ Token saved for macro '{}'", local_id);
        }
    }
    Ok(())
}

fn run_macro(store: &MacroStore, command: MacroSubcommand) -> Result<()> {
    match command {
        MacroSubcommand::Save {
            local_id,
            provider,
            host,
            owner,
            repo,
            branch,
            path,
        } => {
            let config = MacroConfig {
                provider: parse_provider(&provider),
                host,
                owner,
                repo,
                branch,
                path,
            };
            store.save_config(&local_id, &config)?;
            println!("✓ Configuration saved for macro '{}'", local_id);
        }
        MacroSubcommand::Show { local_id, format } => {
            let config = store.load_config(&local_id)?;
            output::print_macro_config(&local_id, config.as_ref(), format)?;
        }
        MacroSubcommand::Delete { local_id } => {
            if store.delete(&local_id)? {
                println!("✓ Removed macro '{}'", local_id);
            } else {
                println!("No saved data for macro '{}'", local_id);
            }
        }
    }
    Ok(())
}

fn parse_provider(tag: &str) -> Provider {
    Provider::parse_tag(tag).unwrap_or_else(|| {
        tracing::warn!(tag = %tag, "Unrecognized provider, using github");
        Provider::Github
    })
}
