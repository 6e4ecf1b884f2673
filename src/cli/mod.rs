//! CLI module for credkit
//!
//! Provides commands over the configured credential store:
//! - `get`, `set`, `remove`: keyed credentials, or the default slot without a key
//! - `remove-all`: every credential this service has written

use clap::{Parser, Subcommand};
use credkit_core::CredentialBackend;
use url::Url;

pub mod commands;

/// Keyed credentials in the platform credential store
#[derive(Parser, Debug)]
#[command(name = "credkit")]
#[command(about = "Keyed credentials in the platform credential store")]
#[command(version)]
pub struct Cli {
    /// Backend to use instead of the configured one
    /// (auto, keychain, secret_service, windows_credential, memory)
    #[arg(long, global = true)]
    pub backend: Option<CredentialBackend>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the credentials stored under KEY (default slot if omitted)
    Get {
        key: Option<String>,
        /// Print the password instead of masking it
        #[arg(long)]
        show_password: bool,
    },
    /// Store credentials under KEY (default slot if omitted)
    Set {
        key: Option<String>,
        #[arg(long, short)]
        username: Option<String>,
        /// Prompted for when omitted
        #[arg(long, short)]
        password: Option<String>,
        #[arg(long)]
        url: Option<Url>,
        /// Allow cross-device sync of the item
        #[arg(long)]
        cloud_sync: bool,
        /// Allow reads while the device is locked
        #[arg(long)]
        background_access: bool,
    },
    /// Remove the credentials under KEY (default slot if omitted)
    Remove { key: Option<String> },
    /// Remove every stored credential, the default included
    RemoveAll {
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

/// Run the CLI command
pub fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(command) = cli.command else {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        cmd.print_help()?;
        println!();
        return Ok(());
    };

    let mut config = crate::settings::load_config()?;
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    let store = credkit_core::CredentialStore::from_config(&config);

    match command {
        Commands::Get { key, show_password } => {
            commands::get(&store, key.as_deref(), show_password)
        }
        Commands::Set {
            key,
            username,
            password,
            url,
            cloud_sync,
            background_access,
        } => commands::set(
            &store,
            key.as_deref(),
            commands::SetArgs {
                username,
                password,
                url,
                cloud_sync,
                background_access,
            },
        ),
        Commands::Remove { key } => commands::remove(&store, key.as_deref()),
        Commands::RemoveAll { yes } => commands::remove_all(&store, yes),
    }
}
