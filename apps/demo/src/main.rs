use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use modal_core::{
    ModalDependencies, ModalError, ProviderHandle, SelectionSurface, SurfaceProps, WalletModal,
    WalletSession,
};
use shared::domain::RenderStyle;
use storage::Storage;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod simulated;
mod terminal;

use config::{load_settings, normalize_database_url};
use terminal::TerminalSurface;

#[derive(Parser, Debug)]
#[command(name = "wallet-select-demo")]
struct Cli {
    /// Overrides the configured preference store.
    #[arg(long)]
    database_url: Option<String>,
    /// TOML settings file; defaults to ./wallet_select.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Prints the eligible providers.
    List,
    /// Connects through the cached provider, the only provider or the surface.
    Connect,
    /// Connects to one provider directly.
    ConnectTo { id: String },
    /// Prints the cached provider id.
    Cached,
    SetCache { id: String },
    ClearCache,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(database_url) = cli.database_url {
        settings.database_url = normalize_database_url(&database_url);
    }

    let storage = Storage::new(&settings.database_url)
        .await
        .with_context(|| format!("failed to open store at '{}'", settings.database_url))?;
    info!(database_url = %settings.database_url, "preference store ready");

    let surface = Arc::new(TerminalSurface::default());
    let dependencies = simulated::register(
        ModalDependencies::new(Arc::new(storage), surface.clone())
            .with_environment(settings.environment()),
        &settings,
    );
    let modal = WalletModal::new(settings.modal.clone(), dependencies).await?;
    if modal.render_style() == RenderStyle::Inline {
        let selector = modal.render_inline()?;
        surface.mount(
            "inline",
            SurfaceProps {
                providers: selector.providers,
                on_close: selector.on_close,
                reset_state: selector.reset_state,
                lightbox_opacity: None,
            },
        )?;
    }

    let outcome = run(&modal, cli.command).await;
    modal.dispose();
    outcome
}

async fn run(modal: &WalletModal, command: Command) -> Result<()> {
    match command {
        Command::List => {
            if modal.providers().is_empty() {
                println!("no eligible providers");
            }
            terminal::print_providers(modal.providers());
        }
        Command::Connect => match modal.connect().await {
            Ok(handle) => report(handle).await?,
            Err(ModalError::Dismissed) => println!("selection dismissed"),
            Err(err) => return Err(err.into()),
        },
        Command::ConnectTo { id } => report(modal.connect_to(&id).await?).await?,
        Command::Cached => match modal.cached_provider() {
            Some(id) => println!("cached provider: {id}"),
            None => println!("no cached provider"),
        },
        Command::SetCache { id } => {
            modal.set_cached_provider(&id).await?;
            println!("cached provider set to {id}");
        }
        Command::ClearCache => {
            modal.clear_cached_provider().await?;
            println!("cached provider cleared");
        }
    }
    Ok(())
}

async fn report(handle: ProviderHandle) -> Result<()> {
    println!(
        "connected provider={} accounts={} network={}",
        handle.provider_id(),
        handle.accounts().join(","),
        handle.network().as_deref().unwrap_or("<none>")
    );
    handle.disconnect().await
}
