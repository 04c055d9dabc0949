pub mod cli;
pub mod commands;
pub mod http;
pub mod render;
pub mod store;

use std::ffi::OsString;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use taskhub_core::config::{API_URL_ENV_VAR, ClientConfig};
use taskhub_core::{ApiClient, App};
use tracing::{debug, info};

#[tracing::instrument(skip_all)]
pub fn run(raw_args: Vec<OsString>) -> anyhow::Result<()> {
    let cli = cli::Cli::parse_from(raw_args);

    cli::init_tracing(cli.verbose, cli.quiet)?;

    info!(
        verbose = cli.verbose,
        quiet = cli.quiet,
        "starting taskhub CLI"
    );

    let cfg = resolve_config(&cli)?;
    let session_path = match &cli.session_file {
        Some(path) => path.clone(),
        None => store::default_session_path()?,
    };
    debug!(
        api = cfg.api_base_url(),
        session = %session_path.display(),
        "resolved settings"
    );

    let store = store::FileStore::open(&session_path).with_context(|| {
        format!(
            "failed to open session file {}",
            session_path.display()
        )
    })?;
    let transport = http::ReqwestTransport::new()?;
    let client = ApiClient::new(cfg.api_base_url(), transport);
    let app = App::new(store, &cfg);
    let renderer = render::Renderer::new(
        io::stdout().lock(),
        io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let mut shell = commands::Shell::new(app, client, renderer);
    runtime.block_on(shell.dispatch(cli.command))?;

    info!("done");
    Ok(())
}

/// Config file, then `TASKHUB_API_URL`, then `--rc`, then `--api-url`.
pub fn resolve_config(cli: &cli::Cli) -> anyhow::Result<ClientConfig> {
    let path = cli.config.clone().or_else(default_config_path);
    let mut cfg = ClientConfig::load(path.as_deref())?;

    let env_url = std::env::var(API_URL_ENV_VAR)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(|value| ("api.base_url".to_string(), value));

    cfg.apply_overrides(
        env_url
            .into_iter()
            .chain(
                cli.rc_overrides
                    .iter()
                    .map(|kv| (kv.key.clone(), kv.value.clone())),
            )
            .chain(
                cli.api_url
                    .clone()
                    .map(|url| ("api.base_url".to_string(), url)),
            ),
    )?;

    Ok(cfg)
}

/// `<config dir>/taskhub/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("taskhub").join("config.toml"))
}
