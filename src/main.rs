mod app_paths;
mod browser;
mod content;
mod error;
mod keepalive;
mod logging;
mod rpc;
mod server;
mod session;
mod settings;

use anyhow::{Context, Result};
use clap::Parser;
use content::{ArchiveIndex, ContentSource, SearchPath};
use rpc::{BuiltinFunctions, JsonStore};
use server::{port, AppState};
use session::{ServerContext, ServerSession};
use settings::Settings;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Short git SHA of the build, or `unknown`.
pub const BUILD_SHA: &str = env!("SLFSRV_GIT_SHA");

/// File extensions served as in-memory bundles.
const BUNDLE_EXTENSIONS: &[&str] = &["zip", "slfsrv"];

#[derive(Parser)]
#[command(name = "slfsrv")]
#[command(about = "Serve a local web application to one browser session")]
#[command(version)]
struct Cli {
    /// Directory to serve, or a .zip/.slfsrv bundle
    root: PathBuf,

    /// Resource opened first, relative to ROOT
    #[arg(default_value = "")]
    init_file: String,

    /// Listen on this port instead of probing 8000-8999
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory searched before ROOT (repeatable; first wins)
    #[arg(long)]
    overlay: Vec<PathBuf>,

    /// Key/value store file (defaults to ~/.slfsrv/store.json)
    #[arg(long)]
    store: Option<PathBuf>,

    /// Print the URL instead of opening a browser
    #[arg(long)]
    no_browser: bool,

    /// Serve without the secret path segment
    #[arg(long)]
    no_secret: bool,

    /// Log rejected requests, missing files and RPC calls
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Settings file (defaults to ~/.slfsrv/settings.yaml)
    #[arg(long)]
    settings: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.debug);

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("slfsrv: {:#}", e);
            1
        }
    };
    std::process::exit(code);
}

/// Starts serving and returns the process exit code once an exit is requested.
async fn run(cli: Cli) -> Result<i32> {
    let settings_path = match &cli.settings {
        Some(path) => path.clone(),
        None => app_paths::settings_path()?,
    };
    let settings = Settings::load(&settings_path)?;

    let content = content_source(&cli.root, &cli.overlay)?;
    let store_path = match &cli.store {
        Some(path) => path.clone(),
        None => app_paths::store_path()?,
    };
    let store = JsonStore::load(&store_path)?;

    let session = Arc::new(ServerSession {
        secret_key: session::generate_secret_key(),
        secret_key_in_path: settings.secret_key_in_path && !cli.no_secret,
        verbose: cli.verbose,
        content,
        root_path: std::fs::canonicalize(&cli.root).unwrap_or_else(|_| cli.root.clone()),
        init_file: cli.init_file.clone(),
    });

    let port = port::select_port(cli.port.or(settings.explicit_port()));
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, port))
        .await
        .with_context(|| format!("Failed to listen on 127.0.0.1:{}", port))?;
    let port = listener
        .local_addr()
        .context("Failed to read listener address")?
        .port();

    let window = settings.keep_alive_window();
    let (exit_tx, mut exit_rx) = mpsc::unbounded_channel();
    let (keepalive, signals) = keepalive::channel();
    let state = Arc::new(AppState {
        context: ServerContext::new(session.clone(), port, window, exit_tx.clone()),
        functions: Arc::new(BuiltinFunctions::new(store)),
        keepalive,
    });

    let server = tokio::spawn(server::serve(listener, server::router(state)));
    let _watchdog = keepalive::spawn_watchdog(signals, window, exit_tx);
    info!(
        "Serving {} on port {} (version {}, keepalive {}s)",
        session.root_path.display(),
        port,
        BUILD_SHA,
        window.as_secs()
    );

    let url = browser::launch_url(port, &session);
    if cli.no_browser {
        println!("{}", url);
    } else {
        browser::launch(&url)?;
    }

    tokio::select! {
        request = exit_rx.recv() => match request {
            Some(request) => {
                if request.exit_code() == 0 {
                    info!("Exiting: {}", request);
                } else {
                    error!("Exiting: {}", request);
                }
                Ok(request.exit_code())
            }
            None => Ok(0),
        },
        result = server => {
            result.context("HTTP server task failed")??;
            anyhow::bail!("HTTP server stopped")
        }
    }
}

/// Chooses the content source for `root`. Overlays apply only to directories.
fn content_source(root: &Path, overlays: &[PathBuf]) -> Result<ContentSource> {
    if is_bundle(root) {
        if !overlays.is_empty() {
            warn!("--overlay is ignored when serving a bundle");
        }
        let index = ArchiveIndex::open(root)?;
        if index.is_empty() {
            warn!("Bundle {} has no file entries", root.display());
        }
        info!("Loaded {} entries from {}", index.len(), root.display());
        return Ok(ContentSource::Archive(index));
    }

    if !root.is_dir() {
        anyhow::bail!(
            "ROOT must be a directory or a .zip/.slfsrv bundle: {}",
            root.display()
        );
    }
    let mut roots = overlays.to_vec();
    roots.push(root.to_path_buf());
    let search_path = SearchPath::new(roots);
    info!("Search path: {:?}", search_path.roots());
    Ok(ContentSource::Filesystem(search_path))
}

fn is_bundle(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| BUNDLE_EXTENSIONS.iter().any(|b| ext.eq_ignore_ascii_case(b)))
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_directory_root_searched_after_overlays() {
        let temp = TempDir::new().unwrap();
        let overlay = temp.path().join("overlay");
        std::fs::create_dir_all(&overlay).unwrap();

        let source = content_source(temp.path(), std::slice::from_ref(&overlay)).unwrap();
        let ContentSource::Filesystem(search_path) = source else {
            panic!("Expected filesystem source");
        };
        assert_eq!(
            search_path.roots(),
            &[overlay, temp.path().to_path_buf()]
        );
    }

    #[test]
    fn test_bundle_root_loads_archive() {
        let temp = TempDir::new().unwrap();
        let bundle = temp.path().join("app.SLFSRV");
        let file = std::fs::File::create(&bundle).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        writer
            .start_file("index.html", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"<p>hi</p>").unwrap();
        writer.finish().unwrap();

        let source = content_source(&bundle, &[]).unwrap();
        let ContentSource::Archive(index) = source else {
            panic!("Expected archive source");
        };
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_missing_root_rejected() {
        let temp = TempDir::new().unwrap();
        let err = content_source(&temp.path().join("nope"), &[]).unwrap_err();
        assert!(err.to_string().contains("ROOT must be a directory"));
    }
}
