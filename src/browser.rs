//! Opens the served application in the system browser.

use crate::session::ServerSession;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// URL of the first page the browser opens.
pub fn launch_url(port: u16, session: &ServerSession) -> String {
    let init_file = session.init_file.trim_start_matches('/');
    match session.path_secret() {
        Some(secret) => format!("http://127.0.0.1:{}/{}/{}", port, secret, init_file),
        None => format!("http://127.0.0.1:{}/{}", port, init_file),
    }
}

/// Hands `url` to the platform's opener without waiting for it.
pub fn launch(url: &str) -> Result<()> {
    let (opener, args) = opener_command(url)?;
    Command::new(&opener)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("Failed to launch browser with {}", opener.display()))?;
    Ok(())
}

fn opener_command(url: &str) -> Result<(PathBuf, Vec<String>)> {
    if cfg!(target_os = "windows") {
        let cmd = which::which("cmd").context("Failed to find cmd")?;
        // The empty argument is the window title `start` expects first.
        let args = ["/C", "start", "", url].map(str::to_string).to_vec();
        return Ok((cmd, args));
    }
    let name = if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    };
    let opener = which::which(name).with_context(|| format!("Failed to find {}", name))?;
    Ok((opener, vec![url.to_string()]))
}
