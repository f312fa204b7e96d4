//! Terminal credential entry for values not given as flags.

use anyhow::{anyhow, bail, Context, Result};
use std::io::{self, BufRead, IsTerminal, Write};

pub fn read_token() -> Result<String> {
    if !io::stdin().is_terminal() {
        bail!("Asana token required; pass --token or set ASANA_TOKEN when running non-interactively");
    }
    let token = rpassword::prompt_password("Asana personal access token: ")
        .map_err(|err| anyhow!("failed to read token from terminal: {err}"))?;
    non_empty(&token, "token")
}

pub fn read_project() -> Result<String> {
    if !io::stdin().is_terminal() {
        bail!("Asana project ID required; pass --project when running non-interactively");
    }
    eprint!("Asana project ID: ");
    io::stderr().flush().context("flush prompt")?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("read project ID")?;
    non_empty(&line, "project ID")
}

pub(crate) fn non_empty(value: &str, what: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        bail!("{} cannot be empty", what);
    }
    Ok(trimmed.to_string())
}
