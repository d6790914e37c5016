use crate::domain::{ContainerManager, ManagerCli};
use anyhow::{Context, Result, bail};
use std::ffi::OsStr;
use std::process::{Command, Output, Stdio};
use tracing::debug;

/// Runs the real `incus` / `lxc` executables found on `PATH`.
#[derive(Debug)]
pub struct IncusAdapter;

impl IncusAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for IncusAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerManager for IncusAdapter {
    fn version(&self, cli: ManagerCli) -> Result<String> {
        let output = run(cli, ["version"], &format!("checking {cli} version"))?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn list_json(&self, cli: ManagerCli) -> Result<String> {
        let output = run(
            cli,
            ["list", "--format", "json"],
            &format!("listing containers with {cli}"),
        )?;

        String::from_utf8(output.stdout)
            .with_context(|| format!("{cli} list produced non UTF-8 output"))
    }
}

fn run<I, S>(cli: ManagerCli, args: I, context: &str) -> Result<Output>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<_> = args
        .into_iter()
        .map(|item| item.as_ref().to_os_string())
        .collect();
    debug!("running {} {:?}", cli.program(), args);

    let output = Command::new(cli.program())
        .args(&args)
        .stdin(Stdio::null())
        .output()
        .with_context(|| context.to_string())?;

    ensure_success(cli, &output, context)?;
    Ok(output)
}

fn ensure_success(cli: ManagerCli, output: &Output, context: &str) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    bail!(
        "{cli} returned status {:?} ({context}): {}",
        output.status.code(),
        stderr.trim()
    )
}
