use crate::domain::ContainerManager;
use crate::infra::config::{default_config_dir, load_app_config_or_default};
use crate::infra::IncusAdapter;
use crate::services::InventoryBuilder;
use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{ArgGroup, Parser};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "incus-inventory",
    version,
    about = "Ansible dynamic inventory for Incus/LXD containers"
)]
#[command(group(ArgGroup::new("mode").required(true).args(["list", "host"])))]
pub struct Cli {
    /// Print the full inventory (groups and hostvars)
    #[arg(long)]
    pub list: bool,

    /// Print variables for a single host (always empty, see `_meta`)
    #[arg(long, value_name = "HOSTNAME")]
    pub host: Option<String>,

    /// Config directory (default: ~/.config/incus-inventory)
    #[arg(long, env = "INCUS_INVENTORY_CONFIG_DIR", default_value_os_t = default_config_dir())]
    pub config_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    List,
    Host(String),
}

impl Cli {
    pub fn mode(&self) -> Mode {
        match &self.host {
            Some(host) if !self.list => Mode::Host(host.clone()),
            _ => Mode::List,
        }
    }
}

/// Exit code for an argument error; help and version output are not failures.
pub fn usage_exit_code(error: &clap::Error) -> i32 {
    match error.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => 0,
        _ => 1,
    }
}

pub fn usage(program: &str) -> String {
    format!("Usage: {program} --list or {program} --host <hostname>")
}

pub fn run(cli: &Cli, out: &mut impl Write) -> Result<()> {
    let manager: Arc<dyn ContainerManager> = Arc::new(IncusAdapter::new());
    run_with_manager(cli, manager, out)
}

pub fn run_with_manager(
    cli: &Cli,
    manager: Arc<dyn ContainerManager>,
    out: &mut impl Write,
) -> Result<()> {
    match cli.mode() {
        Mode::List => {
            let builder = builder(&cli.config_dir, manager);
            let inventory = builder.build();
            serde_json::to_writer_pretty(&mut *out, &inventory)
                .context("writing inventory")?;
        }
        Mode::Host(host) => {
            debug!("--host {host}: hostvars are served through _meta");
            serde_json::to_writer(&mut *out, &serde_json::Map::new())
                .context("writing host vars")?;
        }
    }

    writeln!(out).context("writing inventory")?;
    out.flush().context("flushing stdout")
}

fn builder(config_dir: &Path, manager: Arc<dyn ContainerManager>) -> InventoryBuilder {
    let settings = load_app_config_or_default(config_dir).resolve();
    debug!("inventory settings: {:?}", settings);
    InventoryBuilder::new(manager, settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ManagerCli;
    use crate::test_support::MockManager;

    fn parse(args: &[&str]) -> std::result::Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("incus-inventory").chain(args.iter().copied()))
    }

    #[test]
    fn parses_list_mode() {
        let cli = parse(&["--list"]).unwrap();
        assert_eq!(cli.mode(), Mode::List);
    }

    #[test]
    fn parses_host_mode() {
        let cli = parse(&["--host", "web"]).unwrap();
        assert_eq!(cli.mode(), Mode::Host("web".to_string()));
    }

    #[test]
    fn missing_mode_is_usage_error() {
        let err = parse(&[]).unwrap_err();
        assert_eq!(usage_exit_code(&err), 1);
    }

    #[test]
    fn conflicting_modes_are_usage_error() {
        let err = parse(&["--list", "--host", "web"]).unwrap_err();
        assert_eq!(usage_exit_code(&err), 1);
    }

    #[test]
    fn host_without_name_is_usage_error() {
        let err = parse(&["--host"]).unwrap_err();
        assert_eq!(usage_exit_code(&err), 1);
    }

    #[test]
    fn help_is_not_a_failure() {
        let err = parse(&["--help"]).unwrap_err();
        assert_eq!(usage_exit_code(&err), 0);
    }

    #[test]
    fn usage_mentions_both_modes() {
        let text = usage("inv");
        assert_eq!(text, "Usage: inv --list or inv --host <hostname>");
    }

    #[test]
    fn host_mode_prints_empty_object_without_touching_manager() {
        let mock = Arc::new(MockManager::new());
        mock.set_available(ManagerCli::Incus);
        let cli = parse(&["--host", "anything"]).unwrap();

        let mut out = Vec::new();
        run_with_manager(&cli, mock.clone(), &mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "{}\n");
        assert!(mock.get_commands().is_empty());
    }

    #[test]
    fn list_mode_prints_inventory() {
        let dir = tempfile::tempdir().unwrap();
        let mock = Arc::new(MockManager::new());
        mock.set_available(ManagerCli::Incus);
        mock.set_listing(
            r#"[{"name": "web", "status": "Running", "state": {"network": {
                "eth0": {"addresses": [{"family": "inet", "scope": "global", "address": "10.0.0.4"}]}
            }}}]"#,
        );
        let config_dir = dir.path().to_str().unwrap();
        let cli = parse(&["--list", "--config-dir", config_dir]).unwrap();

        let mut out = Vec::new();
        run_with_manager(&cli, mock, &mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["_meta"]["hostvars"]["web"]["ansible_host"], "10.0.0.4");
        assert_eq!(value["running"]["hosts"][0], "web");
        assert_eq!(value["containers"]["vars"]["ansible_user"], "ec");
    }
}
