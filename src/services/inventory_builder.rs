use crate::domain::inventory::{CONTAINERS_GROUP, RUNNING_GROUP, STOPPED_GROUP};
use crate::domain::{
    ContainerManager, ContainerRecord, GroupVars, HostVars, Inventory, ManagerCli, OsFamily,
};
use crate::infra::config::InventorySettings;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Turns the container manager's listing into an Ansible inventory.
pub struct InventoryBuilder {
    manager: Arc<dyn ContainerManager>,
    settings: InventorySettings,
}

impl InventoryBuilder {
    pub fn new(manager: Arc<dyn ContainerManager>, settings: InventorySettings) -> Self {
        Self { manager, settings }
    }

    /// Configured client, or the first candidate whose `version` succeeds.
    pub fn detect_command(&self) -> Option<ManagerCli> {
        if let Some(cli) = self.settings.command {
            debug!("using configured client {cli}");
            return Some(cli);
        }

        ManagerCli::CANDIDATES.into_iter().find(|cli| {
            match self.manager.version(*cli) {
                Ok(version) => {
                    debug!("{cli} available (version {version})");
                    true
                }
                Err(e) => {
                    debug!("{cli} not usable: {e:#}");
                    false
                }
            }
        })
    }

    /// Containers from the detected client; any failure is logged and yields an empty list.
    pub fn fetch_containers(&self) -> (Vec<ContainerRecord>, Option<ManagerCli>) {
        let Some(cli) = self.detect_command() else {
            error!("Neither incus nor lxc command found. Please install Incus or LXD.");
            return (Vec::new(), None);
        };

        let raw = match self.manager.list_json(cli) {
            Ok(raw) => raw,
            Err(e) => {
                error!("Unable to list containers using {cli}. Is the service running? ({e:#})");
                return (Vec::new(), Some(cli));
            }
        };

        match parse_listing(&raw) {
            Ok(records) => {
                info!("{} container(s) reported by {cli}", records.len());
                (records, Some(cli))
            }
            Err(e) => {
                error!("Unable to parse {cli} output: {e:#}");
                (Vec::new(), Some(cli))
            }
        }
    }

    pub fn build(&self) -> Inventory {
        let (records, cli) = self.fetch_containers();
        self.build_from(&records, cli)
    }

    /// Maps already-listed containers; `cli` is recorded in each host's vars.
    pub fn build_from(&self, records: &[ContainerRecord], cli: Option<ManagerCli>) -> Inventory {
        let mut inventory = Inventory::new(self.group_vars());
        let command = cli.map(|c| c.program()).unwrap_or_default();

        for record in records {
            let name = record.name.as_str();
            if name.is_empty() {
                debug!("skipping container record without a name");
                continue;
            }

            inventory.add_host(CONTAINERS_GROUP, name);

            if record.status.is_running() {
                inventory.add_host(RUNNING_GROUP, name);

                if let Some(ip) = record.ipv4_address() {
                    inventory.set_host_vars(
                        name,
                        HostVars {
                            ansible_host: Some(ip.to_string()),
                            ansible_user: record.ansible_user().map(str::to_string),
                            ..self.base_host_vars(record, command)
                        },
                    );
                } else {
                    debug!("{name} is running without a global IPv4 address");
                }
            } else {
                inventory.add_host(STOPPED_GROUP, name);
                inventory.set_host_vars(name, self.base_host_vars(record, command));
            }

            if let Some(family) = OsFamily::from_image_description(record.image_description()) {
                inventory.add_host(family.group_name(), name);

                if family == OsFamily::Fedora {
                    if let Some(vars) = inventory.host_vars_mut(name) {
                        vars.ansible_user
                            .get_or_insert_with(|| self.settings.fedora_user.clone());
                    }
                }
            }
        }

        inventory
    }

    fn group_vars(&self) -> GroupVars {
        GroupVars {
            ansible_user: self.settings.default_user.clone(),
            ansible_ssh_private_key_file: self.settings.ssh_key.to_string_lossy().into_owned(),
            ansible_ssh_common_args: self.settings.ssh_common_args.clone(),
        }
    }

    fn base_host_vars(&self, record: &ContainerRecord, command: &str) -> HostVars {
        HostVars {
            container_status: record.status.to_string(),
            container_type: record.kind.clone(),
            container_command: command.to_string(),
            ..HostVars::default()
        }
    }
}

pub fn parse_listing(raw: &str) -> Result<Vec<ContainerRecord>> {
    serde_json::from_str(raw).context("decoding container list")
}
