use anyhow::Result;
use serde::Deserialize;
use std::fmt::{self, Debug};

/// Container manager clients that understand `version` and `list --format json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManagerCli {
    Incus,
    Lxc,
}

impl ManagerCli {
    /// Probe order: Incus first, LXD's client second.
    pub const CANDIDATES: [ManagerCli; 2] = [ManagerCli::Incus, ManagerCli::Lxc];

    pub fn program(&self) -> &'static str {
        match self {
            Self::Incus => "incus",
            Self::Lxc => "lxc",
        }
    }
}

impl fmt::Display for ManagerCli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

/// Trait for container manager operations
pub trait ContainerManager: Send + Sync + Debug {
    /// Run `<cli> version`, failing when the client is missing or exits non-zero
    fn version(&self, cli: ManagerCli) -> Result<String>;

    /// Raw stdout of `<cli> list --format json`
    fn list_json(&self, cli: ManagerCli) -> Result<String>;
}
