use crate::domain::{ContainerManager, ManagerCli};
use anyhow::{Result, bail};
use std::collections::HashSet;
use std::sync::RwLock;

/// In-memory container manager: records every call and answers from canned state.
#[derive(Debug)]
pub struct MockManager {
    available: RwLock<HashSet<ManagerCli>>,
    listing: RwLock<String>,
    commands: RwLock<Vec<String>>,
    fail_on: RwLock<Option<String>>,
}

impl MockManager {
    pub fn new() -> Self {
        Self {
            available: RwLock::new(HashSet::new()),
            listing: RwLock::new("[]".to_string()),
            commands: RwLock::new(Vec::new()),
            fail_on: RwLock::new(None),
        }
    }

    pub fn set_available(&self, cli: ManagerCli) {
        self.available.write().unwrap().insert(cli);
    }

    /// Raw JSON returned by `list_json`.
    pub fn set_listing(&self, json: &str) {
        *self.listing.write().unwrap() = json.to_string();
    }

    pub fn set_fail_on(&self, operation: &str) {
        *self.fail_on.write().unwrap() = Some(operation.to_string());
    }

    pub fn get_commands(&self) -> Vec<String> {
        self.commands.read().unwrap().clone()
    }

    fn record_command(&self, cmd: &str) {
        self.commands.write().unwrap().push(cmd.to_string());
    }

    fn check_available(&self, cli: ManagerCli) -> Result<()> {
        if !self.available.read().unwrap().contains(&cli) {
            bail!("{cli}: command not found");
        }
        Ok(())
    }

    fn check_fail(&self, operation: &str) -> Result<()> {
        if let Some(ref fail_on) = *self.fail_on.read().unwrap() {
            if fail_on == operation {
                bail!("Mock failure on: {}", operation);
            }
        }
        Ok(())
    }
}

impl Default for MockManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerManager for MockManager {
    fn version(&self, cli: ManagerCli) -> Result<String> {
        self.record_command(&format!("{cli} version"));
        self.check_available(cli)?;
        self.check_fail("version")?;
        Ok("6.0.0".to_string())
    }

    fn list_json(&self, cli: ManagerCli) -> Result<String> {
        self.record_command(&format!("{cli} list --format json"));
        self.check_available(cli)?;
        self.check_fail("list")?;
        Ok(self.listing.read().unwrap().clone())
    }
}
