use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

pub const ALL_GROUP: &str = "all";
pub const CONTAINERS_GROUP: &str = "containers";
pub const RUNNING_GROUP: &str = "running";
pub const STOPPED_GROUP: &str = "stopped";

/// Groups kept so playbooks written against older setups still resolve.
pub const ALIAS_GROUPS: [&str; 2] = ["incus_containers", "lxc_containers"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Ubuntu,
    Fedora,
    Alpine,
}

impl OsFamily {
    const ALL: [OsFamily; 3] = [OsFamily::Ubuntu, OsFamily::Fedora, OsFamily::Alpine];

    /// Case-insensitive substring match, first family wins.
    pub fn from_image_description(description: &str) -> Option<Self> {
        let description = description.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|family| description.contains(family.group_name()))
    }

    pub fn group_name(&self) -> &'static str {
        match self {
            Self::Ubuntu => "ubuntu",
            Self::Fedora => "fedora",
            Self::Alpine => "alpine",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupVars {
    pub ansible_user: String,
    pub ansible_ssh_private_key_file: String,
    pub ansible_ssh_common_args: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Group {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosts: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vars: Option<GroupVars>,
}

impl Group {
    pub fn with_hosts() -> Self {
        Self {
            hosts: Some(Vec::new()),
            ..Self::default()
        }
    }

    pub fn with_children(children: &[&str]) -> Self {
        Self {
            children: children.iter().map(|c| c.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn hosts(&self) -> &[String] {
        self.hosts.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HostVars {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ansible_host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ansible_user: Option<String>,
    pub container_status: String,
    pub container_type: String,
    pub container_command: String,
}

/// Ansible dynamic inventory as printed by `--list`.
///
/// Groups and hostvars keep insertion order so the output is stable across runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inventory {
    groups: Vec<(String, Group)>,
    hostvars: Vec<(String, HostVars)>,
}

impl Inventory {
    /// Skeleton with the fixed groups and no hosts.
    pub fn new(container_vars: GroupVars) -> Self {
        let containers = Group {
            vars: Some(container_vars),
            ..Group::with_hosts()
        };

        let mut groups = vec![
            (ALL_GROUP.to_string(), Group::with_children(&[CONTAINERS_GROUP])),
            (CONTAINERS_GROUP.to_string(), containers),
        ];
        for alias in ALIAS_GROUPS {
            groups.push((alias.to_string(), Group::with_children(&[CONTAINERS_GROUP])));
        }
        groups.push((RUNNING_GROUP.to_string(), Group::with_hosts()));
        groups.push((STOPPED_GROUP.to_string(), Group::with_hosts()));

        Self {
            groups,
            hostvars: Vec::new(),
        }
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|(n, _)| n == name).map(|(_, g)| g)
    }

    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(n, _)| n.as_str())
    }

    /// Hosts of `group`, empty when the group does not exist.
    pub fn hosts(&self, group: &str) -> &[String] {
        self.group(group).map(Group::hosts).unwrap_or_default()
    }

    /// Appends `host` to `group`, creating a host-only group on first use.
    pub fn add_host(&mut self, group: &str, host: &str) {
        let idx = match self.groups.iter().position(|(n, _)| n == group) {
            Some(idx) => idx,
            None => {
                self.groups.push((group.to_string(), Group::with_hosts()));
                self.groups.len() - 1
            }
        };

        self.groups[idx]
            .1
            .hosts
            .get_or_insert_with(Vec::new)
            .push(host.to_string());
    }

    pub fn host_vars(&self, host: &str) -> Option<&HostVars> {
        self.hostvars.iter().find(|(n, _)| n == host).map(|(_, v)| v)
    }

    pub fn host_vars_mut(&mut self, host: &str) -> Option<&mut HostVars> {
        self.hostvars
            .iter_mut()
            .find(|(n, _)| n == host)
            .map(|(_, v)| v)
    }

    pub fn set_host_vars(&mut self, host: &str, vars: HostVars) {
        match self.host_vars_mut(host) {
            Some(existing) => *existing = vars,
            None => self.hostvars.push((host.to_string(), vars)),
        }
    }

    pub fn hostvars_len(&self) -> usize {
        self.hostvars.len()
    }
}

struct OrderedMap<'a, T>(&'a [(String, T)]);

impl<T: Serialize> Serialize for OrderedMap<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(k, v)| (k, v)))
    }
}

#[derive(Serialize)]
struct Meta<'a> {
    hostvars: OrderedMap<'a, HostVars>,
}

impl Serialize for Inventory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len() + 1))?;
        map.serialize_entry(
            "_meta",
            &Meta {
                hostvars: OrderedMap(&self.hostvars),
            },
        )?;
        for (name, group) in &self.groups {
            map.serialize_entry(name, group)?;
        }
        map.end()
    }
}
