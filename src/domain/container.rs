use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::fmt;

pub const LOOPBACK_INTERFACE: &str = "lo";
pub const ANSIBLE_USER_KEY: &str = "user.ansible_user";
pub const IMAGE_DESCRIPTION_KEY: &str = "image.description";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum ContainerStatus {
    Running,
    Stopped,
    Frozen,
    Error,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ContainerStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "Running"),
            Self::Stopped => write!(f, "Stopped"),
            Self::Frozen => write!(f, "Frozen"),
            Self::Error => write!(f, "Error"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct NetworkAddress {
    #[serde(default)]
    pub family: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub address: String,
}

impl NetworkAddress {
    pub fn is_global_ipv4(&self) -> bool {
        self.family == "inet" && self.scope == "global" && !self.address.is_empty()
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct NetworkInterface {
    #[serde(default, deserialize_with = "null_as_default")]
    pub addresses: Vec<NetworkAddress>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContainerState {
    /// Interfaces in the order the manager reported them.
    #[serde(default, deserialize_with = "interfaces_in_order")]
    pub network: Vec<(String, NetworkInterface)>,
}

/// One element of `<cli> list --format json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ContainerRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub status: ContainerStatus,
    #[serde(rename = "type", default = "default_container_type")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub config: HashMap<String, String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub state: ContainerState,
}

fn default_container_type() -> String {
    "container".to_string()
}

impl ContainerRecord {
    pub fn config_value(&self, key: &str) -> Option<&str> {
        self.config.get(key).map(String::as_str)
    }

    /// First global IPv4 address on a non-loopback interface, only for running containers.
    pub fn ipv4_address(&self) -> Option<&str> {
        if !self.status.is_running() {
            return None;
        }

        self.state
            .network
            .iter()
            .filter(|(name, _)| name != LOOPBACK_INTERFACE)
            .flat_map(|(_, iface)| iface.addresses.iter())
            .find(|addr| addr.is_global_ipv4())
            .map(|addr| addr.address.as_str())
    }

    /// `user.ansible_user` from the container config, ignoring empty values.
    pub fn ansible_user(&self) -> Option<&str> {
        self.config_value(ANSIBLE_USER_KEY)
            .filter(|user| !user.trim().is_empty())
    }

    pub fn image_description(&self) -> &str {
        self.config_value(IMAGE_DESCRIPTION_KEY).unwrap_or_default()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn interfaces_in_order<'de, D>(
    deserializer: D,
) -> Result<Vec<(String, NetworkInterface)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct InterfacesVisitor;

    impl<'de> Visitor<'de> for InterfacesVisitor {
        type Value = Vec<(String, NetworkInterface)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of network interfaces or null")
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_map(self)
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut interfaces = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((name, iface)) = map.next_entry::<String, NetworkInterface>()? {
                interfaces.push((name, iface));
            }
            Ok(interfaces)
        }
    }

    deserializer.deserialize_option(InterfacesVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ContainerRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn parses_running_container_with_network() {
        let record = parse(
            r#"{
                "name": "web",
                "status": "Running",
                "type": "container",
                "config": {"image.description": "Ubuntu noble amd64"},
                "state": {
                    "network": {
                        "lo": {"addresses": [
                            {"family": "inet", "scope": "global", "address": "127.0.0.1"}
                        ]},
                        "eth0": {"addresses": [
                            {"family": "inet6", "scope": "global", "address": "fd42::1"},
                            {"family": "inet", "scope": "link", "address": "169.254.0.2"},
                            {"family": "inet", "scope": "global", "address": "10.10.0.5"}
                        ]}
                    }
                }
            }"#,
        );

        assert_eq!(record.name, "web");
        assert_eq!(record.status, ContainerStatus::Running);
        assert_eq!(record.ipv4_address(), Some("10.10.0.5"));
        assert_eq!(record.image_description(), "Ubuntu noble amd64");
    }

    #[test]
    fn keeps_interface_order_from_listing() {
        let record = parse(
            r#"{
                "name": "multi",
                "status": "Running",
                "state": {"network": {
                    "eth1": {"addresses": [{"family": "inet", "scope": "global", "address": "192.168.1.9"}]},
                    "docker0": {"addresses": [{"family": "inet", "scope": "global", "address": "172.17.0.1"}]}
                }}
            }"#,
        );

        let names: Vec<&str> = record.state.network.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["eth1", "docker0"]);
        assert_eq!(record.ipv4_address(), Some("192.168.1.9"));
    }

    #[test]
    fn stopped_container_has_no_address() {
        let record = parse(
            r#"{
                "name": "db",
                "status": "Stopped",
                "state": {"network": {
                    "eth0": {"addresses": [{"family": "inet", "scope": "global", "address": "10.0.0.2"}]}
                }}
            }"#,
        );

        assert_eq!(record.ipv4_address(), None);
    }

    #[test]
    fn tolerates_null_and_missing_fields() {
        let record = parse(r#"{"name": "bare", "status": "Running", "config": null, "state": null}"#);
        assert_eq!(record.kind, "container");
        assert!(record.config.is_empty());
        assert!(record.state.network.is_empty());
        assert_eq!(record.ipv4_address(), None);

        let record = parse(r#"{"name": "nonet", "state": {"network": null}}"#);
        assert_eq!(record.status, ContainerStatus::Unknown);
        assert!(record.state.network.is_empty());
    }

    #[test]
    fn unrecognized_status_is_unknown() {
        let record = parse(r#"{"name": "odd", "status": "Migrating"}"#);
        assert_eq!(record.status, ContainerStatus::Unknown);
        assert_eq!(record.status.to_string(), "Unknown");
    }

    #[test]
    fn empty_ansible_user_is_ignored() {
        let record = parse(r#"{"name": "x", "config": {"user.ansible_user": "  "}}"#);
        assert_eq!(record.ansible_user(), None);

        let record = parse(r#"{"name": "x", "config": {"user.ansible_user": "deploy"}}"#);
        assert_eq!(record.ansible_user(), Some("deploy"));
    }
}
