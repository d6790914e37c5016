mod container;
pub mod inventory;
pub mod traits;

pub use container::{
    ContainerRecord, ContainerState, ContainerStatus, NetworkAddress, NetworkInterface,
};
pub use inventory::{Group, GroupVars, HostVars, Inventory, OsFamily};
pub use traits::{ContainerManager, ManagerCli};
