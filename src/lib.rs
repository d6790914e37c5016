pub mod cli;
pub mod domain;
pub mod infra;
pub mod services;

// Make test_support available for integration tests
pub mod test_support;

pub use domain::{ContainerManager, ContainerRecord, Inventory, ManagerCli};
pub use infra::IncusAdapter;
pub use services::InventoryBuilder;
