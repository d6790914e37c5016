mod inventory_builder;

pub use inventory_builder::{InventoryBuilder, parse_listing};
