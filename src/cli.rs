pub mod inventory;

pub use inventory::{Cli, Mode};
