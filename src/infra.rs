pub mod config;
pub mod incus_adapter;

pub use config::AppConfig;
pub use incus_adapter::IncusAdapter;
