pub mod toml_loader;

pub use toml_loader::{load_registry_from_toml, parse_registry_toml};
