//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod mandi_csv_adapter;
pub mod ttl_cache;
