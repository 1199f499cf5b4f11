pub mod manager_config;
