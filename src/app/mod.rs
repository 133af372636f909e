// Gateway module for application configuration

mod config;

pub use config::{
    get_config_dir, init_config, load_config, load_config_from, save_config, Config, ServerConfig,
    UIConfig,
};
