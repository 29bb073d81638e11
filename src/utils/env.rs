// src/utils/env.rs

use log::debug;

/// Load a local .env file into the process environment if one exists.
/// Existing variables are never overwritten.
pub fn load_env() {
    match dotenv::dotenv() {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(_) => debug!("No .env file found; using process environment"),
    }
}
