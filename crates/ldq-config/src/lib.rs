//! # ldq-config
//!
//! Settings for the ldq query compiler: result and fresh variable naming,
//! recursion unrolling, `DISTINCT` projection and extra namespace prefixes.
//!
//! ```rust,no_run
//! use ldq_config::ConfigLoader;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::load_from_file("ldq.toml").await?;
//!     println!("unrolling up to {} steps", config.recursion.max_depth);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod loader;

pub use config::*;
pub use error::*;
pub use loader::*;
