//! # tapkit runtime
//!
//! Everything between a configured process and the dispatcher:
//!
//! - [`config`]: figment-based loading of [`TapkitConfig`] (`tapkit.toml`,
//!   `TAPKIT_*` variables, `.env`)
//! - [`logging`]: `tracing-subscriber` setup from [`LoggingConfig`](config::LoggingConfig)
//! - [`services`]: the web3.bio, identifier and USDC clients built from config
//! - [`runtime`]: [`AgentRuntime`], the inbound message loop
//!
//! ```rust,ignore
//! use tapkit_runtime::{AgentRuntime, AgentServices, ConfigLoader};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::new().load()?;
//!     let services = AgentServices::from_config(&config)?;
//!
//!     let dispatcher = build_dispatcher(services);
//!     let runtime = AgentRuntime::from_config(dispatcher, config);
//!     let (tx, rx) = runtime.channel();
//!     spawn_sdk_stream(tx);
//!
//!     let stats = runtime.run(rx).await;
//!     println!("handled {} messages", stats.received);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod services;

pub use config::{ConfigError, ConfigLoader, ConfigResult, TapkitConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, LoggingError, SpanEvents};
pub use runtime::{AgentRuntime, Incoming, RuntimeStats};
pub use services::AgentServices;

// Re-export tracing for use by agents
pub use tracing;
pub use tracing_subscriber;

/// Logging macros for agent code.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
