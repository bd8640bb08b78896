//! # tapkit usdc
//!
//! USDC on Base for chat agents: look up a network, build the wallet call
//! bundle for a transfer, read a balance over JSON-RPC.
//!
//! ```rust,ignore
//! let usdc = UsdcHandler::new("base-sepolia")?;
//! let calls = usdc.create_transfer_calls(agent_address, recipient, to_base_units("1.5", 6)?)?;
//! ctx.send(calls).await?;
//! ```

pub mod error;
pub mod handler;
pub mod network;
pub mod units;

pub use error::{UsdcError, UsdcResult};
pub use handler::UsdcHandler;
pub use network::{BASE_MAINNET, BASE_SEPOLIA, NetworkConfig, USDC_NETWORKS, find_network};
pub use units::{format_units, to_base_units};
