//! Wallet shim for Ontology dApps.
//!
//! A dApp talks to one [`Dapi`] facade. At startup the facade picks a
//! [`WalletProvider`]: the desktop browser extension or the mobile in-app bridge.
//! Mobile invokes only return a transaction hash, so the facade resolves them into
//! the contract's notification by polling the node with a [`NotifyPoller`].

pub mod balance;
pub mod config;
pub mod dapi;
pub mod error;
pub mod notify;
pub mod platform;
pub mod provider;
pub mod value;

pub use balance::{BalanceMap, balance_map, query_balance};
pub use config::{ConfigError, DapiConfig, parse_config_from_env};
pub use dapi::{Dapi, ProviderClients};
pub use error::DapiError;
pub use notify::{
    DEFAULT_POLL_INTERVAL, NotifyPollHandle, NotifyPoller, NotifyResult, PollCanceller, PollPolicy,
};
pub use platform::{MOBILE_AGENT_TOKENS, ParsePlatformError, Platform};
pub use provider::desktop::{DesktopDapiClient, DesktopInvokeParams, DesktopProvider};
pub use provider::mobile::{
    AccountRequest, BridgeResponse, DappDescriptor, InvokeConfig, MobileBridgeClient,
    MobileInvokeParams, MobileProvider,
};
pub use provider::{InvokeRequest, WalletProvider};
pub use value::{ArgType, ConvertedArg, InvokeArg, convert_value, str_to_hex};

pub use ontbridge_explorer::{ExplorerClient, ExplorerClientConfig, ExplorerClientError};
