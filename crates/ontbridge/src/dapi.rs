use std::sync::Arc;

use ontbridge_explorer::ExplorerClient;
use serde_json::Value;

use crate::DapiError;
use crate::balance::{self, BalanceMap};
use crate::config::DapiConfig;
use crate::notify::{NotifyPollHandle, NotifyPoller, NotifyResult};
use crate::platform::Platform;
use crate::provider::desktop::{DesktopDapiClient, DesktopProvider};
use crate::provider::mobile::{MobileBridgeClient, MobileProvider};
use crate::provider::{InvokeRequest, WalletProvider};
use crate::value::ArgType;

/// Wallet clients the host application can offer. Only the one matching the
/// configured platform is used.
#[derive(Default, Clone)]
pub struct ProviderClients {
    pub desktop: Option<Arc<dyn DesktopDapiClient>>,
    pub mobile: Option<Arc<dyn MobileBridgeClient>>,
}

impl ProviderClients {
    pub fn with_desktop(mut self, client: Arc<dyn DesktopDapiClient>) -> Self {
        self.desktop = Some(client);
        self
    }

    pub fn with_mobile(mut self, client: Arc<dyn MobileBridgeClient>) -> Self {
        self.mobile = Some(client);
        self
    }
}

pub struct Dapi {
    provider: Arc<dyn WalletProvider>,
    explorer: ExplorerClient,
    poller: NotifyPoller,
}

impl Dapi {
    pub fn new(provider: Arc<dyn WalletProvider>, poller: NotifyPoller, explorer: ExplorerClient) -> Self {
        Self {
            provider,
            explorer,
            poller,
        }
    }

    /// Picks the provider for `config.platform`. This happens once; the
    /// provider stays active for the lifetime of the facade.
    pub fn from_config(config: &DapiConfig, clients: ProviderClients) -> Result<Self, DapiError> {
        let explorer = config.explorer_client()?;
        let poller = NotifyPoller::new(explorer.clone(), config.poll);

        let provider: Arc<dyn WalletProvider> = match config.platform {
            Platform::Desktop => {
                let client = clients.desktop.ok_or_else(|| {
                    DapiError::InvalidRequest("no desktop wallet client available".to_string())
                })?;
                Arc::new(DesktopProvider::new(client))
            }
            Platform::Mobile => {
                let client = clients.mobile.ok_or_else(|| {
                    DapiError::InvalidRequest("no mobile bridge client available".to_string())
                })?;
                Arc::new(MobileProvider::new(client, poller.clone(), config.dapp.clone()))
            }
        };
        tracing::debug!(platform = %config.platform, "wallet provider selected");

        Ok(Self::new(provider, poller, explorer))
    }

    pub fn platform(&self) -> Platform {
        self.provider.platform()
    }

    pub fn provider(&self) -> &Arc<dyn WalletProvider> {
        &self.provider
    }

    pub async fn init(&self) -> Result<(), DapiError> {
        self.provider.register().await
    }

    pub async fn get_account(&self) -> Result<String, DapiError> {
        self.provider.get_account().await
    }

    pub async fn invoke(&self, request: InvokeRequest) -> Result<NotifyResult, DapiError> {
        self.provider.invoke(request).await
    }

    pub async fn get_balance(&self, address: &str) -> Result<BalanceMap, DapiError> {
        balance::query_balance(&self.explorer, address).await
    }

    pub fn convert_value(&self, value: &str, arg_type: ArgType) -> Result<Option<Value>, DapiError> {
        self.provider.convert_value(value, arg_type)
    }

    pub async fn get_notify(&self, txhash: &str, script_hash: &str) -> Result<NotifyResult, DapiError> {
        self.poller.get_notify(txhash, script_hash).await
    }

    pub fn spawn_notify(&self, txhash: impl Into<String>, script_hash: impl Into<String>) -> NotifyPollHandle {
        self.poller.spawn(txhash, script_hash)
    }
}
