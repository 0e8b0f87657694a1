use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::DapiError;
use crate::notify::{NotifyPoller, NotifyResult};
use crate::platform::Platform;
use crate::provider::{InvokeRequest, WalletProvider};
use crate::value::{ArgType, InvokeArg};

pub const DEFAULT_DAPP_NAME: &str = "My dapp";
pub const INVOKE_MESSAGE: &str = "invoke smart contract";

/// Bridge status code for success.
const BRIDGE_OK: i64 = 0;

/// Name and icon the wallet app shows when asking the user to share an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DappDescriptor {
    pub name: String,
    pub icon: String,
}

impl Default for DappDescriptor {
    fn default() -> Self {
        Self {
            name: DEFAULT_DAPP_NAME.to_string(),
            icon: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRequest {
    pub dapp_name: String,
    pub dapp_icon: String,
}

impl From<&DappDescriptor> for AccountRequest {
    fn from(descriptor: &DappDescriptor) -> Self {
        Self {
            dapp_name: descriptor.name.clone(),
            dapp_icon: descriptor.icon.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvokeConfig {
    pub login: bool,
    pub message: String,
    pub url: String,
}

impl Default for InvokeConfig {
    fn default() -> Self {
        Self {
            login: true,
            message: INVOKE_MESSAGE.to_string(),
            url: String::new(),
        }
    }
}

/// Parameters handed to the bridge's `smartContract.invoke`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileInvokeParams {
    pub script_hash: String,
    pub operation: String,
    pub args: Vec<InvokeArg>,
    pub gas_price: Option<u64>,
    pub gas_limit: Option<u64>,
    pub payer: String,
    pub config: InvokeConfig,
}

/// `{ error, result }` reply every bridge call produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeResponse {
    pub error: i64,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub result: Value,
}

impl BridgeResponse {
    pub fn ok(result: impl Into<Value>) -> Self {
        Self {
            error: BRIDGE_OK,
            desc: None,
            result: result.into(),
        }
    }

    pub fn failed(error: i64, desc: impl Into<String>) -> Self {
        Self {
            error,
            desc: Some(desc.into()),
            result: Value::Null,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error == BRIDGE_OK
    }

    fn result_str(&self) -> Option<&str> {
        self.result
            .as_str()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

/// The in-app wallet bridge.
#[async_trait]
pub trait MobileBridgeClient: Send + Sync {
    async fn register_client(&self) -> Result<(), DapiError>;

    async fn get_account(&self, request: &AccountRequest) -> Result<BridgeResponse, DapiError>;

    async fn invoke(&self, params: &MobileInvokeParams) -> Result<BridgeResponse, DapiError>;
}

/// Routes calls through the bridge. The bridge only returns a transaction hash
/// for invokes, so results are resolved with the notification poller.
pub struct MobileProvider {
    client: Arc<dyn MobileBridgeClient>,
    poller: NotifyPoller,
    dapp: DappDescriptor,
    login_address: RwLock<Option<String>>,
}

impl MobileProvider {
    pub fn new(client: Arc<dyn MobileBridgeClient>, poller: NotifyPoller, dapp: DappDescriptor) -> Self {
        Self {
            client,
            poller,
            dapp,
            login_address: RwLock::new(None),
        }
    }

    /// Address used as fee payer for invokes. Set by `get_account`.
    pub async fn login_address(&self) -> Option<String> {
        self.login_address.read().await.clone()
    }

    pub async fn set_login_address(&self, address: impl Into<String>) {
        let address = address.into();
        let address = Some(address.trim().to_string()).filter(|value| !value.is_empty());
        *self.login_address.write().await = address;
    }

    pub async fn logout(&self) {
        *self.login_address.write().await = None;
    }
}

#[async_trait]
impl WalletProvider for MobileProvider {
    fn platform(&self) -> Platform {
        Platform::Mobile
    }

    async fn register(&self) -> Result<(), DapiError> {
        self.client.register_client().await?;
        tracing::info!(platform = %Platform::Mobile, "registered with wallet bridge");
        Ok(())
    }

    async fn get_account(&self) -> Result<String, DapiError> {
        let response = self
            .client
            .get_account(&AccountRequest::from(&self.dapp))
            .await?;
        if !response.is_ok() {
            tracing::warn!(code = response.error, desc = ?response.desc, "bridge refused account request");
            return Err(DapiError::Provider(format!(
                "bridge get_account failed with code {}",
                response.error
            )));
        }

        let address = response
            .result_str()
            .ok_or_else(|| {
                DapiError::UnexpectedResponse("bridge account result is not an address".to_string())
            })?
            .to_string();
        self.set_login_address(address.clone()).await;
        Ok(address)
    }

    async fn invoke(&self, request: InvokeRequest) -> Result<NotifyResult, DapiError> {
        let Some(payer) = self.login_address().await else {
            return Err(DapiError::NotLoggedIn);
        };
        request.validate()?;

        let params = MobileInvokeParams {
            script_hash: request.script_hash,
            operation: request.operation,
            args: request.args,
            gas_price: request.gas_price,
            gas_limit: request.gas_limit,
            payer,
            config: InvokeConfig::default(),
        };
        let response = self.client.invoke(&params).await?;
        if !response.is_ok() {
            tracing::warn!(
                script_hash = %params.script_hash,
                operation = %params.operation,
                code = response.error,
                "bridge rejected invoke"
            );
            return Err(DapiError::InvokeRejected {
                code: response.error,
            });
        }

        let txhash = response.result_str().ok_or_else(|| {
            DapiError::UnexpectedResponse("bridge invoke result is not a transaction hash".to_string())
        })?;
        tracing::info!(%txhash, script_hash = %params.script_hash, "invoke submitted, waiting for notification");
        self.poller.get_notify(txhash, &params.script_hash).await
    }

    fn convert_value(&self, _value: &str, _arg_type: ArgType) -> Result<Option<Value>, DapiError> {
        Ok(None)
    }
}
