//! In-memory wallet clients that record what they were asked to do.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::DapiError;
use crate::notify::NotifyResult;
use crate::provider::desktop::{DesktopDapiClient, DesktopInvokeParams};
use crate::provider::mobile::{AccountRequest, BridgeResponse, MobileBridgeClient, MobileInvokeParams};

pub const MOCK_DESKTOP_TX: &str = "mock-desktop-tx";
pub const MOCK_MOBILE_TX: &str = "mock-mobile-tx";

pub struct MockDesktopClient {
    account: Result<String, String>,
    calls: Mutex<Vec<String>>,
    last_invoke: Mutex<Option<DesktopInvokeParams>>,
}

impl MockDesktopClient {
    pub fn new(account: impl Into<String>) -> Self {
        Self::with_account(Ok(account.into()))
    }

    /// Every call fails with `reason`, like a user dismissing the extension prompt.
    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self::with_account(Err(reason.into()))
    }

    fn with_account(account: Result<String, String>) -> Self {
        Self {
            account,
            calls: Mutex::new(Vec::new()),
            last_invoke: Mutex::new(None),
        }
    }

    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    pub async fn last_invoke(&self) -> Option<DesktopInvokeParams> {
        self.last_invoke.lock().await.clone()
    }

    async fn record(&self, call: &str) -> Result<(), DapiError> {
        self.calls.lock().await.push(call.to_string());
        match &self.account {
            Ok(_) => Ok(()),
            Err(reason) => Err(DapiError::Provider(reason.clone())),
        }
    }
}

#[async_trait]
impl DesktopDapiClient for MockDesktopClient {
    async fn register_client(&self) -> Result<(), DapiError> {
        self.record("register_client").await
    }

    async fn get_account(&self) -> Result<String, DapiError> {
        self.record("get_account").await?;
        self.account.clone().map_err(DapiError::Provider)
    }

    async fn invoke(&self, params: DesktopInvokeParams) -> Result<NotifyResult, DapiError> {
        self.record("invoke").await?;
        let args = serde_json::to_value(&params.args)
            .map_err(|error| DapiError::Internal(error.to_string()))?;
        *self.last_invoke.lock().await = Some(params);
        Ok(NotifyResult {
            result: vec![args],
            transaction: MOCK_DESKTOP_TX.to_string(),
        })
    }
}

pub struct MockBridgeClient {
    account_response: Mutex<BridgeResponse>,
    invoke_response: Mutex<BridgeResponse>,
    calls: Mutex<Vec<String>>,
    last_account_request: Mutex<Option<AccountRequest>>,
    last_invoke: Mutex<Option<MobileInvokeParams>>,
}

impl MockBridgeClient {
    pub fn new(account: impl Into<String>) -> Self {
        Self {
            account_response: Mutex::new(BridgeResponse::ok(Value::String(account.into()))),
            invoke_response: Mutex::new(BridgeResponse::ok(MOCK_MOBILE_TX)),
            calls: Mutex::new(Vec::new()),
            last_account_request: Mutex::new(None),
            last_invoke: Mutex::new(None),
        }
    }

    pub async fn set_account_response(&self, response: BridgeResponse) {
        *self.account_response.lock().await = response;
    }

    pub async fn set_invoke_response(&self, response: BridgeResponse) {
        *self.invoke_response.lock().await = response;
    }

    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    pub async fn last_account_request(&self) -> Option<AccountRequest> {
        self.last_account_request.lock().await.clone()
    }

    pub async fn last_invoke(&self) -> Option<MobileInvokeParams> {
        self.last_invoke.lock().await.clone()
    }

    async fn record(&self, call: &str) {
        self.calls.lock().await.push(call.to_string());
    }
}

#[async_trait]
impl MobileBridgeClient for MockBridgeClient {
    async fn register_client(&self) -> Result<(), DapiError> {
        self.record("register_client").await;
        Ok(())
    }

    async fn get_account(&self, request: &AccountRequest) -> Result<BridgeResponse, DapiError> {
        self.record("get_account").await;
        *self.last_account_request.lock().await = Some(request.clone());
        Ok(self.account_response.lock().await.clone())
    }

    async fn invoke(&self, params: &MobileInvokeParams) -> Result<BridgeResponse, DapiError> {
        self.record("invoke").await;
        *self.last_invoke.lock().await = Some(params.clone());
        Ok(self.invoke_response.lock().await.clone())
    }
}
