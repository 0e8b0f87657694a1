//! The two wallet back ends a dApp can run against, behind one interface.

pub mod desktop;
pub mod mobile;
#[cfg(any(test, feature = "testing"))]
pub mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::notify::NotifyResult;
use crate::platform::Platform;
use crate::value::{ArgType, InvokeArg};
use crate::DapiError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeRequest {
    pub script_hash: String,
    pub operation: String,
    #[serde(default)]
    pub args: Vec<InvokeArg>,
    #[serde(default)]
    pub gas_price: Option<u64>,
    #[serde(default)]
    pub gas_limit: Option<u64>,
    #[serde(default)]
    pub require_identity: bool,
}

impl InvokeRequest {
    pub fn new(script_hash: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            script_hash: script_hash.into(),
            operation: operation.into(),
            args: Vec::new(),
            gas_price: None,
            gas_limit: None,
            require_identity: false,
        }
    }

    pub fn with_arg(mut self, arg: InvokeArg) -> Self {
        self.args.push(arg);
        self
    }

    pub fn with_gas(mut self, gas_price: u64, gas_limit: u64) -> Self {
        self.gas_price = Some(gas_price);
        self.gas_limit = Some(gas_limit);
        self
    }

    pub fn with_require_identity(mut self, require_identity: bool) -> Self {
        self.require_identity = require_identity;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), DapiError> {
        if self.script_hash.trim().is_empty() {
            return Err(DapiError::InvalidRequest(
                "scriptHash must not be empty".to_string(),
            ));
        }
        if self.operation.trim().is_empty() {
            return Err(DapiError::InvalidRequest(
                "operation must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
pub trait WalletProvider: Send + Sync {
    fn platform(&self) -> Platform;

    /// Registers this dApp with the underlying wallet client.
    async fn register(&self) -> Result<(), DapiError>;

    async fn get_account(&self) -> Result<String, DapiError>;

    async fn invoke(&self, request: InvokeRequest) -> Result<NotifyResult, DapiError>;

    /// Provider-native value for a raw argument, or `None` where the provider
    /// takes raw arguments as they are.
    fn convert_value(&self, value: &str, arg_type: ArgType) -> Result<Option<Value>, DapiError>;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::InvokeRequest;
    use crate::value::{ArgType, InvokeArg};

    #[test]
    fn invoke_request_uses_dapi_field_names() -> anyhow::Result<()> {
        let request = InvokeRequest::new("0xabc", "transfer")
            .with_arg(InvokeArg::new(ArgType::Integer, "5"))
            .with_gas(500, 20_000)
            .with_require_identity(true);
        assert_eq!(
            serde_json::to_value(&request)?,
            json!({
                "scriptHash": "0xabc",
                "operation": "transfer",
                "args": [{"type": "Integer", "value": "5"}],
                "gasPrice": 500,
                "gasLimit": 20000,
                "requireIdentity": true
            })
        );
        Ok(())
    }

    #[test]
    fn blank_fields_fail_validation() {
        assert!(InvokeRequest::new(" ", "transfer").validate().is_err());
        assert!(InvokeRequest::new("0xabc", "").validate().is_err());
        assert!(InvokeRequest::new("0xabc", "transfer").validate().is_ok());
    }
}
