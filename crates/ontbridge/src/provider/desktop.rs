use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::DapiError;
use crate::notify::NotifyResult;
use crate::platform::Platform;
use crate::provider::{InvokeRequest, WalletProvider};
use crate::value::{self, ArgType, ConvertedArg};

/// Parameters handed to the extension's `smartContract.invoke`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DesktopInvokeParams {
    pub script_hash: String,
    pub operation: String,
    pub args: Vec<ConvertedArg>,
    pub gas_price: Option<u64>,
    pub gas_limit: Option<u64>,
    pub require_identity: bool,
}

/// The browser extension's dAPI surface.
#[async_trait]
pub trait DesktopDapiClient: Send + Sync {
    async fn register_client(&self) -> Result<(), DapiError>;

    async fn get_account(&self) -> Result<String, DapiError>;

    async fn invoke(&self, params: DesktopInvokeParams) -> Result<NotifyResult, DapiError>;

    fn str_to_hex(&self, value: &str) -> String {
        value::str_to_hex(value)
    }
}

pub struct DesktopProvider {
    client: Arc<dyn DesktopDapiClient>,
}

impl DesktopProvider {
    pub fn new(client: Arc<dyn DesktopDapiClient>) -> Self {
        Self { client }
    }

    fn convert(&self, value: &str, arg_type: ArgType) -> Result<Value, DapiError> {
        value::convert_value(value, arg_type, |raw| self.client.str_to_hex(raw))
    }
}

#[async_trait]
impl WalletProvider for DesktopProvider {
    fn platform(&self) -> Platform {
        Platform::Desktop
    }

    async fn register(&self) -> Result<(), DapiError> {
        self.client.register_client().await?;
        tracing::info!(platform = %Platform::Desktop, "registered with wallet extension");
        Ok(())
    }

    async fn get_account(&self) -> Result<String, DapiError> {
        self.client.get_account().await
    }

    async fn invoke(&self, request: InvokeRequest) -> Result<NotifyResult, DapiError> {
        request.validate()?;
        let args = request
            .args
            .iter()
            .map(|arg| {
                Ok(ConvertedArg {
                    arg_type: arg.arg_type,
                    value: self.convert(&arg.value, arg.arg_type)?,
                })
            })
            .collect::<Result<Vec<_>, DapiError>>()?;

        self.client
            .invoke(DesktopInvokeParams {
                script_hash: request.script_hash,
                operation: request.operation,
                args,
                gas_price: request.gas_price,
                gas_limit: request.gas_limit,
                require_identity: request.require_identity,
            })
            .await
    }

    fn convert_value(&self, value: &str, arg_type: ArgType) -> Result<Option<Value>, DapiError> {
        self.convert(value, arg_type).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::Result;
    use serde_json::json;

    use super::DesktopProvider;
    use crate::DapiError;
    use crate::platform::Platform;
    use crate::provider::mock::MockDesktopClient;
    use crate::provider::{InvokeRequest, WalletProvider};
    use crate::value::{ArgType, InvokeArg};

    #[tokio::test]
    async fn invoke_converts_every_argument() -> Result<()> {
        let client = Arc::new(MockDesktopClient::new("AXpNeebiUbb"));
        let provider = DesktopProvider::new(client.clone());

        let request = InvokeRequest::new("0xabc", "put")
            .with_arg(InvokeArg::new(ArgType::String, "key"))
            .with_arg(InvokeArg::new(ArgType::Integer, "5"))
            .with_arg(InvokeArg::new(ArgType::Boolean, "true"))
            .with_arg(InvokeArg::new(ArgType::ByteArray, "0a0b"))
            .with_gas(500, 20_000);
        let result = provider.invoke(request).await?;
        assert_eq!(result.transaction, "mock-desktop-tx");

        let Some(params) = client.last_invoke().await else {
            anyhow::bail!("extension was not invoked");
        };
        assert_eq!(
            serde_json::to_value(&params)?,
            json!({
                "scriptHash": "0xabc",
                "operation": "put",
                "args": [
                    {"type": "String", "value": "6b6579"},
                    {"type": "Integer", "value": 5},
                    {"type": "Boolean", "value": true},
                    {"type": "ByteArray", "value": "0a0b"}
                ],
                "gasPrice": 500,
                "gasLimit": 20000,
                "requireIdentity": false
            })
        );
        Ok(())
    }

    #[tokio::test]
    async fn invalid_argument_fails_before_reaching_the_extension() -> Result<()> {
        let client = Arc::new(MockDesktopClient::new("AXpNeebiUbb"));
        let provider = DesktopProvider::new(client.clone());

        let request =
            InvokeRequest::new("0xabc", "put").with_arg(InvokeArg::new(ArgType::Integer, "x"));
        let result = provider.invoke(request).await;
        assert!(matches!(result, Err(DapiError::InvalidArgValue { .. })));
        assert!(client.last_invoke().await.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn account_and_registration_go_straight_to_the_extension() -> Result<()> {
        let client = Arc::new(MockDesktopClient::new("AXpNeebiUbb"));
        let provider = DesktopProvider::new(client.clone());

        provider.register().await?;
        assert_eq!(provider.get_account().await?, "AXpNeebiUbb");
        assert_eq!(provider.platform(), Platform::Desktop);
        assert_eq!(client.calls().await, vec!["register_client", "get_account"]);
        Ok(())
    }

    #[tokio::test]
    async fn extension_rejections_propagate_unchanged() -> Result<()> {
        let client = Arc::new(MockDesktopClient::rejecting("user cancelled"));
        let provider = DesktopProvider::new(client);

        let result = provider.get_account().await;
        assert!(matches!(result, Err(DapiError::Provider(message)) if message == "user cancelled"));
        Ok(())
    }

    #[test]
    fn convert_value_is_available_on_desktop() -> Result<()> {
        let provider = DesktopProvider::new(Arc::new(MockDesktopClient::new("A")));
        assert_eq!(provider.convert_value("5", ArgType::Integer)?, Some(json!(5)));
        assert_eq!(provider.convert_value("true", ArgType::Boolean)?, Some(json!(true)));
        assert_eq!(provider.convert_value("ab", ArgType::ByteArray)?, Some(json!("ab")));
        Ok(())
    }
}
