use std::collections::BTreeMap;

use ontbridge_explorer::{AddressSummary, AssetBalance, ExplorerClient};

use crate::DapiError;

/// Asset name to balance, rebuilt on every query.
pub type BalanceMap = BTreeMap<String, f64>;

/// Fetches every token balance the explorer indexes for `address`.
pub async fn query_balance(client: &ExplorerClient, address: &str) -> Result<BalanceMap, DapiError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(DapiError::InvalidRequest(
            "address must not be empty".to_string(),
        ));
    }

    let envelope = client.address_summary(address).await?;
    if !envelope.is_success() {
        tracing::warn!(%address, code = envelope.error, desc = %envelope.desc, "explorer rejected balance query");
        return Err(DapiError::Explorer {
            code: envelope.error,
            desc: envelope.desc,
        });
    }

    let summary = envelope
        .decode_result::<AddressSummary>()?
        .ok_or_else(|| {
            DapiError::UnexpectedResponse("address summary without result".to_string())
        })?;
    Ok(balance_map(summary.asset_balance))
}

/// Later records with the same asset name overwrite earlier ones.
pub fn balance_map(records: impl IntoIterator<Item = AssetBalance>) -> BalanceMap {
    records
        .into_iter()
        .map(|record| (record.asset_name, record.balance))
        .collect()
}
