use crate::error::{LendingError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A piece of real estate. `SellerHash` is stamped by the ledger, never taken from input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Property {
    pub hash: String,
    #[serde(default)]
    pub seller_hash: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub image_base64: String,
    pub selling_price: i64,
    #[serde(default)]
    pub timestamp: DateTime<Utc>,
}

impl Property {
    pub fn validate(&self) -> Result<()> {
        if self.hash.is_empty() {
            return Err(LendingError::ValidationError(
                "Property Hash must be provided".to_string(),
            ));
        }
        if self.selling_price < 1 {
            return Err(LendingError::ValidationError(format!(
                "SellingPrice must be positive, got {}",
                self.selling_price
            )));
        }
        Ok(())
    }
}
