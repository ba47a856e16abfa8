use crate::error::LendingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Organisational role of a caller, attested through its MSP id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Buyer,
    Seller,
    Bank,
    Appraiser,
    Insurer,
    Government,
    CreditRatingAgency,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::Buyer,
        Role::Seller,
        Role::Bank,
        Role::Appraiser,
        Role::Insurer,
        Role::Government,
        Role::CreditRatingAgency,
    ];

    pub fn msp_id(self) -> &'static str {
        match self {
            Role::Buyer => "POCBuyerMSP",
            Role::Seller => "POCSellerMSP",
            Role::Bank => "POCBankMSP",
            Role::Appraiser => "POCAppraiserMSP",
            Role::Insurer => "POCInsuranceMSP",
            Role::Government => "POCGovernmentMSP",
            Role::CreditRatingAgency => "POCCreditRatingAgencyMSP",
        }
    }

    pub fn from_msp_id(msp_id: &str) -> Option<Self> {
        Role::ALL.into_iter().find(|role| role.msp_id() == msp_id)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.msp_id())
    }
}

impl FromStr for Role {
    type Err = LendingError;

    /// Accepts either an MSP id (`POCBankMSP`) or a short role name (`bank`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(role) = Role::from_msp_id(s) {
            return Ok(role);
        }
        match s.to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "buyer" => Ok(Role::Buyer),
            "seller" => Ok(Role::Seller),
            "bank" => Ok(Role::Bank),
            "appraiser" => Ok(Role::Appraiser),
            "insurer" | "insurance" => Ok(Role::Insurer),
            "government" => Ok(Role::Government),
            "credit_rating_agency" | "credit_rating" => Ok(Role::CreditRatingAgency),
            _ => Err(LendingError::ValidationError(format!("Unknown role '{s}'"))),
        }
    }
}

/// The attested execution context of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub identity: String,
    pub msp_id: String,
}

impl Caller {
    pub fn new(identity: impl Into<String>, msp_id: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            msp_id: msp_id.into(),
        }
    }

    pub fn with_role(identity: impl Into<String>, role: Role) -> Self {
        Self::new(identity, role.msp_id())
    }

    /// `None` when the MSP id belongs to no known organisation.
    pub fn role(&self) -> Option<Role> {
        Role::from_msp_id(&self.msp_id)
    }
}
