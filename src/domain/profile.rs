//! Participant profiles. Each is stored whole under a role-specific key.

use super::identity::Role;
use super::keys;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A registration record a participant writes about itself.
pub trait Profile: Serialize + DeserializeOwned + Send + Sync {
    const ROLE: Role;

    fn key(identity: &str) -> String;

    /// Fills in the fields the ledger owns.
    fn stamp(&mut self, identity: &str, now: DateTime<Utc>);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Buyer {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "IDNumber", default)]
    pub id_number: String,
    #[serde(rename = "IDBase64", default)]
    pub id_base64: String,
    #[serde(default)]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Seller {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "IDNumber", default)]
    pub id_number: String,
    #[serde(default)]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Bank {
    #[serde(default)]
    pub swift_number: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub total_supply: i64,
    #[serde(default)]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Appraiser {
    #[serde(default)]
    pub appraiser_hash: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "IDNumber", default)]
    pub id_number: String,
    #[serde(default)]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InsuranceCompany {
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub license_number: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreditRatingAgency {
    #[serde(default)]
    pub license_number: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub timestamp: DateTime<Utc>,
}

impl Profile for Buyer {
    const ROLE: Role = Role::Buyer;

    fn key(identity: &str) -> String {
        keys::buyer_profile(identity)
    }

    fn stamp(&mut self, _identity: &str, now: DateTime<Utc>) {
        self.timestamp = now;
    }
}

impl Profile for Seller {
    const ROLE: Role = Role::Seller;

    fn key(identity: &str) -> String {
        keys::seller_profile(identity)
    }

    fn stamp(&mut self, _identity: &str, now: DateTime<Utc>) {
        self.timestamp = now;
    }
}

impl Profile for Bank {
    const ROLE: Role = Role::Bank;

    fn key(identity: &str) -> String {
        keys::bank_profile(identity)
    }

    fn stamp(&mut self, _identity: &str, now: DateTime<Utc>) {
        self.timestamp = now;
    }
}

impl Profile for InsuranceCompany {
    const ROLE: Role = Role::Insurer;

    fn key(identity: &str) -> String {
        keys::insurance_company_profile(identity)
    }

    fn stamp(&mut self, identity: &str, now: DateTime<Utc>) {
        self.hash = identity.to_string();
        self.timestamp = now;
    }
}

impl Profile for CreditRatingAgency {
    const ROLE: Role = Role::CreditRatingAgency;

    fn key(identity: &str) -> String {
        keys::credit_rating_agency_profile(identity)
    }

    fn stamp(&mut self, _identity: &str, now: DateTime<Utc>) {
        self.timestamp = now;
    }
}

impl Appraiser {
    /// Appraisers live in one shared list rather than under per-identity keys.
    pub fn stamp(&mut self, identity: &str, now: DateTime<Utc>) {
        self.appraiser_hash = identity.to_string();
        self.timestamp = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insurance_company_stamp_overrides_hash() {
        let json = r#"{"Hash":"spoofed","Name":"Acme Cover"}"#;
        let mut company: InsuranceCompany = serde_json::from_str(json).unwrap();
        company.stamp("insurer-1", Utc::now());
        assert_eq!(company.hash, "insurer-1");
        assert_eq!(InsuranceCompany::key("insurer-1"), "insuranceCompany_insurer-1");
    }

    #[test]
    fn test_buyer_profile_field_names() {
        let json = r#"{"FullName":"Ann Lee","IDNumber":"123","IDBase64":"aGk="}"#;
        let buyer: Buyer = serde_json::from_str(json).unwrap();
        assert_eq!(buyer.id_number, "123");
        assert_eq!(buyer.id_base64, "aGk=");
        assert_eq!(Buyer::ROLE, Role::Buyer);
    }

    #[test]
    fn test_appraiser_stamp() {
        let mut appraiser: Appraiser =
            serde_json::from_str(r#"{"FirstName":"Ola","AppraiserHash":"x"}"#).unwrap();
        appraiser.stamp("appraiser-7", Utc::now());
        assert_eq!(appraiser.appraiser_hash, "appraiser-7");
    }
}
