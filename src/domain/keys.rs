//! Ledger key schema. Every key the engine reads or writes is built here.

use std::fmt;

pub const REQUESTS_PREFIX: &str = "requests_";
pub const PROPERTIES_PREFIX: &str = "properties_";
pub const MONEY_PREFIX: &str = "money_";
pub const ESCROW_PREFIX: &str = "escrow_";
pub const PROPERTIES_FOR_SALE: &str = "properties4sale";
pub const APPRAISER_LIST: &str = "appraiserList";

/// Collection of requests owned by one buyer.
pub fn requests(buyer_hash: &str) -> String {
    format!("{REQUESTS_PREFIX}{buyer_hash}")
}

/// Collection of properties owned by one party.
pub fn properties(owner_hash: &str) -> String {
    format!("{PROPERTIES_PREFIX}{owner_hash}")
}

/// Balance record of a money account.
pub fn money(account: &str) -> String {
    format!("{MONEY_PREFIX}{account}")
}

/// Account that holds a request's loan between approval and settlement.
pub fn escrow_account(request_hash: &str) -> String {
    format!("{ESCROW_PREFIX}{request_hash}")
}

pub fn buyer_profile(identity: &str) -> String {
    format!("buyer-{identity}")
}

pub fn seller_profile(identity: &str) -> String {
    format!("seller-{identity}")
}

pub fn bank_profile(identity: &str) -> String {
    format!("bank_{identity}")
}

pub fn insurance_company_profile(identity: &str) -> String {
    format!("insuranceCompany_{identity}")
}

pub fn credit_rating_agency_profile(identity: &str) -> String {
    format!("credit-rating-agency-{identity}")
}

/// Workflow inbox; one per stage, plus one per appraiser.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Queue {
    CreditRankOpenRequests,
    Open4BankOffers,
    SelectAppraiser,
    PendingForAppraiserEstimation(String),
    Open4InsuranceOffers,
    Pending4Government,
    Pending4BankApproval,
    Pending4ChaincodeExecute,
}

impl Queue {
    pub fn key(&self) -> String {
        match self {
            Queue::CreditRankOpenRequests => "creditRankOpenRequests".to_string(),
            Queue::Open4BankOffers => "open4bankoffers".to_string(),
            Queue::SelectAppraiser => "selectAppraiser".to_string(),
            Queue::PendingForAppraiserEstimation(appraiser) => {
                format!("pendingForAppraiserEstimation_{appraiser}")
            }
            Queue::Open4InsuranceOffers => "open4InsuranceOffers".to_string(),
            Queue::Pending4Government => "pending4Government".to_string(),
            Queue::Pending4BankApproval => "pending4bankApproval".to_string(),
            Queue::Pending4ChaincodeExecute => "pending4ChaincodeExecute".to_string(),
        }
    }
}

impl fmt::Display for Queue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}
