use super::credit::CreditGrade;
use crate::error::{LendingError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Workflow position of a purchase request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    #[default]
    RequestInitialized,
    CreditScoreInstalled,
    BankOfferInstalled,
    BuyerSelectedBankOffer,
    AppraiserChosen,
    AppraiserProvidedAmount,
    InsuranceOfferProvided,
    InsuranceOfferSelected,
    GovernmentProvided,
    ApprovedByBank,
    DeclinedByBank,
    CompletedActiveMortgage,
}

impl RequestStatus {
    /// States from which `self` may be entered.
    pub fn allowed_sources(self) -> &'static [RequestStatus] {
        use RequestStatus::*;
        match self {
            RequestInitialized => &[],
            CreditScoreInstalled => &[RequestInitialized],
            BankOfferInstalled => &[CreditScoreInstalled, BankOfferInstalled],
            BuyerSelectedBankOffer => &[BankOfferInstalled],
            AppraiserChosen => &[BuyerSelectedBankOffer],
            AppraiserProvidedAmount => &[AppraiserChosen],
            InsuranceOfferProvided => &[AppraiserProvidedAmount, InsuranceOfferProvided],
            InsuranceOfferSelected => &[InsuranceOfferProvided],
            GovernmentProvided => &[InsuranceOfferSelected],
            ApprovedByBank | DeclinedByBank => &[GovernmentProvided],
            CompletedActiveMortgage => &[ApprovedByBank],
        }
    }

    pub fn can_advance_to(self, next: RequestStatus) -> bool {
        next.allowed_sources().contains(&self)
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RequestStatus::DeclinedByBank | RequestStatus::CompletedActiveMortgage
        )
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Reuse the wire name so logs and payloads agree.
        match serde_json::to_value(self) {
            Ok(serde_json::Value::String(name)) => f.write_str(&name),
            _ => write!(f, "{self:?}"),
        }
    }
}

/// Pointer from a named queue into a buyer's request collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RequestLink {
    pub user_hash: String,
    pub request_hash: String,
}

impl RequestLink {
    pub fn new(user_hash: impl Into<String>, request_hash: impl Into<String>) -> Self {
        Self {
            user_hash: user_hash.into(),
            request_hash: request_hash.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.user_hash.is_empty() || self.request_hash.is_empty() {
            return Err(LendingError::ValidationError(
                "RequestLink needs both UserHash and RequestHash".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BankOffer {
    pub hash: String,
    pub bank_hash: String,
    pub interest: Decimal,
    pub monthly_payment: Decimal,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InsuranceOffer {
    pub hash: String,
    pub insurance_hash: String,
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GovernmentResults {
    pub check_lien: bool,
    pub check_house_owner: bool,
    pub check_warning_shot: bool,
    pub timestamp: DateTime<Utc>,
}

impl GovernmentResults {
    pub fn new(
        check_house_owner: bool,
        check_lien: bool,
        check_warning_shot: bool,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            check_lien,
            check_house_owner,
            check_warning_shot,
            timestamp,
        }
    }

    /// Names of the checks that came back `true`.
    pub fn flagged(&self) -> Vec<&'static str> {
        let mut flags = Vec::new();
        if self.check_house_owner {
            flags.push("house owner");
        }
        if self.check_lien {
            flags.push("lien");
        }
        if self.check_warning_shot {
            flags.push("warning shot");
        }
        flags
    }

    pub fn any_flagged(&self) -> bool {
        self.check_house_owner || self.check_lien || self.check_warning_shot
    }
}

/// The buyer-supplied part of a request, as posted to `buy`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PurchaseApplication {
    pub hash: String,
    pub property_hash: String,
    pub seller_hash: String,
    #[serde(default)]
    pub salary: i64,
    pub loan_amount: i64,
    pub duration: i64,
}

/// One buyer's attempt to finance one property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Request {
    pub hash: String,
    pub property_hash: String,
    pub buyer_hash: String,
    pub seller_hash: String,
    pub appraiser_hash: String,
    pub appraiser_amount: i64,
    pub credit_score: Option<CreditGrade>,
    pub credit_score_identity: String,
    pub loan_amount_left_to_refund: i64,
    pub government_results_data: Option<GovernmentResults>,
    pub insurance_offers: Vec<InsuranceOffer>,
    pub bank_offers: Vec<BankOffer>,
    pub selected_bank_offer_hash: String,
    pub selected_insurance_offer_hash: String,
    pub salary: i64,
    pub loan_amount: i64,
    pub duration: i64,
    pub status: RequestStatus,
    pub decline_info: String,
    pub timestamp: DateTime<Utc>,
}

impl Request {
    /// Opens a fresh request for `buyer_hash`. Only the application fields are taken
    /// from the caller; everything the workflow owns starts empty.
    pub fn open(
        application: PurchaseApplication,
        buyer_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        if application.hash.is_empty() {
            return Err(LendingError::ValidationError(
                "Request Hash must be provided".to_string(),
            ));
        }
        if application.property_hash.is_empty() || application.seller_hash.is_empty() {
            return Err(LendingError::ValidationError(
                "PropertyHash and SellerHash must be provided".to_string(),
            ));
        }
        if application.loan_amount < 1 {
            return Err(LendingError::ValidationError(format!(
                "LoanAmount must be positive, got {}",
                application.loan_amount
            )));
        }
        if application.salary < 0 {
            return Err(LendingError::ValidationError(format!(
                "Salary cannot be negative, got {}",
                application.salary
            )));
        }

        Ok(Self {
            hash: application.hash,
            property_hash: application.property_hash,
            buyer_hash: buyer_hash.to_string(),
            seller_hash: application.seller_hash,
            appraiser_hash: String::new(),
            appraiser_amount: 0,
            credit_score: None,
            credit_score_identity: String::new(),
            loan_amount_left_to_refund: 0,
            government_results_data: None,
            insurance_offers: Vec::new(),
            bank_offers: Vec::new(),
            selected_bank_offer_hash: String::new(),
            selected_insurance_offer_hash: String::new(),
            salary: application.salary,
            loan_amount: application.loan_amount,
            duration: application.duration,
            status: RequestStatus::RequestInitialized,
            decline_info: String::new(),
            timestamp: now,
        })
    }

    pub fn link(&self) -> RequestLink {
        RequestLink::new(&self.buyer_hash, &self.hash)
    }

    /// Moves to `next`, failing if the transition table does not allow it.
    pub fn advance(&mut self, next: RequestStatus) -> Result<()> {
        if self.status.is_terminal() {
            return Err(LendingError::BusinessRule(format!(
                "request {} is closed as {}",
                self.hash, self.status
            )));
        }
        if !self.status.can_advance_to(next) {
            return Err(LendingError::BusinessRule(format!(
                "request {} cannot move from {} to {}",
                self.hash, self.status, next
            )));
        }
        self.status = next;
        Ok(())
    }

    pub fn bank_offer(&self, offer_hash: &str) -> Option<&BankOffer> {
        self.bank_offers.iter().find(|o| o.hash == offer_hash)
    }

    pub fn selected_bank_offer(&self) -> Option<&BankOffer> {
        if self.selected_bank_offer_hash.is_empty() {
            return None;
        }
        self.bank_offer(&self.selected_bank_offer_hash)
    }

    pub fn add_bank_offer(&mut self, offer: BankOffer) -> Result<()> {
        if self.bank_offer(&offer.hash).is_some() {
            return Err(LendingError::BusinessRule(format!(
                "bank offer {} already exists on request {}",
                offer.hash, self.hash
            )));
        }
        self.bank_offers.push(offer);
        Ok(())
    }

    pub fn add_insurance_offer(&mut self, offer: InsuranceOffer) -> Result<()> {
        if self.insurance_offers.iter().any(|o| o.hash == offer.hash) {
            return Err(LendingError::BusinessRule(format!(
                "insurance offer {} already exists on request {}",
                offer.hash, self.hash
            )));
        }
        self.insurance_offers.push(offer);
        Ok(())
    }

    pub fn select_bank_offer(&mut self, offer_hash: &str) -> Result<()> {
        if self.bank_offers.is_empty() {
            return Err(LendingError::BusinessRule(format!(
                "request {} has no bank offers",
                self.hash
            )));
        }
        if self.bank_offer(offer_hash).is_none() {
            return Err(LendingError::BusinessRule(format!(
                "Bank Offer was not found {offer_hash}"
            )));
        }
        self.selected_bank_offer_hash = offer_hash.to_string();
        Ok(())
    }

    pub fn select_insurance_offer(&mut self, offer_hash: &str) -> Result<()> {
        if !self.insurance_offers.iter().any(|o| o.hash == offer_hash) {
            return Err(LendingError::BusinessRule(format!(
                "Insurance offer was not found {offer_hash}"
            )));
        }
        self.selected_insurance_offer_hash = offer_hash.to_string();
        Ok(())
    }
}
