use crate::domain::request::Request;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Minimum appraisal as a multiple of the loan.
pub const MIN_COLLATERAL_RATIO: Decimal = dec!(1.1);

/// What a raised government flag means for bank approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalWaiver {
    /// Any raised flag approves outright, skipping the remaining checks.
    #[default]
    AnyFlagWaives,
    /// Any raised flag declines.
    AnyFlagDeclines,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Decline(String),
}

/// Decides whether `request` is approved.
///
/// The approving bank must already be known to own the selected offer.
pub fn evaluate(request: &Request, policy: ApprovalWaiver) -> Decision {
    let Some(results) = request.government_results_data.as_ref() else {
        return Decision::Decline("government results are missing".to_string());
    };

    if results.any_flagged() {
        match policy {
            ApprovalWaiver::AnyFlagWaives => return Decision::Approve,
            ApprovalWaiver::AnyFlagDeclines => {
                return Decision::Decline(format!(
                    "government flagged: {}",
                    results.flagged().join(", ")
                ));
            }
        }
    }

    let required = Decimal::from(request.loan_amount) * MIN_COLLATERAL_RATIO;
    if Decimal::from(request.appraiser_amount) < required {
        return Decision::Decline(format!(
            "appraised amount {} is below {} required for loan {}",
            request.appraiser_amount, required, request.loan_amount
        ));
    }

    if request.selected_insurance_offer_hash.is_empty() {
        return Decision::Decline("no insurance offer was selected".to_string());
    }

    Decision::Approve
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::request::{BankOffer, GovernmentResults, PurchaseApplication};
    use chrono::Utc;

    fn approvable() -> Request {
        let mut request = Request::open(
            PurchaseApplication {
                hash: "r1".to_string(),
                property_hash: "p1".to_string(),
                seller_hash: "s1".to_string(),
                salary: 15_000,
                loan_amount: 100_000,
                duration: 240,
            },
            "b1",
            Utc::now(),
        )
        .unwrap();
        request
            .add_bank_offer(BankOffer {
                hash: "o1".to_string(),
                bank_hash: "bank-1".to_string(),
                interest: dec!(4),
                monthly_payment: dec!(605.98),
                timestamp: Utc::now(),
            })
            .unwrap();
        request.select_bank_offer("o1").unwrap();
        request.selected_insurance_offer_hash = "i1".to_string();
        request.appraiser_amount = 110_000;
        request.government_results_data =
            Some(GovernmentResults::new(false, false, false, Utc::now()));
        request
    }

    #[test]
    fn test_clean_request_is_approved() {
        assert_eq!(
            evaluate(&approvable(), ApprovalWaiver::default()),
            Decision::Approve
        );
    }

    #[test]
    fn test_low_appraisal_declines() {
        let mut request = approvable();
        request.appraiser_amount = 109_999;
        assert!(matches!(
            evaluate(&request, ApprovalWaiver::AnyFlagWaives),
            Decision::Decline(_)
        ));
    }

    #[test]
    fn test_missing_insurance_declines() {
        let mut request = approvable();
        request.selected_insurance_offer_hash.clear();
        assert!(matches!(
            evaluate(&request, ApprovalWaiver::AnyFlagWaives),
            Decision::Decline(_)
        ));
    }

    #[test]
    fn test_flag_policies() {
        let mut request = approvable();
        request.appraiser_amount = 1;
        request.government_results_data =
            Some(GovernmentResults::new(false, true, false, Utc::now()));

        assert_eq!(
            evaluate(&request, ApprovalWaiver::AnyFlagWaives),
            Decision::Approve
        );
        assert_eq!(
            evaluate(&request, ApprovalWaiver::AnyFlagDeclines),
            Decision::Decline("government flagged: lien".to_string())
        );
    }

    #[test]
    fn test_policy_config_names() {
        let policy: ApprovalWaiver = serde_json::from_str("\"any_flag_declines\"").unwrap();
        assert_eq!(policy, ApprovalWaiver::AnyFlagDeclines);
    }
}
