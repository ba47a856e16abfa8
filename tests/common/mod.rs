#![allow(dead_code)]

use homelend::application::engine::LendingEngine;
use homelend::config::EngineConfig;
use homelend::domain::identity::{Caller, Role};
use homelend::domain::profile::Appraiser;
use homelend::domain::property::Property;
use homelend::domain::request::{PurchaseApplication, RequestLink};
use homelend::infrastructure::in_memory::InMemoryLedger;
use homelend::infrastructure::oracles::{SalaryBandScorer, StaticGovernmentRegistry};
use rust_decimal_macros::dec;

pub const SELLER: &str = "seller-1";
pub const BUYER: &str = "buyer-1";
pub const AGENCY: &str = "cra-1";
pub const BANK: &str = "bank-1";
pub const APPRAISER: &str = "appraiser-1";
pub const INSURER: &str = "insurer-1";
pub const GOVERNMENT: &str = "gov-1";

pub const PROPERTY: &str = "prop-1";
pub const REQUEST: &str = "req-1";
pub const LOAN: i64 = 200_000;
/// Exactly 110% of `LOAN`.
pub const FULL_APPRAISAL: i64 = 220_000;

pub fn seller() -> Caller {
    Caller::with_role(SELLER, Role::Seller)
}

pub fn buyer() -> Caller {
    Caller::with_role(BUYER, Role::Buyer)
}

pub fn agency() -> Caller {
    Caller::with_role(AGENCY, Role::CreditRatingAgency)
}

pub fn bank() -> Caller {
    Caller::with_role(BANK, Role::Bank)
}

pub fn appraiser() -> Caller {
    Caller::with_role(APPRAISER, Role::Appraiser)
}

pub fn insurer() -> Caller {
    Caller::with_role(INSURER, Role::Insurer)
}

pub fn government() -> Caller {
    Caller::with_role(GOVERNMENT, Role::Government)
}

pub fn link() -> RequestLink {
    RequestLink::new(BUYER, REQUEST)
}

pub fn engine(ledger: &InMemoryLedger) -> LendingEngine {
    engine_with(ledger, EngineConfig::default(), StaticGovernmentRegistry::new())
}

pub fn engine_with(
    ledger: &InMemoryLedger,
    config: EngineConfig,
    registry: StaticGovernmentRegistry,
) -> LendingEngine {
    LendingEngine::new(
        Box::new(ledger.clone()),
        Box::new(SalaryBandScorer),
        Box::new(registry),
        config,
    )
}

pub fn property(hash: &str) -> Property {
    serde_json::from_value(serde_json::json!({
        "Hash": hash,
        "Address": "7 Orchard Lane",
        "SellingPrice": 250000
    }))
    .unwrap()
}

pub fn application(request: &str, property: &str) -> PurchaseApplication {
    PurchaseApplication {
        hash: request.to_string(),
        property_hash: property.to_string(),
        seller_hash: SELLER.to_string(),
        salary: 15_000,
        loan_amount: LOAN,
        duration: 360,
    }
}

/// Lists the property, registers the appraiser and opens the buyer's request.
pub async fn open_request(engine: &LendingEngine) {
    engine.advertise(&seller(), property(PROPERTY)).await.unwrap();
    let profile: Appraiser =
        serde_json::from_str(r#"{"FirstName":"Ines","LastName":"Moro"}"#).unwrap();
    engine.put_appraiser(&appraiser(), profile).await.unwrap();
    engine
        .buy(&buyer(), application(REQUEST, PROPERTY))
        .await
        .unwrap();
}

/// Runs credit scoring, the bank offer and the appraisal.
pub async fn appraise(engine: &LendingEngine, appraised: i64) {
    engine.credit_score(&agency(), &link()).await.unwrap();
    engine
        .bank_put_offer(&bank(), &link(), "bank-offer-1", dec!(6))
        .await
        .unwrap();
    engine
        .buyer_select_bank_offer(&buyer(), REQUEST, "bank-offer-1")
        .await
        .unwrap();
    engine
        .buyer_select_appraiser(&buyer(), REQUEST, APPRAISER)
        .await
        .unwrap();
    engine
        .appraiser_provide_amount(&appraiser(), &link(), appraised)
        .await
        .unwrap();
}

pub async fn insure(engine: &LendingEngine) {
    engine
        .insurance_put_offer(&insurer(), &link(), dec!(1250.50), "ins-offer-1")
        .await
        .unwrap();
    engine
        .buyer_select_insurance_offer(&buyer(), REQUEST, "ins-offer-1")
        .await
        .unwrap();
}

/// Drives the request all the way to the bank approval queue.
pub async fn ready_for_approval(
    engine: &LendingEngine,
    appraised: i64,
    flags: (bool, bool, bool),
) {
    open_request(engine).await;
    appraise(engine, appraised).await;
    insure(engine).await;
    let (house_owner, lien, warning_shot) = flags;
    engine
        .government_put_data(&government(), &link(), house_owner, lien, warning_shot)
        .await
        .unwrap();
}
