use super::approval::{self, ApprovalWaiver, Decision};
use super::auth::authorize;
use super::escrow;
use super::ledger_tx::LedgerTx;
use super::queues::QueueManager;
use crate::config::EngineConfig;
use crate::domain::amortization::monthly_payment;
use crate::domain::credit::CreditGrade;
use crate::domain::identity::{Caller, Role};
use crate::domain::keys::{self, Queue};
use crate::domain::money::{Amount, Balance};
use crate::domain::ports::{CreditScorerBox, GovernmentRegistryBox, KeyValueStoreBox};
use crate::domain::profile::Appraiser;
use crate::domain::property::Property;
use crate::domain::request::{
    BankOffer, GovernmentResults, InsuranceOffer, PurchaseApplication, Request, RequestLink,
    RequestStatus,
};
use crate::error::{LendingError, Result};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

/// Result of `bank_approve`. A decline is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "Outcome", rename_all = "PascalCase", rename_all_fields = "PascalCase")]
pub enum ApprovalOutcome {
    Approved,
    Declined { reason: String },
}

/// Drives purchase requests through their workflow.
///
/// `LendingEngine` owns the ledger and the two oracles. Every operation runs inside
/// its own [`LedgerTx`] and commits once, so either all of its writes land or none do.
pub struct LendingEngine {
    pub(super) store: KeyValueStoreBox,
    credit_scorer: CreditScorerBox,
    government: GovernmentRegistryBox,
    pub(super) queues: QueueManager,
    approval_waiver: ApprovalWaiver,
}

pub(super) async fn load_requests(tx: &mut LedgerTx<'_>, buyer_hash: &str) -> Result<Vec<Request>> {
    Ok(tx
        .read_entity(&keys::requests(buyer_hash))
        .await?
        .unwrap_or_default())
}

pub(super) fn find_request<'r>(
    requests: &'r mut [Request],
    request_hash: &str,
) -> Result<&'r mut Request> {
    requests
        .iter_mut()
        .find(|r| r.hash == request_hash)
        .ok_or_else(|| LendingError::NotFound(format!("Request {request_hash} was not found")))
}

async fn save_requests(tx: &mut LedgerTx<'_>, buyer_hash: &str, requests: &[Request]) -> Result<()> {
    tx.write_entity(&keys::requests(buyer_hash), &requests).await
}

/// Only the bank behind the selected offer may approve or settle a request.
fn ensure_offer_owner(request: &Request, bank: &str) -> Result<()> {
    match request.selected_bank_offer() {
        Some(offer) if offer.bank_hash == bank => Ok(()),
        _ => {
            warn!(bank, request = %request.hash, "bank does not own the selected offer");
            Err(LendingError::Unauthorized(format!(
                "Bank {bank} does not own the selected offer of request {}",
                request.hash
            )))
        }
    }
}

impl LendingEngine {
    /// Creates a new `LendingEngine`.
    ///
    /// # Arguments
    ///
    /// * `store` - The ledger every operation reads from and commits to.
    /// * `credit_scorer` - Grades buyers for `credit_score`.
    /// * `government` - Answers `government_run_checks`.
    /// * `config` - Queue matching and approval policy.
    pub fn new(
        store: KeyValueStoreBox,
        credit_scorer: CreditScorerBox,
        government: GovernmentRegistryBox,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            credit_scorer,
            government,
            queues: QueueManager::new(config.dequeue_match),
            approval_waiver: config.approval_waiver,
        }
    }

    pub(super) fn begin(&self) -> LedgerTx<'_> {
        LedgerTx::new(self.store.as_ref())
    }

    /// Current balance of a money account, for hosts and tests.
    pub async fn balance(&self, account: &str) -> Result<Balance> {
        let mut tx = self.begin();
        escrow::balance(&mut tx, account).await
    }

    /// Lists a property for sale under the calling seller.
    pub async fn advertise(&self, caller: &Caller, mut property: Property) -> Result<Property> {
        let seller = authorize(caller, Some(Role::Seller))?;
        property.validate()?;
        property.seller_hash = seller.to_string();
        property.timestamp = Utc::now();

        let mut tx = self.begin();
        let owned_key = keys::properties(seller);
        let mut owned: Vec<Property> = tx.read_entity(&owned_key).await?.unwrap_or_default();
        let mut for_sale: Vec<Property> = tx
            .read_entity(keys::PROPERTIES_FOR_SALE)
            .await?
            .unwrap_or_default();

        if owned.iter().chain(for_sale.iter()).any(|p| p.hash == property.hash) {
            return Err(LendingError::BusinessRule(format!(
                "Property {} already exists",
                property.hash
            )));
        }

        owned.push(property.clone());
        for_sale.push(property.clone());
        tx.write_entity(&owned_key, &owned).await?;
        tx.write_entity(keys::PROPERTIES_FOR_SALE, &for_sale).await?;
        tx.commit().await?;

        info!(seller, property = %property.hash, "property advertised");
        Ok(property)
    }

    /// Opens a purchase request and takes the property off the market.
    /// Returns the buyer identity.
    pub async fn buy(&self, caller: &Caller, application: PurchaseApplication) -> Result<String> {
        let buyer = authorize(caller, Some(Role::Buyer))?;
        let request = Request::open(application, buyer, Utc::now())?;

        let mut tx = self.begin();
        let mut for_sale: Vec<Property> = tx
            .read_entity(keys::PROPERTIES_FOR_SALE)
            .await?
            .unwrap_or_default();
        let position = for_sale
            .iter()
            .position(|p| p.hash == request.property_hash && p.seller_hash == request.seller_hash)
            .ok_or_else(|| {
                LendingError::NotFound(format!(
                    "Property {} of seller {} is not for sale",
                    request.property_hash, request.seller_hash
                ))
            })?;

        let mut requests = load_requests(&mut tx, buyer).await?;
        if requests.iter().any(|r| r.hash == request.hash) {
            return Err(LendingError::BusinessRule(format!(
                "Request {} already exists",
                request.hash
            )));
        }

        for_sale.remove(position);
        let link = request.link();
        requests.push(request);

        tx.write_entity(keys::PROPERTIES_FOR_SALE, &for_sale).await?;
        save_requests(&mut tx, buyer, &requests).await?;
        self.queues
            .enqueue(&mut tx, &Queue::CreditRankOpenRequests, &link)
            .await?;
        tx.commit().await?;

        info!(buyer, request = %link.request_hash, status = %RequestStatus::RequestInitialized, "request opened");
        Ok(buyer.to_string())
    }

    /// Grades the buyer through the credit scorer and opens the request to bank offers.
    pub async fn credit_score(&self, caller: &Caller, link: &RequestLink) -> Result<CreditGrade> {
        let agency = authorize(caller, Some(Role::CreditRatingAgency))?;
        link.validate()?;

        let mut tx = self.begin();
        let mut requests = load_requests(&mut tx, &link.user_hash).await?;
        let request = find_request(&mut requests, &link.request_hash)?;

        let grade = self
            .credit_scorer
            .score(request.salary, request.loan_amount)
            .await?;
        request.advance(RequestStatus::CreditScoreInstalled)?;
        request.credit_score = Some(grade);
        request.credit_score_identity = agency.to_string();
        let request_link = request.link();

        save_requests(&mut tx, &link.user_hash, &requests).await?;
        self.queues
            .route(
                &mut tx,
                &Queue::CreditRankOpenRequests,
                &Queue::Open4BankOffers,
                &request_link,
            )
            .await?;
        tx.commit().await?;

        info!(agency, request = %link.request_hash, %grade, status = %RequestStatus::CreditScoreInstalled, "credit score installed");
        Ok(grade)
    }

    /// Prices and attaches an offer from the calling bank.
    pub async fn bank_put_offer(
        &self,
        caller: &Caller,
        link: &RequestLink,
        offer_hash: &str,
        interest: Decimal,
    ) -> Result<BankOffer> {
        let bank = authorize(caller, Some(Role::Bank))?;
        link.validate()?;
        if offer_hash.is_empty() {
            return Err(LendingError::ValidationError(
                "Offer hash must be provided".to_string(),
            ));
        }

        let mut tx = self.begin();
        let mut requests = load_requests(&mut tx, &link.user_hash).await?;
        let request = find_request(&mut requests, &link.request_hash)?;

        let payment = monthly_payment(interest, request.duration, Decimal::from(request.loan_amount))?;
        let offer = BankOffer {
            hash: offer_hash.to_string(),
            bank_hash: bank.to_string(),
            interest,
            monthly_payment: payment,
            timestamp: Utc::now(),
        };
        request.advance(RequestStatus::BankOfferInstalled)?;
        request.add_bank_offer(offer.clone())?;
        let request_link = request.link();

        save_requests(&mut tx, &link.user_hash, &requests).await?;
        self.queues
            .discard(&mut tx, &Queue::Open4BankOffers, &request_link)
            .await?;
        tx.commit().await?;

        info!(bank, request = %link.request_hash, offer = offer_hash, %payment, "bank offer installed");
        Ok(offer)
    }

    /// Closes bidding on the buyer's request with one of its bank offers.
    pub async fn buyer_select_bank_offer(
        &self,
        caller: &Caller,
        request_hash: &str,
        offer_hash: &str,
    ) -> Result<()> {
        let buyer = authorize(caller, Some(Role::Buyer))?;

        let mut tx = self.begin();
        let mut requests = load_requests(&mut tx, buyer).await?;
        let request = find_request(&mut requests, request_hash)?;

        request.select_bank_offer(offer_hash)?;
        request.advance(RequestStatus::BuyerSelectedBankOffer)?;
        let link = request.link();

        save_requests(&mut tx, buyer, &requests).await?;
        self.queues
            .discard(&mut tx, &Queue::Open4BankOffers, &link)
            .await?;
        self.queues
            .enqueue(&mut tx, &Queue::SelectAppraiser, &link)
            .await?;
        tx.commit().await?;

        info!(buyer, request = request_hash, offer = offer_hash, "bank offer selected");
        Ok(())
    }

    /// Assigns a registered appraiser and hands the request to that appraiser's queue.
    pub async fn buyer_select_appraiser(
        &self,
        caller: &Caller,
        request_hash: &str,
        appraiser_hash: &str,
    ) -> Result<()> {
        let buyer = authorize(caller, Some(Role::Buyer))?;

        let mut tx = self.begin();
        let appraisers: Vec<Appraiser> = tx
            .read_entity(keys::APPRAISER_LIST)
            .await?
            .unwrap_or_default();
        if !appraisers.iter().any(|a| a.appraiser_hash == appraiser_hash) {
            return Err(LendingError::NotFound(format!(
                "Appraiser {appraiser_hash} is not registered"
            )));
        }

        let mut requests = load_requests(&mut tx, buyer).await?;
        let request = find_request(&mut requests, request_hash)?;
        request.advance(RequestStatus::AppraiserChosen)?;
        request.appraiser_hash = appraiser_hash.to_string();
        let link = request.link();

        save_requests(&mut tx, buyer, &requests).await?;
        self.queues
            .route(
                &mut tx,
                &Queue::SelectAppraiser,
                &Queue::PendingForAppraiserEstimation(appraiser_hash.to_string()),
                &link,
            )
            .await?;
        tx.commit().await?;

        info!(buyer, request = request_hash, appraiser = appraiser_hash, "appraiser chosen");
        Ok(())
    }

    /// Records the assigned appraiser's valuation and opens the request to insurers.
    pub async fn appraiser_provide_amount(
        &self,
        caller: &Caller,
        link: &RequestLink,
        amount: i64,
    ) -> Result<()> {
        let appraiser = authorize(caller, Some(Role::Appraiser))?;
        link.validate()?;
        if amount < 1 {
            return Err(LendingError::ValidationError(format!(
                "Appraisal amount must be positive, got {amount}"
            )));
        }

        let mut tx = self.begin();
        let mut requests = load_requests(&mut tx, &link.user_hash).await?;
        let request = find_request(&mut requests, &link.request_hash)?;
        if request.appraiser_hash != appraiser {
            warn!(appraiser, request = %link.request_hash, "appraiser not assigned to request");
            return Err(LendingError::Unauthorized(
                "This appraiser has no access to this request".to_string(),
            ));
        }

        request.advance(RequestStatus::AppraiserProvidedAmount)?;
        request.appraiser_amount = amount;
        let request_link = request.link();

        save_requests(&mut tx, &link.user_hash, &requests).await?;
        self.queues
            .route(
                &mut tx,
                &Queue::PendingForAppraiserEstimation(appraiser.to_string()),
                &Queue::Open4InsuranceOffers,
                &request_link,
            )
            .await?;
        tx.commit().await?;

        info!(appraiser, request = %link.request_hash, amount, "appraisal recorded");
        Ok(())
    }

    /// Attaches an insurance quote from the calling insurer.
    pub async fn insurance_put_offer(
        &self,
        caller: &Caller,
        link: &RequestLink,
        amount: Decimal,
        offer_hash: &str,
    ) -> Result<InsuranceOffer> {
        let insurer = authorize(caller, Some(Role::Insurer))?;
        link.validate()?;
        if offer_hash.is_empty() {
            return Err(LendingError::ValidationError(
                "Offer hash must be provided".to_string(),
            ));
        }
        if amount <= Decimal::ZERO {
            return Err(LendingError::ValidationError(format!(
                "Insurance amount must be positive, got {amount}"
            )));
        }

        let mut tx = self.begin();
        let mut requests = load_requests(&mut tx, &link.user_hash).await?;
        let request = find_request(&mut requests, &link.request_hash)?;

        let offer = InsuranceOffer {
            hash: offer_hash.to_string(),
            insurance_hash: insurer.to_string(),
            amount,
            timestamp: Utc::now(),
        };
        request.advance(RequestStatus::InsuranceOfferProvided)?;
        request.add_insurance_offer(offer.clone())?;
        let request_link = request.link();

        save_requests(&mut tx, &link.user_hash, &requests).await?;
        self.queues
            .discard(&mut tx, &Queue::Open4InsuranceOffers, &request_link)
            .await?;
        tx.commit().await?;

        info!(insurer, request = %link.request_hash, offer = offer_hash, %amount, "insurance offer installed");
        Ok(offer)
    }

    /// Picks an insurance quote and sends the request to the government checks.
    pub async fn buyer_select_insurance_offer(
        &self,
        caller: &Caller,
        request_hash: &str,
        offer_hash: &str,
    ) -> Result<()> {
        let buyer = authorize(caller, Some(Role::Buyer))?;

        let mut tx = self.begin();
        let mut requests = load_requests(&mut tx, buyer).await?;
        let request = find_request(&mut requests, request_hash)?;

        request.select_insurance_offer(offer_hash)?;
        request.advance(RequestStatus::InsuranceOfferSelected)?;
        let link = request.link();

        save_requests(&mut tx, buyer, &requests).await?;
        self.queues
            .discard(&mut tx, &Queue::Open4InsuranceOffers, &link)
            .await?;
        self.queues
            .enqueue(&mut tx, &Queue::Pending4Government, &link)
            .await?;
        tx.commit().await?;

        info!(buyer, request = request_hash, offer = offer_hash, "insurance offer selected");
        Ok(())
    }

    /// Records registry results supplied by the government caller.
    pub async fn government_put_data(
        &self,
        caller: &Caller,
        link: &RequestLink,
        check_house_owner: bool,
        check_lien: bool,
        check_warning_shot: bool,
    ) -> Result<GovernmentResults> {
        authorize(caller, Some(Role::Government))?;
        link.validate()?;

        let results =
            GovernmentResults::new(check_house_owner, check_lien, check_warning_shot, Utc::now());
        let mut tx = self.begin();
        self.install_government_results(&mut tx, link, results)
            .await?;
        tx.commit().await?;
        Ok(results)
    }

    /// Asks the registry port for the checks, then records them as `government_put_data` would.
    pub async fn government_run_checks(
        &self,
        caller: &Caller,
        link: &RequestLink,
    ) -> Result<GovernmentResults> {
        authorize(caller, Some(Role::Government))?;
        link.validate()?;

        let mut tx = self.begin();
        let mut requests = load_requests(&mut tx, &link.user_hash).await?;
        let request = find_request(&mut requests, &link.request_hash)?;
        let results = self.government.check(request).await?;

        self.install_government_results(&mut tx, link, results)
            .await?;
        tx.commit().await?;
        Ok(results)
    }

    async fn install_government_results(
        &self,
        tx: &mut LedgerTx<'_>,
        link: &RequestLink,
        results: GovernmentResults,
    ) -> Result<()> {
        let mut requests = load_requests(tx, &link.user_hash).await?;
        let request = find_request(&mut requests, &link.request_hash)?;
        request.advance(RequestStatus::GovernmentProvided)?;
        request.government_results_data = Some(results);
        let request_link = request.link();

        save_requests(tx, &link.user_hash, &requests).await?;
        self.queues
            .route(
                tx,
                &Queue::Pending4Government,
                &Queue::Pending4BankApproval,
                &request_link,
            )
            .await?;

        info!(
            request = %link.request_hash,
            flagged = ?results.flagged(),
            status = %RequestStatus::GovernmentProvided,
            "government results installed"
        );
        Ok(())
    }

    /// Approves or declines a request on behalf of the calling bank.
    ///
    /// On approval the loan is reserved in the request's escrow account.
    pub async fn bank_approve(&self, caller: &Caller, link: &RequestLink) -> Result<ApprovalOutcome> {
        let bank = authorize(caller, Some(Role::Bank))?;
        link.validate()?;

        let mut tx = self.begin();
        let mut requests = load_requests(&mut tx, &link.user_hash).await?;
        let request = find_request(&mut requests, &link.request_hash)?;

        ensure_offer_owner(request, bank)?;

        let outcome = match approval::evaluate(request, self.approval_waiver) {
            Decision::Approve => {
                request.advance(RequestStatus::ApprovedByBank)?;
                request.loan_amount_left_to_refund = request.loan_amount;
                let loan = Amount::new(request.loan_amount)?;
                let escrow_account = keys::escrow_account(&request.hash);
                let request_link = request.link();

                save_requests(&mut tx, &link.user_hash, &requests).await?;
                escrow::reserve(&mut tx, &escrow_account, loan).await?;
                self.queues
                    .route(
                        &mut tx,
                        &Queue::Pending4BankApproval,
                        &Queue::Pending4ChaincodeExecute,
                        &request_link,
                    )
                    .await?;
                ApprovalOutcome::Approved
            }
            Decision::Decline(reason) => {
                request.advance(RequestStatus::DeclinedByBank)?;
                request.decline_info = reason.clone();
                let request_link = request.link();

                save_requests(&mut tx, &link.user_hash, &requests).await?;
                self.queues
                    .dequeue(&mut tx, &Queue::Pending4BankApproval, &request_link)
                    .await?;
                ApprovalOutcome::Declined { reason }
            }
        };
        tx.commit().await?;

        match &outcome {
            ApprovalOutcome::Approved => {
                info!(bank, request = %link.request_hash, status = %RequestStatus::ApprovedByBank, "request approved")
            }
            ApprovalOutcome::Declined { reason } => {
                warn!(bank, request = %link.request_hash, reason = %reason, "request declined")
            }
        }
        Ok(outcome)
    }

    /// Settles an approved request: the property changes hands and escrow pays the seller.
    pub async fn bank_run_chaincode(&self, caller: &Caller, link: &RequestLink) -> Result<()> {
        let bank = authorize(caller, Some(Role::Bank))?;
        link.validate()?;

        let mut tx = self.begin();
        let mut requests = load_requests(&mut tx, &link.user_hash).await?;
        let request = find_request(&mut requests, &link.request_hash)?;

        ensure_offer_owner(request, bank)?;
        request.advance(RequestStatus::CompletedActiveMortgage)?;

        let loan = Amount::new(request.loan_amount)?;
        let escrow_account = keys::escrow_account(&request.hash);
        let seller_hash = request.seller_hash.clone();
        let buyer_hash = request.buyer_hash.clone();
        let property_hash = request.property_hash.clone();
        let request_link = request.link();

        save_requests(&mut tx, &link.user_hash, &requests).await?;

        let seller_key = keys::properties(&seller_hash);
        let mut seller_properties: Vec<Property> =
            tx.read_entity(&seller_key).await?.unwrap_or_default();
        let position = seller_properties
            .iter()
            .position(|p| p.hash == property_hash)
            .ok_or_else(|| {
                LendingError::NotFound(format!(
                    "Property {property_hash} is not owned by {seller_hash}"
                ))
            })?;
        let property = seller_properties.remove(position);
        tx.write_entity(&seller_key, &seller_properties).await?;

        let buyer_key = keys::properties(&buyer_hash);
        let mut buyer_properties: Vec<Property> =
            tx.read_entity(&buyer_key).await?.unwrap_or_default();
        buyer_properties.push(property);
        tx.write_entity(&buyer_key, &buyer_properties).await?;

        escrow::transfer(&mut tx, &escrow_account, &seller_hash, loan).await?;
        self.queues
            .dequeue(&mut tx, &Queue::Pending4ChaincodeExecute, &request_link)
            .await?;
        tx.commit().await?;

        info!(
            bank,
            request = %link.request_hash,
            property = %property_hash,
            seller = %seller_hash,
            buyer = %buyer_hash,
            status = %RequestStatus::CompletedActiveMortgage,
            "mortgage settled"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::in_memory::InMemoryLedger;
    use crate::infrastructure::oracles::{SalaryBandScorer, StaticGovernmentRegistry};
    use rust_decimal_macros::dec;

    fn engine(ledger: &InMemoryLedger) -> LendingEngine {
        LendingEngine::new(
            Box::new(ledger.clone()),
            Box::new(SalaryBandScorer),
            Box::new(StaticGovernmentRegistry::default()),
            EngineConfig::default(),
        )
    }

    fn property(hash: &str) -> Property {
        serde_json::from_value(serde_json::json!({
            "Hash": hash,
            "Address": "12 Harbour Rd",
            "SellingPrice": 300000
        }))
        .unwrap()
    }

    fn application(hash: &str, property: &str, seller: &str) -> PurchaseApplication {
        PurchaseApplication {
            hash: hash.to_string(),
            property_hash: property.to_string(),
            seller_hash: seller.to_string(),
            salary: 15_000,
            loan_amount: 200_000,
            duration: 360,
        }
    }

    #[tokio::test]
    async fn test_buy_requires_listed_property() {
        let ledger = InMemoryLedger::new();
        let engine = engine(&ledger);
        let buyer = Caller::with_role("buyer-1", Role::Buyer);

        let err = engine
            .buy(&buyer, application("r1", "p1", "seller-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, LendingError::NotFound(_)));
        assert!(ledger.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_buy_takes_property_off_market() {
        let ledger = InMemoryLedger::new();
        let engine = engine(&ledger);
        let seller = Caller::with_role("seller-1", Role::Seller);
        let buyer = Caller::with_role("buyer-1", Role::Buyer);

        engine.advertise(&seller, property("p1")).await.unwrap();
        let owner = engine
            .buy(&buyer, application("r1", "p1", "seller-1"))
            .await
            .unwrap();
        assert_eq!(owner, "buyer-1");

        let mut tx = engine.begin();
        let for_sale: Vec<Property> = tx
            .read_entity(keys::PROPERTIES_FOR_SALE)
            .await
            .unwrap()
            .unwrap();
        assert!(for_sale.is_empty());

        // The same property cannot be bought twice.
        let other = Caller::with_role("buyer-2", Role::Buyer);
        assert!(engine
            .buy(&other, application("r2", "p1", "seller-1"))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_duplicate_advertise_is_rejected() {
        let ledger = InMemoryLedger::new();
        let engine = engine(&ledger);
        let seller = Caller::with_role("seller-1", Role::Seller);

        engine.advertise(&seller, property("p1")).await.unwrap();
        let err = engine.advertise(&seller, property("p1")).await.unwrap_err();
        assert!(matches!(err, LendingError::BusinessRule(_)));
    }

    #[tokio::test]
    async fn test_bank_offer_is_priced_from_request() {
        let ledger = InMemoryLedger::new();
        let engine = engine(&ledger);
        let seller = Caller::with_role("seller-1", Role::Seller);
        let buyer = Caller::with_role("buyer-1", Role::Buyer);
        let agency = Caller::with_role("cra-1", Role::CreditRatingAgency);
        let bank = Caller::with_role("bank-1", Role::Bank);
        let link = RequestLink::new("buyer-1", "r1");

        engine.advertise(&seller, property("p1")).await.unwrap();
        engine
            .buy(&buyer, application("r1", "p1", "seller-1"))
            .await
            .unwrap();
        assert_eq!(
            engine.credit_score(&agency, &link).await.unwrap(),
            CreditGrade::B
        );

        let offer = engine
            .bank_put_offer(&bank, &link, "o1", dec!(6))
            .await
            .unwrap();
        assert_eq!(offer.monthly_payment, dec!(1199.10));
        assert_eq!(offer.bank_hash, "bank-1");

        // A second bank may still offer.
        let other_bank = Caller::with_role("bank-2", Role::Bank);
        engine
            .bank_put_offer(&other_bank, &link, "o2", dec!(5))
            .await
            .unwrap();
        assert!(engine
            .bank_put_offer(&other_bank, &link, "o2", dec!(5))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_out_of_order_transition_commits_nothing() {
        let ledger = InMemoryLedger::new();
        let engine = engine(&ledger);
        let seller = Caller::with_role("seller-1", Role::Seller);
        let buyer = Caller::with_role("buyer-1", Role::Buyer);
        let bank = Caller::with_role("bank-1", Role::Bank);

        engine.advertise(&seller, property("p1")).await.unwrap();
        engine
            .buy(&buyer, application("r1", "p1", "seller-1"))
            .await
            .unwrap();
        let before = ledger.snapshot().await;

        let err = engine
            .bank_approve(&bank, &RequestLink::new("buyer-1", "r1"))
            .await
            .unwrap_err();
        assert!(matches!(err, LendingError::BusinessRule(_)));
        assert_eq!(ledger.snapshot().await, before);
    }
}
