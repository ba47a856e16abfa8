//! Participant registration and the read side of the ledger.

use super::auth::authorize;
use super::engine::{LendingEngine, find_request, load_requests};
use super::escrow;
use crate::domain::identity::{Caller, Role};
use crate::domain::keys::{self, Queue};
use crate::domain::money::Balance;
use crate::domain::profile::{Appraiser, Profile};
use crate::domain::property::Property;
use crate::domain::request::{Request, RequestLink};
use crate::error::Result;
use chrono::Utc;
use tracing::info;

impl LendingEngine {
    /// Stores the caller's own profile under its role-specific key.
    pub async fn put_profile<P: Profile>(&self, caller: &Caller, mut profile: P) -> Result<()> {
        let identity = authorize(caller, Some(P::ROLE))?;
        profile.stamp(identity, Utc::now());

        let mut tx = self.begin();
        tx.write_entity(&P::key(identity), &profile).await?;
        tx.commit().await?;

        info!(identity, role = %P::ROLE, "profile stored");
        Ok(())
    }

    /// Inserts or replaces the caller's entry in the shared appraiser list.
    pub async fn put_appraiser(&self, caller: &Caller, mut appraiser: Appraiser) -> Result<()> {
        let identity = authorize(caller, Some(Role::Appraiser))?;
        appraiser.stamp(identity, Utc::now());

        let mut tx = self.begin();
        let mut appraisers: Vec<Appraiser> = tx
            .read_entity(keys::APPRAISER_LIST)
            .await?
            .unwrap_or_default();
        match appraisers
            .iter_mut()
            .find(|a| a.appraiser_hash == appraiser.appraiser_hash)
        {
            Some(existing) => *existing = appraiser,
            None => appraisers.push(appraiser),
        }
        tx.write_entity(keys::APPRAISER_LIST, &appraisers).await?;
        tx.commit().await?;

        info!(identity, "appraiser registered");
        Ok(())
    }

    /// Properties currently owned by the caller.
    pub async fn get_properties(&self, caller: &Caller) -> Result<Vec<Property>> {
        let identity = authorize(caller, None)?;
        let mut tx = self.begin();
        Ok(tx
            .read_entity(&keys::properties(identity))
            .await?
            .unwrap_or_default())
    }

    pub async fn get_properties_for_sale(&self, caller: &Caller) -> Result<Vec<Property>> {
        authorize(caller, Some(Role::Buyer))?;
        let mut tx = self.begin();
        Ok(tx
            .read_entity(keys::PROPERTIES_FOR_SALE)
            .await?
            .unwrap_or_default())
    }

    pub async fn get_request_info(&self, caller: &Caller, link: &RequestLink) -> Result<Request> {
        authorize(caller, None)?;
        link.validate()?;
        let mut tx = self.begin();
        let mut requests = load_requests(&mut tx, &link.user_hash).await?;
        let request = find_request(&mut requests, &link.request_hash)?;
        Ok(request.clone())
    }

    pub async fn buyer_get_my_requests(&self, caller: &Caller) -> Result<Vec<Request>> {
        let buyer = authorize(caller, Some(Role::Buyer))?;
        let mut tx = self.begin();
        load_requests(&mut tx, buyer).await
    }

    pub async fn buyer_get_all_appraisers(&self, caller: &Caller) -> Result<Vec<Appraiser>> {
        authorize(caller, Some(Role::Buyer))?;
        let mut tx = self.begin();
        Ok(tx
            .read_entity(keys::APPRAISER_LIST)
            .await?
            .unwrap_or_default())
    }

    pub async fn get_my_balance(&self, caller: &Caller) -> Result<Balance> {
        let identity = authorize(caller, None)?;
        let mut tx = self.begin();
        escrow::balance(&mut tx, identity).await
    }

    async fn pull(&self, caller: &Caller, role: Role, queue: Queue) -> Result<Vec<RequestLink>> {
        authorize(caller, Some(role))?;
        let mut tx = self.begin();
        self.queues.pending(&mut tx, &queue).await
    }

    pub async fn credit_rating_pull(&self, caller: &Caller) -> Result<Vec<RequestLink>> {
        self.pull(caller, Role::CreditRatingAgency, Queue::CreditRankOpenRequests)
            .await
    }

    pub async fn bank_pull_open_for_offers(&self, caller: &Caller) -> Result<Vec<RequestLink>> {
        self.pull(caller, Role::Bank, Queue::Open4BankOffers).await
    }

    pub async fn bank_pull_pending_approval(&self, caller: &Caller) -> Result<Vec<RequestLink>> {
        self.pull(caller, Role::Bank, Queue::Pending4BankApproval)
            .await
    }

    pub async fn bank_pull_pending_settlement(&self, caller: &Caller) -> Result<Vec<RequestLink>> {
        self.pull(caller, Role::Bank, Queue::Pending4ChaincodeExecute)
            .await
    }

    /// The caller's own requests that are waiting for an appraiser choice.
    pub async fn buyer_pull_select_appraiser(&self, caller: &Caller) -> Result<Vec<RequestLink>> {
        let links = self
            .pull(caller, Role::Buyer, Queue::SelectAppraiser)
            .await?;
        Ok(links
            .into_iter()
            .filter(|link| link.user_hash == caller.identity)
            .collect())
    }

    pub async fn appraiser_pull_pending_requests(
        &self,
        caller: &Caller,
    ) -> Result<Vec<RequestLink>> {
        let queue = Queue::PendingForAppraiserEstimation(caller.identity.clone());
        self.pull(caller, Role::Appraiser, queue).await
    }

    pub async fn insurance_get_open_requests(&self, caller: &Caller) -> Result<Vec<RequestLink>> {
        self.pull(caller, Role::Insurer, Queue::Open4InsuranceOffers)
            .await
    }

    pub async fn government_pull_pending(&self, caller: &Caller) -> Result<Vec<RequestLink>> {
        self.pull(caller, Role::Government, Queue::Pending4Government)
            .await
    }
}

#[cfg(test)]
mod tests {
    use crate::application::engine::LendingEngine;
    use crate::config::EngineConfig;
    use crate::domain::identity::{Caller, Role};
    use crate::domain::money::Balance;
    use crate::domain::profile::{Appraiser, Bank, InsuranceCompany};
    use crate::error::LendingError;
    use crate::infrastructure::in_memory::InMemoryLedger;
    use crate::infrastructure::oracles::{SalaryBandScorer, StaticGovernmentRegistry};

    fn engine(ledger: &InMemoryLedger) -> LendingEngine {
        LendingEngine::new(
            Box::new(ledger.clone()),
            Box::new(SalaryBandScorer),
            Box::new(StaticGovernmentRegistry::default()),
            EngineConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_profile_is_stored_under_role_key() {
        let ledger = InMemoryLedger::new();
        let engine = engine(&ledger);
        let insurer = Caller::with_role("ins-1", Role::Insurer);
        let company: InsuranceCompany =
            serde_json::from_str(r#"{"Name":"Shield","LicenseNumber":"L-9"}"#).unwrap();

        engine.put_profile(&insurer, company).await.unwrap();

        let snapshot = ledger.snapshot().await;
        let stored: InsuranceCompany =
            serde_json::from_slice(&snapshot["insuranceCompany_ins-1"]).unwrap();
        assert_eq!(stored.hash, "ins-1");
        assert_eq!(stored.name, "Shield");
    }

    #[tokio::test]
    async fn test_profile_role_mismatch_aborts() {
        let ledger = InMemoryLedger::new();
        let engine = engine(&ledger);
        let buyer = Caller::with_role("buyer-1", Role::Buyer);
        let bank: Bank = serde_json::from_str(r#"{"Name":"Fake Bank"}"#).unwrap();

        let err = engine.put_profile(&buyer, bank).await.unwrap_err();
        assert!(matches!(err, LendingError::Unauthorized(_)));
        assert!(ledger.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_appraiser_registration_upserts() {
        let ledger = InMemoryLedger::new();
        let engine = engine(&ledger);
        let appraiser = Caller::with_role("appr-1", Role::Appraiser);
        let buyer = Caller::with_role("buyer-1", Role::Buyer);

        let first: Appraiser = serde_json::from_str(r#"{"FirstName":"Ana"}"#).unwrap();
        let second: Appraiser = serde_json::from_str(r#"{"FirstName":"Anna"}"#).unwrap();
        engine.put_appraiser(&appraiser, first).await.unwrap();
        engine.put_appraiser(&appraiser, second).await.unwrap();

        let listed = engine.buyer_get_all_appraisers(&buyer).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].first_name, "Anna");
        assert_eq!(listed[0].appraiser_hash, "appr-1");
    }

    #[tokio::test]
    async fn test_reads_default_to_empty() {
        let ledger = InMemoryLedger::new();
        let engine = engine(&ledger);
        let buyer = Caller::with_role("buyer-1", Role::Buyer);

        assert!(engine.get_properties(&buyer).await.unwrap().is_empty());
        assert!(engine.buyer_get_my_requests(&buyer).await.unwrap().is_empty());
        assert_eq!(engine.get_my_balance(&buyer).await.unwrap(), Balance::ZERO);
        assert!(engine.credit_rating_pull(&buyer).await.is_err());
    }
}
