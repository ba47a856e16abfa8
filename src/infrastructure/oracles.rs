use crate::config::GovernmentConfig;
use crate::domain::credit::{self, CreditGrade};
use crate::domain::ports::{CreditScorer, GovernmentRegistry};
use crate::domain::request::{GovernmentResults, Request};
use crate::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;

/// Grades buyers purely on salary bands; the loan amount is not considered.
#[derive(Debug, Clone, Copy, Default)]
pub struct SalaryBandScorer;

#[async_trait]
impl CreditScorer for SalaryBandScorer {
    async fn score(&self, salary: i64, _loan_amount: i64) -> Result<CreditGrade> {
        credit::grade(salary)
    }
}

/// A registry backed by fixed sets of flagged property hashes.
#[derive(Debug, Clone, Default)]
pub struct StaticGovernmentRegistry {
    liens: HashSet<String>,
    house_owner_flags: HashSet<String>,
    warning_shots: HashSet<String>,
}

impl StaticGovernmentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lien(mut self, property_hash: impl Into<String>) -> Self {
        self.liens.insert(property_hash.into());
        self
    }

    pub fn with_house_owner_flag(mut self, property_hash: impl Into<String>) -> Self {
        self.house_owner_flags.insert(property_hash.into());
        self
    }

    pub fn with_warning_shot(mut self, property_hash: impl Into<String>) -> Self {
        self.warning_shots.insert(property_hash.into());
        self
    }
}

impl From<&GovernmentConfig> for StaticGovernmentRegistry {
    fn from(config: &GovernmentConfig) -> Self {
        let registry = config.liens.iter().fold(Self::new(), |r, p| r.with_lien(p));
        let registry = config
            .house_owner_flags
            .iter()
            .fold(registry, |r, p| r.with_house_owner_flag(p));
        config
            .warning_shots
            .iter()
            .fold(registry, |r, p| r.with_warning_shot(p))
    }
}

#[async_trait]
impl GovernmentRegistry for StaticGovernmentRegistry {
    async fn check(&self, request: &Request) -> Result<GovernmentResults> {
        let property = &request.property_hash;
        Ok(GovernmentResults::new(
            self.house_owner_flags.contains(property),
            self.liens.contains(property),
            self.warning_shots.contains(property),
            Utc::now(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::request::PurchaseApplication;

    fn request_for(property: &str) -> Request {
        Request::open(
            PurchaseApplication {
                hash: "r1".to_string(),
                property_hash: property.to_string(),
                seller_hash: "s1".to_string(),
                salary: 1,
                loan_amount: 1,
                duration: 12,
            },
            "b1",
            Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_salary_band_scorer() {
        let scorer = SalaryBandScorer;
        assert_eq!(scorer.score(25_000, 1).await.unwrap(), CreditGrade::A);
        assert!(scorer.score(20_000, 1).await.is_err());
    }

    #[tokio::test]
    async fn test_static_registry_flags_listed_properties() {
        let registry = StaticGovernmentRegistry::new()
            .with_lien("p-lien")
            .with_warning_shot("p-warrant");

        let clean = registry.check(&request_for("p-clean")).await.unwrap();
        assert!(!clean.any_flagged());

        let lien = registry.check(&request_for("p-lien")).await.unwrap();
        assert!(lien.check_lien);
        assert!(!lien.check_warning_shot);

        let warrant = registry.check(&request_for("p-warrant")).await.unwrap();
        assert!(warrant.check_warning_shot);
    }

    #[tokio::test]
    async fn test_registry_from_config() {
        let config = GovernmentConfig {
            liens: vec![],
            house_owner_flags: vec!["p-owner".to_string()],
            warning_shots: vec!["p-owner".to_string()],
        };
        let registry = StaticGovernmentRegistry::from(&config);

        let results = registry.check(&request_for("p-owner")).await.unwrap();
        assert!(results.check_house_owner);
        assert!(results.check_warning_shot);
        assert!(!results.check_lien);
        assert_eq!(results.flagged().len(), 2);
    }
}
