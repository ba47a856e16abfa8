//! String-argument entry point: operation name plus positional arguments in,
//! optional JSON payload out.

use crate::application::command::Command;
use crate::application::engine::LendingEngine;
use crate::domain::identity::Caller;
use crate::domain::request::RequestLink;
use crate::error::{LendingError, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::debug;

/// Turns positional string arguments into a typed [`Command`].
pub type ArgParser = fn(&[String]) -> Result<Command>;

fn expect_args(args: &[String], expected: usize) -> Result<()> {
    if args.len() != expected {
        return Err(LendingError::ValidationError(format!(
            "Incorrect number of arguments {}. Expecting {expected}",
            args.len()
        )));
    }
    Ok(())
}

fn json_arg<T: DeserializeOwned>(arg: &str) -> Result<T> {
    if arg.trim().is_empty() {
        return Err(LendingError::ValidationError(
            "JSON must be non-empty string".to_string(),
        ));
    }
    serde_json::from_str(arg)
        .map_err(|e| LendingError::ValidationError(format!("Invalid JSON argument: {e}")))
}

fn text_arg(arg: &str, name: &str) -> Result<String> {
    if arg.is_empty() {
        return Err(LendingError::ValidationError(format!(
            "{name} must be a non-empty string"
        )));
    }
    Ok(arg.to_string())
}

fn int_arg(arg: &str, name: &str) -> Result<i64> {
    arg.trim().parse().map_err(|_| {
        LendingError::ValidationError(format!("{name} must be an integer, got '{arg}'"))
    })
}

fn decimal_arg(arg: &str, name: &str) -> Result<Decimal> {
    Decimal::from_str(arg.trim()).map_err(|_| {
        LendingError::ValidationError(format!("{name} must be a decimal number, got '{arg}'"))
    })
}

fn bool_arg(arg: &str, name: &str) -> Result<bool> {
    match arg.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(LendingError::ValidationError(format!(
            "{name} must be 'true' or 'false', got '{other}'"
        ))),
    }
}

fn link_args(user_hash: &str, request_hash: &str) -> Result<RequestLink> {
    Ok(RequestLink::new(
        text_arg(user_hash, "UserHash")?,
        text_arg(request_hash, "RequestHash")?,
    ))
}

/// Maps operation names to their argument parsers.
pub struct CommandRegistry {
    parsers: HashMap<&'static str, ArgParser>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistry {
    /// Creates a registry with every built-in operation.
    pub fn new() -> Self {
        let mut registry = Self {
            parsers: HashMap::new(),
        };

        registry.register("advertise", |args| {
            expect_args(args, 1)?;
            Ok(Command::Advertise(json_arg(&args[0])?))
        });
        registry.register("buy", |args| {
            expect_args(args, 1)?;
            Ok(Command::Buy(json_arg(&args[0])?))
        });
        registry.register("creditScore", |args| {
            expect_args(args, 1)?;
            Ok(Command::CreditScore(json_arg(&args[0])?))
        });
        registry.register("bankPutOffer", |args| {
            expect_args(args, 3)?;
            Ok(Command::BankPutOffer {
                link: json_arg(&args[0])?,
                offer_hash: text_arg(&args[1], "OfferHash")?,
                interest: decimal_arg(&args[2], "Interest")?,
            })
        });
        registry.register("buyerSelectBankOffer", |args| {
            expect_args(args, 2)?;
            Ok(Command::BuyerSelectBankOffer {
                request_hash: text_arg(&args[0], "RequestHash")?,
                offer_hash: text_arg(&args[1], "OfferHash")?,
            })
        });
        registry.register("buyerSelectAppraiser", |args| {
            expect_args(args, 2)?;
            Ok(Command::BuyerSelectAppraiser {
                request_hash: text_arg(&args[0], "RequestHash")?,
                appraiser_hash: text_arg(&args[1], "AppraiserHash")?,
            })
        });
        registry.register("appraiserProvideAmount", |args| {
            expect_args(args, 3)?;
            Ok(Command::AppraiserProvideAmount {
                link: link_args(&args[0], &args[1])?,
                amount: int_arg(&args[2], "Amount")?,
            })
        });
        registry.register("insurancePutOffer", |args| {
            expect_args(args, 4)?;
            Ok(Command::InsurancePutOffer {
                link: link_args(&args[0], &args[1])?,
                amount: decimal_arg(&args[2], "Amount")?,
                offer_hash: text_arg(&args[3], "OfferHash")?,
            })
        });
        registry.register("buyerSelectInsuranceOffer", |args| {
            expect_args(args, 2)?;
            Ok(Command::BuyerSelectInsuranceOffer {
                request_hash: text_arg(&args[0], "RequestHash")?,
                offer_hash: text_arg(&args[1], "OfferHash")?,
            })
        });
        registry.register("governmentPutData", |args| {
            expect_args(args, 5)?;
            Ok(Command::GovernmentPutData {
                link: link_args(&args[0], &args[1])?,
                check_house_owner: bool_arg(&args[2], "CheckHouseOwner")?,
                check_lien: bool_arg(&args[3], "CheckLien")?,
                check_warning_shot: bool_arg(&args[4], "CheckWarningShot")?,
            })
        });
        registry.register("governmentRunChecks", |args| {
            expect_args(args, 2)?;
            Ok(Command::GovernmentRunChecks(link_args(&args[0], &args[1])?))
        });
        registry.register("bankApprove", |args| {
            expect_args(args, 1)?;
            Ok(Command::BankApprove(json_arg(&args[0])?))
        });
        registry.register("bankRunChaincode", |args| {
            expect_args(args, 1)?;
            Ok(Command::BankRunChaincode(json_arg(&args[0])?))
        });

        registry.register("putBuyerPersonalInfo", |args| {
            expect_args(args, 1)?;
            Ok(Command::PutBuyerInfo(json_arg(&args[0])?))
        });
        registry.register("putSellerPersonalInfo", |args| {
            expect_args(args, 1)?;
            Ok(Command::PutSellerInfo(json_arg(&args[0])?))
        });
        registry.register("putBankInfo", |args| {
            expect_args(args, 1)?;
            Ok(Command::PutBankInfo(json_arg(&args[0])?))
        });
        registry.register("putInsuranceCompanyInfo", |args| {
            expect_args(args, 1)?;
            Ok(Command::PutInsuranceCompanyInfo(json_arg(&args[0])?))
        });
        registry.register("putCreditRatingAgencyInfo", |args| {
            expect_args(args, 1)?;
            Ok(Command::PutCreditRatingAgencyInfo(json_arg(&args[0])?))
        });
        let appraiser_info: ArgParser = |args| {
            expect_args(args, 1)?;
            Ok(Command::PutAppraiserInfo(json_arg(&args[0])?))
        };
        registry.register("appraiserPutPersonalInfo", appraiser_info);
        registry.register("appraiserputPersonalInfo", appraiser_info);

        registry.register("getProperties", |args| {
            expect_args(args, 0)?;
            Ok(Command::GetProperties)
        });
        registry.register("getProperties4Sale", |args| {
            expect_args(args, 0)?;
            Ok(Command::GetPropertiesForSale)
        });
        registry.register("getRequestInfo", |args| {
            expect_args(args, 2)?;
            Ok(Command::GetRequestInfo(link_args(&args[0], &args[1])?))
        });
        registry.register("buyerGetMyRequests", |args| {
            expect_args(args, 0)?;
            Ok(Command::BuyerGetMyRequests)
        });
        registry.register("buyerGetAllAppraisers", |args| {
            expect_args(args, 0)?;
            Ok(Command::BuyerGetAllAppraisers)
        });
        registry.register("getMyBalance", |args| {
            expect_args(args, 0)?;
            Ok(Command::GetMyBalance)
        });

        registry.register("creditRatingPull", |args| {
            expect_args(args, 0)?;
            Ok(Command::CreditRatingPull)
        });
        registry.register("bankPullOpen4bankOffers", |args| {
            expect_args(args, 0)?;
            Ok(Command::BankPullOpenForOffers)
        });
        registry.register("bankPullPendingApproval", |args| {
            expect_args(args, 0)?;
            Ok(Command::BankPullPendingApproval)
        });
        registry.register("bankPullPendingSettlement", |args| {
            expect_args(args, 0)?;
            Ok(Command::BankPullPendingSettlement)
        });
        registry.register("buyerPullSelectAppraiser", |args| {
            expect_args(args, 0)?;
            Ok(Command::BuyerPullSelectAppraiser)
        });
        registry.register("appraiserPullPendingRequests", |args| {
            expect_args(args, 0)?;
            Ok(Command::AppraiserPullPendingRequests)
        });
        registry.register("insuranceGetOpenRequests", |args| {
            expect_args(args, 0)?;
            Ok(Command::InsuranceGetOpenRequests)
        });
        registry.register("governmentPullPending", |args| {
            expect_args(args, 0)?;
            Ok(Command::GovernmentPullPending)
        });

        registry
    }

    pub fn register(&mut self, operation: &'static str, parser: ArgParser) {
        self.parsers.insert(operation, parser);
    }

    /// Registered operation names, sorted.
    pub fn operations(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.parsers.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn parse(&self, operation: &str, args: &[String]) -> Result<Command> {
        let parser = self.parsers.get(operation).ok_or_else(|| {
            LendingError::ValidationError(format!(
                "Received unknown function invocation {operation}"
            ))
        })?;
        parser(args)
    }
}

fn payload<T: Serialize>(value: &T) -> Result<Option<Value>> {
    Ok(Some(serde_json::to_value(value)?))
}

/// Runs named operations against a [`LendingEngine`].
pub struct Dispatcher {
    engine: LendingEngine,
    registry: CommandRegistry,
}

impl Dispatcher {
    pub fn new(engine: LendingEngine) -> Self {
        Self {
            engine,
            registry: CommandRegistry::new(),
        }
    }

    pub fn engine(&self) -> &LendingEngine {
        &self.engine
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub async fn invoke(
        &self,
        caller: &Caller,
        operation: &str,
        args: &[String],
    ) -> Result<Option<Value>> {
        let command = self.registry.parse(operation, args)?;
        debug!(operation, identity = %caller.identity, "dispatching");
        self.execute(caller, command).await
    }

    pub async fn execute(&self, caller: &Caller, command: Command) -> Result<Option<Value>> {
        let engine = &self.engine;
        match command {
            Command::Advertise(property) => payload(&engine.advertise(caller, property).await?),
            Command::Buy(application) => payload(&engine.buy(caller, application).await?),
            Command::CreditScore(link) => payload(&engine.credit_score(caller, &link).await?),
            Command::BankPutOffer {
                link,
                offer_hash,
                interest,
            } => payload(
                &engine
                    .bank_put_offer(caller, &link, &offer_hash, interest)
                    .await?,
            ),
            Command::BuyerSelectBankOffer {
                request_hash,
                offer_hash,
            } => {
                engine
                    .buyer_select_bank_offer(caller, &request_hash, &offer_hash)
                    .await?;
                Ok(None)
            }
            Command::BuyerSelectAppraiser {
                request_hash,
                appraiser_hash,
            } => {
                engine
                    .buyer_select_appraiser(caller, &request_hash, &appraiser_hash)
                    .await?;
                Ok(None)
            }
            Command::AppraiserProvideAmount { link, amount } => {
                engine
                    .appraiser_provide_amount(caller, &link, amount)
                    .await?;
                Ok(None)
            }
            Command::InsurancePutOffer {
                link,
                amount,
                offer_hash,
            } => payload(
                &engine
                    .insurance_put_offer(caller, &link, amount, &offer_hash)
                    .await?,
            ),
            Command::BuyerSelectInsuranceOffer {
                request_hash,
                offer_hash,
            } => {
                engine
                    .buyer_select_insurance_offer(caller, &request_hash, &offer_hash)
                    .await?;
                Ok(None)
            }
            Command::GovernmentPutData {
                link,
                check_house_owner,
                check_lien,
                check_warning_shot,
            } => payload(
                &engine
                    .government_put_data(
                        caller,
                        &link,
                        check_house_owner,
                        check_lien,
                        check_warning_shot,
                    )
                    .await?,
            ),
            Command::GovernmentRunChecks(link) => {
                payload(&engine.government_run_checks(caller, &link).await?)
            }
            Command::BankApprove(link) => payload(&engine.bank_approve(caller, &link).await?),
            Command::BankRunChaincode(link) => {
                engine.bank_run_chaincode(caller, &link).await?;
                Ok(None)
            }

            Command::PutBuyerInfo(profile) => {
                engine.put_profile(caller, profile).await?;
                Ok(None)
            }
            Command::PutSellerInfo(profile) => {
                engine.put_profile(caller, profile).await?;
                Ok(None)
            }
            Command::PutBankInfo(profile) => {
                engine.put_profile(caller, profile).await?;
                Ok(None)
            }
            Command::PutInsuranceCompanyInfo(profile) => {
                engine.put_profile(caller, profile).await?;
                Ok(None)
            }
            Command::PutCreditRatingAgencyInfo(profile) => {
                engine.put_profile(caller, profile).await?;
                Ok(None)
            }
            Command::PutAppraiserInfo(appraiser) => {
                engine.put_appraiser(caller, appraiser).await?;
                Ok(None)
            }

            Command::GetProperties => payload(&engine.get_properties(caller).await?),
            Command::GetPropertiesForSale => {
                payload(&engine.get_properties_for_sale(caller).await?)
            }
            Command::GetRequestInfo(link) => {
                payload(&engine.get_request_info(caller, &link).await?)
            }
            Command::BuyerGetMyRequests => payload(&engine.buyer_get_my_requests(caller).await?),
            Command::BuyerGetAllAppraisers => {
                payload(&engine.buyer_get_all_appraisers(caller).await?)
            }
            Command::GetMyBalance => payload(&engine.get_my_balance(caller).await?),

            Command::CreditRatingPull => payload(&engine.credit_rating_pull(caller).await?),
            Command::BankPullOpenForOffers => {
                payload(&engine.bank_pull_open_for_offers(caller).await?)
            }
            Command::BankPullPendingApproval => {
                payload(&engine.bank_pull_pending_approval(caller).await?)
            }
            Command::BankPullPendingSettlement => {
                payload(&engine.bank_pull_pending_settlement(caller).await?)
            }
            Command::BuyerPullSelectAppraiser => {
                payload(&engine.buyer_pull_select_appraiser(caller).await?)
            }
            Command::AppraiserPullPendingRequests => {
                payload(&engine.appraiser_pull_pending_requests(caller).await?)
            }
            Command::InsuranceGetOpenRequests => {
                payload(&engine.insurance_get_open_requests(caller).await?)
            }
            Command::GovernmentPullPending => {
                payload(&engine.government_pull_pending(caller).await?)
            }
        }
    }
}
