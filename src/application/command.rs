use crate::domain::profile::{Appraiser, Bank, Buyer, CreditRatingAgency, InsuranceCompany, Seller};
use crate::domain::property::Property;
use crate::domain::request::{PurchaseApplication, RequestLink};
use rust_decimal::Decimal;

/// A parsed invocation, ready to run against the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Advertise(Property),
    Buy(PurchaseApplication),
    CreditScore(RequestLink),
    BankPutOffer {
        link: RequestLink,
        offer_hash: String,
        interest: Decimal,
    },
    BuyerSelectBankOffer {
        request_hash: String,
        offer_hash: String,
    },
    BuyerSelectAppraiser {
        request_hash: String,
        appraiser_hash: String,
    },
    AppraiserProvideAmount {
        link: RequestLink,
        amount: i64,
    },
    InsurancePutOffer {
        link: RequestLink,
        amount: Decimal,
        offer_hash: String,
    },
    BuyerSelectInsuranceOffer {
        request_hash: String,
        offer_hash: String,
    },
    GovernmentPutData {
        link: RequestLink,
        check_house_owner: bool,
        check_lien: bool,
        check_warning_shot: bool,
    },
    GovernmentRunChecks(RequestLink),
    BankApprove(RequestLink),
    BankRunChaincode(RequestLink),

    PutBuyerInfo(Buyer),
    PutSellerInfo(Seller),
    PutBankInfo(Bank),
    PutInsuranceCompanyInfo(InsuranceCompany),
    PutCreditRatingAgencyInfo(CreditRatingAgency),
    PutAppraiserInfo(Appraiser),

    GetProperties,
    GetPropertiesForSale,
    GetRequestInfo(RequestLink),
    BuyerGetMyRequests,
    BuyerGetAllAppraisers,
    GetMyBalance,

    CreditRatingPull,
    BankPullOpenForOffers,
    BankPullPendingApproval,
    BankPullPendingSettlement,
    BuyerPullSelectAppraiser,
    AppraiserPullPendingRequests,
    InsuranceGetOpenRequests,
    GovernmentPullPending,
}
