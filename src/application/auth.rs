use crate::domain::identity::{Caller, Role};
use crate::error::{LendingError, Result};
use tracing::warn;

/// Resolves the caller's identity and, when `expected` is set, checks its role.
///
/// Returns the identity the operation acts on behalf of.
pub fn authorize(caller: &Caller, expected: Option<Role>) -> Result<&str> {
    if caller.identity.is_empty() {
        warn!(msp_id = %caller.msp_id, "rejected caller without identity");
        return Err(LendingError::Unauthorized(
            "Caller identity is missing".to_string(),
        ));
    }

    if let Some(role) = expected
        && caller.role() != Some(role)
    {
        warn!(
            identity = %caller.identity,
            msp_id = %caller.msp_id,
            expected = %role,
            "role mismatch"
        );
        return Err(LendingError::Unauthorized(format!(
            "Only {} can execute this method, not {}",
            role, caller.msp_id
        )));
    }

    Ok(&caller.identity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_role_yields_identity() {
        let caller = Caller::with_role("bank-1", Role::Bank);
        assert_eq!(authorize(&caller, Some(Role::Bank)).unwrap(), "bank-1");
        assert_eq!(authorize(&caller, None).unwrap(), "bank-1");
    }

    #[test]
    fn test_mismatched_role_is_rejected() {
        let caller = Caller::with_role("buyer-1", Role::Buyer);
        let err = authorize(&caller, Some(Role::Bank)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unauthorized: Only POCBankMSP can execute this method, not POCBuyerMSP"
        );
    }

    #[test]
    fn test_unknown_msp_never_matches() {
        let caller = Caller::new("x", "POCBankMSP2");
        assert!(authorize(&caller, Some(Role::Bank)).is_err());
        assert!(authorize(&caller, None).is_ok());
    }

    #[test]
    fn test_empty_identity_is_rejected() {
        let caller = Caller::with_role("", Role::Buyer);
        assert!(matches!(
            authorize(&caller, None),
            Err(LendingError::Unauthorized(_))
        ));
    }
}
