//! Named money balances kept under `money_<account>`.

use super::ledger_tx::LedgerTx;
use crate::domain::keys;
use crate::domain::money::{Amount, Balance};
use crate::error::{LendingError, Result};
use tracing::debug;

/// Balance of `account`; unknown accounts hold zero.
pub async fn balance(tx: &mut LedgerTx<'_>, account: &str) -> Result<Balance> {
    let Some(bytes) = tx.read_raw(&keys::money(account)).await? else {
        return Ok(Balance::ZERO);
    };
    std::str::from_utf8(&bytes)
        .ok()
        .and_then(|text| text.trim().parse::<i64>().ok())
        .filter(|units| *units >= 0)
        .map(Balance::new)
        .ok_or_else(|| LendingError::internal(format!("corrupt balance for account {account}")))
}

async fn store(tx: &mut LedgerTx<'_>, account: &str, balance: Balance) -> Result<()> {
    tx.write_raw(&keys::money(account), balance.units().to_string().into_bytes())
        .await
}

/// Credits `amount` to `account` and returns the new balance.
pub async fn reserve(tx: &mut LedgerTx<'_>, account: &str, amount: Amount) -> Result<Balance> {
    let current = balance(tx, account).await?;
    let updated = current.checked_add(amount).ok_or_else(|| {
        LendingError::BusinessRule(format!("balance of {account} would overflow"))
    })?;
    store(tx, account, updated).await?;
    debug!(account, amount = amount.value(), balance = updated.units(), "reserved");
    Ok(updated)
}

/// Moves `amount` from `src` to `dst`. Neither balance changes when `src` is short.
pub async fn transfer(tx: &mut LedgerTx<'_>, src: &str, dst: &str, amount: Amount) -> Result<()> {
    if src == dst {
        return Err(LendingError::ValidationError(format!(
            "cannot transfer from {src} to itself"
        )));
    }

    let source = balance(tx, src).await?;
    let debited = source.checked_sub(amount).ok_or_else(|| {
        LendingError::BusinessRule(format!(
            "insufficient funds in {src}: balance {}, requested {}",
            source.units(),
            amount.value()
        ))
    })?;
    let target = balance(tx, dst).await?;
    let credited = target.checked_add(amount).ok_or_else(|| {
        LendingError::BusinessRule(format!("balance of {dst} would overflow"))
    })?;

    store(tx, src, debited).await?;
    store(tx, dst, credited).await?;
    debug!(src, dst, amount = amount.value(), "transferred");
    Ok(())
}
