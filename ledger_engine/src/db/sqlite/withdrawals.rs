use ledger_common::Points;
use log::*;
use sqlx::SqliteConnection;

use crate::{
    db::{sqlite::errors::user_not_found_or_other, traits::LedgerError},
    db_types::{NewWithdrawal, Withdrawal},
};

const WITHDRAWAL_COLUMNS: &str = "id, user_id, order_number, amount, processed_at";

/// Appends a withdrawal to the ledger. No balance check is made here. See [`available_balance`].
///
/// In SQLite this statement takes the database's writer lock, which is then held until the surrounding transaction
/// ends.
pub async fn insert_withdrawal(
    withdrawal: &NewWithdrawal,
    conn: &mut SqliteConnection,
) -> Result<Withdrawal, LedgerError> {
    let record = sqlx::query_as::<_, Withdrawal>(&format!(
        "INSERT INTO withdrawals (user_id, order_number, amount) VALUES ($1, $2, $3) RETURNING {WITHDRAWAL_COLUMNS}"
    ))
    .bind(withdrawal.user_id)
    .bind(withdrawal.order_number.as_str())
    .bind(withdrawal.amount)
    .fetch_one(conn)
    .await
    .map_err(|e| user_not_found_or_other(e, withdrawal.user_id))?;
    trace!("🗃️ Withdrawal #{} of {} recorded for user {}", record.id, record.amount, record.user_id);
    Ok(record)
}

pub async fn fetch_withdrawals_for_user(
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Withdrawal>, sqlx::Error> {
    sqlx::query_as::<_, Withdrawal>(&format!(
        "SELECT {WITHDRAWAL_COLUMNS} FROM withdrawals WHERE user_id = $1 ORDER BY processed_at DESC, id DESC"
    ))
    .bind(user_id)
    .fetch_all(conn)
    .await
}

pub async fn sum_withdrawals(user_id: i64, conn: &mut SqliteConnection) -> Result<Points, sqlx::Error> {
    let total: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(amount), 0) FROM withdrawals WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(conn)
        .await?;
    Ok(Points::from(total))
}

pub async fn sum_processed_accruals(user_id: i64, conn: &mut SqliteConnection) -> Result<Points, sqlx::Error> {
    let total: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(accrual), 0) FROM orders WHERE user_id = $1 AND status = 'PROCESSED' AND accrual IS NOT \
         NULL",
    )
    .bind(user_id)
    .fetch_one(conn)
    .await?;
    Ok(Points::from(total))
}

/// Processed accruals less every withdrawal, including any made earlier in the current transaction.
pub async fn available_balance(user_id: i64, conn: &mut SqliteConnection) -> Result<Points, sqlx::Error> {
    let accrued = sum_processed_accruals(user_id, &mut *conn).await?;
    let withdrawn = sum_withdrawals(user_id, conn).await?;
    Ok(accrued - withdrawn)
}
