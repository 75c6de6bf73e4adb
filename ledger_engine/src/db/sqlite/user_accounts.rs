use log::*;
use sqlx::SqliteConnection;

use crate::{db::traits::LedgerError, db_types::UserAccount};

const USER_COLUMNS: &str = "id, login, password_hash, created_at";

pub async fn insert_user_account(
    login: &str,
    password_hash: &str,
    conn: &mut SqliteConnection,
) -> Result<UserAccount, LedgerError> {
    let result = sqlx::query_as::<_, UserAccount>(&format!(
        "INSERT INTO user_accounts (login, password_hash) VALUES ($1, $2) RETURNING {USER_COLUMNS}"
    ))
    .bind(login)
    .bind(password_hash)
    .fetch_one(conn)
    .await;
    match result {
        Ok(account) => {
            debug!("🗃️ Created user account #{} for '{}'", account.id, account.login);
            Ok(account)
        },
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Err(LedgerError::LoginAlreadyExists(login.to_string()))
        },
        Err(e) => Err(e.into()),
    }
}

pub async fn user_account_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<UserAccount>, sqlx::Error> {
    sqlx::query_as::<_, UserAccount>(&format!("SELECT {USER_COLUMNS} FROM user_accounts WHERE id = $1"))
        .bind(id)
        .fetch_optional(conn)
        .await
}

pub async fn user_account_by_login(
    login: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<UserAccount>, sqlx::Error> {
    sqlx::query_as::<_, UserAccount>(&format!("SELECT {USER_COLUMNS} FROM user_accounts WHERE login = $1"))
        .bind(login)
        .fetch_optional(conn)
        .await
}
