use std::collections::HashMap;

use cucumber::World;
use ledger_engine::{
    db_types::Withdrawal,
    order_objects::SubmitOrderResult,
    test_utils::{
        prepare_env::{prepare_test_env, random_db_path},
        ScriptedAuthority,
    },
    AccountApi,
    LedgerError,
    OrderFlowApi,
    SqliteDatabase,
    WithdrawalApi,
};
use log::*;

#[derive(Default, Debug, World)]
pub struct LedgerWorld {
    pub system: Option<LedgerSystem>,
}

#[derive(Debug)]
pub struct LedgerSystem {
    pub db_path: String,
    pub db: SqliteDatabase,
    pub authority: ScriptedAuthority,
    pub users: HashMap<String, i64>,
    pub last_upload: Option<Result<SubmitOrderResult, LedgerError>>,
    pub last_withdrawal: Option<Result<Withdrawal, LedgerError>>,
    pub worker_count: usize,
    pub noted_calls: HashMap<String, usize>,
}

impl LedgerWorld {
    pub fn system(&mut self) -> &mut LedgerSystem {
        self.system.as_mut().expect("Ledger system not initialised")
    }
}

impl LedgerSystem {
    pub async fn new() -> Self {
        let db_path = random_db_path();
        let db = prepare_test_env(&db_path).await;
        debug!("Created database: {db_path}");
        Self {
            db_path,
            db,
            authority: ScriptedAuthority::new(),
            users: HashMap::new(),
            last_upload: None,
            last_withdrawal: None,
            worker_count: 5,
            noted_calls: HashMap::new(),
        }
    }

    pub fn user_id(&self, login: &str) -> i64 {
        *self.users.get(login).unwrap_or_else(|| panic!("No user named {login}"))
    }

    pub fn accounts(&self) -> AccountApi<SqliteDatabase> {
        AccountApi::new(self.db.clone())
    }

    pub fn orders(&self) -> OrderFlowApi<SqliteDatabase> {
        OrderFlowApi::new(self.db.clone())
    }

    pub fn withdrawals(&self) -> WithdrawalApi<SqliteDatabase> {
        WithdrawalApi::new(self.db.clone())
    }
}
