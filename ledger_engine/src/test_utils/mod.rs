//! Helpers for tests, in this crate and downstream: throwaway SQLite databases and a scripted accrual authority.
#[cfg(feature = "sqlite")]
pub mod prepare_env;
mod scripted_authority;

pub use scripted_authority::ScriptedAuthority;
