//! Domain logic for the personal finance service: users, sessions and their ledgers, all kept in
//! flat JSON files.

pub mod auth;
pub mod ledger;
pub mod storage;
pub mod user;
