//! Routes for reading and replacing the logged in user's income, expenses and savings.

use rocket::{get, http::Status, post, serde::json::Json, State};
use rocket_okapi::openapi;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use app::ledger::{self, Entry, Snapshot};
use app::user::Savings;

use crate::error::{self, Ack, MessageError, MessageResult};
use crate::{access, state::RocketState};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub(super) struct SnapshotModel {
    /// Income entries, in the order they were saved. Their shape is up to the client.
    #[serde(rename = "ingresos", default)]
    income: Vec<Value>,
    /// Expense entries, in the order they were saved. Their shape is up to the client.
    #[serde(rename = "gastos", default)]
    expenses: Vec<Value>,
    /// Current savings.
    #[serde(rename = "ahorro", default = "zero")]
    #[schemars(with = "f64")]
    savings: Number,
}

fn zero() -> Number {
    Number::from(0)
}

impl SnapshotModel {
    fn from_entity(snapshot: Snapshot) -> Self {
        Self {
            income: snapshot.income.into_iter().map(|entry| entry.0).collect(),
            expenses: snapshot.expenses.into_iter().map(|entry| entry.0).collect(),
            savings: snapshot.savings.0,
        }
    }

    fn into_entity(self) -> Snapshot {
        Snapshot {
            income: self.income.into_iter().map(Entry).collect(),
            expenses: self.expenses.into_iter().map(Entry).collect(),
            savings: Savings(self.savings),
        }
    }
}

/// Get your income, expenses and savings.
#[openapi(tag = "Data")]
#[get("/datos")]
pub(super) async fn get(
    state: &State<RocketState>,
    guard: access::SessionGuard,
) -> MessageResult<SnapshotModel> {
    ledger::get_snapshot(guard.grant(), &state.storage)
        .await
        .map(|snapshot| Json(SnapshotModel::from_entity(snapshot)))
        .map_err(ledger_error)
}

/// Replace your income and expense lists and your savings. Missing fields are saved as empty
/// lists and zero savings.
#[openapi(tag = "Data")]
#[post("/datos", data = "<req>")]
pub(super) async fn post(
    state: &State<RocketState>,
    req: Json<SnapshotModel>,
    guard: access::SessionGuard,
) -> MessageResult<Ack> {
    ledger::save_snapshot(guard.grant(), &state.storage, req.into_inner().into_entity())
        .await
        .map_err(ledger_error)?;
    Ok(Ack::ok())
}

/// Same bodies as the 401 and 500 catchers.
fn ledger_error(e: ledger::Error) -> MessageError {
    match e {
        ledger::Error::UnknownUser(_) => error::message(Status::Unauthorized, error::UNAUTHORIZED),
        ledger::Error::Storage(e) => error::internal_error_message(&e),
    }
}
