use std::{
    str::FromStr,
    time::{Duration, Instant},
};

use accrual_tools::{AccrualResponse, AccrualStatus};
use cucumber::{given, then, when};
use ledger_common::Points;
use ledger_engine::{
    db_types::{Order, OrderNumber, OrderStatusType},
    order_objects::SubmitOrderResult,
    LedgerError,
    ReconciliationConfig,
    ReconciliationPipeline,
};
use tokio_util::sync::CancellationToken;

use crate::cucumber::LedgerWorld;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

fn points(s: &str) -> Points {
    Points::from_str(s).unwrap_or_else(|e| panic!("{s} is not a points value: {e}"))
}

fn status(s: &str) -> OrderStatusType {
    OrderStatusType::from_str(s).unwrap_or_else(|e| panic!("{e}"))
}

async fn fetch_order(world: &mut LedgerWorld, number: &str) -> Order {
    let number = OrderNumber::parse(number).expect("Not a valid order number");
    let order = world.system().accounts().order_by_number(&number).await.expect("Error fetching order");
    order.unwrap_or_else(|| panic!("Order {number} does not exist"))
}

//----------------------------------------------   Accrual authority  ----------------------------------------------------

#[given(expr = "the accrual authority reports order {word} as {word}")]
async fn authority_reports(world: &mut LedgerWorld, number: String, status: String) {
    let status = serde_status(&status);
    world.system().authority.push_report(&number, status, None);
}

#[given(expr = "the accrual authority reports order {word} as {word} with an accrual of {word}")]
async fn authority_reports_accrual(world: &mut LedgerWorld, number: String, status: String, accrual: String) {
    let status = serde_status(&status);
    world.system().authority.push_report(&number, status, Some(points(&accrual)));
}

#[given(expr = "the accrual authority has no news about order {word}")]
async fn authority_has_no_news(world: &mut LedgerWorld, number: String) {
    world.system().authority.push_response(&number, Ok(AccrualResponse::Unchanged));
}

#[given(expr = "the accrual authority rate limits order {word} for {int} seconds")]
async fn authority_rate_limits(world: &mut LedgerWorld, number: String, secs: u64) {
    world.system().authority.push_response(&number, Ok(AccrualResponse::RateLimited(Duration::from_secs(secs))));
}

fn serde_status(s: &str) -> AccrualStatus {
    match s {
        "REGISTERED" => AccrualStatus::Registered,
        "INVALID" => AccrualStatus::Invalid,
        "PROCESSING" => AccrualStatus::Processing,
        "PROCESSED" => AccrualStatus::Processed,
        s => panic!("The accrual authority does not report {s}"),
    }
}

//----------------------------------------------   Reconciliation  -------------------------------------------------------

#[given(expr = "the reconciliation pipeline has {int} worker(s)")]
async fn pipeline_workers(world: &mut LedgerWorld, count: usize) {
    world.system().worker_count = count;
}

#[when(expr = "the reconciliation pipeline runs for {int}ms")]
async fn pipeline_runs_for(world: &mut LedgerWorld, ms: u64) {
    let sys = world.system();
    let config = ReconciliationConfig::new(sys.worker_count, POLL_INTERVAL);
    let pipeline = ReconciliationPipeline::start(sys.db.clone(), sys.authority.clone(), config, CancellationToken::new());
    tokio::time::sleep(Duration::from_millis(ms)).await;
    pipeline.shutdown(Duration::from_secs(2)).await;
}

#[when(expr = "the reconciliation pipeline runs until order {word} is {word}")]
async fn pipeline_runs_until(world: &mut LedgerWorld, number: String, target: String) {
    let target = status(&target);
    let (db, authority, worker_count) = {
        let sys = world.system();
        (sys.db.clone(), sys.authority.clone(), sys.worker_count)
    };
    let config = ReconciliationConfig::new(worker_count, POLL_INTERVAL);
    let pipeline = ReconciliationPipeline::start(db, authority, config, CancellationToken::new());
    let start = Instant::now();
    loop {
        let order = fetch_order(world, &number).await;
        if order.status == target {
            break;
        }
        assert!(start.elapsed() < Duration::from_secs(10), "Order {number} is still {} after 10s", order.status);
        tokio::time::sleep(POLL_INTERVAL).await;
    }
    pipeline.shutdown(Duration::from_secs(2)).await;
}

#[when(expr = "I note how often the accrual authority was asked about order {word}")]
async fn note_calls(world: &mut LedgerWorld, number: String) {
    let sys = world.system();
    let count = sys.authority.call_count(&number);
    sys.noted_calls.insert(number, count);
}

#[then(expr = "the accrual authority was not asked about order {word} again")]
async fn authority_not_asked_again(world: &mut LedgerWorld, number: String) {
    let sys = world.system();
    let noted = *sys.noted_calls.get(&number).expect("Call count was not noted");
    assert_eq!(sys.authority.call_count(&number), noted);
}

#[then(expr = "the accrual authority was asked about order {word} at least {int} seconds apart")]
async fn authority_was_asked_apart(world: &mut LedgerWorld, number: String, secs: u64) {
    let calls = world.system().authority.calls(&number);
    assert!(calls.len() >= 2, "Order {number} was only queried {} times", calls.len());
    let gap = calls[1].duration_since(calls[0]);
    assert!(gap >= Duration::from_secs(secs), "Only {gap:?} between the first two queries");
}

//----------------------------------------------   Orders  ---------------------------------------------------------------

#[when(expr = "{word} uploads order {string}")]
async fn upload_order(world: &mut LedgerWorld, login: String, number: String) {
    let sys = world.system();
    let user_id = sys.user_id(&login);
    let result = sys.orders().submit_order(user_id, &number).await;
    sys.last_upload = Some(result);
}

#[then(expr = "the upload is {word}")]
async fn upload_result(world: &mut LedgerWorld, outcome: String) {
    let result = world.system().last_upload.take().expect("Nothing was uploaded");
    match (outcome.as_str(), result) {
        ("accepted", Ok(SubmitOrderResult::Accepted(order))) => assert_eq!(order.status, OrderStatusType::New),
        ("repeated", Ok(SubmitOrderResult::AlreadyUploaded(_))) => {},
        ("refused", Ok(SubmitOrderResult::UploadedByAnotherUser)) => {},
        ("invalid", Err(LedgerError::InvalidOrderNumber(_))) => {},
        (expected, actual) => panic!("Expected the upload to be {expected}, but got {actual:?}"),
    }
}

#[then(expr = "order {word} has status {word}")]
async fn order_has_status(world: &mut LedgerWorld, number: String, expected: String) {
    let order = fetch_order(world, &number).await;
    assert_eq!(order.status, status(&expected));
}

#[then(expr = "order {word} has an accrual of {word}")]
async fn order_has_accrual(world: &mut LedgerWorld, number: String, accrual: String) {
    let order = fetch_order(world, &number).await;
    assert_eq!(order.accrual, Some(points(&accrual)));
}

#[then(expr = "order {word} has no accrual")]
async fn order_has_no_accrual(world: &mut LedgerWorld, number: String) {
    let order = fetch_order(world, &number).await;
    assert_eq!(order.accrual, None);
}

#[then(expr = "order {word} belongs to {word}")]
async fn order_belongs_to(world: &mut LedgerWorld, number: String, login: String) {
    let order = fetch_order(world, &number).await;
    assert_eq!(order.user_id, world.system().user_id(&login));
}

#[then(expr = "{word} has {int} order(s)")]
async fn order_count(world: &mut LedgerWorld, login: String, count: usize) {
    let sys = world.system();
    let orders = sys.accounts().orders_for_user(sys.user_id(&login)).await.expect("Error fetching orders");
    assert_eq!(orders.len(), count);
}

//----------------------------------------------   Withdrawals  ----------------------------------------------------------

#[when(expr = "{word} withdraws {word} points against order {string}")]
async fn withdraw(world: &mut LedgerWorld, login: String, amount: String, reference: String) {
    let sys = world.system();
    let user_id = sys.user_id(&login);
    let result = sys.withdrawals().withdraw(user_id, &reference, points(&amount)).await;
    sys.last_withdrawal = Some(result);
}

#[then("the withdrawal succeeds")]
async fn withdrawal_succeeds(world: &mut LedgerWorld) {
    let result = world.system().last_withdrawal.take().expect("No withdrawal was made");
    assert!(result.is_ok(), "Withdrawal failed: {result:?}");
}

#[then(expr = "the withdrawal fails for insufficient funds with {word} available")]
async fn withdrawal_insufficient(world: &mut LedgerWorld, available: String) {
    match world.system().last_withdrawal.take().expect("No withdrawal was made") {
        Err(LedgerError::InsufficientFunds { available: actual, .. }) => assert_eq!(actual, points(&available)),
        other => panic!("Expected insufficient funds, got {other:?}"),
    }
}

#[then(expr = "the withdrawal fails with an invalid {word}")]
async fn withdrawal_invalid(world: &mut LedgerWorld, what: String) {
    let result = world.system().last_withdrawal.take().expect("No withdrawal was made");
    match (what.as_str(), result) {
        ("amount", Err(LedgerError::InvalidAmount(_))) => {},
        ("reference", Err(LedgerError::InvalidOrderNumber(_))) => {},
        (what, other) => panic!("Expected an invalid {what}, got {other:?}"),
    }
}

#[then(expr = "{word} has a balance of {word} with {word} withdrawn")]
async fn balance(world: &mut LedgerWorld, login: String, current: String, withdrawn: String) {
    let sys = world.system();
    let balance = sys.accounts().balance_for_user(sys.user_id(&login)).await.expect("Error fetching balance");
    assert_eq!(balance.current, points(&current));
    assert_eq!(balance.withdrawn, points(&withdrawn));
}

#[then(expr = "{word} has made {int} withdrawal(s)")]
async fn withdrawal_count(world: &mut LedgerWorld, login: String, count: usize) {
    let sys = world.system();
    let history = sys.accounts().withdrawals_for_user(sys.user_id(&login)).await.expect("Error fetching withdrawals");
    assert_eq!(history.len(), count);
}
