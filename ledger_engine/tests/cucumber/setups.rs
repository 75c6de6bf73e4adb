use cucumber::given;

use crate::cucumber::{ledger_world::LedgerSystem, LedgerWorld};

#[given("a fresh install")]
async fn fresh_database(world: &mut LedgerWorld) {
    let system = LedgerSystem::new().await;
    world.system = Some(system);
}

#[given(expr = "a user named {word}")]
async fn a_user(world: &mut LedgerWorld, login: String) {
    let sys = world.system();
    let user = sys.accounts().register_user(&login, "$argon2id$v=19$hash").await.expect("Error registering user");
    sys.users.insert(login, user.id);
}

#[given(expr = "{word} has uploaded order {word}")]
async fn uploaded_order(world: &mut LedgerWorld, login: String, number: String) {
    let sys = world.system();
    let user_id = sys.user_id(&login);
    let result = sys.orders().submit_order(user_id, &number).await.expect("Error uploading order");
    assert!(result.is_accepted(), "Order {number} was not accepted: {result:?}");
}
