//! Event dispatcher tests: READY handling, per-event time limit, mapping
//! writes that outlive a timed-out event
//!
//! Run with: cargo test -p integration-tests --test dispatcher_tests

use std::sync::Arc;
use std::time::Duration;

use integration_tests::*;
use reactrole_gateway::dispatch::EventDispatcher;
use reactrole_gateway::events::DispatchEvent;
use reactrole_service::{IgnoreReason, Outcome};
use serde_json::json;
use tokio::sync::mpsc;

fn ready() -> DispatchEvent {
    DispatchEvent::decode(
        "READY",
        json!({
            "v": 10,
            "user": { "id": BOT.to_string(), "username": "reactrole", "bot": true },
            "guilds": [{ "id": GUILD.to_string(), "unavailable": true }],
            "session_id": "abc123",
            "resume_gateway_url": "wss://gateway.example"
        }),
    )
    .unwrap()
    .expect("READY is consumed")
}

async fn seeded_bot() -> TestBot {
    let store = Arc::new(InMemoryStore::new());
    store.seed(
        MESSAGE,
        CHANNEL,
        GUILD,
        &[binding(FIRE, ROLE), binding(WATER, OTHER_ROLE)],
    );
    let bot = TestBot::with_store(store);
    bot.engine.load_cache().await.unwrap();
    bot
}

/// Feed `events` through a dispatcher and wait for every handler to finish
async fn dispatch_all(dispatcher: EventDispatcher, events: Vec<DispatchEvent>) {
    let (tx, rx) = mpsc::channel(16);
    let running = tokio::spawn(dispatcher.run(rx));
    for event in events {
        tx.send(event).await.unwrap();
    }
    drop(tx);
    running.await.unwrap();
}

#[tokio::test]
async fn test_ready_records_identity_and_restores_once() {
    let bot = seeded_bot().await;
    let dispatcher = EventDispatcher::new(bot.engine.clone(), Duration::from_secs(5), true);

    dispatch_all(dispatcher, vec![ready(), DispatchEvent::Resumed, ready()]).await;

    assert_eq!(bot.engine.context().self_id(), Some(BOT));
    let restored: Vec<_> = bot
        .gateway
        .calls()
        .into_iter()
        .filter(|call| matches!(call, GatewayCall::AddReaction { .. }))
        .collect();
    assert_eq!(restored.len(), 2);
}

#[tokio::test]
async fn test_ready_without_restore() {
    let bot = seeded_bot().await;
    let dispatcher = EventDispatcher::new(bot.engine.clone(), Duration::from_secs(5), false);

    dispatch_all(dispatcher, vec![ready()]).await;

    assert_eq!(bot.engine.context().self_id(), Some(BOT));
    assert!(bot.gateway.calls().is_empty());
}

#[tokio::test]
async fn test_own_reaction_after_ready_is_recognized() {
    let bot = seeded_bot().await;
    let dispatcher = EventDispatcher::new(bot.engine.clone(), Duration::from_secs(5), false);

    dispatch_all(
        dispatcher,
        vec![
            ready(),
            DispatchEvent::Engine(reaction_added(MESSAGE, BOT, fire())),
        ],
    )
    .await;

    assert!(bot.gateway.role_changes().is_empty());
}

#[tokio::test]
async fn test_events_reach_engine_and_are_counted() {
    let bot = seeded_bot().await;
    bot.engine.set_self_id(BOT);
    let dispatcher = EventDispatcher::new(bot.engine.clone(), Duration::from_secs(5), false);
    let counter = dispatcher.clone();

    dispatch_all(
        dispatcher,
        vec![
            DispatchEvent::Engine(reaction_added(MESSAGE, USER, fire())),
            DispatchEvent::Engine(reaction_added(MESSAGE, USER, water())),
            DispatchEvent::Engine(reaction_added(OTHER_MESSAGE, USER, fire())),
        ],
    )
    .await;

    assert_eq!(counter.handled_count(), 3);
    assert!(bot.gateway.has_role(GUILD, USER, ROLE));
    assert!(bot.gateway.has_role(GUILD, USER, OTHER_ROLE));
}

#[tokio::test]
async fn test_slow_event_is_dropped_after_timeout() {
    let bot = seeded_bot().await;
    bot.engine.set_self_id(BOT);
    bot.gateway.set_delay(Some(Duration::from_millis(500)));
    let dispatcher = EventDispatcher::new(bot.engine.clone(), Duration::from_millis(20), false);
    let counter = dispatcher.clone();

    dispatch_all(
        dispatcher,
        vec![DispatchEvent::Engine(reaction_added(MESSAGE, USER, fire()))],
    )
    .await;

    assert_eq!(counter.handled_count(), 1);
    assert!(bot.gateway.calls().is_empty());
    assert!(!bot.gateway.has_role(GUILD, USER, ROLE));
}

/// Wait until any mapping write still in flight has finished
async fn settle_writes(bot: &TestBot) {
    drop(bot.engine.context().lock_writes().await);
    bot.store.set_commit_delay(None);
}

#[tokio::test]
async fn test_timed_out_clear_still_reaches_cache() {
    let store = Arc::new(InMemoryStore::new());
    store.seed(MESSAGE, CHANNEL, GUILD, &[binding(FIRE, ROLE)]);
    let bot = TestBot::started(store).await;
    bot.store.set_commit_delay(Some(Duration::from_millis(300)));
    let dispatcher = EventDispatcher::new(bot.engine.clone(), Duration::from_millis(50), false);
    let counter = dispatcher.clone();

    dispatch_all(
        dispatcher,
        vec![DispatchEvent::Engine(cleared(MESSAGE, fire()))],
    )
    .await;
    assert_eq!(counter.handled_count(), 1);

    settle_writes(&bot).await;
    assert_eq!(bot.store.tracked_count(), 0);
    assert!(bot.cached().is_empty());
    bot.assert_consistent();

    let outcome = bot.send(reaction_added(MESSAGE, USER, fire())).await.unwrap();
    assert_eq!(outcome, Outcome::Ignored(IgnoreReason::NotTracked));
    assert!(bot.gateway.role_changes().is_empty());
}

#[tokio::test]
async fn test_timed_out_bind_still_reaches_cache() {
    let bot = TestBot::started(Arc::new(InMemoryStore::new())).await;
    bot.store.set_commit_delay(Some(Duration::from_millis(100)));
    let dispatcher = EventDispatcher::new(bot.engine.clone(), Duration::from_millis(50), false);

    dispatch_all(
        dispatcher,
        vec![DispatchEvent::Engine(add_reaction_command(MESSAGE, &fire(), ROLE))],
    )
    .await;

    settle_writes(&bot).await;
    let (_, bindings) = bot.store.find_by_message(MESSAGE).expect("message stored");
    assert_eq!(bindings, vec![binding(FIRE, ROLE)]);
    assert_eq!(bot.cached().len(), 1);
    bot.assert_consistent();

    let outcome = bot.send(reaction_added(MESSAGE, USER, fire())).await.unwrap();
    assert_eq!(outcome, Outcome::RoleGranted { role_id: ROLE });
}
