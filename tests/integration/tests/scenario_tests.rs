//! End-to-end scenarios: bind, react, un-react, and clear on one message
//!
//! Run with: cargo test -p integration-tests --test scenario_tests

use std::sync::Arc;

use integration_tests::*;
use reactrole_core::MessageRef;
use reactrole_service::{IgnoreReason, LoadReport, Outcome};

fn message_ref() -> MessageRef {
    MessageRef::new(CHANNEL, MESSAGE)
}

/// Bind fire to ROLE on MESSAGE through the command path
async fn bound_bot() -> TestBot {
    let bot = TestBot::started(Arc::new(InMemoryStore::new())).await;
    let outcome = bot
        .send(add_reaction_command(MESSAGE, &fire(), ROLE))
        .await
        .unwrap();
    assert!(matches!(outcome, Outcome::Bound { created: true, .. }));
    bot.gateway.clear_calls();
    bot
}

#[tokio::test]
async fn test_bind_tracks_new_message() {
    let bot = TestBot::started(Arc::new(InMemoryStore::new())).await;

    let outcome = bot
        .send(add_reaction_command(MESSAGE, &fire(), ROLE))
        .await
        .unwrap();
    assert!(matches!(outcome, Outcome::Bound { created: true, .. }));

    let (header, bindings) = bot.store.find_by_message(MESSAGE).expect("message stored");
    assert_eq!(header.guild_id, GUILD);
    assert_eq!(header.channel_id, CHANNEL);
    assert_eq!(bindings, vec![binding(FIRE, ROLE)]);

    let cached = bot
        .engine
        .context()
        .cache()
        .find_by_message(GUILD, MESSAGE)
        .expect("message cached");
    assert_eq!(cached.bindings(), &[binding(FIRE, ROLE)]);

    let calls = bot.gateway.calls();
    assert!(calls.contains(&GatewayCall::AddReaction {
        message: message_ref(),
        emote_id: Some(FIRE),
    }));
    // The command went through, so its message is gone
    assert!(calls
        .iter()
        .any(|call| matches!(call, GatewayCall::DeleteMessage(_))));
    assert!(bot.gateway.replies().is_empty());

    bot.assert_consistent();
}

#[tokio::test]
async fn test_reaction_grants_role_once() {
    let bot = bound_bot().await;

    let outcome = bot.send(reaction_added(MESSAGE, USER, fire())).await.unwrap();

    assert_eq!(outcome, Outcome::RoleGranted { role_id: ROLE });
    assert_eq!(
        bot.gateway.role_changes(),
        vec![GatewayCall::GrantRole {
            guild_id: GUILD,
            user_id: USER,
            role_id: ROLE,
        }]
    );
    assert!(bot.gateway.has_role(GUILD, USER, ROLE));
}

#[tokio::test]
async fn test_unreact_revokes_role_once() {
    let bot = bound_bot().await;
    bot.gateway.give_role(GUILD, USER, ROLE);

    let outcome = bot
        .send(reaction_removed(MESSAGE, USER, fire()))
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::RoleRevoked { role_id: ROLE });
    assert_eq!(
        bot.gateway.role_changes(),
        vec![GatewayCall::RevokeRole {
            guild_id: GUILD,
            user_id: USER,
            role_id: ROLE,
        }]
    );
    assert!(!bot.gateway.has_role(GUILD, USER, ROLE));
}

#[tokio::test]
async fn test_own_reaction_removed_is_put_back() {
    let bot = bound_bot().await;

    let outcome = bot
        .send(reaction_removed(MESSAGE, BOT, fire()))
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::AffordanceRestored);
    assert_eq!(
        bot.gateway.calls(),
        vec![GatewayCall::AddReaction {
            message: message_ref(),
            emote_id: Some(FIRE),
        }]
    );
    assert!(bot.gateway.role_changes().is_empty());
}

#[tokio::test]
async fn test_clearing_last_binding_untracks_message() {
    let bot = bound_bot().await;

    let outcome = bot.send(cleared(MESSAGE, fire())).await.unwrap();

    assert!(matches!(outcome, Outcome::Unbound { exhausted: true, .. }));
    assert!(bot.store.find_by_message(MESSAGE).is_none());
    assert!(bot.cached().is_empty());
    bot.assert_consistent();

    // Reactions on an untracked message do nothing
    let outcome = bot.send(reaction_added(MESSAGE, USER, fire())).await.unwrap();
    assert_eq!(outcome, Outcome::Ignored(IgnoreReason::NotTracked));
    assert!(bot.gateway.role_changes().is_empty());
}

#[tokio::test]
async fn test_clearing_one_of_two_bindings_keeps_message() {
    let bot = bound_bot().await;
    bot.send(add_reaction_command(MESSAGE, &water(), OTHER_ROLE))
        .await
        .unwrap();

    let outcome = bot.send(cleared(MESSAGE, fire())).await.unwrap();

    assert!(matches!(outcome, Outcome::Unbound { exhausted: false, .. }));
    let (_, bindings) = bot.store.find_by_message(MESSAGE).expect("still tracked");
    assert_eq!(bindings, vec![binding(WATER, OTHER_ROLE)]);
    bot.assert_consistent();
}

#[tokio::test]
async fn test_startup_loads_every_tracked_message() {
    let store = Arc::new(InMemoryStore::new());
    store.seed(MESSAGE, CHANNEL, GUILD, &[binding(FIRE, ROLE)]);
    store.seed(
        OTHER_MESSAGE,
        CHANNEL,
        GUILD,
        &[binding(FIRE, ROLE), binding(WATER, OTHER_ROLE)],
    );

    let bot = TestBot::with_store(store);
    let report = bot.start().await.unwrap();

    assert_eq!(
        report,
        LoadReport {
            loaded: 2,
            bindings: 3,
            discarded_empty: 0,
            duplicate_bindings: 0,
        }
    );
    assert_eq!(bot.cached().len(), 2);
    bot.assert_consistent();

    let outcome = bot
        .send(reaction_added(OTHER_MESSAGE, USER, water()))
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::RoleGranted { role_id: OTHER_ROLE });
}

#[tokio::test]
async fn test_startup_discards_empty_and_duplicate_rows() {
    let store = Arc::new(InMemoryStore::new());
    store.seed(MESSAGE, CHANNEL, GUILD, &[]);
    store.seed(
        OTHER_MESSAGE,
        CHANNEL,
        GUILD,
        &[binding(FIRE, ROLE), binding(FIRE, OTHER_ROLE)],
    );

    let bot = TestBot::with_store(store.clone());
    let report = bot.start().await.unwrap();

    assert_eq!(report.loaded, 1);
    assert_eq!(report.discarded_empty, 1);
    assert_eq!(report.duplicate_bindings, 1);
    assert!(store.find_by_message(MESSAGE).is_none());

    let cached = bot
        .engine
        .context()
        .cache()
        .find_by_message(GUILD, OTHER_MESSAGE)
        .unwrap();
    assert_eq!(cached.bindings(), &[binding(FIRE, ROLE)]);
}

#[tokio::test]
async fn test_failed_startup_load_is_an_error() {
    let store = Arc::new(InMemoryStore::new());
    store.seed(MESSAGE, CHANNEL, GUILD, &[binding(FIRE, ROLE)]);
    store.fail_next(StoreOp::ListBindings);

    let bot = TestBot::with_store(store);
    let err = bot.start().await.unwrap_err();

    assert!(err.is_store());
    assert!(bot.cached().is_empty());
}
