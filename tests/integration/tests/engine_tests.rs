//! Reconciliation engine tests: idempotence, failure handling, commands
//!
//! Run with: cargo test -p integration-tests --test engine_tests

use std::sync::Arc;

use futures::future::join_all;
use integration_tests::*;
use reactrole_core::{Emote, MessageRef, Snowflake};
use reactrole_service::{EngineSettings, IgnoreReason, Outcome};

async fn bot_with_fire_bound() -> TestBot {
    let store = Arc::new(InMemoryStore::new());
    store.seed(MESSAGE, CHANNEL, GUILD, &[binding(FIRE, ROLE)]);
    TestBot::started(store).await
}

fn deleted_messages(bot: &TestBot) -> usize {
    bot.gateway
        .calls()
        .iter()
        .filter(|call| matches!(call, GatewayCall::DeleteMessage(_)))
        .count()
}

// === Role sync ===

#[tokio::test]
async fn test_reaction_added_when_role_held_grants_nothing() {
    let bot = bot_with_fire_bound().await;
    bot.gateway.give_role(GUILD, USER, ROLE);

    let outcome = bot.send(reaction_added(MESSAGE, USER, fire())).await.unwrap();

    assert_eq!(outcome, Outcome::Ignored(IgnoreReason::AlreadyHasRole));
    assert!(bot.gateway.role_changes().is_empty());
}

#[tokio::test]
async fn test_repeated_reaction_grants_once() {
    let bot = bot_with_fire_bound().await;

    bot.send(reaction_added(MESSAGE, USER, fire())).await.unwrap();
    let second = bot.send(reaction_added(MESSAGE, USER, fire())).await.unwrap();

    assert_eq!(second, Outcome::Ignored(IgnoreReason::AlreadyHasRole));
    assert_eq!(bot.gateway.role_changes().len(), 1);
}

#[tokio::test]
async fn test_reaction_removed_without_role_revokes_nothing() {
    let bot = bot_with_fire_bound().await;

    let outcome = bot
        .send(reaction_removed(MESSAGE, USER, fire()))
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Ignored(IgnoreReason::DoesNotHaveRole));
    assert!(bot.gateway.role_changes().is_empty());
}

#[tokio::test]
async fn test_own_reaction_added_is_ignored() {
    let bot = bot_with_fire_bound().await;

    let outcome = bot.send(reaction_added(MESSAGE, BOT, fire())).await.unwrap();

    assert_eq!(outcome, Outcome::Ignored(IgnoreReason::OwnReaction));
    assert!(bot.gateway.calls().is_empty());
}

#[tokio::test]
async fn test_unbound_emotes_are_ignored() {
    let bot = bot_with_fire_bound().await;

    let custom = bot.send(reaction_added(MESSAGE, USER, water())).await.unwrap();
    let unicode = bot
        .send(reaction_added(MESSAGE, USER, Emote::unicode("🔥")))
        .await
        .unwrap();
    let own_unbound = bot
        .send(reaction_removed(MESSAGE, BOT, water()))
        .await
        .unwrap();

    assert_eq!(custom, Outcome::Ignored(IgnoreReason::EmoteNotBound));
    assert_eq!(unicode, Outcome::Ignored(IgnoreReason::EmoteNotBound));
    assert_eq!(own_unbound, Outcome::Ignored(IgnoreReason::EmoteNotBound));
    assert!(bot.gateway.calls().is_empty());
}

#[tokio::test]
async fn test_platform_failure_drops_event() {
    let bot = bot_with_fire_bound().await;
    bot.gateway.set_failing(true);

    let err = bot
        .send(reaction_added(MESSAGE, USER, fire()))
        .await
        .unwrap_err();

    assert!(err.is_platform());
    assert!(!bot.gateway.has_role(GUILD, USER, ROLE));
    bot.assert_consistent();
}

// === Clearing ===

#[tokio::test]
async fn test_second_clear_is_a_no_op() {
    let bot = bot_with_fire_bound().await;

    bot.send(cleared(MESSAGE, fire())).await.unwrap();
    let second = bot.send(cleared(MESSAGE, fire())).await.unwrap();

    assert_eq!(second, Outcome::Ignored(IgnoreReason::NotTracked));
    assert_eq!(bot.store.tracked_count(), 0);
    bot.assert_consistent();
}

#[tokio::test]
async fn test_clear_of_unbound_emote_keeps_mapping() {
    let bot = bot_with_fire_bound().await;

    let custom = bot.send(cleared(MESSAGE, water())).await.unwrap();
    let unicode = bot
        .send(cleared(MESSAGE, Emote::unicode("🔥")))
        .await
        .unwrap();

    assert_eq!(custom, Outcome::Ignored(IgnoreReason::EmoteNotBound));
    assert_eq!(unicode, Outcome::Ignored(IgnoreReason::EmoteNotBound));
    assert_eq!(bot.cached().len(), 1);
    bot.assert_consistent();
}

#[tokio::test]
async fn test_store_failure_on_clear_leaves_cache_unchanged() {
    let bot = bot_with_fire_bound().await;
    bot.store.fail_next(StoreOp::RemoveBinding);

    let err = bot.send(cleared(MESSAGE, fire())).await.unwrap_err();

    assert!(err.is_store());
    let cached = bot
        .engine
        .context()
        .cache()
        .find_by_message(GUILD, MESSAGE)
        .expect("still cached");
    assert_eq!(cached.bindings(), &[binding(FIRE, ROLE)]);
    bot.assert_consistent();
}

#[tokio::test]
async fn test_failed_teardown_leaves_mapping_intact() {
    let bot = bot_with_fire_bound().await;
    bot.store.fail_next(StoreOp::DeleteTrackedMessage);

    let err = bot.send(cleared(MESSAGE, fire())).await.unwrap_err();

    assert!(err.is_store());
    assert_eq!(
        bot.store.find_by_message(MESSAGE).unwrap().1,
        vec![binding(FIRE, ROLE)]
    );
    assert_eq!(bot.cached()[0].bindings(), &[binding(FIRE, ROLE)]);
    bot.assert_consistent();

    // A later clear finishes the teardown
    let outcome = bot.send(cleared(MESSAGE, fire())).await.unwrap();
    assert!(matches!(outcome, Outcome::Unbound { exhausted: true, .. }));
    assert_eq!(bot.store.tracked_count(), 0);
    bot.assert_consistent();
}

// === Binding ===

#[tokio::test]
async fn test_store_failure_on_bind_leaves_cache_unchanged() {
    let bot = bot_with_fire_bound().await;
    bot.store.fail_next(StoreOp::AddBinding);

    let err = bot
        .send(add_reaction_command(MESSAGE, &water(), OTHER_ROLE))
        .await
        .unwrap_err();

    assert!(err.is_store());
    let cached = bot
        .engine
        .context()
        .cache()
        .find_by_message(GUILD, MESSAGE)
        .unwrap();
    assert_eq!(cached.bindings(), &[binding(FIRE, ROLE)]);
    assert_eq!(deleted_messages(&bot), 0);
    bot.assert_consistent();
}

#[tokio::test]
async fn test_failed_first_binding_leaves_nothing_tracked() {
    let bot = TestBot::started(Arc::new(InMemoryStore::new())).await;
    bot.store.fail_next(StoreOp::AddBinding);

    let err = bot
        .send(add_reaction_command(MESSAGE, &fire(), ROLE))
        .await
        .unwrap_err();

    assert!(err.is_store());
    assert_eq!(bot.store.tracked_count(), 0);
    assert!(bot.cached().is_empty());
}

#[tokio::test]
async fn test_duplicate_bind_is_rejected_with_reply() {
    let bot = bot_with_fire_bound().await;

    let outcome = bot
        .send(add_reaction_command(MESSAGE, &fire(), OTHER_ROLE))
        .await
        .unwrap();

    assert!(matches!(outcome, Outcome::Rejected(_)));
    let replies = bot.gateway.replies();
    assert_eq!(replies.len(), 1);
    assert!(replies[0].contains("addReaction"));
    assert_eq!(deleted_messages(&bot), 0);
    assert_eq!(
        bot.store.find_by_message(MESSAGE).unwrap().1,
        vec![binding(FIRE, ROLE)]
    );
    bot.assert_consistent();
}

#[tokio::test]
async fn test_unicode_emote_is_rejected_and_command_kept() {
    let bot = TestBot::started(Arc::new(InMemoryStore::new())).await;

    let outcome = bot
        .send(command("?addReaction 🔥 <@&222>", Some(MESSAGE)))
        .await
        .unwrap();

    assert!(matches!(outcome, Outcome::Rejected(_)));
    assert_eq!(bot.gateway.replies().len(), 1);
    assert_eq!(deleted_messages(&bot), 0);
    assert_eq!(bot.store.tracked_count(), 0);
}

#[tokio::test]
async fn test_bad_role_and_missing_arguments_are_rejected() {
    let bot = TestBot::started(Arc::new(InMemoryStore::new())).await;

    for content in [
        "?addReaction <:fire:111> everyone",
        "?addReaction <:fire:111>",
        "?addReaction",
        "?removeReaction",
    ] {
        let outcome = bot.send(command(content, Some(MESSAGE))).await.unwrap();
        assert!(matches!(outcome, Outcome::Rejected(_)), "{content}");
    }

    assert_eq!(bot.gateway.replies().len(), 4);
    assert_eq!(deleted_messages(&bot), 0);
    assert_eq!(bot.store.tracked_count(), 0);
}

#[tokio::test]
async fn test_command_must_be_a_reply() {
    let bot = TestBot::started(Arc::new(InMemoryStore::new())).await;

    let outcome = bot
        .send(command("?addReaction <:fire:111> <@&222>", None))
        .await
        .unwrap();

    assert!(matches!(outcome, Outcome::Rejected(_)));
    assert_eq!(bot.gateway.replies().len(), 1);
    assert_eq!(bot.store.tracked_count(), 0);
}

#[tokio::test]
async fn test_non_commands_are_ignored() {
    let bot = TestBot::started(Arc::new(InMemoryStore::new())).await;

    let chat = bot.send(command("hello there", Some(MESSAGE))).await.unwrap();
    let unknown = bot.send(command("?help", Some(MESSAGE))).await.unwrap();

    assert_eq!(chat, Outcome::Ignored(IgnoreReason::NotACommand));
    assert_eq!(unknown, Outcome::Ignored(IgnoreReason::NotACommand));
    assert!(bot.gateway.calls().is_empty());
}

#[tokio::test]
async fn test_bot_authors_are_ignored() {
    let bot = TestBot::started(Arc::new(InMemoryStore::new())).await;
    let mut message = command_message("?addReaction <:fire:111> <@&222>", Some(MESSAGE));
    message.author_is_bot = true;

    let outcome = bot
        .send(reactrole_core::ReactionRoleEvent::CommandMessage(message))
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Ignored(IgnoreReason::BotAuthor));
    assert_eq!(bot.store.tracked_count(), 0);
}

#[tokio::test]
async fn test_command_role_gate() {
    let settings = EngineSettings {
        command_role_ids: vec![MODERATOR_ROLE],
        ..Default::default()
    };
    let bot = TestBot::with_settings(Arc::new(InMemoryStore::new()), settings);
    bot.start().await.unwrap();

    // No reply for outsiders, even when the command is malformed
    let outsider = bot
        .send(add_reaction_command(MESSAGE, &fire(), ROLE))
        .await
        .unwrap();
    let malformed = bot.send(command("?addReaction", Some(MESSAGE))).await.unwrap();
    assert_eq!(outsider, Outcome::Ignored(IgnoreReason::Unauthorized));
    assert_eq!(malformed, Outcome::Ignored(IgnoreReason::Unauthorized));
    assert!(bot.gateway.calls().is_empty());

    let mut message = command_message("?addReaction <:fire:111> <@&222>", Some(MESSAGE));
    message.author_role_ids = vec![Snowflake::new(1), MODERATOR_ROLE];
    let outcome = bot
        .send(reactrole_core::ReactionRoleEvent::CommandMessage(message))
        .await
        .unwrap();

    assert!(matches!(outcome, Outcome::Bound { created: true, .. }));
    bot.assert_consistent();
}

#[tokio::test]
async fn test_concurrent_binds_on_one_message() {
    let bot = TestBot::started(Arc::new(InMemoryStore::new())).await;

    let binds = (0..8).map(|i| {
        let engine = bot.engine.clone();
        let emote = Emote::custom(Snowflake::new(300 + i), format!("e{i}"), false);
        let event = add_reaction_command(MESSAGE, &emote, ROLE);
        async move { engine.handle_event(event).await }
    });
    let outcomes = join_all(binds).await;

    let created = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, Ok(Outcome::Bound { created: true, .. })))
        .count();
    assert_eq!(created, 1);
    assert!(outcomes.iter().all(Result::is_ok));
    assert_eq!(bot.store.tracked_count(), 1);
    assert_eq!(bot.cached()[0].bindings().len(), 8);
    bot.assert_consistent();
}

// === removeReaction ===

#[tokio::test]
async fn test_remove_reaction_clears_then_unbinds() {
    let bot = bot_with_fire_bound().await;

    let outcome = bot
        .send(remove_reaction_command(MESSAGE, &fire()))
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::ClearRequested);
    assert!(bot
        .gateway
        .calls()
        .contains(&GatewayCall::RemoveAllReactionsForEmote {
            message: MessageRef::new(CHANNEL, MESSAGE),
            emote_id: Some(FIRE),
        }));
    assert_eq!(deleted_messages(&bot), 1);
    // Still bound until the platform reports the clear
    assert_eq!(bot.store.tracked_count(), 1);

    let outcome = bot.send(cleared(MESSAGE, fire())).await.unwrap();
    assert!(matches!(outcome, Outcome::Unbound { exhausted: true, .. }));
    assert_eq!(bot.store.tracked_count(), 0);
    bot.assert_consistent();
}

#[tokio::test]
async fn test_remove_reaction_for_unbound_emote_is_rejected() {
    let bot = bot_with_fire_bound().await;

    let outcome = bot
        .send(remove_reaction_command(MESSAGE, &water()))
        .await
        .unwrap();

    assert!(matches!(outcome, Outcome::Rejected(_)));
    assert_eq!(bot.gateway.replies().len(), 1);
    assert!(!bot
        .gateway
        .calls()
        .iter()
        .any(|call| matches!(call, GatewayCall::RemoveAllReactionsForEmote { .. })));
}

// === Store and cache divergence ===

#[tokio::test]
async fn test_store_only_message_is_reloaded_on_bind() {
    let bot = TestBot::started(Arc::new(InMemoryStore::new())).await;
    // Written behind the engine's back
    bot.store.seed(MESSAGE, CHANNEL, GUILD, &[binding(FIRE, ROLE)]);

    let outcome = bot
        .send(add_reaction_command(MESSAGE, &water(), OTHER_ROLE))
        .await
        .unwrap();

    assert!(matches!(outcome, Outcome::Bound { created: false, .. }));
    assert_eq!(bot.store.tracked_count(), 1);
    assert_eq!(bot.cached()[0].bindings().len(), 2);
    bot.assert_consistent();
}

#[tokio::test]
async fn test_store_only_message_is_reloaded_on_clear() {
    let bot = TestBot::started(Arc::new(InMemoryStore::new())).await;
    bot.store.seed(MESSAGE, CHANNEL, GUILD, &[binding(FIRE, ROLE)]);

    let outcome = bot.send(cleared(MESSAGE, fire())).await.unwrap();

    assert!(matches!(outcome, Outcome::Unbound { exhausted: true, .. }));
    assert_eq!(bot.store.tracked_count(), 0);
    bot.assert_consistent();
}

#[tokio::test]
async fn test_cache_only_message_is_evicted() {
    let bot = bot_with_fire_bound().await;
    let id = bot.cached()[0].id;
    bot.store.forget(id);

    let result = bot
        .send(add_reaction_command(MESSAGE, &water(), OTHER_ROLE))
        .await;

    assert!(result.is_err());
    assert!(bot.cached().is_empty());
    bot.assert_consistent();
}
