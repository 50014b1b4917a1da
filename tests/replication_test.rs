//! Tests for mirroring the session document through a channel.

use crossword_arena::{ArenaClient, ArenaConfig, ChannelEvent, MemoryChannel, ReplicationChannel};
use crossword_arena_core::{Status, Turn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::time::Duration;

async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

fn client(config: &ArenaConfig, seed: u64) -> ArenaClient {
    ArenaClient::with_rng(config, StdRng::seed_from_u64(seed))
}

#[tokio::test(start_paused = true)]
async fn first_subscribe_seeds_absent_document() {
    let config = ArenaConfig::default();
    let channel = MemoryChannel::new();
    assert!(channel.document(config.document_key()).is_none());

    let client = client(&config, 1);
    client.attach(Arc::new(channel.clone())).await.expect("attach");
    settle().await;

    assert!(client.is_connected());
    assert_eq!(
        channel.document(config.document_key()),
        Some(client.current_state())
    );
}

#[tokio::test(start_paused = true)]
async fn local_commands_are_pushed() {
    let config = ArenaConfig::default();
    let channel = MemoryChannel::new();
    let client = client(&config, 2);
    client.attach(Arc::new(channel.clone())).await.expect("attach");
    settle().await;

    client.start();
    client.click_cell(8, 7);
    client.input_char('n');
    settle().await;

    let remote = channel.document(config.document_key()).expect("document");
    assert_eq!(remote.status, Status::Playing);
    assert_eq!(remote, client.current_state());
}

#[tokio::test(start_paused = true)]
async fn remote_snapshot_replaces_local_state() {
    let config = ArenaConfig::default();
    let channel = MemoryChannel::new();

    let player = client(&config, 3);
    player.attach(Arc::new(channel.clone())).await.expect("attach");
    settle().await;

    let viewer = client(&config.clone().without_ai(), 4);
    viewer.attach(Arc::new(channel.clone())).await.expect("attach");
    settle().await;
    assert_eq!(viewer.current_state(), player.current_state());

    player.start();
    for (i, c) in "NODE".chars().enumerate() {
        player.click_cell(8, 7 + i);
        player.input_char(c);
    }
    settle().await;

    let seen = viewer.current_state();
    assert_eq!(seen, player.current_state());
    assert_eq!(seen.turn, Turn::Ai);
    assert_eq!(seen.human_score, 40);
    assert!(!viewer.ai_pending());

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(viewer.current_state().turn, Turn::Human);
    assert_eq!(viewer.current_state().words_solved.ai.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_write_marks_disconnected() {
    let config = ArenaConfig::default();
    let channel = MemoryChannel::new();
    let client = client(&config, 5);
    client.attach(Arc::new(channel.clone())).await.expect("attach");
    settle().await;
    let seeded = channel.document(config.document_key());

    channel.set_offline(true);
    client.start();
    settle().await;
    assert!(!client.is_connected());

    // No retry once disconnected, even after the channel recovers.
    channel.set_offline(false);
    client.click_cell(8, 7);
    client.input_char('n');
    settle().await;
    assert_eq!(channel.document(config.document_key()), seeded);
    assert_eq!(client.current_state().status, Status::Playing);
}

#[tokio::test(start_paused = true)]
async fn memory_subscription_reports_absence_then_writes() {
    let channel = MemoryChannel::new();
    let mut subscription = channel.subscribe("doc").await.expect("subscribe");
    assert!(matches!(subscription.next().await, Some(ChannelEvent::Snapshot(None))));

    let state = client(&ArenaConfig::default(), 6).current_state();
    channel.write("doc", &state).await.expect("write");
    match subscription.next().await {
        Some(ChannelEvent::Snapshot(Some(remote))) => assert_eq!(remote, state),
        other => panic!("expected snapshot, got {other:?}"),
    }
}
