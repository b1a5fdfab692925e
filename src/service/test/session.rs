use test_utils::builder::TestBuilder;
use test_utils::context::TestContext;

use super::fake::{FakeTransport, TransportCall};
use crate::error::transport::TransportError;
use crate::service::alert::{AlertCommand, AlertHandle};
use crate::service::voice::audio::AudioResourceBuilder;
use crate::service::voice::session::{PlaybackSessionManager, SessionTarget};
use crate::service::voice::transport::PlaybackOutcome;

const GUILD: u64 = 1;
const CHANNEL_A: u64 = 10;
const CHANNEL_B: u64 = 20;

fn target(channel_id: u64) -> SessionTarget {
    SessionTarget {
        guild_id: GUILD,
        channel_id,
    }
}

fn setup(
    transport: FakeTransport,
) -> (
    TestContext,
    PlaybackSessionManager<FakeTransport>,
    tokio::sync::mpsc::UnboundedReceiver<AlertCommand>,
) {
    let test = TestBuilder::new()
        .with_file("alert.mp3", "")
        .build()
        .unwrap();
    let (alerts, receiver) = AlertHandle::channel();
    let manager = PlaybackSessionManager::new(transport, AudioResourceBuilder::new(0.8), alerts);
    (test, manager, receiver)
}

/// Tests starting a session with nothing active.
///
/// Expected: Ok with connect then play issued and the session active
#[tokio::test]
async fn starts_session() {
    let transport = FakeTransport::default();
    let (test, mut manager, _receiver) = setup(transport.clone());
    let clip = test.path("alert.mp3");

    let id = manager.start_session(target(CHANNEL_A), &clip).await.unwrap();

    assert_eq!(manager.active(), Some((id, target(CHANNEL_A))));
    assert_eq!(
        transport.calls(),
        vec![
            TransportCall::Connect {
                guild_id: GUILD,
                channel_id: CHANNEL_A
            },
            TransportCall::Play {
                guild_id: GUILD,
                clip: clip.clone()
            },
        ]
    );
}

/// Tests that starting a new session tears down the previous one first.
///
/// Expected: Stop and disconnect of the old session precede the new connect, and at most
/// one connection is ever open
#[tokio::test]
async fn replaces_active_session() {
    let transport = FakeTransport::default();
    let (test, mut manager, _receiver) = setup(transport.clone());
    let clip = test.path("alert.mp3");

    let first = manager.start_session(target(CHANNEL_A), &clip).await.unwrap();
    transport.clear_calls();
    let second = manager.start_session(target(CHANNEL_B), &clip).await.unwrap();

    assert_ne!(first, second);
    assert_eq!(manager.active(), Some((second, target(CHANNEL_B))));
    assert_eq!(
        &transport.calls()[..3],
        &[
            TransportCall::Stop { guild_id: GUILD },
            TransportCall::Disconnect { guild_id: GUILD },
            TransportCall::Connect {
                guild_id: GUILD,
                channel_id: CHANNEL_B
            },
        ]
    );
    assert_eq!(transport.max_connected(), 1);
}

/// Tests a failed connection attempt.
///
/// Expected: Err(Join), the half-open connection destroyed and no session active
#[tokio::test]
async fn connect_failure_leaves_no_session() {
    let transport = FakeTransport::failing_connect();
    let (test, mut manager, _receiver) = setup(transport.clone());

    let result = manager
        .start_session(target(CHANNEL_A), &test.path("alert.mp3"))
        .await;

    assert!(matches!(result, Err(TransportError::Join { .. })));
    assert_eq!(manager.active(), None);
    assert_eq!(
        transport.count(|c| matches!(c, TransportCall::Disconnect { .. })),
        1
    );
    assert_eq!(transport.count(|c| matches!(c, TransportCall::Play { .. })), 0);
}

/// Tests a clip that does not exist.
///
/// Expected: Err(Resource), connection destroyed, nothing played
#[tokio::test]
async fn missing_clip_leaves_no_session() {
    let transport = FakeTransport::default();
    let (test, mut manager, _receiver) = setup(transport.clone());

    let result = manager
        .start_session(target(CHANNEL_A), &test.path("missing.mp3"))
        .await;

    assert!(matches!(result, Err(TransportError::Resource { .. })));
    assert_eq!(manager.active(), None);
    assert_eq!(transport.connected(), 0);
    assert_eq!(transport.count(|c| matches!(c, TransportCall::Play { .. })), 0);
}

/// Tests a player that rejects the track.
///
/// Expected: Err(Play) and the connection destroyed
#[tokio::test]
async fn play_failure_leaves_no_session() {
    let transport = FakeTransport::failing_play();
    let (test, mut manager, _receiver) = setup(transport.clone());

    let result = manager
        .start_session(target(CHANNEL_A), &test.path("alert.mp3"))
        .await;

    assert!(matches!(result, Err(TransportError::Play(_))));
    assert_eq!(manager.active(), None);
    assert_eq!(transport.connected(), 0);
}

/// Tests that stopping is idempotent.
///
/// Expected: First stop tears down, second is a no-op with no transport calls
#[tokio::test]
async fn stop_session_is_idempotent() {
    let transport = FakeTransport::default();
    let (test, mut manager, _receiver) = setup(transport.clone());
    manager
        .start_session(target(CHANNEL_A), &test.path("alert.mp3"))
        .await
        .unwrap();

    assert!(manager.stop_session().await);
    transport.clear_calls();

    assert!(!manager.stop_session().await);
    assert!(transport.calls().is_empty());
    assert_eq!(manager.active(), None);
}

/// Tests the player reaching the end of the clip.
///
/// Expected: Session torn down without any presence event
#[tokio::test]
async fn natural_end_tears_down() {
    let transport = FakeTransport::default();
    let (test, mut manager, _receiver) = setup(transport.clone());
    let id = manager
        .start_session(target(CHANNEL_A), &test.path("alert.mp3"))
        .await
        .unwrap();

    assert!(manager.on_playback_ended(id, PlaybackOutcome::Finished).await);
    assert_eq!(manager.active(), None);
    assert_eq!(transport.connected(), 0);
}

/// Tests a player error mid-stream.
///
/// Expected: Session torn down like a natural end
#[tokio::test]
async fn player_error_tears_down() {
    let transport = FakeTransport::default();
    let (test, mut manager, _receiver) = setup(transport.clone());
    let id = manager
        .start_session(target(CHANNEL_A), &test.path("alert.mp3"))
        .await
        .unwrap();

    let outcome = PlaybackOutcome::Errored("decoder failed".to_string());
    assert!(manager.on_playback_ended(id, outcome).await);
    assert_eq!(manager.active(), None);
}

/// Tests an outcome reported for a session that has since been replaced.
///
/// Expected: Ignored, the newer session stays active
#[tokio::test]
async fn stale_outcome_is_ignored() {
    let transport = FakeTransport::default();
    let (test, mut manager, _receiver) = setup(transport.clone());
    let clip = test.path("alert.mp3");
    let first = manager.start_session(target(CHANNEL_A), &clip).await.unwrap();
    let second = manager.start_session(target(CHANNEL_B), &clip).await.unwrap();

    assert!(!manager.on_playback_ended(first, PlaybackOutcome::Finished).await);
    assert_eq!(manager.active(), Some((second, target(CHANNEL_B))));
}

/// Tests that the observer handed to the transport reports into the event loop channel.
///
/// Expected: PlaybackEnded tagged with the session id
#[tokio::test]
async fn observer_reports_to_event_loop() {
    let transport = FakeTransport::default();
    let (test, mut manager, mut receiver) = setup(transport.clone());
    let id = manager
        .start_session(target(CHANNEL_A), &test.path("alert.mp3"))
        .await
        .unwrap();

    transport.observer(0).finished();

    assert_eq!(
        receiver.recv().await,
        Some(AlertCommand::PlaybackEnded {
            session: id,
            outcome: PlaybackOutcome::Finished,
        })
    );
}
