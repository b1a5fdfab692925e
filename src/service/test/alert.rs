use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serenity::async_trait;
use test_utils::builder::TestBuilder;
use test_utils::context::TestContext;
use tokio::task::JoinHandle;

use super::fake::{FakeSink, FakeTransport, SinkRecord, TransportCall};
use crate::data::watch_target::WatchTargetStore;
use crate::model::presence::PresenceUpdate;
use crate::service::alert::{AlertCommand, AlertHandle, AlertService};
use crate::service::alert_log::AlertSink;
use crate::service::voice::audio::AudioResourceBuilder;
use crate::service::watch_target::{AlertClips, CommandPolicy, WatchTargetRegistry};

const GRACE: Duration = Duration::from_millis(2000);
const GUILD: u64 = 1;
const CHANNEL_A: u64 = 10;
const CHANNEL_B: u64 = 20;
const ADMIN: u64 = 754021929480093809;
const CONTROL_CHANNEL: u64 = 1390955411858919434;
const WATCHED: &str = "1111";
const SPECIAL: &str = "2222";
const UNWATCHED: &str = "3333";

struct Harness<S> {
    test: TestContext,
    transport: FakeTransport,
    sink: Arc<S>,
    registry: Arc<WatchTargetRegistry>,
    alerts: AlertHandle,
    service: JoinHandle<()>,
}

async fn start(transport: FakeTransport) -> Harness<FakeSink> {
    start_with_sink(transport, Arc::new(FakeSink::default())).await
}

async fn start_with_sink<S: AlertSink + 'static>(
    transport: FakeTransport,
    sink: Arc<S>,
) -> Harness<S> {
    let test = TestBuilder::new()
        .with_file("alert.mp3", "")
        .with_file("special.mp3", "")
        .with_file("target_user_id.txt", WATCHED)
        .build()
        .unwrap();

    let clips = AlertClips {
        default: test.path("alert.mp3"),
        special: HashMap::from([(SPECIAL.to_string(), test.path("special.mp3"))]),
    };
    let policy = CommandPolicy {
        admin_ids: HashSet::from([ADMIN]),
        command_channel_id: CONTROL_CHANNEL,
    };
    let store = WatchTargetStore::new(test.path("target_user_id.txt"));
    let registry = Arc::new(WatchTargetRegistry::load(store, policy, clips).await.unwrap());

    let (alerts, receiver) = AlertHandle::channel();
    let service = AlertService::new(
        receiver,
        alerts.clone(),
        registry.clone(),
        transport.clone(),
        AudioResourceBuilder::new(0.8),
        sink.clone(),
        GRACE,
    );

    Harness {
        test,
        transport,
        sink,
        registry,
        alerts,
        service: tokio::spawn(service.run()),
    }
}

fn update(identifier: &str, previous: Option<u64>, current: Option<u64>) -> PresenceUpdate {
    PresenceUpdate {
        identifier: identifier.to_string(),
        guild_id: GUILD,
        display_name: format!("user{}", identifier),
        previous_channel: previous,
        current_channel: current,
    }
}

/// Lets the event loop drain its queue. Time is paused, so the runtime only advances the
/// clock once every task is idle.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

/// Sink whose alert records take far longer than the grace window, like a rate-limited
/// Discord send.
#[derive(Default)]
struct SlowSink {
    alerts: AtomicUsize,
}

#[async_trait]
impl AlertSink for SlowSink {
    async fn voice_alert(&self, _update: &PresenceUpdate) {
        tokio::time::sleep(Duration::from_secs(30)).await;
        self.alerts.fetch_add(1, Ordering::SeqCst);
    }

    async fn keep_alive(&self) {}
}

fn connects(transport: &FakeTransport) -> usize {
    transport.count(|c| matches!(c, TransportCall::Connect { .. }))
}

fn disconnects(transport: &FakeTransport) -> usize {
    transport.count(|c| matches!(c, TransportCall::Disconnect { .. }))
}

/// Tests a join by a member nobody watches.
///
/// Expected: No transport calls and nothing logged
#[tokio::test(start_paused = true)]
async fn ignores_unwatched_member() {
    let h = start(FakeTransport::default()).await;

    h.alerts
        .send_presence(update(UNWATCHED, None, Some(CHANNEL_A)));
    h.alerts.send_presence(update(UNWATCHED, Some(CHANNEL_A), None));
    tokio::time::sleep(GRACE * 2).await;

    assert!(h.transport.calls().is_empty());
    assert!(h.sink.records().is_empty());
}

/// Tests the default watched member joining voice.
///
/// Expected: Connect to the channel, play the default clip and record one alert
#[tokio::test(start_paused = true)]
async fn alerts_on_watched_join() {
    let h = start(FakeTransport::default()).await;

    h.alerts.send_presence(update(WATCHED, None, Some(CHANNEL_A)));
    settle().await;

    assert_eq!(
        h.transport.calls(),
        vec![
            TransportCall::Connect {
                guild_id: GUILD,
                channel_id: CHANNEL_A
            },
            TransportCall::Play {
                guild_id: GUILD,
                clip: h.test.path("alert.mp3")
            },
        ]
    );
    assert_eq!(
        h.sink.records(),
        vec![SinkRecord::VoiceAlert {
            identifier: WATCHED.to_string(),
            channel_id: Some(CHANNEL_A),
        }]
    );
}

/// Tests a special member joining voice.
///
/// Expected: Their dedicated clip is played
#[tokio::test(start_paused = true)]
async fn plays_special_clip() {
    let h = start(FakeTransport::default()).await;

    h.alerts.send_presence(update(SPECIAL, None, Some(CHANNEL_A)));
    settle().await;

    assert!(h.transport.calls().contains(&TransportCall::Play {
        guild_id: GUILD,
        clip: h.test.path("special.mp3"),
    }));
}

/// Tests a watched member moving between channels.
///
/// Expected: Old session torn down before the new connect, never two connections, two alerts
#[tokio::test(start_paused = true)]
async fn restarts_session_on_move() {
    let h = start(FakeTransport::default()).await;

    h.alerts.send_presence(update(WATCHED, None, Some(CHANNEL_A)));
    settle().await;
    h.transport.clear_calls();

    h.alerts
        .send_presence(update(WATCHED, Some(CHANNEL_A), Some(CHANNEL_B)));
    settle().await;

    assert_eq!(
        h.transport.calls(),
        vec![
            TransportCall::Stop { guild_id: GUILD },
            TransportCall::Disconnect { guild_id: GUILD },
            TransportCall::Connect {
                guild_id: GUILD,
                channel_id: CHANNEL_B
            },
            TransportCall::Play {
                guild_id: GUILD,
                clip: h.test.path("alert.mp3")
            },
        ]
    );
    assert_eq!(h.transport.max_connected(), 1);
    assert_eq!(h.sink.records().len(), 2);
}

/// Tests a mute toggle inside the same channel.
///
/// Expected: No new session
#[tokio::test(start_paused = true)]
async fn ignores_same_channel_update() {
    let h = start(FakeTransport::default()).await;

    h.alerts.send_presence(update(WATCHED, None, Some(CHANNEL_A)));
    settle().await;
    h.alerts
        .send_presence(update(WATCHED, Some(CHANNEL_A), Some(CHANNEL_A)));
    settle().await;

    assert_eq!(connects(&h.transport), 1);
    assert_eq!(h.sink.records().len(), 1);
}

/// Tests a leave followed by silence for the whole grace window.
///
/// Expected: Connection kept during the window, exactly one teardown after it
#[tokio::test(start_paused = true)]
async fn tears_down_after_grace_window() {
    let h = start(FakeTransport::default()).await;

    h.alerts.send_presence(update(WATCHED, None, Some(CHANNEL_A)));
    settle().await;
    h.alerts.send_presence(update(WATCHED, Some(CHANNEL_A), None));
    settle().await;

    assert_eq!(h.transport.connected(), 1);
    assert_eq!(disconnects(&h.transport), 0);

    tokio::time::sleep(GRACE).await;

    assert_eq!(h.transport.connected(), 0);
    assert_eq!(disconnects(&h.transport), 1);

    tokio::time::sleep(GRACE * 2).await;
    assert_eq!(disconnects(&h.transport), 1);
}

/// Tests a leave followed by a rejoin inside the grace window.
///
/// Expected: The pending teardown is cancelled and the rejoined session survives the window
#[tokio::test(start_paused = true)]
async fn rejoin_cancels_pending_teardown() {
    let h = start(FakeTransport::default()).await;

    h.alerts.send_presence(update(WATCHED, None, Some(CHANNEL_A)));
    settle().await;
    h.alerts.send_presence(update(WATCHED, Some(CHANNEL_A), None));
    tokio::time::sleep(Duration::from_millis(500)).await;
    h.alerts.send_presence(update(WATCHED, None, Some(CHANNEL_B)));
    tokio::time::sleep(GRACE * 2).await;

    assert_eq!(h.transport.connected(), 1);
    assert_eq!(connects(&h.transport), 2);
    // Only the teardown preceding the second connect.
    assert_eq!(disconnects(&h.transport), 1);
}

/// Tests repeated leave events for the same member.
///
/// Expected: A single teardown once the last timer runs out
#[tokio::test(start_paused = true)]
async fn repeated_leaves_tear_down_once() {
    let h = start(FakeTransport::default()).await;

    h.alerts.send_presence(update(WATCHED, None, Some(CHANNEL_A)));
    settle().await;
    h.alerts.send_presence(update(WATCHED, Some(CHANNEL_A), None));
    tokio::time::sleep(Duration::from_millis(1500)).await;
    h.alerts.send_presence(update(WATCHED, Some(CHANNEL_A), None));
    tokio::time::sleep(Duration::from_millis(1000)).await;

    assert_eq!(h.transport.connected(), 1);

    tokio::time::sleep(GRACE).await;

    assert_eq!(h.transport.connected(), 0);
    assert_eq!(disconnects(&h.transport), 1);
}

/// Tests the clip ending on its own while the member is still in voice.
///
/// Expected: Session torn down
#[tokio::test(start_paused = true)]
async fn tears_down_when_clip_finishes() {
    let h = start(FakeTransport::default()).await;

    h.alerts.send_presence(update(WATCHED, None, Some(CHANNEL_A)));
    settle().await;
    h.transport.observer(0).finished();
    settle().await;

    assert_eq!(h.transport.connected(), 0);
    assert_eq!(disconnects(&h.transport), 1);
}

/// Tests a join that cannot be served because the voice connection fails.
///
/// Expected: No alert recorded and no connection left open
#[tokio::test(start_paused = true)]
async fn failed_join_records_no_alert() {
    let h = start(FakeTransport::failing_connect()).await;

    h.alerts.send_presence(update(WATCHED, None, Some(CHANNEL_A)));
    settle().await;

    assert!(h.sink.records().is_empty());
    assert_eq!(h.transport.connected(), 0);
}

/// Tests changing the default identifier while the loop runs.
///
/// Expected: The new member triggers alerts, the old one no longer does
#[tokio::test(start_paused = true)]
async fn follows_default_identifier_changes() {
    let h = start(FakeTransport::default()).await;

    h.registry
        .set_default_identifier(ADMIN, CONTROL_CHANNEL, UNWATCHED)
        .await
        .unwrap();
    h.alerts.send_presence(update(WATCHED, None, Some(CHANNEL_A)));
    settle().await;
    assert!(h.transport.calls().is_empty());

    h.alerts.send_presence(update(UNWATCHED, None, Some(CHANNEL_A)));
    settle().await;
    assert_eq!(connects(&h.transport), 1);
}

/// Tests shutting down with an active session and a pending leave.
///
/// Expected: The loop exits, the session is torn down and the timer never fires
#[tokio::test(start_paused = true)]
async fn shutdown_tears_down() {
    let h = start(FakeTransport::default()).await;

    h.alerts.send_presence(update(WATCHED, None, Some(CHANNEL_A)));
    h.alerts.send_presence(update(SPECIAL, Some(CHANNEL_B), None));
    settle().await;

    h.alerts.shutdown();
    h.service.await.unwrap();

    assert_eq!(h.transport.connected(), 0);
    assert_eq!(disconnects(&h.transport), 1);
}

/// Tests an alert sink that stalls for much longer than the grace window.
///
/// Expected: A move still reconnects right away and a leave is torn down after the grace
/// window, while both alert records complete later
#[tokio::test(start_paused = true)]
async fn slow_sink_does_not_stall_playback() {
    let h = start_with_sink(FakeTransport::default(), Arc::new(SlowSink::default())).await;

    h.alerts.send_presence(update(WATCHED, None, Some(CHANNEL_A)));
    tokio::time::sleep(Duration::from_secs(1)).await;
    h.alerts
        .send_presence(update(WATCHED, Some(CHANNEL_A), Some(CHANNEL_B)));
    settle().await;

    assert_eq!(connects(&h.transport), 2);
    assert_eq!(h.transport.connected(), 1);

    h.alerts.send_presence(update(WATCHED, Some(CHANNEL_B), None));
    tokio::time::sleep(GRACE + Duration::from_millis(100)).await;

    assert_eq!(h.transport.connected(), 0);
    assert_eq!(h.sink.alerts.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(h.sink.alerts.load(Ordering::SeqCst), 2);
}

/// Tests a leave timer whose expiry was already queued when the member rejoined.
///
/// Expected: The outdated expiry is ignored and the rejoined session stays connected
#[tokio::test(start_paused = true)]
async fn queued_expiry_after_rejoin_is_ignored() {
    let h = start(FakeTransport::default()).await;

    h.alerts.send_presence(update(WATCHED, None, Some(CHANNEL_A)));
    h.alerts.send_presence(update(WATCHED, Some(CHANNEL_A), None));
    h.alerts.send_presence(update(WATCHED, None, Some(CHANNEL_B)));
    // Generation of the leave timer cancelled by the rejoin.
    h.alerts.send(AlertCommand::LeaveElapsed {
        identifier: WATCHED.to_string(),
        generation: 1,
    });
    settle().await;

    assert_eq!(h.transport.connected(), 1);
    assert_eq!(connects(&h.transport), 2);
    assert_eq!(disconnects(&h.transport), 1);
    assert_eq!(h.sink.records().len(), 2);
}
