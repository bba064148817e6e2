use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use futures_util::stream;
use serenwalk::{
    monitor::{AlertDispatcher, EventKind, EventSink, GeofenceMonitor, LogAlerts, ZoneEvent},
    session::{NavigationSession, PositionError, PositionSample, SessionStatus},
    shared::geo::{Coordinate, Distance, EARTH_RADIUS},
    zones::{Category, Zone, ZoneRegistry},
};
use tokio::sync::mpsc;

const CENTER: (f64, f64) = (14.6727, 121.0497);

#[derive(Default)]
struct Collected(Mutex<Vec<ZoneEvent>>);

impl EventSink for Collected {
    fn send(&self, event: &ZoneEvent) {
        self.0.lock().unwrap().push(event.clone());
    }
}

impl Collected {
    fn kinds(&self) -> Vec<EventKind> {
        self.0.lock().unwrap().iter().map(|event| event.kind).collect()
    }
}

fn session(sink: Arc<Collected>) -> NavigationSession {
    let zone = Zone::new(
        "danger1",
        "Dark alley",
        Coordinate::from(CENTER),
        Distance::from_meters(300.0),
        Category::Danger,
    )
    .unwrap();
    let registry = Arc::new(ZoneRegistry::new(vec![zone]).unwrap());
    let dispatcher =
        AlertDispatcher::new(Arc::new(LogAlerts), Arc::new(LogAlerts)).with_sink(sink);
    NavigationSession::new(GeofenceMonitor::new(registry), dispatcher)
}

fn at(meters: f64) -> Result<PositionSample, PositionError> {
    let center = Coordinate::from(CENTER);
    Ok(PositionSample::new(Coordinate {
        latitude: center.latitude + (meters / EARTH_RADIUS.as_meters()).to_degrees(),
        longitude: center.longitude,
    }))
}

fn channel_stream(
    rx: mpsc::UnboundedReceiver<Result<PositionSample, PositionError>>,
) -> impl futures_util::Stream<Item = Result<PositionSample, PositionError>> {
    stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|item| (item, rx)) })
}

async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_millis(20)).await;
}

#[tokio::test(start_paused = true)]
async fn processes_samples_in_order() {
    let sink = Arc::new(Collected::default());
    let samples = vec![at(500.0), at(250.0), at(250.0), at(400.0), at(100.0)];
    let handle = session(sink.clone()).spawn(stream::iter(samples));

    let mut status = handle.status();
    while status != SessionStatus::Stopped {
        settle().await;
        status = handle.status();
    }
    let monitor = handle.stop().await.unwrap();

    assert_eq!(
        sink.kinds(),
        vec![EventKind::Enter, EventKind::Exit, EventKind::Enter]
    );
    assert_eq!(monitor.is_inside("danger1"), Some(true));
}

#[tokio::test(start_paused = true)]
async fn snapshot_tracks_latest_sample() {
    let sink = Arc::new(Collected::default());
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = session(sink).spawn(channel_stream(rx));
    assert!(handle.snapshot().is_empty());

    tx.send(at(0.0)).unwrap();
    settle().await;
    assert_eq!(handle.snapshot().get("danger1"), Some(true));

    tx.send(at(1000.0)).unwrap();
    settle().await;
    assert_eq!(handle.snapshot().get("danger1"), Some(false));

    handle.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn permission_denied_is_reported_without_events() {
    let sink = Arc::new(Collected::default());
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = session(sink.clone()).spawn(channel_stream(rx));

    tx.send(Err(PositionError::PermissionDenied)).unwrap();
    settle().await;
    assert_eq!(handle.status(), SessionStatus::PermissionDenied);
    assert!(sink.kinds().is_empty());
    assert!(handle.snapshot().is_empty());
    assert!(!handle.is_finished());

    // Permission granted later
    tx.send(at(0.0)).unwrap();
    settle().await;
    assert_eq!(handle.status(), SessionStatus::Tracking);
    assert_eq!(sink.kinds(), vec![EventKind::Enter]);

    handle.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn no_events_after_stop() {
    let sink = Arc::new(Collected::default());
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = session(sink.clone()).spawn(channel_stream(rx));

    tx.send(at(500.0)).unwrap();
    settle().await;
    let monitor = handle.stop().await.unwrap();
    assert!(monitor.is_stopped());

    // Delivered after stop: the receiver is gone or never polled again.
    let _ = tx.send(at(0.0));
    let _ = tx.send(at(1000.0));
    settle().await;

    assert!(sink.kinds().is_empty());
    assert_eq!(monitor.is_inside("danger1"), Some(false));
}

#[tokio::test(start_paused = true)]
async fn queued_samples_are_dropped_on_stop() {
    let sink = Arc::new(Collected::default());
    let (tx, rx) = mpsc::unbounded_channel();
    // Queue before the session task ever runs.
    tx.send(at(0.0)).unwrap();
    tx.send(at(1000.0)).unwrap();
    let handle = session(sink.clone()).spawn(channel_stream(rx));
    let monitor = handle.stop().await.unwrap();

    assert!(sink.kinds().is_empty());
    assert!(monitor.snapshot().is_empty());
}

#[tokio::test(start_paused = true)]
async fn source_end_stops_session() {
    let sink = Arc::new(Collected::default());
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = session(sink).spawn(channel_stream(rx));
    tx.send(Err(PositionError::Unavailable("gps off".into())))
        .unwrap();
    settle().await;
    assert_eq!(
        handle.status(),
        SessionStatus::SourceError("gps off".into())
    );
    drop(tx);
    settle().await;
    assert_eq!(handle.status(), SessionStatus::Stopped);
    assert!(handle.is_finished());
}
