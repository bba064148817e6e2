use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
};

use crossbeam_queue::ArrayQueue;
use futures_util::stream;
use serenwalk::prelude::*;
use tokio::{
    sync::{RwLock, mpsc},
    time::Instant,
};

pub type PositionSender = mpsc::UnboundedSender<Result<PositionSample, PositionError>>;

pub struct AppState {
    pub config: Config,
    pub registry: Arc<ZoneRegistry>,
    pub maps: GoogleMaps,
    pub sessions: RwLock<HashMap<u64, ActiveSession>>,
    next_id: AtomicU64,
}

impl AppState {
    pub fn new(config: Config, registry: ZoneRegistry, maps: GoogleMaps) -> Self {
        Self {
            config,
            registry: Arc::new(registry),
            maps,
            sessions: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn next_session_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Removes sessions idle for longer than the configured timeout as of
    /// `now`. The caller stops them.
    pub async fn evict_idle(&self, now: Instant) -> Vec<(u64, ActiveSession)> {
        let timeout = self.config.session_idle_timeout;
        let mut sessions = self.sessions.write().await;
        let idle: Vec<u64> = sessions
            .iter()
            .filter(|(_, session)| now.saturating_duration_since(session.last_seen()) > timeout)
            .map(|(id, _)| *id)
            .collect();
        idle.into_iter()
            .filter_map(|id| sessions.remove(&id).map(|session| (id, session)))
            .collect()
    }
}

pub struct ActiveSession {
    pub handle: SessionHandle,
    pub positions: PositionSender,
    pub events: Arc<EventQueue>,
    pub routes: Arc<RouteOverlayBuilder<GoogleMaps>>,
    last_seen: Mutex<Instant>,
}

impl ActiveSession {
    /// Spawns a navigation session fed by an in-process position channel.
    pub fn start(state: &AppState) -> Self {
        let (positions, rx) = mpsc::unbounded_channel();
        let events = Arc::new(EventQueue::new(state.config.event_capacity));
        let dispatcher = AlertDispatcher::default().with_sink(events.clone());
        let monitor = GeofenceMonitor::new(state.registry.clone());
        let source = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|update| (update, rx))
        });
        let handle = NavigationSession::new(monitor, dispatcher).spawn(source);
        let routes = Arc::new(
            RouteOverlayBuilder::new(state.maps.clone())
                .with_timeout(state.config.directions_timeout),
        );
        Self {
            handle,
            positions,
            events,
            routes,
            last_seen: Mutex::new(Instant::now()),
        }
    }

    pub fn touch(&self) {
        *self.last_seen.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    pub fn last_seen(&self) -> Instant {
        *self.last_seen.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Bounded per-session event buffer. When full the oldest event is dropped.
pub struct EventQueue(ArrayQueue<ZoneEvent>);

impl EventQueue {
    pub fn new(capacity: usize) -> Self {
        Self(ArrayQueue::new(capacity.max(1)))
    }

    pub fn drain(&self) -> Vec<ZoneEvent> {
        std::iter::from_fn(|| self.0.pop()).collect()
    }
}

impl EventSink for EventQueue {
    fn send(&self, event: &ZoneEvent) {
        if let Some(dropped) = self.0.force_push(event.clone()) {
            tracing::warn!("Event queue full, dropped {} {}", dropped.kind, dropped.zone_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn state() -> AppState {
        let config = Config {
            session_idle_timeout: Duration::from_secs(60),
            ..Config::default()
        };
        AppState::new(config, ZoneRegistry::new(vec![]).unwrap(), GoogleMaps::new(""))
    }

    #[tokio::test]
    async fn idle_sessions_are_evicted() {
        let state = state();
        let session = ActiveSession::start(&state);
        let seen = session.last_seen();
        state.sessions.write().await.insert(7, session);

        assert!(state.evict_idle(seen + Duration::from_secs(30)).await.is_empty());
        assert_eq!(state.sessions.read().await.len(), 1);

        let evicted = state.evict_idle(seen + Duration::from_secs(61)).await;
        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].0, 7);
        assert!(state.sessions.read().await.is_empty());
        for (_, session) in evicted {
            session.handle.stop().await.unwrap();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn touch_keeps_session_alive() {
        let state = state();
        let session = ActiveSession::start(&state);
        let started = session.last_seen();
        tokio::time::advance(Duration::from_secs(45)).await;
        session.touch();
        state.sessions.write().await.insert(1, session);

        let later = started + Duration::from_secs(90);
        assert!(state.evict_idle(later).await.is_empty());
        assert_eq!(state.sessions.read().await.len(), 1);
    }

    #[test]
    fn full_queue_drops_oldest() {
        let queue = EventQueue::new(2);
        for (kind, zone_id) in [
            (EventKind::Enter, "a"),
            (EventKind::Exit, "a"),
            (EventKind::Enter, "b"),
        ] {
            queue.send(&ZoneEvent {
                kind,
                zone_id: zone_id.into(),
                label: "Zone".into(),
                category: Category::Safe,
                at: chrono::Utc::now(),
            });
        }
        let drained: Vec<_> = queue
            .drain()
            .iter()
            .map(|event| (event.kind, event.zone_id.to_string()))
            .collect();
        assert_eq!(
            drained,
            vec![(EventKind::Exit, "a".into()), (EventKind::Enter, "b".into())]
        );
    }
}
