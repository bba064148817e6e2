use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    monitor::{EventKind, ZoneEvent},
    zones::Category,
};

/// Device vibration.
pub trait Haptics: Send + Sync {
    fn vibrate(&self, event: &ZoneEvent);
}

/// User-visible toast or alert.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: &ZoneEvent);
}

/// Receives every containment change, e.g. for redrawing markers.
pub trait EventSink: Send + Sync {
    fn send(&self, event: &ZoneEvent);
}

/// Logs alerts instead of driving a device. Used when no device is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAlerts;

impl Haptics for LogAlerts {
    fn vibrate(&self, event: &ZoneEvent) {
        info!("Vibrate for {}", event.zone_id);
    }
}

impl Notifier for LogAlerts {
    fn notify(&self, event: &ZoneEvent) {
        match event.category {
            Category::Danger => warn!("Entered {}: {}", event.category, event.label),
            Category::Safe | Category::Police => {
                info!("Entered {}: {}", event.category, event.label)
            }
        }
    }
}

/// Fans monitor output out to the alert and rendering collaborators.
///
/// Only [`EventKind::Enter`] alerts: one vibration and one notification per
/// entry. Exits reach the sinks and nothing else.
#[derive(Clone)]
pub struct AlertDispatcher {
    haptics: Arc<dyn Haptics>,
    notifier: Arc<dyn Notifier>,
    sinks: Vec<Arc<dyn EventSink>>,
}

impl Default for AlertDispatcher {
    fn default() -> Self {
        Self::new(Arc::new(LogAlerts), Arc::new(LogAlerts))
    }
}

impl AlertDispatcher {
    pub fn new(haptics: Arc<dyn Haptics>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            haptics,
            notifier,
            sinks: Vec::new(),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn dispatch(&self, events: &[ZoneEvent]) {
        for event in events {
            if event.kind == EventKind::Enter {
                self.haptics.vibrate(event);
                self.notifier.notify(event);
            }
            self.sinks.iter().for_each(|sink| sink.send(event));
        }
    }
}
