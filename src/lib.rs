pub mod config;
pub mod monitor;
pub mod provider;
pub mod route;
pub mod session;
pub mod shared;
pub mod zones;

pub mod prelude {
    pub use crate::config::Config;
    pub use crate::monitor::{
        AlertDispatcher, ContainmentState, EventKind, EventSink, GeofenceMonitor, Haptics,
        Notifier, ZoneEvent,
    };
    pub use crate::provider::{
        AutocompleteProvider, AutocompleteRequest, DirectionsProvider, DirectionsRequest,
        DirectionsResponse, GoogleMaps, Suggestion, TravelMode,
    };
    pub use crate::route::{RouteOverlay, RouteOverlayBuilder, polyline};
    pub use crate::session::{
        NavigationSession, PositionError, PositionSample, SessionHandle, SessionStatus,
    };
    pub use crate::shared::{Coordinate, Distance};
    pub use crate::zones::{Category, Severity, Zone, ZoneRegistry};
}
