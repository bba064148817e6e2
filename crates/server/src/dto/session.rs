use serde::{Deserialize, Serialize};
use serenwalk::{
    monitor::{ContainmentState, ZoneEvent},
    session::SessionStatus,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCreatedDto {
    pub id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDto {
    pub id: u64,
    pub status: SessionStatus,
    /// Ids of the zones the walker is inside, in registry order.
    pub inside: Vec<String>,
    pub containment: ContainmentState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsDto {
    pub events: Vec<ZoneEvent>,
}
