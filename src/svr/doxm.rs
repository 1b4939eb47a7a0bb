use serde::Serialize;
use uuid::Uuid;

/// Device ownership transfer state, replaced wholesale on refresh.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Doxm {
    /// Supported ownership transfer methods.
    pub oxms: Vec<u16>,
    pub oxm_sel: u16,
    /// Supported credential types bitmask.
    pub sct: u16,
    pub owned: bool,
    pub device_id: Uuid,
    pub owner: Uuid,
    pub rowner: Uuid,
}
