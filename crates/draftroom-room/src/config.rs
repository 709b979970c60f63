//! Room layer configuration.

use serde::{Deserialize, Serialize};

/// Tuning knobs for the room layer.
///
/// The defaults suit a handful of rooms with a few browsers each; nothing
/// here changes semantics, only buffering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Capacity of each room actor's command channel. When full, callers
    /// wait (bounded channel).
    pub command_buffer: usize,

    /// Capacity of each connection's outbound queue. When full, new
    /// broadcasts to that connection are dropped until it catches up.
    pub outbound_buffer: usize,

    /// How many random room codes to try before giving up on creation.
    pub code_attempts: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            command_buffer: 64,
            outbound_buffer: 32,
            code_attempts: 16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_config_default() {
        let config = RoomConfig::default();
        assert_eq!(config.command_buffer, 64);
        assert_eq!(config.outbound_buffer, 32);
        assert_eq!(config.code_attempts, 16);
    }
}
