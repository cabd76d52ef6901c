//! WebSocket Session Management

use std::time::Instant;

/// Per-connection state owned by the connection task
#[derive(Debug)]
pub struct SessionState {
    pub user_id: i64,
    pub session_id: String,
    pub sequence: u64,
    pub last_heartbeat: Instant,
}

impl SessionState {
    pub fn new(session_id: String, user_id: i64) -> Self {
        Self {
            user_id,
            session_id,
            sequence: 0,
            last_heartbeat: Instant::now(),
        }
    }

    /// Sequence numbers are per session and start at 1.
    pub fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    pub fn heartbeat(&mut self) {
        self.last_heartbeat = Instant::now();
    }

    pub fn is_alive(&self, timeout_ms: u64) -> bool {
        self.last_heartbeat.elapsed().as_millis() < timeout_ms as u128
    }
}
