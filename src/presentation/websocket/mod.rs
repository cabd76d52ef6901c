//! WebSocket Gateway
//!
//! Real-time delivery of chat events and the client event channel.

pub mod dispatcher;
pub mod gateway;
pub mod handler;
pub mod messages;
pub mod session;

pub use dispatcher::{Dispatcher, EventHandler};
pub use gateway::{Gateway, RoutedEvent};
pub use handler::ws_handler;
pub use messages::{GatewayReceive, GatewaySend, OpCode};
pub use session::SessionState;
