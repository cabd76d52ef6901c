//! Client Event Dispatcher
//!
//! Routes client-sent gateway events to handler functions through an
//! explicit name → handler registry.

use std::collections::HashMap;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::Validate;

use crate::application::dto::{AddReactionPayload, JoinChannelPayload, SendMessageRequest, TypingPayload};
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

/// Handler for one client event: (state, acting user, payload)
pub type EventHandler = fn(AppState, i64, Value) -> BoxFuture<'static, Result<(), AppError>>;

/// Registry of client event handlers
#[derive(Clone, Default)]
pub struct Dispatcher {
    handlers: HashMap<&'static str, EventHandler>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every event the gateway accepts
    pub fn with_default_handlers() -> Self {
        let mut dispatcher = Self::new();
        dispatcher
            .register("send_message", |state, user_id, data| {
                send_message(state, user_id, data).boxed()
            })
            .register("add_reaction", |state, user_id, data| {
                add_reaction(state, user_id, data).boxed()
            })
            .register("typing", |state, user_id, data| typing(state, user_id, data).boxed())
            .register("join_channel", |state, user_id, data| {
                join_channel(state, user_id, data).boxed()
            });
        dispatcher
    }

    pub fn register(&mut self, event: &'static str, handler: EventHandler) -> &mut Self {
        self.handlers.insert(event, handler);
        self
    }

    pub fn handles(&self, event: &str) -> bool {
        self.handlers.contains_key(event)
    }

    /// Run the handler registered for `event`.
    pub async fn dispatch(&self, state: &AppState, user_id: i64, event: &str, data: Value) -> Result<(), AppError> {
        let handler = self
            .handlers
            .get(event)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown event '{}'", event)))?;

        handler(state.clone(), user_id, data).await
    }
}

fn payload<T: DeserializeOwned>(data: Value) -> Result<T, AppError> {
    serde_json::from_value(data).map_err(|e| AppError::BadRequest(format!("Invalid payload: {}", e)))
}

async fn send_message(state: AppState, user_id: i64, data: Value) -> Result<(), AppError> {
    let request: SendMessageRequest = payload(data)?;
    state.messages.send_message(user_id, request.into_dto()?).await?;
    Ok(())
}

async fn add_reaction(state: AppState, user_id: i64, data: Value) -> Result<(), AppError> {
    let request: AddReactionPayload = payload(data)?;
    request.validate().map_err(validation_error)?;
    state
        .reactions
        .toggle_reaction(request.message_id, user_id, &request.emoji)
        .await?;
    Ok(())
}

async fn typing(state: AppState, user_id: i64, data: Value) -> Result<(), AppError> {
    let request: TypingPayload = payload(data)?;
    state.relay.typing(user_id, request.target()?).await?;
    Ok(())
}

async fn join_channel(state: AppState, user_id: i64, data: Value) -> Result<(), AppError> {
    let request: JoinChannelPayload = payload(data)?;
    state.relay.join_channel(user_id, request.channel_id).await?;
    Ok(())
}
