//! The [`Handler`] contract of the message pipeline, plus conversions from transport types.

use async_trait::async_trait;

use super::{message::Message, response::HandlerResponse, user::User};
use crate::core::error::Result;

/// Builds a core [`User`] from a transport's user type.
pub trait ToCoreUser: Send + Sync {
    fn to_core(&self) -> User;
}

/// Builds a core [`Message`] from a transport's message type.
pub trait ToCoreMessage: Send + Sync {
    fn to_core(&self) -> Message;
}

/// One stage of the [`HandlerChain`](crate::chain::HandlerChain).
///
/// All three hooks are optional. For each message the chain calls every `before`, then `handle`
/// on each stage until one answers `Stop` or `Reply`, then every `after` from last to first with
/// that answer. In this bot the stages are the logging handler and the command handler.
#[async_trait]
pub trait Handler: Send + Sync {
    /// `false` drops the message; later stages never see it.
    async fn before(&self, _message: &Message) -> Result<bool> {
        Ok(true)
    }

    /// `Continue` or `Ignore` passes the message on.
    async fn handle(&self, _message: &Message) -> Result<HandlerResponse> {
        Ok(HandlerResponse::Continue)
    }

    /// Sees the final answer, including the reply text.
    async fn after(&self, _message: &Message, _response: &HandlerResponse) -> Result<()> {
        Ok(())
    }
}
