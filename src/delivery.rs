//! Message delivery with tiered fallback.
//!
//! Rich rendering is best-effort, plain delivery is the guaranteed baseline,
//! and an acknowledgment-only answer is the last resort for interactions that
//! originated from a button press. Both addressing modes (send a new message,
//! edit an existing interactive one) walk the same chain, and every transport
//! call is bounded by a timeout so one slow delivery cannot stall a handler.

use crate::localization::t;
use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use teloxide::prelude::*;
use teloxide::types::{
    CallbackQueryId, InlineKeyboardMarkup, MessageId, ParseMode, Recipient,
};
use teloxide::utils::markdown;
use tokio::time::timeout;
use tracing::{error, warn};

/// Upper bound on a single transport call.
const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Transport-level failure reported by a gateway call.
#[derive(Debug, Clone)]
pub struct GatewayError(pub String);

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gateway error: {}", self.0)
    }
}

impl std::error::Error for GatewayError {}

impl From<teloxide::RequestError> for GatewayError {
    fn from(err: teloxide::RequestError) -> Self {
        GatewayError(err.to_string())
    }
}

/// One fallback level in the delivery chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryTier {
    Rich,
    Plain,
    Ack,
}

impl fmt::Display for DeliveryTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryTier::Rich => write!(f, "rich"),
            DeliveryTier::Plain => write!(f, "plain"),
            DeliveryTier::Ack => write!(f, "ack"),
        }
    }
}

/// Terminal delivery failure: the named tier was the last one available and
/// it failed too.
#[derive(Debug)]
pub enum DeliveryError {
    Exhausted {
        tier: DeliveryTier,
        reason: GatewayError,
    },
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryError::Exhausted { tier, reason } => {
                write!(f, "delivery exhausted at {tier} tier: {reason}")
            }
        }
    }
}

impl std::error::Error for DeliveryError {}

/// Preferred rendering for an outbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    RichMarkup,
    PlainText,
}

/// A message constructed by a handler and consumed within one event.
#[derive(Clone, Debug)]
pub struct OutboundMessage {
    pub text: String,
    pub mode: RenderMode,
    pub keyboard: Option<InlineKeyboardMarkup>,
}

impl OutboundMessage {
    pub fn rich(text: String, keyboard: Option<InlineKeyboardMarkup>) -> Self {
        Self {
            text,
            mode: RenderMode::RichMarkup,
            keyboard,
        }
    }

    pub fn plain(text: String) -> Self {
        Self {
            text,
            mode: RenderMode::PlainText,
            keyboard: None,
        }
    }
}

/// Where a delivery goes: a fresh message, or an edit of the interactive
/// message the user pressed a button on.
#[derive(Clone, Debug)]
pub enum DeliveryTarget {
    New {
        chat: ChatId,
    },
    Edit {
        chat: ChatId,
        message: MessageId,
        callback: CallbackQueryId,
    },
}

/// Which tier ultimately reached the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Rich,
    Plain,
    AckOnly,
}

/// Seam between delivery logic and the Telegram API, so the fallback chain
/// can be exercised against a scripted gateway in tests.
#[async_trait]
pub trait MessageGateway: Send + Sync {
    async fn send_message(
        &self,
        to: Recipient,
        text: &str,
        mode: Option<ParseMode>,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<(), GatewayError>;

    async fn edit_message(
        &self,
        chat: ChatId,
        message: MessageId,
        text: &str,
        mode: Option<ParseMode>,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<(), GatewayError>;

    async fn answer_callback(
        &self,
        callback: CallbackQueryId,
        text: Option<&str>,
    ) -> Result<(), GatewayError>;
}

#[async_trait]
impl<G> MessageGateway for std::sync::Arc<G>
where
    G: MessageGateway + ?Sized,
{
    async fn send_message(
        &self,
        to: Recipient,
        text: &str,
        mode: Option<ParseMode>,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<(), GatewayError> {
        (**self).send_message(to, text, mode, keyboard).await
    }

    async fn edit_message(
        &self,
        chat: ChatId,
        message: MessageId,
        text: &str,
        mode: Option<ParseMode>,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<(), GatewayError> {
        (**self).edit_message(chat, message, text, mode, keyboard).await
    }

    async fn answer_callback(
        &self,
        callback: CallbackQueryId,
        text: Option<&str>,
    ) -> Result<(), GatewayError> {
        (**self).answer_callback(callback, text).await
    }
}

/// Live gateway backed by the teloxide `Bot`.
#[derive(Clone)]
pub struct TelegramGateway {
    bot: Bot,
}

impl TelegramGateway {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl MessageGateway for TelegramGateway {
    async fn send_message(
        &self,
        to: Recipient,
        text: &str,
        mode: Option<ParseMode>,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<(), GatewayError> {
        let mut request = self.bot.send_message(to, text);
        if let Some(mode) = mode {
            request = request.parse_mode(mode);
        }
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(keyboard);
        }
        request.await?;
        Ok(())
    }

    async fn edit_message(
        &self,
        chat: ChatId,
        message: MessageId,
        text: &str,
        mode: Option<ParseMode>,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<(), GatewayError> {
        let mut request = self.bot.edit_message_text(chat, message, text);
        if let Some(mode) = mode {
            request = request.parse_mode(mode);
        }
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(keyboard);
        }
        request.await?;
        Ok(())
    }

    async fn answer_callback(
        &self,
        callback: CallbackQueryId,
        text: Option<&str>,
    ) -> Result<(), GatewayError> {
        let mut request = self.bot.answer_callback_query(callback);
        if let Some(text) = text {
            request = request.text(text);
        }
        request.await?;
        Ok(())
    }
}

/// Sends or edits conversational messages through the fallback chain.
pub struct DeliveryService<G> {
    gateway: G,
    timeout: Duration,
}

impl<G: MessageGateway> DeliveryService<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            timeout: DELIVERY_TIMEOUT,
        }
    }

    pub fn with_timeout(gateway: G, timeout: Duration) -> Self {
        Self { gateway, timeout }
    }

    /// Deliver `message` to `target`, degrading through the tiers until one
    /// succeeds. Returns which tier reached the user.
    pub async fn deliver(
        &self,
        target: &DeliveryTarget,
        message: &OutboundMessage,
    ) -> Result<DeliveryOutcome, DeliveryError> {
        let mut attempts: Vec<(DeliveryTier, Option<ParseMode>, String)> = Vec::new();
        if message.mode == RenderMode::RichMarkup {
            attempts.push((
                DeliveryTier::Rich,
                Some(ParseMode::MarkdownV2),
                markdown::escape(&message.text),
            ));
        }
        // The plain tier always retries with the original, unescaped text.
        attempts.push((DeliveryTier::Plain, None, message.text.clone()));

        let mut last_error = GatewayError("no delivery attempt was made".to_string());
        for (tier, mode, text) in attempts {
            match self
                .attempt(target, &text, mode, message.keyboard.clone())
                .await
            {
                Ok(()) => {
                    let outcome = match tier {
                        DeliveryTier::Rich => DeliveryOutcome::Rich,
                        _ => DeliveryOutcome::Plain,
                    };
                    return Ok(outcome);
                }
                Err(e) => {
                    match tier {
                        DeliveryTier::Rich => {
                            warn!(%tier, error = %e, "delivery attempt failed, falling back")
                        }
                        _ => error!(%tier, error = %e, "delivery attempt failed"),
                    }
                    last_error = e;
                }
            }
        }

        if let DeliveryTarget::Edit { callback, .. } = target {
            let ack_text = t("error-ack");
            let ack = self
                .gateway
                .answer_callback(callback.clone(), Some(&ack_text));
            match self.bounded(ack).await {
                Ok(()) => return Ok(DeliveryOutcome::AckOnly),
                Err(e) => {
                    error!(error = %e, "acknowledgment-tier delivery failed");
                    return Err(DeliveryError::Exhausted {
                        tier: DeliveryTier::Ack,
                        reason: e,
                    });
                }
            }
        }

        Err(DeliveryError::Exhausted {
            tier: DeliveryTier::Plain,
            reason: last_error,
        })
    }

    /// One-shot plain message outside the fallback chain, used to relay
    /// inquiries to the admin.
    pub async fn notify(&self, to: Recipient, text: &str) -> Result<(), GatewayError> {
        self.bounded(self.gateway.send_message(to, text, None, None))
            .await
    }

    /// Answer a callback query without text so the client stops showing the
    /// loading spinner.
    pub async fn acknowledge(&self, callback: CallbackQueryId) -> Result<(), GatewayError> {
        self.bounded(self.gateway.answer_callback(callback, None))
            .await
    }

    async fn attempt(
        &self,
        target: &DeliveryTarget,
        text: &str,
        mode: Option<ParseMode>,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<(), GatewayError> {
        match target {
            DeliveryTarget::New { chat } => {
                self.bounded(
                    self.gateway
                        .send_message(Recipient::Id(*chat), text, mode, keyboard),
                )
                .await
            }
            DeliveryTarget::Edit { chat, message, .. } => {
                self.bounded(
                    self.gateway
                        .edit_message(*chat, *message, text, mode, keyboard),
                )
                .await
            }
        }
    }

    async fn bounded<F>(&self, call: F) -> Result<(), GatewayError>
    where
        F: Future<Output = Result<(), GatewayError>> + Send,
    {
        match timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError(format!(
                "transport call timed out after {:?}",
                self.timeout
            ))),
        }
    }
}
