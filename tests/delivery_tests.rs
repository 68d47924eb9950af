use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use storefront::delivery::{
    DeliveryError, DeliveryOutcome, DeliveryService, DeliveryTarget, DeliveryTier, GatewayError,
    MessageGateway, OutboundMessage,
};
use storefront::localization::init_localization;
use teloxide::types::{
    CallbackQueryId, ChatId, InlineKeyboardButton, InlineKeyboardMarkup, MessageId, ParseMode,
    Recipient,
};

fn setup_localization() {
    // Initialize localization if not already done
    let _ = init_localization();
}

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Send {
        text: String,
        mode: Option<ParseMode>,
        has_keyboard: bool,
    },
    Edit {
        text: String,
        mode: Option<ParseMode>,
        has_keyboard: bool,
    },
    Ack {
        text: Option<String>,
    },
}

/// Gateway that replays scripted results in call order; unscripted calls
/// succeed. Records every call for assertions.
#[derive(Default)]
struct ScriptedGateway {
    script: Mutex<VecDeque<Result<(), GatewayError>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedGateway {
    fn failing_first(failures: usize) -> Self {
        let gateway = Self::default();
        {
            let mut script = gateway.script.lock().unwrap();
            for _ in 0..failures {
                script.push_back(Err(GatewayError("scripted transport failure".to_string())));
            }
        }
        gateway
    }

    fn next_result(&self) -> Result<(), GatewayError> {
        self.script.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageGateway for ScriptedGateway {
    async fn send_message(
        &self,
        _to: Recipient,
        text: &str,
        mode: Option<ParseMode>,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<(), GatewayError> {
        self.calls.lock().unwrap().push(Call::Send {
            text: text.to_string(),
            mode,
            has_keyboard: keyboard.is_some(),
        });
        self.next_result()
    }

    async fn edit_message(
        &self,
        _chat: ChatId,
        _message: MessageId,
        text: &str,
        mode: Option<ParseMode>,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<(), GatewayError> {
        self.calls.lock().unwrap().push(Call::Edit {
            text: text.to_string(),
            mode,
            has_keyboard: keyboard.is_some(),
        });
        self.next_result()
    }

    async fn answer_callback(
        &self,
        _callback: CallbackQueryId,
        text: Option<&str>,
    ) -> Result<(), GatewayError> {
        self.calls.lock().unwrap().push(Call::Ack {
            text: text.map(|t| t.to_string()),
        });
        self.next_result()
    }
}

/// Gateway whose sends hang longer than the configured delivery timeout.
struct SlowGateway;

#[async_trait]
impl MessageGateway for SlowGateway {
    async fn send_message(
        &self,
        _to: Recipient,
        _text: &str,
        _mode: Option<ParseMode>,
        _keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<(), GatewayError> {
        tokio::time::sleep(Duration::from_millis(200)).await;
        Ok(())
    }

    async fn edit_message(
        &self,
        _chat: ChatId,
        _message: MessageId,
        _text: &str,
        _mode: Option<ParseMode>,
        _keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<(), GatewayError> {
        tokio::time::sleep(Duration::from_millis(200)).await;
        Ok(())
    }

    async fn answer_callback(
        &self,
        _callback: CallbackQueryId,
        _text: Option<&str>,
    ) -> Result<(), GatewayError> {
        tokio::time::sleep(Duration::from_millis(200)).await;
        Ok(())
    }
}

fn new_target() -> DeliveryTarget {
    DeliveryTarget::New { chat: ChatId(100) }
}

fn edit_target() -> DeliveryTarget {
    DeliveryTarget::Edit {
        chat: ChatId(100),
        message: MessageId(7),
        callback: CallbackQueryId("cb-1".to_string()),
    }
}

fn keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback("ok", "ok")]])
}

#[tokio::test]
async fn test_rich_tier_sends_escaped_markdown_with_keyboard() {
    setup_localization();
    let gateway = Arc::new(ScriptedGateway::default());
    let service = DeliveryService::with_timeout(Arc::clone(&gateway), Duration::from_secs(1));
    let message = OutboundMessage::rich("Price (50.00)".to_string(), Some(keyboard()));

    let outcome = service.deliver(&new_target(), &message).await.unwrap();
    assert_eq!(outcome, DeliveryOutcome::Rich);

    let calls = gateway.calls();
    assert_eq!(calls.len(), 1);
    match &calls[0] {
        Call::Send {
            text,
            mode,
            has_keyboard,
        } => {
            assert_eq!(*mode, Some(ParseMode::MarkdownV2));
            assert!(*has_keyboard);
            // Escaped for MarkdownV2, not the raw text.
            assert_ne!(text, "Price (50.00)");
            assert!(text.contains("\\("));
        }
        other => panic!("expected a send call, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fallback_retries_with_original_text() {
    setup_localization();
    let gateway = Arc::new(ScriptedGateway::failing_first(1));
    let service = DeliveryService::with_timeout(Arc::clone(&gateway), Duration::from_secs(1));
    let message = OutboundMessage::rich("Price (50.00)".to_string(), Some(keyboard()));

    let outcome = service.deliver(&new_target(), &message).await.unwrap();
    assert_eq!(outcome, DeliveryOutcome::Plain);

    let calls = gateway.calls();
    assert_eq!(calls.len(), 2);
    match &calls[1] {
        Call::Send {
            text,
            mode,
            has_keyboard,
        } => {
            // The plain tier must carry the unescaped text and keep the keyboard.
            assert_eq!(text, "Price (50.00)");
            assert_eq!(*mode, None);
            assert!(*has_keyboard);
        }
        other => panic!("expected a send call, got {other:?}"),
    }
}

#[tokio::test]
async fn test_editable_interaction_falls_back_to_acknowledgment() {
    setup_localization();
    let gateway = Arc::new(ScriptedGateway::failing_first(2));
    let service = DeliveryService::with_timeout(Arc::clone(&gateway), Duration::from_secs(1));
    let message = OutboundMessage::rich("detail text".to_string(), None);

    let outcome = service.deliver(&edit_target(), &message).await.unwrap();
    assert_eq!(outcome, DeliveryOutcome::AckOnly);

    let calls = gateway.calls();
    assert_eq!(calls.len(), 3);
    match &calls[2] {
        Call::Ack { text } => {
            let text = text.as_deref().expect("ack tier must carry feedback text");
            assert!(text.contains("error"));
        }
        other => panic!("expected an ack call, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fresh_command_exhaustion_is_terminal() {
    setup_localization();
    let gateway = Arc::new(ScriptedGateway::failing_first(2));
    let service = DeliveryService::with_timeout(Arc::clone(&gateway), Duration::from_secs(1));
    let message = OutboundMessage::rich("welcome".to_string(), None);

    let err = service.deliver(&new_target(), &message).await.unwrap_err();
    match err {
        DeliveryError::Exhausted { tier, .. } => assert_eq!(tier, DeliveryTier::Plain),
    }

    // No acknowledgment tier exists for fresh messages.
    let calls = gateway.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|c| !matches!(c, Call::Ack { .. })));
}

#[tokio::test]
async fn test_failed_acknowledgment_is_terminal() {
    setup_localization();
    let gateway = Arc::new(ScriptedGateway::failing_first(3));
    let service = DeliveryService::with_timeout(Arc::clone(&gateway), Duration::from_secs(1));
    let message = OutboundMessage::rich("detail text".to_string(), None);

    let err = service.deliver(&edit_target(), &message).await.unwrap_err();
    match err {
        DeliveryError::Exhausted { tier, .. } => assert_eq!(tier, DeliveryTier::Ack),
    }
}

#[tokio::test]
async fn test_plain_message_skips_rich_tier() {
    setup_localization();
    let gateway = Arc::new(ScriptedGateway::default());
    let service = DeliveryService::with_timeout(Arc::clone(&gateway), Duration::from_secs(1));
    let message = OutboundMessage::plain("Group information not found.".to_string());

    let outcome = service.deliver(&new_target(), &message).await.unwrap();
    assert_eq!(outcome, DeliveryOutcome::Plain);

    let calls = gateway.calls();
    assert_eq!(calls.len(), 1);
    match &calls[0] {
        Call::Send { text, mode, .. } => {
            assert_eq!(text, "Group information not found.");
            assert_eq!(*mode, None);
        }
        other => panic!("expected a send call, got {other:?}"),
    }
}

#[tokio::test]
async fn test_slow_transport_counts_as_failure() {
    setup_localization();
    let service = DeliveryService::with_timeout(SlowGateway, Duration::from_millis(20));
    let message = OutboundMessage::plain("welcome".to_string());

    let err = service.deliver(&new_target(), &message).await.unwrap_err();
    match err {
        DeliveryError::Exhausted { tier, reason } => {
            assert_eq!(tier, DeliveryTier::Plain);
            assert!(reason.to_string().contains("timed out"));
        }
    }
}

#[tokio::test]
async fn test_notify_sends_single_plain_message() {
    setup_localization();
    let gateway = Arc::new(ScriptedGateway::default());
    let service = DeliveryService::with_timeout(Arc::clone(&gateway), Duration::from_secs(1));

    service
        .notify(
            Recipient::ChannelUsername("@shop_admin".to_string()),
            "New Group inquiry",
        )
        .await
        .unwrap();

    let calls = gateway.calls();
    assert_eq!(calls.len(), 1);
    match &calls[0] {
        Call::Send {
            text,
            mode,
            has_keyboard,
        } => {
            assert_eq!(text, "New Group inquiry");
            assert_eq!(*mode, None);
            assert!(!*has_keyboard);
        }
        other => panic!("expected a send call, got {other:?}"),
    }
}
