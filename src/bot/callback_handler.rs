//! Callback Handler module for processing inline keyboard callback queries

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{Recipient, User};
use tracing::{debug, error, warn};

// Import localization
use crate::localization::{t, t_args};

use crate::deeplink::inquiry_message;
use crate::delivery::{DeliveryOutcome, DeliveryTarget, OutboundMessage};

// Import UI builder functions
use super::ui_builder::{catalog_keyboard, catalog_text, item_detail_keyboard, item_detail_text};

use super::AppState;

pub const SELECT_ITEM_PREFIX: &str = "select_course_";
pub const CONTACT_ADMIN_PREFIX: &str = "contact_admin_";
pub const BACK_TO_CATALOG: &str = "back_to_groups";

/// A decoded inline-button payload.
///
/// Raw payload strings are decoded exactly once, here; the handlers only ever
/// see tagged variants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallbackAction {
    BackToCatalog,
    SelectItem(String),
    ContactAdmin(String),
}

impl CallbackAction {
    pub fn parse(data: &str) -> Option<Self> {
        if data == BACK_TO_CATALOG {
            return Some(Self::BackToCatalog);
        }
        if let Some(id) = data.strip_prefix(SELECT_ITEM_PREFIX) {
            return Some(Self::SelectItem(id.to_string()));
        }
        if let Some(id) = data.strip_prefix(CONTACT_ADMIN_PREFIX) {
            return Some(Self::ContactAdmin(id.to_string()));
        }
        None
    }
}

/// Handle callback queries from inline keyboards.
///
/// All failures are contained here: anything unexpected is logged together
/// with the raw query and converted into the generic error response, so one
/// conversation can never take down the dispatch loop.
pub async fn callback_handler(q: CallbackQuery, state: Arc<AppState>) -> Result<()> {
    debug!(user_id = %q.from.id, "Received callback query from user");

    match handle_callback(&q, &state).await {
        Ok(outcome) => {
            // Answer the callback query to remove the loading state, unless
            // the delivery chain already answered it at the ack tier.
            if outcome != Some(DeliveryOutcome::AckOnly) {
                if let Err(e) = state.delivery.acknowledge(q.id.clone()).await {
                    warn!(user_id = %q.from.id, error = %e, "Failed to answer callback query");
                }
            }
        }
        Err(e) => {
            error!(
                user_id = %q.from.id,
                query = ?q,
                error = %e,
                "Unexpected failure while handling callback query"
            );
            if let Some(target) = edit_target(&q) {
                let message = OutboundMessage::plain(t("error-generic"));
                match state.delivery.deliver(&target, &message).await {
                    Ok(DeliveryOutcome::AckOnly) => {}
                    Ok(_) => {
                        let _ = state.delivery.acknowledge(q.id.clone()).await;
                    }
                    Err(e) => {
                        error!(user_id = %q.from.id, error = %e, "Failed to deliver generic error response");
                    }
                }
            }
        }
    }

    Ok(())
}

async fn handle_callback(q: &CallbackQuery, state: &AppState) -> Result<Option<DeliveryOutcome>> {
    let Some(target) = edit_target(q) else {
        // Stale query without an editable message; nothing to render into.
        warn!(user_id = %q.from.id, "Callback query without an editable message");
        return Ok(None);
    };

    let data = q.data.as_deref().unwrap_or("");
    let Some(action) = CallbackAction::parse(data) else {
        warn!(user_id = %q.from.id, data, "Unrecognized callback payload");
        let message = OutboundMessage::plain(t("error-generic"));
        return Ok(Some(state.delivery.deliver(&target, &message).await?));
    };

    match action {
        CallbackAction::BackToCatalog => {
            let message =
                OutboundMessage::rich(catalog_text(), Some(catalog_keyboard(&state.catalog)?));
            Ok(Some(state.delivery.deliver(&target, &message).await?))
        }
        CallbackAction::SelectItem(item_id) => {
            let Some(item) = state.catalog.get(&item_id) else {
                warn!(user_id = %q.from.id, item_id = %item_id, "Selected item not found in catalog");
                let message = OutboundMessage::plain(t("error-item-not-found"));
                return Ok(Some(state.delivery.deliver(&target, &message).await?));
            };

            state.sessions.set_selection(q.from.id, &item.id).await;

            let message = OutboundMessage::rich(
                item_detail_text(item),
                Some(item_detail_keyboard(item, &state.config.admin_username)?),
            );
            Ok(Some(state.delivery.deliver(&target, &message).await?))
        }
        CallbackAction::ContactAdmin(item_id) => {
            let Some(item) = state.catalog.get(&item_id) else {
                warn!(user_id = %q.from.id, item_id = %item_id, "Inquiry for item not found in catalog");
                let message = OutboundMessage::plain(t("error-item-not-found"));
                return Ok(Some(state.delivery.deliver(&target, &message).await?));
            };

            let session = state.sessions.get(q.from.id).await;
            debug!(
                user_id = %q.from.id,
                item_id = %item.id,
                current_selection = ?session.selected_item,
                "Relaying inquiry to admin"
            );

            let header = t_args("inquiry-header", &[("user", &describe_user(&q.from))]);
            let inquiry = inquiry_message(&header, item);
            state
                .delivery
                .notify(
                    Recipient::ChannelUsername(state.config.admin_recipient()),
                    &inquiry,
                )
                .await?;

            let message = OutboundMessage::plain(t("contact-confirmation"));
            Ok(Some(state.delivery.deliver(&target, &message).await?))
        }
    }
}

fn edit_target(q: &CallbackQuery) -> Option<DeliveryTarget> {
    q.message.as_ref().map(|msg| DeliveryTarget::Edit {
        chat: msg.chat().id,
        message: msg.id(),
        callback: q.id.clone(),
    })
}

/// "First Last (@username)" as far as the profile provides it.
fn describe_user(user: &User) -> String {
    let mut name = user.first_name.clone();
    if let Some(last_name) = &user.last_name {
        name.push(' ');
        name.push_str(last_name);
    }
    match &user.username {
        Some(username) => format!("{name} (@{username})"),
        None => name,
    }
}
