//! UI Builder module for creating keyboards and formatting messages

use anyhow::Result;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use url::Url;

// Import localization
use crate::localization::t;

use crate::catalog::{Catalog, Item};
use crate::deeplink::contact_deep_link;

use super::callback_handler::{BACK_TO_CATALOG, SELECT_ITEM_PREFIX};

/// Invite link for the demo channel, shown at the bottom of the catalog.
const DEMO_LINK: &str = "https://t.me/+ukJYiqlkRLYzOTFl";

/// Welcome text shown above the catalog keyboard.
pub fn catalog_text() -> String {
    format!("{}\n\n{}", t("welcome-title"), t("welcome-prompt"))
}

/// One button per item in catalog order, plus the demo link row.
pub fn catalog_keyboard(catalog: &Catalog) -> Result<InlineKeyboardMarkup> {
    let mut buttons: Vec<Vec<InlineKeyboardButton>> = catalog
        .list_all()
        .iter()
        .map(|item| {
            vec![InlineKeyboardButton::callback(
                format!("{} (₹{})", item.name, item.price),
                format!("{SELECT_ITEM_PREFIX}{}", item.id),
            )]
        })
        .collect();

    buttons.push(vec![InlineKeyboardButton::url(
        t("button-demo"),
        Url::parse(DEMO_LINK)?,
    )]);

    Ok(InlineKeyboardMarkup::new(buttons))
}

/// Detail view for one item: name, exact price, feature list, description.
pub fn item_detail_text(item: &Item) -> String {
    format!(
        "📘 {}\n\n{}: ₹{}\n\n{}:\n• {}\n\n{}:\n{}",
        item.name,
        t("detail-price-label"),
        item.price,
        t("detail-features-label"),
        item.features.join("\n• "),
        t("detail-description-label"),
        item.description,
    )
}

/// Detail keyboard: pre-filled contact deep link plus a back button.
pub fn item_detail_keyboard(item: &Item, admin_username: &str) -> Result<InlineKeyboardMarkup> {
    let keyboard = vec![
        vec![InlineKeyboardButton::url(
            t("button-contact-admin"),
            contact_deep_link(admin_username, item)?,
        )],
        vec![InlineKeyboardButton::callback(
            t("button-back"),
            BACK_TO_CATALOG.to_string(),
        )],
    ];

    Ok(InlineKeyboardMarkup::new(keyboard))
}
