//! Contact deep links and admin inquiry messages.
//!
//! A deep link is a `https://t.me/<admin>?text=…` URL that pre-fills a
//! message to the operator when the user opens it. Every dynamic field is
//! percent-encoded on its own before the message scaffold is assembled, so
//! field content can never inject the literal separators (`%0A` line breaks,
//! the `|` feature delimiter) that the scaffold relies on.

use crate::catalog::Item;
use anyhow::Result;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

/// Percent-encode everything except RFC 3986 unreserved characters, matching
/// what chat clients expect inside a `?text=` payload. The encoder can never
/// emit a literal `|`, which is why `|` is safe as the feature delimiter.
const FIELD: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

fn encode_field(value: &str) -> String {
    utf8_percent_encode(value, FIELD).to_string()
}

/// Build the pre-filled contact link for one catalog item.
///
/// An item without features produces an empty features segment, not an error.
pub fn contact_deep_link(admin_username: &str, item: &Item) -> Result<Url> {
    let name = encode_field(&item.name);
    let price = encode_field(&item.price.to_string());
    let features = item
        .features
        .iter()
        .map(|feature| encode_field(feature))
        .collect::<Vec<_>>()
        .join("|");

    let message_text = format!(
        "Hello Admin,%0A%0A\
         I'm interested in the following Group:%0A\
         📘 Group: {name}%0A\
         💰 Price: ₹{price}%0A\
         📋 Features: {features}%0A%0A\
         Please provide payment details."
    );

    let link = format!("https://t.me/{admin_username}?text={message_text}");
    Ok(Url::parse(&link)?)
}

/// Plain-text inquiry relayed to the admin when the user asks the bot to make
/// contact on their behalf.
pub fn inquiry_message(header: &str, item: &Item) -> String {
    format!(
        "{header}\n\n\
         📘 Group: {}\n\
         💰 Price: ₹{}\n\
         📋 Features: {}",
        item.name,
        item.price,
        item.features.join(", ")
    )
}
