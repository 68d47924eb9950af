//! # Storefront Telegram Bot
//!
//! A Telegram bot that presents a small fixed catalog of purchasable groups,
//! lets a user drill into one item's details and routes purchase inquiries to
//! a human operator via a pre-filled contact deep link or a relayed message.

pub mod bot;
pub mod catalog;
pub mod config;
pub mod deeplink;
pub mod delivery;
pub mod health;
pub mod localization;
pub mod session;
