//! Access Gate Bot Library
//!
//! A Telegram bot gatekeeper: only users the admin has approved may
//! interact with the bot, approvals are time-limited, and messages from
//! unauthorized users are removed.
//!
//! This crate provides the core functionality for:
//! - Tracking time-limited authorization grants (expire-on-read)
//! - Parsing admin-supplied grant durations
//! - Handling `/start`, `/approve`, and `/deny` commands
//! - Gating and purging messages from unauthorized users

pub mod auth;
pub mod commands;
pub mod config;
pub mod telegram;
