//! # qbot
//!
//! Quiz bowl tossups and bonuses played live in a chat channel.
//!
//! Questions come from a remote question source and answers are graded
//! by a remote judge. Tossups are revealed a few words at a time while the
//! player may buzz at any point; the buzz is scored against how far the
//! reading got. Sessions chain plays and keep running statistics.

#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::similar_names)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::ignored_unit_patterns)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]

pub mod constants;

pub mod bonus;
pub mod category;
pub mod channel;
pub mod command;
pub mod config;
pub mod error;
pub mod filter;
pub mod judge;
pub mod play;
pub mod qbreader;
pub mod question;
pub mod reveal;
pub mod session;
pub mod stats;
pub mod tossup;

#[cfg(test)]
mod test_support;
