//! Relaychat CLI
//!
//! Headless stand-in for the broker's graphical front-end: it starts a
//! [`relaychat_core::BrokerServer`], renders broker events to the console,
//! and stops the broker on Ctrl-C.

pub mod cli;
pub mod config;
pub mod console;
pub mod error;
