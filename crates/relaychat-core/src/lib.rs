//! Relaychat Broker Core
//!
//! A minimal TCP message broker: every byte a client sends is appended to a
//! timestamped transcript and relayed to every other connected client. The
//! front-end (GUI, CLI, tests) observes the broker through the
//! [`BrokerObserver`] callbacks and drives it through [`BrokerServer::start`]
//! and [`BrokerServer::stop`].
//!
//! There is no framing and no acknowledgment: reads are relayed as-is, so a
//! single read may carry fragments of several logical messages.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod accept;
pub mod broadcast;
pub mod config;
pub mod errors;
pub mod handler;
pub mod observer;
pub mod registry;
pub mod server;
pub mod transcript;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use config::BrokerConfig;
pub use errors::{BrokerError, Result};
pub use observer::{BrokerEvent, BrokerObserver, ChannelObserver, NoOpObserver};
pub use registry::{ClientId, ClientRegistry};
pub use server::BrokerServer;
pub use transcript::TranscriptLog;
