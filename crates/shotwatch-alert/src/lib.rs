//! Alert dispatch layer for shotwatch
//!
//! Consumes detection events and pushes notifications through an
//! `AlertSink`. The provided sink logs each outbound notification; a
//! real transport (SMS modem, webhook) slots in behind the same trait.

pub mod error;
pub mod processor;
pub mod sink;
pub mod types;

pub use error::{AlertError, AlertResult};
pub use processor::AlertProcessor;
pub use sink::{AlertSink, LogAlertSink};
pub use types::AlertConfig;
