//! # Velum DNS Model
//!
//! Decoded DNS data structures shared by the velum resolver pipeline.
//!
//! This crate deliberately stops at the decoded level: questions, resource
//! records, and messages as Rust values. Wire-format parsing and
//! serialization live in the listener layer, which hands fully decoded
//! messages to the resolver stages.

pub mod error;
pub mod message;
pub mod name;
pub mod question;
pub mod rcode;
pub mod rdata;
pub mod record;
pub mod rtype;

pub use error::{Error, Result};
pub use message::Message;
pub use name::Name;
pub use question::Question;
pub use rcode::ResponseCode;
pub use rdata::RData;
pub use record::Record;
pub use rtype::{RecordType, Type};
