//! # DSM Link Library
//!
//! Spektrum/JR DSM satellite receiver decoding and failsafe supervision.
//!
//! This library turns the raw serial byte stream of a DSM satellite receiver
//! into a trusted array of per-channel control values, auto-detecting the
//! 10/11-bit wire resolution from live traffic and independently recovering
//! from link loss with a bounded-time failsafe.

pub mod config;
pub mod error;
pub mod dsm;
pub mod receiver;
pub mod transport;
