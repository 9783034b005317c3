//! # DSM Protocol Module
//!
//! Implementation of the Spektrum/JR DSM satellite receiver protocol.
//!
//! This module handles:
//! - Frame assembly from a delimiter-less byte stream (silence windowing)
//! - 10/11-bit resolution auto-detection from live traffic
//! - Per-channel unrolling into the channel store
//! - Failsafe supervision driven by a fixed-rate tick
//! - One-shot bind pulse sequence at power-up

pub mod protocol;
pub mod resolution;
pub mod decoder;
pub mod device;
pub mod bind;
