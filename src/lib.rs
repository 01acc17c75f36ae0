//! zigsniff library: portable IEEE 802.15.4 sniffer/injector relay core.
//!
//! Captures link-layer frames in promiscuous mode and relays them to a host
//! over a serial link as text lines, and in transmit mode forwards raw frames
//! written by the host to the radio. This crate contains the whole relay
//! pipeline with no platform dependencies, testable on any host with
//! `cargo test`. The ESP-IDF firmware in `firmware-std/` is a thin consumer
//! that binds the [`radio`] and [`comm`] traits to real hardware.
//!
//! Data flow: radio interrupt → [`capture`] → [`queue`] → [`relay`] → serial.
//! Control flow: serial → [`comm`] → [`mode`] (mode changes) or radio transmit.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod board;
pub mod capture;
pub mod comm;
pub mod context;
pub mod mode;
pub mod protocol;
pub mod queue;
pub mod radio;
pub mod record;
pub mod relay;

#[cfg(test)]
pub(crate) mod testutil;
