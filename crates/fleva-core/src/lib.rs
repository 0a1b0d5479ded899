//! # FLEVA Core
//!
//! Post model and the network-first post client.
//! This crate holds the validation rules and the fallback policy; transport
//! and storage come in through the ports.

pub mod client;
pub mod domain;
pub mod error;
pub mod ports;

pub use client::{Created, ImageStatus, PostClient, Source, Sourced, Updated};
pub use error::{ClientError, MirrorError, RemoteError};
