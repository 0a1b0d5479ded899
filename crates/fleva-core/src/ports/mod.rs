//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

pub mod mirror;
mod remote;

pub use mirror::PostMirror;
pub use remote::PostRemote;
