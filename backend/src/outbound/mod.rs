//! Driven adapters implementing domain ports.

pub mod credentials;
pub mod memory;
pub mod persistence;
pub mod storage;
