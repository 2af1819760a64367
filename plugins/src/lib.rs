//! Auxiliary handlers that sit in front of the result builder on the chain.

pub mod factory;
pub mod handlers;
