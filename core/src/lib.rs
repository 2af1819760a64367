//! Supervisor-side core for worker execution traces.
//!
//! A worker writes [`event::Event`]s to a byte stream using the framing in
//! [`codec`]. The supervisor decodes them in order and pushes each one through
//! a [`handler::HandlerChain`]; the terminal [`result::ResultBuilder`] folds
//! them into a [`result::RunResult`].

pub mod api;
pub mod codec;
pub mod config;
pub mod error;
pub mod event;
pub mod handler;
pub mod result;
pub mod runner;
