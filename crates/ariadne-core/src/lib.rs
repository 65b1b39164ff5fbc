//! # Ariadne Core
//!
//! Core types for the Ariadne step pipeline.
//!
//! - [`Violation`] / [`Violations`] - named failure reasons
//! - [`Validation`] - the `Valid` / `Invalid` container every step returns
//! - [`AttrKey`] / [`AttrView`] - typed handles into the attribute store
//! - [`StepContext`] - immutable payload plus attributes
//! - [`InboundEnvelope`] / [`InboundMeta`] / [`RequestId`] - what a transport hands in
//! - [`FailureClass`] / [`ProblemDetails`] - classification of failed flows

#![doc(html_root_url = "https://docs.rs/ariadne-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod attr;
mod classify;
mod context;
mod envelope;
mod error;
mod validation;
mod violation;

pub use attr::{AttrKey, AttrView, Attributes};
pub use classify::{FailureClass, ProblemDetails};
pub use context::{keys, StepContext};
pub use envelope::{headers, InboundEnvelope, InboundMeta, RequestId};
pub use error::{AttrError, AttrResult};
pub use validation::Validation;
pub use violation::{EmptyViolations, Violation, Violations};
