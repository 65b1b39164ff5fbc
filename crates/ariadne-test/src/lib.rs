//! # Ariadne Test
//!
//! Test utilities for Ariadne flows.
//!
//! - [`ProbeStep`] - counts invocations, passes or fails on demand
//! - [`OrderRecorder`] - records the order steps ran in
//! - [`suppliers`] - authentication suppliers for the common cases
//! - [`assertions`] - `Valid`/`Invalid` assertions with readable failures
//!
//! ## Example
//!
//! ```
//! use ariadne_core::Violations;
//! use ariadne_flow::Flow;
//! use ariadne_test::assertions::assert_single_violation;
//! use ariadne_test::ProbeStep;
//!
//! let never = ProbeStep::passing("after");
//! let flow = Flow::builder("fail-fast")
//!     .step(ProbeStep::passing("before"))
//!     .step(ProbeStep::failing("gate", Violations::violate("body.keyword.missing", "keyword required")))
//!     .step(never.clone())
//!     .build();
//!
//! assert_single_violation(flow.run_payload(()), "body.keyword.missing");
//! assert!(never.never_called());
//! ```

#![doc(html_root_url = "https://docs.rs/ariadne-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod assertions;
mod probe;
pub mod suppliers;

pub use probe::{OrderRecorder, ProbeStep, RecordingStep};
