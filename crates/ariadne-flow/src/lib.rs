//! # Ariadne Flow
//!
//! Steps and flows for the Ariadne pipeline.
//!
//! - [`BehaviorStep`] - one `StepContext -> Validation` unit
//! - [`Flow`] - a named, fail-fast sequence of steps
//! - [`service_step`] and friends - lift caller logic into steps behind a
//!   failure boundary
//!
//! Evaluation is synchronous. A flow never returns anything but `Valid` or
//! `Invalid`: errors and panics raised by caller-supplied callbacks are
//! converted to violations at the boundary.

#![doc(html_root_url = "https://docs.rs/ariadne-flow/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod boundary;
mod flow;
mod service;
mod step;

pub use flow::{Flow, FlowBuilder, STEP_PANICKED};
pub use service::{
    payload_service_step, require, service_step, service_validation_step, EXTRACT_FAILED,
    OPERATION_FAILED, PRECONDITION_FAILED,
};
pub use step::{
    step_fn, BehaviorStep, BehaviorStepExt, BoxedStep, FnStep, Named, StepResult, Then,
};
