//! # Ariadne
//!
//! **Typed, fail-fast inbound step pipelines**
//!
//! Ariadne threads an inbound payload through a named sequence of steps.
//! Each step either returns a new, immutable [`StepContext`](core::StepContext)
//! enriched with typed attributes, or stops the flow with a set of
//! [`Violations`](core::Violations) whose names a presentation layer maps to a
//! status.
//!
//! - **Validation monad** - `Valid`/`Invalid` with short-circuiting combinators
//! - **Typed attributes** - `AttrKey<T>` constants, checked on read
//! - **Service adapters** - lift extractors and operations into steps, with
//!   panics and errors turned into violations
//! - **Authentication binding** - bind the caller and resolve entitlements,
//!   under a `required` or `optional` condition
//! - **Ambient stack** - `tracing` logs, Prometheus metrics, TOML/JSON/env
//!   configuration
//!
//! ## Quick Start
//!
//! ```
//! use ariadne::prelude::*;
//!
//! const GREETING: AttrKey<String> = AttrKey::of("demo.greeting");
//!
//! let supplier = || {
//!     Validation::<Violations, _>::valid(Authentication::authenticated("alice", ["ROLE_user"]))
//! };
//!
//! let flow = Flow::builder("greet")
//!     .step(bind_auth_context(AuthCondition::required(), supplier))
//!     .step(resolve_entitlements(
//!         AuthCondition::required(),
//!         EntitlementsResolvers::fixed(["user"], ["staff"], ["READ"]),
//!     ))
//!     .step(service_step(
//!         |name: &String, attrs: &AttrView<'_>| {
//!             attrs
//!                 .require(&auth_keys::AUTH_CONTEXT)
//!                 .map(|auth| format!("{name}, {}", auth.principal_id))
//!         },
//!         |greeting: String| Ok::<_, std::fmt::Error>(format!("hello {greeting}")),
//!         GREETING,
//!     ))
//!     .build();
//!
//! let ctx = flow.run_payload("world".to_string()).expect_valid("alice is bound");
//! assert_eq!(ctx.find_attribute(&GREETING).unwrap(), "hello world, alice");
//! ```
//!
//! ## Architecture
//!
//! ```text
//! InboundEnvelope → auth:bind → auth:entitlements → require … → service:<key> → Valid(ctx)
//!                       ↓               ↓                ↓             ↓
//!                       └───────────────┴────────────────┴─────────────┴──→ Invalid(violations)
//! ```

#![doc(html_root_url = "https://docs.rs/ariadne/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod pipeline;

// Re-export core types
pub use ariadne_core as core;

// Re-export step and flow types
pub use ariadne_flow as flow;

// Re-export authentication binding
pub use ariadne_auth as auth;

// Re-export configuration
pub use ariadne_config as config;

// Re-export telemetry
pub use ariadne_telemetry as telemetry;

pub use pipeline::secured_flow;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use ariadne::prelude::*;
/// ```
pub mod prelude {
    pub use ariadne_core::{
        AttrKey, AttrView, FailureClass, InboundEnvelope, InboundMeta, ProblemDetails, RequestId,
        StepContext, Validation, Violation, Violations,
    };

    // Re-export flow building blocks
    pub use ariadne_flow::{
        payload_service_step, require, service_step, service_validation_step, step_fn,
        BehaviorStep, BehaviorStepExt, Flow, FlowBuilder, StepResult,
    };

    // Re-export authentication binding
    pub use ariadne_auth::keys as auth_keys;
    pub use ariadne_auth::{
        bind_auth_context, resolve_entitlements, AuthCondition, AuthContext, Authentication,
        AuthenticationSupplier, Entitlements, EntitlementsResolver, EntitlementsResolvers,
    };

    // Re-export configuration
    pub use ariadne_config::{ConfigLoader, PipelineConfig};

    pub use crate::secured_flow;
}
