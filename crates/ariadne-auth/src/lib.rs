//! # Ariadne Auth
//!
//! Authentication binding and entitlement resolution for Ariadne flows.
//!
//! Ariadne does not authenticate callers. The host supplies an
//! [`Authentication`] through an [`AuthenticationSupplier`]; two steps turn
//! it into request-scoped facts:
//!
//! 1. [`bind_auth_context`] derives an [`AuthContext`] (principal id,
//!    authorities, `ROLE_` roles, `SCOPE_` role groups) and stores it under
//!    [`keys::AUTH_CONTEXT`].
//! 2. [`resolve_entitlements`] asks an [`EntitlementsResolver`] what that
//!    principal is granted and stores the [`Entitlements`] under
//!    [`keys::ENTITLEMENTS`].
//!
//! Both steps honor an [`AuthCondition`]: under `required` a missing or
//! anonymous caller stops the flow, under `optional` the steps are no-ops.
//!
//! ## Example
//!
//! ```
//! use ariadne_auth::{
//!     bind_auth_context, keys, resolve_entitlements, AuthCondition, Authentication,
//!     EntitlementsResolvers,
//! };
//! use ariadne_core::{Validation, Violations};
//! use ariadne_flow::Flow;
//!
//! let supplier = || {
//!     Validation::<Violations, _>::valid(Authentication::authenticated("alice", ["ROLE_user"]))
//! };
//!
//! let flow = Flow::builder("whoami")
//!     .step(bind_auth_context(AuthCondition::required(), supplier))
//!     .step(resolve_entitlements(
//!         AuthCondition::required(),
//!         EntitlementsResolvers::fixed(["user"], ["staff"], ["READ"]),
//!     ))
//!     .build();
//!
//! let ctx = flow.run_payload(()).expect_valid("alice is entitled");
//! assert!(ctx.find_attribute(&keys::ENTITLEMENTS).unwrap().in_group("staff"));
//! ```

#![doc(html_root_url = "https://docs.rs/ariadne-auth/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod authentication;
mod binding;
mod cache;
pub mod codes;
mod context;
mod entitlements;
pub mod extract;
pub mod holder;
mod resolvers;

pub use authentication::{Authentication, AuthenticationSupplier, Principal, SharedSupplier, UserDetails};
pub use binding::{
    bind_auth_context, bind_auth_context_with, keys, resolve_entitlements, BIND_STEP, RESOLVE_STEP,
};
pub use cache::{CacheConfig, CacheStats, CachedResolver};
pub use context::{AuthCondition, AuthContext};
pub use entitlements::{Entitlements, EntitlementsResolver, SharedResolver};
pub use resolvers::EntitlementsResolvers;
