//! The two canonical auth steps: bind the auth context, then resolve
//! entitlements.
//!
//! ```text
//! NotBound --bind--> Bound --resolve--> Entitled
//!    |                 |
//!    |                 +--> Denied (terminal)
//!    +--> Missing / Anonymous (terminal under `required`, no-op under `optional`)
//! ```

use crate::authentication::{Authentication, AuthenticationSupplier};
use crate::codes;
use crate::context::{AuthCondition, AuthContext};
use crate::entitlements::EntitlementsResolver;
use ariadne_core::{StepContext, Validation, Violations};
use ariadne_flow::boundary::{self, Fault};
use ariadne_flow::{step_fn, BehaviorStep};
use ariadne_telemetry::metrics::record_entitlements_resolution;

/// Attribute keys written by the auth steps.
pub mod keys {
    use crate::context::AuthContext;
    use crate::entitlements::Entitlements;
    use ariadne_core::AttrKey;

    /// The bound [`AuthContext`].
    pub const AUTH_CONTEXT: AttrKey<AuthContext> = AttrKey::of("auth.context");

    /// The resolved [`Entitlements`].
    pub const ENTITLEMENTS: AttrKey<Entitlements> = AttrKey::of("auth.entitlements");
}

/// Name of the bind step.
pub const BIND_STEP: &str = "auth:bind";

/// Name of the entitlements step.
pub const RESOLVE_STEP: &str = "auth:entitlements";

fn supplier_failure(fault: &Fault) -> Violations {
    tracing::warn!(fault = %fault, "authentication supplier failed");
    Violations::violate(
        codes::SUPPLIER_FAILED,
        format!("Authentication supplier failed: {fault}"),
    )
}

/// Binds an [`AuthContext`] derived with [`AuthContext::from_authentication`].
///
/// See [`bind_auth_context_with`].
pub fn bind_auth_context<T, S>(condition: AuthCondition, supplier: S) -> impl BehaviorStep<T>
where
    S: AuthenticationSupplier,
{
    bind_auth_context_with(condition, supplier, AuthContext::from_authentication)
}

/// Pulls the current authentication from `supplier` and stores the context
/// built by `extractor` under [`keys::AUTH_CONTEXT`].
///
/// | Supplier answer | `required` | `optional` |
/// |---|---|---|
/// | authenticated | bound | bound |
/// | anonymous | `auth.anonymous` | unchanged |
/// | `auth.missing` / `auth.anonymous` | propagated | unchanged |
/// | other violations | propagated | propagated |
///
/// Panics in the supplier or the extractor become `auth.supplier.failed` and
/// `auth.ctx.extract.failed`.
pub fn bind_auth_context_with<T, S, X>(
    condition: AuthCondition,
    supplier: S,
    extractor: X,
) -> impl BehaviorStep<T>
where
    S: AuthenticationSupplier,
    X: Fn(&Authentication) -> AuthContext + Send + Sync,
{
    step_fn(BIND_STEP, move |ctx: StepContext<T>| {
        let supplied = match boundary::guard_panic(|| supplier.authentication()) {
            Ok(supplied) => supplied,
            Err(fault) => return Validation::invalid(supplier_failure(&fault)),
        };

        let auth = match supplied {
            Validation::Valid(auth) if auth.is_anonymous() => {
                if condition.is_required() {
                    tracing::debug!(%condition, "anonymous caller rejected");
                    return Validation::invalid(codes::anonymous());
                }
                tracing::debug!(%condition, "anonymous caller left unbound");
                return Validation::valid(ctx);
            }
            Validation::Valid(auth) => auth,
            Validation::Invalid(violations)
                if !condition.is_required() && codes::is_absent(&violations) =>
            {
                tracing::debug!(%condition, "no authentication, context left unbound");
                return Validation::valid(ctx);
            }
            Validation::Invalid(violations) => return Validation::invalid(violations),
        };

        match boundary::guard_panic(|| extractor(&auth)) {
            Ok(auth_context) => {
                tracing::debug!(
                    principal_id = %auth_context.principal_id,
                    roles = auth_context.roles.len(),
                    "auth context bound"
                );
                Validation::valid(ctx.with_attribute(&keys::AUTH_CONTEXT, auth_context))
            }
            Err(fault) => {
                tracing::warn!(fault = %fault, "auth context extraction failed");
                Validation::invalid(Violations::violate(
                    codes::CONTEXT_EXTRACT_FAILED,
                    format!("Auth context extraction failed: {fault}"),
                ))
            }
        }
    })
}

/// Resolves entitlements for the bound principal and stores them under
/// [`keys::ENTITLEMENTS`].
///
/// Without a bound [`AuthContext`] the step fails with
/// `auth-binding.unauthorized` under `required` and is a no-op under
/// `optional`. Resolver denials are returned unchanged; a resolver panic
/// becomes `auth-binding.entitlements.failed`.
pub fn resolve_entitlements<T, R>(condition: AuthCondition, resolver: R) -> impl BehaviorStep<T>
where
    R: EntitlementsResolver,
{
    step_fn(RESOLVE_STEP, move |ctx: StepContext<T>| {
        let Some(auth_context) = ctx.find_attribute(&keys::AUTH_CONTEXT) else {
            if condition.is_required() {
                tracing::debug!(%condition, "no auth context to resolve entitlements for");
                return Validation::invalid(codes::unauthorized());
            }
            return Validation::valid(ctx);
        };
        let principal_id = auth_context.principal_id.as_str();

        let resolved = match boundary::guard_panic(|| resolver.resolve(principal_id)) {
            Ok(resolved) => resolved,
            Err(fault) => {
                tracing::warn!(principal_id, fault = %fault, "entitlements resolver failed");
                record_entitlements_resolution(false);
                return Validation::invalid(Violations::violate(
                    codes::ENTITLEMENTS_FAILED,
                    format!("Entitlements resolution failed: {fault}"),
                ));
            }
        };

        record_entitlements_resolution(resolved.is_valid());
        match resolved {
            Validation::Valid(entitlements) => {
                tracing::debug!(
                    principal_id,
                    roles = entitlements.roles.len(),
                    "entitlements resolved"
                );
                Validation::valid(ctx.with_attribute(&keys::ENTITLEMENTS, entitlements))
            }
            Validation::Invalid(violations) => {
                tracing::debug!(
                    principal_id,
                    violation = %violations.first().name(),
                    "entitlements denied"
                );
                Validation::invalid(violations)
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authentication::UserDetails;
    use crate::entitlements::Entitlements;
    use crate::resolvers::EntitlementsResolvers;
    use std::collections::BTreeSet;

    fn supply(auth: Authentication) -> impl AuthenticationSupplier {
        move || Validation::<Violations, Authentication>::valid(auth.clone())
    }

    fn supply_missing() -> impl AuthenticationSupplier {
        || Validation::<Violations, Authentication>::invalid(codes::missing())
    }

    fn bound_context() -> StepContext<()> {
        let auth = Authentication::user(UserDetails::new("testUser"), ["ROLE_user"]);
        bind_auth_context(AuthCondition::required(), supply(auth))
            .execute(StepContext::new(()))
            .expect_valid("authenticated caller binds")
    }

    #[test]
    fn test_bind_authenticated() {
        let ctx = bound_context();
        let auth_context = ctx
            .find_attribute(&keys::AUTH_CONTEXT)
            .expect("auth context stored");
        assert_eq!(auth_context.principal_id, "testUser");
        assert_eq!(auth_context.roles, BTreeSet::from(["user".to_string()]));
    }

    #[test]
    fn test_required_rejects_missing() {
        let step = bind_auth_context(AuthCondition::required(), supply_missing());
        let violations = step.execute(StepContext::new(())).expect_invalid("missing");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations.first().name(), codes::AUTH_MISSING);
    }

    #[test]
    fn test_required_rejects_anonymous() {
        let step = bind_auth_context(AuthCondition::required(), supply(Authentication::anonymous()));
        let violations = step.execute(StepContext::new(())).expect_invalid("anonymous");
        assert_eq!(violations.first().name(), codes::AUTH_ANONYMOUS);
    }

    #[test]
    fn test_optional_tolerates_absence() {
        let input = StepContext::new(7_u32);
        let names_before = input.attribute_names();

        let missing = bind_auth_context::<u32, _>(AuthCondition::optional(), supply_missing());
        let anonymous =
            bind_auth_context::<u32, _>(AuthCondition::optional(), supply(Authentication::anonymous()));

        for out in [missing.execute(input.clone()), anonymous.execute(input.clone())] {
            let out = out.expect_valid("absence is tolerated");
            assert_eq!(*out.payload(), 7);
            assert_eq!(out.attribute_names(), names_before);
            assert!(!out.has_attribute(&keys::AUTH_CONTEXT));
        }
    }

    #[test]
    fn test_optional_propagates_other_failures() {
        let step = bind_auth_context(AuthCondition::optional(), || {
            Validation::<Violations, Authentication>::invalid(Violations::violate(
                "auth.token.expired",
                "token expired",
            ))
        });
        let violations = step.execute(StepContext::new(())).expect_invalid("expired");
        assert_eq!(violations.first().name(), "auth.token.expired");
    }

    #[test]
    fn test_supplier_panic_is_contained() {
        let step = bind_auth_context(AuthCondition::required(), || -> Validation<
            Violations,
            Authentication,
        > { panic!("session store unavailable") });
        let violations = step.execute(StepContext::new(())).expect_invalid("panic contained");
        assert_eq!(violations.first().name(), codes::SUPPLIER_FAILED);
        assert_eq!(
            violations.first().message(),
            "Authentication supplier failed: panic: session store unavailable"
        );
    }

    #[test]
    fn test_custom_extractor() {
        let auth = Authentication::authenticated("svc", ["SCOPE_batch"]);
        let step = bind_auth_context_with(AuthCondition::required(), supply(auth), |a| {
            let mut ctx = AuthContext::from_authentication(a);
            ctx.roles.insert("service".to_string());
            ctx
        });
        let out = step.execute(StepContext::new(())).expect_valid("binds");
        let bound = out.find_attribute(&keys::AUTH_CONTEXT).expect("bound");
        assert!(bound.has_role("service"));
        assert!(bound.role_groups.contains("batch"));
    }

    #[test]
    fn test_resolve_stores_entitlements() {
        let step = resolve_entitlements(
            AuthCondition::required(),
            EntitlementsResolvers::fixed(["admin", "user"], ["adminGroup"], ["FORM_REVIEW_READ"]),
        );
        let out = step.execute(bound_context()).expect_valid("fixed grants");
        let entitlements = out.find_attribute(&keys::ENTITLEMENTS).expect("stored");
        assert!(entitlements.contains_role("admin"));
        assert!(entitlements.in_group("adminGroup"));
    }

    #[test]
    fn test_resolve_deny_all() {
        let step = resolve_entitlements(AuthCondition::required(), EntitlementsResolvers::deny_all());
        let violations = step.execute(bound_context()).expect_invalid("denied");
        assert_eq!(violations.first().name(), codes::ENTITLEMENTS_DENY);
    }

    #[test]
    fn test_resolve_without_binding() {
        let resolver = EntitlementsResolvers::grant(Entitlements::default());

        let required = resolve_entitlements(AuthCondition::required(), resolver.clone());
        let violations = required
            .execute(StepContext::new(()))
            .expect_invalid("nothing bound");
        assert_eq!(violations.first().name(), codes::UNAUTHORIZED);

        let optional = resolve_entitlements(AuthCondition::optional(), resolver);
        let out = optional.execute(StepContext::new(())).expect_valid("no-op");
        assert!(!out.has_attribute(&keys::ENTITLEMENTS));
    }

    #[test]
    fn test_resolver_receives_principal_id() {
        let step = resolve_entitlements(AuthCondition::required(), |pid: &str| {
            Validation::<Violations, Entitlements>::valid(Entitlements::new(
                [pid],
                Vec::<String>::new(),
                Vec::<String>::new(),
            ))
        });
        let out = step.execute(bound_context()).expect_valid("grants");
        let entitlements = out.find_attribute(&keys::ENTITLEMENTS).expect("stored");
        assert!(entitlements.contains_role("testUser"));
    }

    #[test]
    fn test_resolver_panic_is_contained() {
        let step = resolve_entitlements(AuthCondition::required(), |_: &str| -> Validation<
            Violations,
            Entitlements,
        > { panic!("directory timeout") });
        let violations = step.execute(bound_context()).expect_invalid("panic contained");
        assert_eq!(violations.first().name(), codes::ENTITLEMENTS_FAILED);
    }
}
