//! Flows whose authentication steps come from a [`PipelineConfig`].

use ariadne_auth::{bind_auth_context, resolve_entitlements, AuthenticationSupplier, SharedResolver};
use ariadne_config::{ConfigError, PipelineConfig};
use ariadne_flow::FlowBuilder;

/// Starts a flow that binds the caller and resolves their entitlements.
///
/// The returned builder already holds the bind and resolve steps, both
/// running under the configured [`AuthCondition`](ariadne_auth::AuthCondition).
/// `external` is the host's entitlement lookup, needed only when the
/// configuration selects `external` mode.
///
/// # Errors
///
/// Returns `ConfigError` if the configuration is invalid or its resolver
/// cannot be built.
///
/// # Example
///
/// ```
/// use ariadne::prelude::*;
/// use ariadne::secured_flow;
///
/// let supplier = || {
///     Validation::<Violations, _>::valid(Authentication::authenticated("alice", ["ROLE_user"]))
/// };
///
/// let flow = secured_flow::<(), _>("whoami", &PipelineConfig::development(), supplier, None)
///     .expect("development preset is valid")
///     .build();
///
/// let ctx = flow.run_payload(()).expect_valid("alice is bound");
/// assert!(ctx.find_attribute(&auth_keys::ENTITLEMENTS).unwrap().contains_role("user"));
/// ```
pub fn secured_flow<T, S>(
    name: impl Into<String>,
    config: &PipelineConfig,
    supplier: S,
    external: Option<SharedResolver>,
) -> Result<FlowBuilder<T>, ConfigError>
where
    T: 'static,
    S: AuthenticationSupplier + 'static,
{
    config.validate()?;

    let name = name.into();
    let condition = config.auth.condition();
    let resolver = config.entitlements.build_resolver(external)?;

    tracing::debug!(
        flow = %name,
        %condition,
        mode = ?config.entitlements.mode,
        "secured flow assembled"
    );

    Ok(FlowBuilder::new(name)
        .step(bind_auth_context(condition, supplier))
        .step(resolve_entitlements(condition, resolver)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ariadne_auth::Authentication;
    use ariadne_config::EntitlementsMode;
    use ariadne_core::{Validation, Violations};

    fn alice() -> Validation<Violations, Authentication> {
        Validation::valid(Authentication::authenticated("alice", ["ROLE_user"]))
    }

    #[test]
    fn test_external_mode_needs_resolver() {
        let result = secured_flow::<(), _>("f", &PipelineConfig::production(), alice, None);
        assert!(matches!(result, Err(ConfigError::MissingField { .. })));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = PipelineConfig::default();
        config.telemetry.service_name = String::new();
        assert!(secured_flow::<(), _>("f", &config, alice, None).is_err());
    }

    #[test]
    fn test_steps_in_order() {
        let mut config = PipelineConfig::default();
        config.entitlements.mode = EntitlementsMode::Fixed;
        let flow = secured_flow::<(), _>("f", &config, alice, None)
            .expect("valid config")
            .build();
        assert_eq!(
            flow.step_names(),
            [ariadne_auth::BIND_STEP, ariadne_auth::RESOLVE_STEP]
        );
    }
}
