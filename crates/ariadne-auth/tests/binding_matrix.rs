//! Every supplier answer under both binding conditions, and the cached
//! resolver shared between threads.

use ariadne_auth::{
    bind_auth_context, codes, keys, resolve_entitlements, AuthCondition, Authentication,
    CacheConfig, Entitlements, EntitlementsResolver, EntitlementsResolvers, UserDetails,
};
use ariadne_core::{StepContext, Validation, Violations};
use ariadne_flow::{BehaviorStep, Flow};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
enum Answer {
    User,
    Anonymous,
    Missing,
    Broken,
}

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Bound,
    Unchanged,
    Failed(String),
}

fn supplier(answer: Answer) -> impl Fn() -> Validation<Violations, Authentication> + Send + Sync {
    move || match answer {
        Answer::User => Validation::valid(Authentication::user(
            UserDetails::new("testUser"),
            ["ROLE_user", "SCOPE_reviewers"],
        )),
        Answer::Anonymous => Validation::valid(Authentication::anonymous()),
        Answer::Missing => Validation::invalid(codes::missing()),
        Answer::Broken => Validation::invalid(Violations::violate("directory.down", "unreachable")),
    }
}

fn outcome(condition: AuthCondition, answer: Answer) -> Outcome {
    let step = bind_auth_context::<(), _>(condition, supplier(answer));
    match step.execute(StepContext::new(())) {
        Validation::Valid(ctx) if ctx.has_attribute(&keys::AUTH_CONTEXT) => Outcome::Bound,
        Validation::Valid(ctx) => {
            assert!(ctx.attribute_names().is_empty());
            Outcome::Unchanged
        }
        Validation::Invalid(violations) => Outcome::Failed(violations.first().name().to_string()),
    }
}

#[test]
fn test_binding_matrix() {
    let failed = |name: &str| Outcome::Failed(name.to_string());
    let cases = [
        (AuthCondition::Required, Answer::User, Outcome::Bound),
        (AuthCondition::Required, Answer::Anonymous, failed(codes::AUTH_ANONYMOUS)),
        (AuthCondition::Required, Answer::Missing, failed(codes::AUTH_MISSING)),
        (AuthCondition::Required, Answer::Broken, failed("directory.down")),
        (AuthCondition::Optional, Answer::User, Outcome::Bound),
        (AuthCondition::Optional, Answer::Anonymous, Outcome::Unchanged),
        (AuthCondition::Optional, Answer::Missing, Outcome::Unchanged),
        (AuthCondition::Optional, Answer::Broken, failed("directory.down")),
    ];

    for (condition, answer, expected) in cases {
        assert_eq!(
            outcome(condition, answer),
            expected,
            "{condition} with {answer:?}"
        );
    }
}

#[test]
fn test_role_groups_come_from_scopes() {
    let flow = Flow::builder("groups")
        .step(bind_auth_context(AuthCondition::required(), supplier(Answer::User)))
        .build();
    let ctx = flow.run_payload(()).expect_valid("user binds");
    let auth = ctx.find_attribute(&keys::AUTH_CONTEXT).expect("bound");
    assert!(auth.has_role("user"));
    assert!(auth.role_groups.contains("reviewers"));
    assert!(auth.authorities.contains("SCOPE_reviewers"));
}

#[test]
fn test_resolve_without_bind() {
    let resolve = resolve_entitlements::<(), _>(
        AuthCondition::required(),
        EntitlementsResolvers::fixed(["user"], ["g"], ["READ"]),
    );
    let violations = resolve
        .execute(StepContext::new(()))
        .expect_invalid("nothing bound");
    assert_eq!(violations.first().name(), codes::UNAUTHORIZED);

    let resolve = resolve_entitlements::<(), _>(
        AuthCondition::optional(),
        EntitlementsResolvers::fixed(["user"], ["g"], ["READ"]),
    );
    let ctx = resolve
        .execute(StepContext::new(()))
        .expect_valid("optional skips");
    assert!(!ctx.has_attribute(&keys::ENTITLEMENTS));
}

#[test]
fn test_cached_resolver_shared_across_threads() {
    let lookups = Arc::new(AtomicUsize::new(0));
    let source = {
        let lookups = Arc::clone(&lookups);
        move |principal_id: &str| {
            lookups.fetch_add(1, Ordering::SeqCst);
            Validation::<Violations, Entitlements>::valid(Entitlements::new(
                [principal_id],
                ["staff"],
                ["READ"],
            ))
        }
    };
    let cache = Arc::new(EntitlementsResolvers::cached(source, CacheConfig::default()));

    std::thread::scope(|s| {
        for worker in 0..8 {
            let cache = Arc::clone(&cache);
            s.spawn(move || {
                for round in 0..50 {
                    let principal = format!("user-{}", (worker + round) % 4);
                    let granted = cache.resolve(&principal).expect_valid("source grants");
                    assert!(granted.contains_role(&principal));
                }
            });
        }
    });

    let stats = cache.stats();
    assert_eq!(stats.size, 4);
    assert_eq!(stats.hits + stats.misses, 400);
    // Racing misses may each reach the source, but never more than once per
    // thread and principal.
    let reached = lookups.load(Ordering::SeqCst);
    assert!((4..=32).contains(&reached), "source reached {reached} times");
}
