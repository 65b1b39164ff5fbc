//! Failure classification by violation name.
//!
//! Violation names are classified by prefix, in this order:
//!
//! | Prefix | Class | Status |
//! |---|---|---|
//! | `auth.`, `auth-binding.unauthorized` | [`FailureClass::Authentication`] | 401 |
//! | `auth-binding.entitlements.` | [`FailureClass::Authorization`] | 403 |
//! | `path.`, `query.`, `body.` | [`FailureClass::MalformedRequest`] | 400 |
//! | anything else | [`FailureClass::Unprocessable`] | 422 |
//!
//! A collection is classified by the first rule any of its names matches.

use crate::violation::{Violation, Violations};
use http::StatusCode;
use serde::{Deserialize, Serialize};

const AUTHENTICATION_PREFIXES: &[&str] = &["auth.", "auth-binding.unauthorized"];
const AUTHORIZATION_PREFIXES: &[&str] = &["auth-binding.entitlements."];
const MALFORMED_PREFIXES: &[&str] = &["path.", "query.", "body."];

/// Coarse category of a failed flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    /// The caller is not authenticated.
    Authentication,
    /// The caller is authenticated but not entitled.
    Authorization,
    /// The request itself is malformed.
    MalformedRequest,
    /// Anything else, including failures of the business operation.
    Unprocessable,
}

impl FailureClass {
    /// Classifies a set of violations.
    #[must_use]
    pub fn of(violations: &Violations) -> Self {
        let any_prefix = |prefixes: &[&str]| {
            violations.names_any_match(|name| prefixes.iter().any(|p| name.starts_with(p)))
        };
        if any_prefix(AUTHENTICATION_PREFIXES) {
            Self::Authentication
        } else if any_prefix(AUTHORIZATION_PREFIXES) {
            Self::Authorization
        } else if any_prefix(MALFORMED_PREFIXES) {
            Self::MalformedRequest
        } else {
            Self::Unprocessable
        }
    }

    /// Classifies a single violation name.
    #[must_use]
    pub fn of_name(name: &str) -> Self {
        Self::of(&Violations::single(Violation::new(name, "")))
    }

    /// Returns the HTTP status code for this class.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Authentication => StatusCode::UNAUTHORIZED,
            Self::Authorization => StatusCode::FORBIDDEN,
            Self::MalformedRequest => StatusCode::BAD_REQUEST,
            Self::Unprocessable => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    /// Returns the label used in logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Authentication => "authentication",
            Self::Authorization => "authorization",
            Self::MalformedRequest => "malformed_request",
            Self::Unprocessable => "unprocessable",
        }
    }

    const fn title(self) -> &'static str {
        match self {
            Self::Authentication => "Unauthorized",
            Self::Authorization => "Forbidden",
            Self::MalformedRequest => "Bad Request",
            Self::Unprocessable => "Unprocessable Entity",
        }
    }
}

impl std::fmt::Display for FailureClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A problem-details body describing a failed flow.
///
/// Serializes to the shape a presentation layer can return directly:
///
/// ```json
/// {
///   "title": "Unauthorized",
///   "status": 401,
///   "detail": "authentication is required",
///   "violations": [{ "name": "auth.missing", "message": "authentication is required" }]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemDetails {
    /// Short summary of the failure class.
    pub title: String,
    /// HTTP status code.
    pub status: u16,
    /// All violation messages joined.
    pub detail: String,
    /// The violations themselves.
    pub violations: Violations,
}

impl ProblemDetails {
    /// Builds problem details for `violations`.
    #[must_use]
    pub fn from_violations(violations: Violations) -> Self {
        let class = FailureClass::of(&violations);
        Self {
            title: class.title().to_string(),
            status: class.status_code().as_u16(),
            detail: violations.collect_messages(),
            violations,
        }
    }

    /// Returns the failure class.
    #[must_use]
    pub fn class(&self) -> FailureClass {
        FailureClass::of(&self.violations)
    }
}

impl From<Violations> for ProblemDetails {
    fn from(violations: Violations) -> Self {
        Self::from_violations(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_rules() {
        assert_eq!(FailureClass::of_name("auth.missing"), FailureClass::Authentication);
        assert_eq!(FailureClass::of_name("auth.anonymous"), FailureClass::Authentication);
        assert_eq!(
            FailureClass::of_name("auth-binding.unauthorized"),
            FailureClass::Authentication
        );
        assert_eq!(
            FailureClass::of_name("auth-binding.entitlements.deny"),
            FailureClass::Authorization
        );
        assert_eq!(FailureClass::of_name("path.id"), FailureClass::MalformedRequest);
        assert_eq!(FailureClass::of_name("query.page"), FailureClass::MalformedRequest);
        assert_eq!(FailureClass::of_name("body.keyword"), FailureClass::MalformedRequest);
        assert_eq!(FailureClass::of_name("service.step.failed"), FailureClass::Unprocessable);
    }

    #[test]
    fn test_authentication_takes_precedence() {
        let v = Violations::of(
            Violation::new("body.keyword", "missing"),
            [Violation::new("auth.missing", "no auth")],
        );
        assert_eq!(FailureClass::of(&v), FailureClass::Authentication);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(FailureClass::Authentication.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(FailureClass::Authorization.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(FailureClass::MalformedRequest.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            FailureClass::Unprocessable.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_problem_details_json() {
        let problem = ProblemDetails::from(Violations::violate(
            "auth-binding.entitlements.deny",
            "entitlements denied",
        ));
        assert_eq!(problem.class(), FailureClass::Authorization);

        let json = serde_json::to_value(&problem).expect("serializes");
        assert_eq!(json["title"], "Forbidden");
        assert_eq!(json["status"], 403);
        assert_eq!(json["detail"], "entitlements denied");
        assert_eq!(json["violations"][0]["name"], "auth-binding.entitlements.deny");
    }
}
