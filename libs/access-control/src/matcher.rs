//! The authorization matcher.
//!
//! [`AccessMatcher`] compiles a [`SecurityConstraints`] ruleset once and
//! evaluates requests against it:
//!
//! 1. Public constraints are scanned in declaration order; a pattern match
//!    with the method included returns [`Decision::Public`] immediately.
//! 2. Deny constraints are scanned in declaration order; the first pattern
//!    match decides: [`Decision::Allow`] if any caller role grants the
//!    method, [`Decision::Deny`] otherwise.
//! 3. When no pattern matches at all the decision is [`Decision::Deny`] —
//!    only explicitly public and explicitly granted paths are reachable.

use std::collections::BTreeMap;

use http::Method;
use thiserror::Error;

use crate::rules::SecurityConstraints;

/// Errors raised while compiling a ruleset into an [`AccessMatcher`].
#[derive(Debug, Error)]
pub enum AccessRuleError {
    /// A rule's path pattern is not a valid glob.
    #[error("invalid path pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// The outcome of an authorization check.
///
/// Denial is a normal return value, not an error: callers map it to a
/// response, they never `?`-propagate it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The request matched a public constraint; no caller identity required.
    Public,
    /// A deny constraint matched and one of the caller's roles grants the
    /// method. Implies an authenticated caller was checked.
    Allow,
    /// A deny constraint matched without a grant, or nothing matched.
    Deny,
}

/// A single request to authorize.
#[derive(Debug, Clone)]
pub struct AccessRequest<'a> {
    /// Tenant the request targets. Not consulted by the matcher itself
    /// (the ruleset is process-global); carried for tracing.
    pub tenant: &'a str,
    /// Request path, e.g. `/credentials/me`.
    pub path: &'a str,
    /// Request method.
    pub method: &'a Method,
    /// Roles asserted for the caller. Empty for anonymous callers.
    pub roles: &'a [String],
}

/// A rule pattern compiled for matching.
///
/// A pattern matches a path when the path equals it, falls under it as a
/// path prefix (boundary at `/`), or matches it as a glob.
#[derive(Debug, Clone)]
struct CompiledPattern {
    raw: String,
    glob: glob::Pattern,
}

impl CompiledPattern {
    fn compile(raw: &str) -> Result<Self, AccessRuleError> {
        let glob = glob::Pattern::new(raw).map_err(|e| AccessRuleError::InvalidPattern {
            pattern: raw.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            raw: raw.to_owned(),
            glob,
        })
    }

    fn matches(&self, path: &str) -> bool {
        if path == self.raw || self.glob.matches(path) {
            return true;
        }
        // Prefix match with a path-segment boundary: "/validate" covers
        // "/validate/batch" but not "/validated".
        path.strip_prefix(&self.raw)
            .is_some_and(|rest| self.raw.ends_with('/') || rest.starts_with('/'))
    }
}

#[derive(Debug, Clone)]
struct CompiledPermit {
    pattern: CompiledPattern,
    methods: Vec<String>,
}

#[derive(Debug, Clone)]
struct CompiledDeny {
    pattern: CompiledPattern,
    role_methods: BTreeMap<String, Vec<String>>,
}

fn contains_method(methods: &[String], method: &Method) -> bool {
    methods
        .iter()
        .any(|m| m.eq_ignore_ascii_case(method.as_str()))
}

/// Compiled ruleset, safe for unlimited concurrent use.
#[derive(Debug, Clone)]
pub struct AccessMatcher {
    public_rules: Vec<CompiledPermit>,
    deny_rules: Vec<CompiledDeny>,
}

impl AccessMatcher {
    /// Compile a ruleset. Rule order is kept exactly as declared.
    ///
    /// # Errors
    ///
    /// Returns [`AccessRuleError::InvalidPattern`] when any rule carries a
    /// pattern that does not compile as a glob.
    pub fn new(rules: &SecurityConstraints) -> Result<Self, AccessRuleError> {
        let public_rules = rules
            .public_constraints
            .iter()
            .map(|r| {
                Ok(CompiledPermit {
                    pattern: CompiledPattern::compile(&r.pattern)?,
                    methods: r.methods.clone(),
                })
            })
            .collect::<Result<Vec<_>, AccessRuleError>>()?;

        let deny_rules = rules
            .constraints
            .iter()
            .map(|r| {
                Ok(CompiledDeny {
                    pattern: CompiledPattern::compile(&r.pattern)?,
                    role_methods: r.role_methods.clone(),
                })
            })
            .collect::<Result<Vec<_>, AccessRuleError>>()?;

        Ok(Self {
            public_rules,
            deny_rules,
        })
    }

    /// Evaluate a request against the compiled ruleset.
    #[must_use]
    pub fn authorize(&self, request: &AccessRequest<'_>) -> Decision {
        for rule in &self.public_rules {
            if rule.pattern.matches(request.path) && contains_method(&rule.methods, request.method)
            {
                return Decision::Public;
            }
        }

        for rule in &self.deny_rules {
            if rule.pattern.matches(request.path) {
                let granted = request.roles.iter().any(|role| {
                    rule.role_methods
                        .get(role)
                        .is_some_and(|methods| contains_method(methods, request.method))
                });
                return if granted {
                    Decision::Allow
                } else {
                    Decision::Deny
                };
            }
        }

        Decision::Deny
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{DenyRule, PermitRule};

    fn deny(pattern: &str, role: &str, methods: &[&str]) -> DenyRule {
        let mut role_methods = BTreeMap::new();
        role_methods.insert(
            role.to_owned(),
            methods.iter().map(|m| (*m).to_owned()).collect(),
        );
        DenyRule {
            pattern: pattern.to_owned(),
            role_methods,
        }
    }

    fn permit(pattern: &str, methods: &[&str]) -> PermitRule {
        PermitRule {
            pattern: pattern.to_owned(),
            methods: methods.iter().map(|m| (*m).to_owned()).collect(),
        }
    }

    fn matcher(rules: SecurityConstraints) -> AccessMatcher {
        AccessMatcher::new(&rules).unwrap()
    }

    fn request<'a>(path: &'a str, method: &'a Method, roles: &'a [String]) -> AccessRequest<'a> {
        AccessRequest {
            tenant: "zup",
            path,
            method,
            roles,
        }
    }

    fn roles(names: &[&str]) -> Vec<String> {
        names.iter().map(|r| (*r).to_owned()).collect()
    }

    // ==================== reference ruleset ====================

    fn reference_matcher() -> AccessMatcher {
        matcher(SecurityConstraints {
            constraints: vec![deny("/validate", "admin", &["POST", "GET"])],
            public_constraints: vec![permit("/public", &["POST", "GET"])],
        })
    }

    #[test]
    fn public_path_is_public_for_any_role() {
        let m = reference_matcher();
        let anyone = roles(&["anyone"]);

        assert_eq!(
            m.authorize(&request("/public", &Method::GET, &anyone)),
            Decision::Public
        );
        // Even an empty role set is public.
        assert_eq!(
            m.authorize(&request("/public", &Method::POST, &[])),
            Decision::Public
        );
    }

    #[test]
    fn granted_role_is_allowed() {
        let m = reference_matcher();
        let admin = roles(&["admin"]);

        assert_eq!(
            m.authorize(&request("/validate", &Method::POST, &admin)),
            Decision::Allow
        );
        assert_eq!(
            m.authorize(&request("/validate", &Method::GET, &admin)),
            Decision::Allow
        );
    }

    #[test]
    fn ungranted_role_is_denied() {
        let m = reference_matcher();
        let user = roles(&["user"]);

        assert_eq!(
            m.authorize(&request("/validate", &Method::POST, &user)),
            Decision::Deny
        );
    }

    #[test]
    fn granted_role_with_wrong_method_is_denied() {
        let m = reference_matcher();
        let admin = roles(&["admin"]);

        assert_eq!(
            m.authorize(&request("/validate", &Method::DELETE, &admin)),
            Decision::Deny
        );
    }

    #[test]
    fn public_path_with_method_outside_set_falls_through_to_default() {
        let m = reference_matcher();
        let anyone = roles(&["anyone"]);

        // DELETE is not in the public method set and no deny rule matches
        // "/public", so the fixed default applies.
        assert_eq!(
            m.authorize(&request("/public", &Method::DELETE, &anyone)),
            Decision::Deny
        );
    }

    // ==================== default policy ====================

    #[test]
    fn unmatched_path_is_denied_by_default() {
        let m = reference_matcher();
        let admin = roles(&["admin"]);

        assert_eq!(
            m.authorize(&request("/unmapped", &Method::GET, &admin)),
            Decision::Deny
        );
        assert_eq!(
            m.authorize(&request("/unmapped", &Method::GET, &[])),
            Decision::Deny
        );
    }

    #[test]
    fn empty_ruleset_denies_everything() {
        let m = matcher(SecurityConstraints::default());

        for method in [Method::GET, Method::POST, Method::DELETE] {
            assert_eq!(
                m.authorize(&request("/anything", &method, &roles(&["admin"]))),
                Decision::Deny
            );
        }
    }

    // ==================== ordering ====================

    #[test]
    fn first_matching_deny_rule_wins() {
        // Both rules match "/api/thing"; the first grants only "ops", so an
        // "admin" caller is denied even though the second rule would allow.
        let m = matcher(SecurityConstraints {
            constraints: vec![
                deny("/api", "ops", &["GET"]),
                deny("/api/thing", "admin", &["GET"]),
            ],
            public_constraints: vec![],
        });

        assert_eq!(
            m.authorize(&request("/api/thing", &Method::GET, &roles(&["admin"]))),
            Decision::Deny
        );
        assert_eq!(
            m.authorize(&request("/api/thing", &Method::GET, &roles(&["ops"]))),
            Decision::Allow
        );
    }

    #[test]
    fn public_rules_short_circuit_deny_rules() {
        // The same path appears in both lists; public wins regardless of role.
        let m = matcher(SecurityConstraints {
            constraints: vec![deny("/docs", "admin", &["GET"])],
            public_constraints: vec![permit("/docs", &["GET"])],
        });

        assert_eq!(
            m.authorize(&request("/docs", &Method::GET, &[])),
            Decision::Public
        );
    }

    #[test]
    fn first_matching_public_rule_wins() {
        let m = matcher(SecurityConstraints {
            constraints: vec![],
            public_constraints: vec![permit("/p", &["GET"]), permit("/p", &["POST"])],
        });

        // Second rule still reachable for POST: the first match is per
        // (pattern, method), not per pattern alone.
        assert_eq!(
            m.authorize(&request("/p", &Method::POST, &[])),
            Decision::Public
        );
    }

    // ==================== roles ====================

    #[test]
    fn any_granting_role_allows() {
        let mut role_methods = BTreeMap::new();
        role_methods.insert("admin".to_owned(), vec!["POST".to_owned()]);
        role_methods.insert("user".to_owned(), vec!["GET".to_owned()]);
        let m = matcher(SecurityConstraints {
            constraints: vec![DenyRule {
                pattern: "/validate".to_owned(),
                role_methods,
            }],
            public_constraints: vec![],
        });

        // Caller holds both roles; "user" grants GET.
        let both = roles(&["guest", "user"]);
        assert_eq!(
            m.authorize(&request("/validate", &Method::GET, &both)),
            Decision::Allow
        );

        // Neither role grants DELETE.
        assert_eq!(
            m.authorize(&request("/validate", &Method::DELETE, &both)),
            Decision::Deny
        );
    }

    #[test]
    fn anonymous_caller_is_denied_on_deny_rules() {
        let m = reference_matcher();
        assert_eq!(
            m.authorize(&request("/validate", &Method::GET, &[])),
            Decision::Deny
        );
    }

    // ==================== pattern semantics ====================

    #[test]
    fn prefix_match_respects_segment_boundary() {
        let m = reference_matcher();
        let admin = roles(&["admin"]);

        assert_eq!(
            m.authorize(&request("/validate/batch", &Method::GET, &admin)),
            Decision::Allow
        );
        // "/validated" is not under "/validate".
        assert_eq!(
            m.authorize(&request("/validated", &Method::GET, &admin)),
            Decision::Deny
        );
    }

    #[test]
    fn glob_patterns_match() {
        let m = matcher(SecurityConstraints {
            constraints: vec![deny("/tenants/*/tree", "cli", &["GET"])],
            public_constraints: vec![],
        });
        let cli = roles(&["cli"]);

        assert_eq!(
            m.authorize(&request("/tenants/zup/tree", &Method::GET, &cli)),
            Decision::Allow
        );
        assert_eq!(
            m.authorize(&request("/tenants/zup/tree", &Method::GET, &roles(&["x"]))),
            Decision::Deny
        );
    }

    #[test]
    fn method_comparison_is_case_insensitive() {
        let m = matcher(SecurityConstraints {
            constraints: vec![deny("/validate", "admin", &["post"])],
            public_constraints: vec![permit("/public", &["get"])],
        });

        assert_eq!(
            m.authorize(&request("/public", &Method::GET, &[])),
            Decision::Public
        );
        assert_eq!(
            m.authorize(&request("/validate", &Method::POST, &roles(&["admin"]))),
            Decision::Allow
        );
    }

    #[test]
    fn invalid_glob_fails_compilation() {
        let rules = SecurityConstraints {
            constraints: vec![deny("/bad/[pattern", "admin", &["GET"])],
            public_constraints: vec![],
        };

        match AccessMatcher::new(&rules) {
            Err(AccessRuleError::InvalidPattern { pattern, .. }) => {
                assert_eq!(pattern, "/bad/[pattern");
            }
            Ok(_) => panic!("expected pattern compilation to fail"),
        }
    }
}
