//! Security constraint types.
//!
//! Constraints come in two flavors: [`PermitRule`] exempts matching requests
//! from authorization entirely, while [`DenyRule`] grants access only to the
//! roles it lists. Both lists are ordered; declaration order is evaluation
//! order and must be preserved, so the ruleset is modelled as two `Vec`s
//! rather than any sorted or merged collection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A rule exempting matching requests from authorization entirely.
///
/// No role is required: a request whose path matches `pattern` and whose
/// method is in `methods` proceeds as public.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PermitRule {
    /// Path pattern, matched as an exact path, a path prefix, or a glob.
    pub pattern: String,
    /// HTTP methods the exemption applies to.
    pub methods: Vec<String>,
}

/// A rule granting specific roles specific methods on a path pattern.
///
/// Absence of a grant is a denial: when the pattern matches and no caller
/// role maps to the request method, the request is denied.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DenyRule {
    /// Path pattern, matched as an exact path, a path prefix, or a glob.
    pub pattern: String,
    /// Mapping from role name to the HTTP methods that role may use.
    pub role_methods: BTreeMap<String, Vec<String>>,
}

/// The full security ruleset: deny constraints plus public constraints.
///
/// Evaluation order is fixed: public constraints are scanned first and
/// short-circuit, then deny constraints; within each list the first
/// pattern match wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecurityConstraints {
    /// Ordered deny constraints.
    #[serde(default)]
    pub constraints: Vec<DenyRule>,
    /// Ordered public constraints.
    #[serde(default)]
    pub public_constraints: Vec<PermitRule>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ruleset_deserializes_from_config_shape() {
        let yaml_as_json = serde_json::json!({
            "constraints": [{
                "pattern": "/validate",
                "role_methods": { "admin": ["POST", "GET"] }
            }],
            "public_constraints": [{
                "pattern": "/public",
                "methods": ["POST", "GET"]
            }]
        });

        let rules: SecurityConstraints = serde_json::from_value(yaml_as_json).unwrap();
        assert_eq!(rules.constraints.len(), 1);
        assert_eq!(rules.constraints[0].pattern, "/validate");
        assert_eq!(
            rules.constraints[0].role_methods["admin"],
            vec!["POST", "GET"]
        );
        assert_eq!(rules.public_constraints.len(), 1);
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let rules: SecurityConstraints = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(rules.constraints.is_empty());
        assert!(rules.public_constraints.is_empty());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: Result<SecurityConstraints, _> = serde_json::from_value(serde_json::json!({
            "constraints": [],
            "allow_everything": true
        }));
        assert!(result.is_err());
    }

    #[test]
    fn declaration_order_is_preserved() {
        let rules: SecurityConstraints = serde_json::from_value(serde_json::json!({
            "public_constraints": [
                { "pattern": "/b", "methods": ["GET"] },
                { "pattern": "/a", "methods": ["GET"] }
            ]
        }))
        .unwrap();

        let patterns: Vec<&str> = rules
            .public_constraints
            .iter()
            .map(|r| r.pattern.as_str())
            .collect();
        assert_eq!(patterns, vec!["/b", "/a"]);
    }
}
