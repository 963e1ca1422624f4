//! Path-based access rules, evaluated in order with the first match winning.

use super::{Principal, Role};
use crate::config::AppConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    /// Matches one path exactly.
    Exact(String),
    /// `prefix/**`: matches the prefix itself and everything below it.
    Prefix(String),
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Self {
        match pattern.strip_suffix("/**") {
            Some(prefix) => PathPattern::Prefix(prefix.to_string()),
            None => PathPattern::Exact(pattern.to_string()),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Exact(exact) => path == exact,
            PathPattern::Prefix(prefix) => path
                .strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/')),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    PermitAll,
    Authenticated,
    HasRole(Role),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Permit,
    /// No session on a gated path
    Unauthenticated,
    /// Session present but missing the required role
    Forbidden,
}

#[derive(Debug, Clone)]
pub struct AccessRule {
    pub pattern: PathPattern,
    pub access: Access,
}

#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    rules: Vec<AccessRule>,
}

impl AccessPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, pattern: &str, access: Access) -> Self {
        self.rules.push(AccessRule {
            pattern: PathPattern::parse(pattern),
            access,
        });
        self
    }

    pub fn permit_all(self, patterns: &[&str]) -> Self {
        patterns.iter().fold(self, |policy, p| policy.rule(p, Access::PermitAll))
    }

    /// Rules for the application's routes.
    pub fn for_config(config: &AppConfig) -> Self {
        let policy = Self::new()
            .permit_all(&[
                "/login",
                "/logout",
                "/notAuthorized",
                "/health",
                "/api/auth/login",
                "/public/**",
                "/webjars/**",
            ])
            .rule("/user/**", Access::HasRole(Role::User))
            .rule("/admin/**", Access::HasRole(Role::Admin));

        if config.api.public_products {
            policy.rule("/api/products/**", Access::PermitAll)
        } else {
            policy
        }
    }

    /// First matching rule, or `Authenticated` when nothing matches.
    pub fn required_access(&self, path: &str) -> Access {
        self.rules
            .iter()
            .find(|rule| rule.pattern.matches(path))
            .map(|rule| rule.access)
            .unwrap_or(Access::Authenticated)
    }

    pub fn authorize(&self, path: &str, principal: Option<&Principal>) -> Decision {
        match (self.required_access(path), principal) {
            (Access::PermitAll, _) => Decision::Permit,
            (_, None) => Decision::Unauthenticated,
            (Access::Authenticated, Some(_)) => Decision::Permit,
            (Access::HasRole(role), Some(p)) if p.has_role(role) => Decision::Permit,
            (Access::HasRole(_), Some(_)) => Decision::Forbidden,
        }
    }
}
