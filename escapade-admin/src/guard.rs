use crate::Principal;

/// How a path is treated by the [AccessGuard]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Sign-in pages, only useful without a session
    Public,
    /// Requires a session
    Protected,
    /// Requires a session with the admin role
    AdminOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(&'static str),
}

/// Decides per request whether a page may be shown, based only on the
/// session principal and the path.
#[derive(Debug, Clone)]
pub struct AccessGuard {
    pub public_prefixes: Vec<&'static str>,
    pub admin_prefixes: Vec<&'static str>,
    /// Where signed in users land
    pub home: &'static str,
    pub login: &'static str,
    pub unauthorized: &'static str,
}

impl Default for AccessGuard {
    fn default() -> Self {
        Self {
            public_prefixes: vec!["/login", "/register"],
            admin_prefixes: vec!["/dashboard"],
            home: "/dashboard",
            login: "/login",
            unauthorized: "/unauthorized",
        }
    }
}

impl AccessGuard {
    pub fn classify(&self, path: &str) -> RouteClass {
        if self.public_prefixes.iter().any(|p| path.starts_with(p)) {
            RouteClass::Public
        } else if self.admin_prefixes.iter().any(|p| path.starts_with(p)) {
            RouteClass::AdminOnly
        } else {
            RouteClass::Protected
        }
    }

    pub fn decide(&self, principal: Option<&Principal>, path: &str) -> GuardDecision {
        let class = self.classify(path);

        match (principal, class) {
            (Some(_), RouteClass::Public) => GuardDecision::Redirect(self.home),
            // The root path stays reachable without a session
            (None, _) if class != RouteClass::Public && path != "/" => {
                GuardDecision::Redirect(self.login)
            }
            (Some(p), RouteClass::AdminOnly) if !p.is_admin() => {
                GuardDecision::Redirect(self.unauthorized)
            }
            _ => GuardDecision::Allow,
        }
    }
}
