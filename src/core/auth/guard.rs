//! Route authorization
//!
//! Decides, per request, whether the path may be served given whether a valid
//! session is present. Only two path classes matter: the login page and the
//! dashboard. Everything else is public.

/// Login page and auth entry point
pub const LOGIN_PATH: &str = "/login";

/// Protected dashboard root
pub const DASHBOARD_PATH: &str = "/dashboard";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationDecision {
    Allow,
    RedirectTo(String),
}

impl AuthorizationDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AuthorizationDecision::Allow)
    }
}

#[derive(Debug, Clone)]
pub struct RouteGuard {
    login_path: String,
    dashboard_path: String,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new(LOGIN_PATH, DASHBOARD_PATH)
    }
}

impl RouteGuard {
    pub fn new(login_path: impl Into<String>, dashboard_path: impl Into<String>) -> Self {
        Self {
            login_path: login_path.into(),
            dashboard_path: dashboard_path.into(),
        }
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn dashboard_path(&self) -> &str {
        &self.dashboard_path
    }

    /// Pure decision over `(path, is_logged_in)`.
    ///
    /// Logged-in users are bounced off the login page to the dashboard;
    /// anonymous users are bounced off the dashboard to the login page.
    pub fn authorize(&self, path: &str, is_logged_in: bool) -> AuthorizationDecision {
        let on_login_page = path.starts_with(&self.login_path);
        let on_dashboard = path.starts_with(&self.dashboard_path);

        if on_login_page {
            if is_logged_in {
                return AuthorizationDecision::RedirectTo(self.dashboard_path.clone());
            }
            return AuthorizationDecision::Allow;
        }

        if on_dashboard && !is_logged_in {
            return AuthorizationDecision::RedirectTo(self.login_path.clone());
        }

        AuthorizationDecision::Allow
    }
}
