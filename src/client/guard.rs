use serde::{Deserialize, Serialize};

use crate::auth::models::AuthenticatedUser;

pub const SHOP_HOME: &str = "/shop/home";
pub const ADMIN_DASHBOARD: &str = "/admin/dashboard";
pub const LOGIN: &str = "/auth/login";
pub const UNAUTHORIZED: &str = "/unauth-page";

/// What the client knows about the current session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    pub is_authenticated: bool,
    pub user: Option<AuthenticatedUser>,
}

impl AuthState {
    pub fn signed_in(user: AuthenticatedUser) -> Self {
        Self {
            is_authenticated: true,
            user: Some(user),
        }
    }

    fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.role.is_admin())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    RedirectShopHome,
    RedirectAdminDashboard,
    RedirectLogin,
    RedirectUnauthorized,
    Pass,
}

impl GuardDecision {
    /// Redirect target, `None` for [`GuardDecision::Pass`].
    pub fn target(&self) -> Option<&'static str> {
        match self {
            GuardDecision::RedirectShopHome => Some(SHOP_HOME),
            GuardDecision::RedirectAdminDashboard => Some(ADMIN_DASHBOARD),
            GuardDecision::RedirectLogin => Some(LOGIN),
            GuardDecision::RedirectUnauthorized => Some(UNAUTHORIZED),
            GuardDecision::Pass => None,
        }
    }
}

fn is_auth_page(path: &str) -> bool {
    path.contains("/login") || path.contains("/register")
}

/// Decide where a navigation to `path` should end up. Rules apply in order.
pub fn decide(auth: &AuthState, path: &str) -> GuardDecision {
    let home = if auth.is_admin() {
        GuardDecision::RedirectAdminDashboard
    } else {
        GuardDecision::RedirectShopHome
    };

    if path == "/" {
        return if auth.is_authenticated {
            home
        } else {
            GuardDecision::RedirectLogin
        };
    }

    if !auth.is_authenticated {
        return if is_auth_page(path) {
            GuardDecision::Pass
        } else {
            GuardDecision::RedirectLogin
        };
    }

    if is_auth_page(path) {
        return home;
    }
    if !auth.is_admin() && path.contains("admin") {
        return GuardDecision::RedirectUnauthorized;
    }
    if auth.is_admin() && path.contains("shop") {
        return GuardDecision::RedirectAdminDashboard;
    }
    GuardDecision::Pass
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::Role;

    fn user(role: Role) -> AuthState {
        AuthState::signed_in(AuthenticatedUser {
            id: "u1".into(),
            user_name: "ada".into(),
            email: "ada@example.com".into(),
            role,
        })
    }

    const PATHS: &[&str] = &[
        "/",
        "/auth/login",
        "/auth/register",
        "/shop/home",
        "/shop/clubs",
        "/admin/dashboard",
        "/admin/services",
        "/unauth-page",
    ];

    #[test]
    fn test_root_redirects() {
        assert_eq!(decide(&AuthState::default(), "/"), GuardDecision::RedirectLogin);
        assert_eq!(decide(&user(Role::User), "/"), GuardDecision::RedirectShopHome);
        assert_eq!(
            decide(&user(Role::Admin), "/"),
            GuardDecision::RedirectAdminDashboard
        );
    }

    #[test]
    fn test_anonymous_only_reaches_auth_pages() {
        let anon = AuthState::default();
        for path in PATHS {
            let decision = decide(&anon, path);
            if path.contains("/login") || path.contains("/register") {
                assert_eq!(decision, GuardDecision::Pass, "{path}");
            } else {
                assert_eq!(decision, GuardDecision::RedirectLogin, "{path}");
            }
        }
    }

    #[test]
    fn test_signed_in_users_leave_auth_pages() {
        assert_eq!(
            decide(&user(Role::User), "/auth/login"),
            GuardDecision::RedirectShopHome
        );
        assert_eq!(
            decide(&user(Role::Admin), "/auth/register"),
            GuardDecision::RedirectAdminDashboard
        );
    }

    #[test]
    fn test_non_admin_never_passes_admin_paths() {
        let shopper = user(Role::User);
        for path in PATHS.iter().filter(|p| p.contains("admin")) {
            assert_eq!(decide(&shopper, path), GuardDecision::RedirectUnauthorized);
        }
        assert_eq!(decide(&shopper, "/shop/clubs"), GuardDecision::Pass);
    }

    #[test]
    fn test_admin_never_passes_shop_paths() {
        let admin = user(Role::Admin);
        for path in PATHS.iter().filter(|p| p.contains("shop")) {
            assert_eq!(decide(&admin, path), GuardDecision::RedirectAdminDashboard);
        }
        assert_eq!(decide(&admin, "/admin/services"), GuardDecision::Pass);
    }

    #[test]
    fn test_decisions_are_stable() {
        // Following a redirect never yields another redirect.
        for state in [AuthState::default(), user(Role::User), user(Role::Admin)] {
            for path in PATHS {
                if let Some(target) = decide(&state, path).target() {
                    assert_eq!(decide(&state, target), GuardDecision::Pass, "{path} -> {target}");
                }
            }
        }
    }
}
