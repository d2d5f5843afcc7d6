use crate::auth::rbac::Role;
use crate::auth::session::UserProfile;
use std::sync::RwLock;

pub const DASHBOARD_PATH: &str = "/dashboard";

/// Where the guard sends a request for a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    /// Nobody is signed in.
    RedirectToLogin,
    /// Signed in, but the role may not open this route.
    RedirectToDashboard,
}

/// Role → allowed console routes.
pub struct RouteGuard;

impl RouteGuard {
    pub fn allowed_routes(role: Role) -> &'static [&'static str] {
        match role {
            Role::SuperAdmin => &["/dashboard", "/condominios", "/usuarios", "/reportes", "/perfil"],
            Role::Admin => &[
                "/dashboard", "/gastos", "/pagos", "/residentes", "/multas",
                "/morosidad", "/reservas", "/anuncios", "/reportes", "/perfil",
            ],
            Role::Conserje => &[
                "/dashboard", "/pagos", "/reservas", "/novedades", "/residentes",
                "/multas", "/morosidad", "/perfil",
            ],
            Role::Directiva => &[
                "/dashboard", "/gastos", "/multas", "/anuncios", "/reportes",
                "/morosidad", "/perfil",
            ],
            Role::Residente => &["/dashboard", "/pagos", "/multas", "/reservas", "/anuncios", "/perfil"],
        }
    }

    pub fn check(user: Option<&UserProfile>, path: &str) -> RouteDecision {
        let Some(user) = user else {
            return RouteDecision::RedirectToLogin;
        };

        let allowed = user
            .role()
            .map(|role| Self::allowed_routes(role).contains(&path))
            .unwrap_or(false);

        if allowed {
            RouteDecision::Allow
        } else {
            RouteDecision::RedirectToDashboard
        }
    }
}

/// Navigation seam for redirects triggered by the client core.
pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;
    fn redirect(&self, path: &str);
}

/// Navigator that only tracks the current path and a redirect count.
#[derive(Debug)]
pub struct MemoryNavigator {
    state: RwLock<(String, usize)>,
}

impl MemoryNavigator {
    pub fn new(initial_path: &str) -> Self {
        Self {
            state: RwLock::new((initial_path.to_string(), 0)),
        }
    }

    pub fn redirect_count(&self) -> usize {
        self.state.read().map(|s| s.1).unwrap_or_default()
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new(DASHBOARD_PATH)
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String {
        self.state
            .read()
            .map(|s| s.0.clone())
            .unwrap_or_default()
    }

    fn redirect(&self, path: &str) {
        if let Ok(mut state) = self.state.write() {
            tracing::debug!(from = %state.0, to = %path, "redirect");
            state.0 = path.to_string();
            state.1 += 1;
        }
    }
}

/// Send the user to `login_path` unless they are already there.
/// Returns whether a redirect happened.
pub fn redirect_to_login(navigator: &dyn Navigator, login_path: &str) -> bool {
    if navigator.current_path() == login_path {
        return false;
    }
    navigator.redirect(login_path);
    true
}
