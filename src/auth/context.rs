use crate::auth::rbac::{Capability, PermissionTable, Role};
use crate::auth::session::UserProfile;

/// Capability predicates for one identity, the `can.<capability>()` surface.
///
/// One method per capability is generated next to [`Capability`]
/// (`view_all_reservas`, `create_multas`, ...). All of them funnel through
/// [`Permissions::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Permissions {
    role: Option<Role>,
}

impl Permissions {
    pub fn for_role(role: Option<Role>) -> Self {
        Self { role }
    }

    pub fn for_user(user: Option<&UserProfile>) -> Self {
        Self {
            role: user.and_then(UserProfile::role),
        }
    }

    /// No identity: every predicate is false.
    pub fn anonymous() -> Self {
        Self { role: None }
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn check(&self, capability: Capability) -> bool {
        PermissionTable::can(self.role, capability)
    }

    pub fn check_named(&self, capability: &str) -> bool {
        Capability::from_str(capability)
            .map(|c| self.check(c))
            .unwrap_or(false)
    }

    pub fn granted(&self) -> Vec<Capability> {
        self.role.map(|r| r.capabilities()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: &str) -> UserProfile {
        UserProfile {
            id: 1,
            email: "x@condo.cl".to_string(),
            name: "X".to_string(),
            role: role.to_string(),
        }
    }

    #[test]
    fn test_generated_predicates_follow_table() {
        let resident = Permissions::for_user(Some(&user("residente")));
        assert!(!resident.view_all_reservas());
        assert!(resident.create_reservas());
        assert!(resident.view_pagos());

        let conserje = Permissions::for_role(Some(Role::Conserje));
        assert!(conserje.view_novedades());
        assert!(!Permissions::for_role(Some(Role::Admin)).view_novedades());
    }

    #[test]
    fn test_anonymous_and_unknown_role_deny_everything() {
        let anon = Permissions::anonymous();
        let unknown = Permissions::for_user(Some(&user("jardinero")));
        for capability in Capability::ALL {
            assert!(!anon.check(*capability));
            assert!(!unknown.check(*capability));
        }
        assert!(anon.granted().is_empty());
        assert!(!anon.view_anuncios());
    }

    #[test]
    fn test_check_named() {
        let admin = Permissions::for_role(Some(Role::Admin));
        assert!(admin.check_named("processPagos"));
        assert!(!admin.check_named("viewNovedades"));
        assert!(!admin.check_named("notACapability"));
    }
}
