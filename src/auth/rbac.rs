use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    Conserje,
    Directiva,
    Residente,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::SuperAdmin,
        Role::Admin,
        Role::Conserje,
        Role::Directiva,
        Role::Residente,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
            Role::Conserje => "conserje",
            Role::Directiva => "directiva",
            Role::Residente => "residente",
        }
    }

    /// Parse a backend role string. English aliases are accepted alongside
    /// the wire names.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "super_admin" | "superadmin" | "super-admin" => Some(Role::SuperAdmin),
            "admin" => Some(Role::Admin),
            "conserje" | "concierge" => Some(Role::Conserje),
            "directiva" | "board_member" | "board-member" => Some(Role::Directiva),
            "residente" | "resident" => Some(Role::Residente),
            _ => None,
        }
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        PermissionTable::global().role_has(*self, capability)
    }

    pub fn capabilities(&self) -> Vec<Capability> {
        Capability::ALL
            .iter()
            .copied()
            .filter(|c| self.has_capability(*c))
            .collect()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

macro_rules! capabilities {
    ($( $variant:ident => $name:literal, $method:ident; )*) => {
        #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
        pub enum Capability {
            $( #[serde(rename = $name)] $variant, )*
        }

        impl Capability {
            pub const ALL: &'static [Capability] = &[ $( Capability::$variant, )* ];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Capability::$variant => $name, )*
                }
            }

            /// Look up a capability by its camelCase name (e.g. `viewAllReservas`).
            pub fn from_str(s: &str) -> Option<Self> {
                match s.trim() {
                    $( $name => Some(Capability::$variant), )*
                    _ => None,
                }
            }
        }

        impl crate::auth::context::Permissions {
            $(
                #[doc = concat!("`", $name, "`")]
                pub fn $method(&self) -> bool {
                    self.check(Capability::$variant)
                }
            )*
        }
    };
}

capabilities! {
    // Expenses
    ViewGastos => "viewGastos", view_gastos;
    CreateGastos => "createGastos", create_gastos;
    EditGastos => "editGastos", edit_gastos;
    DeleteGastos => "deleteGastos", delete_gastos;

    // Payments
    ViewPagos => "viewPagos", view_pagos;
    ViewAllPagos => "viewAllPagos", view_all_pagos;
    ProcessPagos => "processPagos", process_pagos;

    // Fines
    ViewMultas => "viewMultas", view_multas;
    ViewAllMultas => "viewAllMultas", view_all_multas;
    CreateMultas => "createMultas", create_multas;
    EditMultas => "editMultas", edit_multas;
    DeleteMultas => "deleteMultas", delete_multas;

    // Reservations
    ViewReservas => "viewReservas", view_reservas;
    ViewAllReservas => "viewAllReservas", view_all_reservas;
    CreateReservas => "createReservas", create_reservas;
    CancelReservas => "cancelReservas", cancel_reservas;
    ManageReservas => "manageReservas", manage_reservas;

    // Announcements
    ViewAnuncios => "viewAnuncios", view_anuncios;
    CreateAnuncios => "createAnuncios", create_anuncios;
    EditAnuncios => "editAnuncios", edit_anuncios;
    DeleteAnuncios => "deleteAnuncios", delete_anuncios;

    // Residents directory
    ViewResidentes => "viewResidentes", view_residentes;
    CreateResidentes => "createResidentes", create_residentes;
    EditResidentes => "editResidentes", edit_residentes;
    DeleteResidentes => "deleteResidentes", delete_residentes;

    // Delinquency
    ViewMorosidad => "viewMorosidad", view_morosidad;
    ManageMorosidad => "manageMorosidad", manage_morosidad;

    // Daily log
    ViewNovedades => "viewNovedades", view_novedades;
    CreateNovedades => "createNovedades", create_novedades;
    EditNovedades => "editNovedades", edit_novedades;
    DeleteNovedades => "deleteNovedades", delete_novedades;

    // Reports
    ViewReportes => "viewReportes", view_reportes;
    GenerateReportes => "generateReportes", generate_reportes;

    // Condominium registry
    ViewCondominios => "viewCondominios", view_condominios;
    CreateCondominios => "createCondominios", create_condominios;
    EditCondominios => "editCondominios", edit_condominios;
    DeleteCondominios => "deleteCondominios", delete_condominios;

    // User administration
    ViewUsuarios => "viewUsuarios", view_usuarios;
    CreateUsuarios => "createUsuarios", create_usuarios;
    EditUsuarios => "editUsuarios", edit_usuarios;
    DeleteUsuarios => "deleteUsuarios", delete_usuarios;
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Capabilities every known role holds: each identity may see its own
/// payments, fines and reservations, book and cancel its own reservations,
/// and read announcements.
const UNIVERSAL: &[Capability] = &[
    Capability::ViewPagos,
    Capability::ViewMultas,
    Capability::ViewReservas,
    Capability::CreateReservas,
    Capability::CancelReservas,
    Capability::ViewAnuncios,
];

const GRANTS: &[(Capability, &[Role])] = {
    use Role::*;
    &[
        (Capability::ViewGastos, &[Admin, Directiva, Conserje, SuperAdmin, Residente]),
        (Capability::CreateGastos, &[Admin, SuperAdmin]),
        (Capability::EditGastos, &[Admin, SuperAdmin]),
        (Capability::DeleteGastos, &[Admin, SuperAdmin]),

        (Capability::ViewAllPagos, &[Admin, Conserje, SuperAdmin]),
        (Capability::ProcessPagos, &[Admin, SuperAdmin]),

        (Capability::ViewAllMultas, &[Admin, Conserje, Directiva, SuperAdmin]),
        (Capability::CreateMultas, &[Admin, Conserje, SuperAdmin]),
        (Capability::EditMultas, &[Admin, SuperAdmin]),
        (Capability::DeleteMultas, &[Admin, SuperAdmin]),

        (Capability::ViewAllReservas, &[Admin, Conserje, SuperAdmin]),
        (Capability::ManageReservas, &[Admin, Conserje, SuperAdmin]),

        (Capability::CreateAnuncios, &[Admin, Directiva]),
        (Capability::EditAnuncios, &[Admin, Directiva]),
        (Capability::DeleteAnuncios, &[Admin, Directiva]),

        (Capability::ViewResidentes, &[Admin, Conserje, SuperAdmin]),
        (Capability::CreateResidentes, &[Admin, SuperAdmin]),
        (Capability::EditResidentes, &[Admin, SuperAdmin]),
        (Capability::DeleteResidentes, &[Admin, SuperAdmin]),

        (Capability::ViewMorosidad, &[Admin, Conserje, Directiva, SuperAdmin]),
        (Capability::ManageMorosidad, &[Admin, SuperAdmin]),

        (Capability::ViewNovedades, &[Conserje]),
        (Capability::CreateNovedades, &[Conserje]),
        (Capability::EditNovedades, &[Conserje]),
        (Capability::DeleteNovedades, &[Conserje]),

        (Capability::ViewReportes, &[Admin, Directiva, SuperAdmin]),
        (Capability::GenerateReportes, &[Admin, Directiva, SuperAdmin]),

        (Capability::ViewCondominios, &[SuperAdmin]),
        (Capability::CreateCondominios, &[SuperAdmin]),
        (Capability::EditCondominios, &[SuperAdmin]),
        (Capability::DeleteCondominios, &[SuperAdmin]),

        (Capability::ViewUsuarios, &[SuperAdmin]),
        (Capability::CreateUsuarios, &[SuperAdmin]),
        (Capability::EditUsuarios, &[SuperAdmin]),
        (Capability::DeleteUsuarios, &[SuperAdmin]),
    ]
};

/// Static role → capability-set table.
///
/// Lookups are plain set membership. Capabilities in the universal set are
/// held by every known role; an unknown or missing role holds nothing.
#[derive(Debug)]
pub struct PermissionTable {
    universal: HashSet<Capability>,
    super_admin: HashSet<Capability>,
    admin: HashSet<Capability>,
    conserje: HashSet<Capability>,
    directiva: HashSet<Capability>,
    residente: HashSet<Capability>,
}

impl PermissionTable {
    fn build() -> Self {
        let mut table = Self {
            universal: UNIVERSAL.iter().copied().collect(),
            super_admin: HashSet::new(),
            admin: HashSet::new(),
            conserje: HashSet::new(),
            directiva: HashSet::new(),
            residente: HashSet::new(),
        };

        for (capability, roles) in GRANTS {
            for role in *roles {
                table.set_for_mut(*role).insert(*capability);
            }
        }

        table
    }

    pub fn global() -> &'static PermissionTable {
        static TABLE: OnceLock<PermissionTable> = OnceLock::new();
        TABLE.get_or_init(PermissionTable::build)
    }

    /// Can `role` exercise `capability`? `None` means unauthenticated.
    pub fn can(role: Option<Role>, capability: Capability) -> bool {
        match role {
            Some(role) => Self::global().role_has(role, capability),
            None => false,
        }
    }

    /// String-keyed variant: unknown role or capability names are denied.
    pub fn can_named(role: Option<&str>, capability: &str) -> bool {
        match (role.and_then(Role::from_str), Capability::from_str(capability)) {
            (Some(role), Some(capability)) => Self::global().role_has(role, capability),
            _ => false,
        }
    }

    pub fn is_universal(capability: Capability) -> bool {
        Self::global().universal.contains(&capability)
    }

    fn role_has(&self, role: Role, capability: Capability) -> bool {
        self.universal.contains(&capability) || self.set_for(role).contains(&capability)
    }

    fn set_for(&self, role: Role) -> &HashSet<Capability> {
        match role {
            Role::SuperAdmin => &self.super_admin,
            Role::Admin => &self.admin,
            Role::Conserje => &self.conserje,
            Role::Directiva => &self.directiva,
            Role::Residente => &self.residente,
        }
    }

    fn set_for_mut(&mut self, role: Role) -> &mut HashSet<Capability> {
        match role {
            Role::SuperAdmin => &mut self.super_admin,
            Role::Admin => &mut self.admin,
            Role::Conserje => &mut self.conserje,
            Role::Directiva => &mut self.directiva,
            Role::Residente => &mut self.residente,
        }
    }
}

#[macro_export]
macro_rules! require_capability {
    ($permissions:expr, $cap:expr) => {
        if !$permissions.check($cap) {
            return Err($crate::error::ClientError::Authorization(format!(
                "Capability {} required",
                $cap
            )));
        }
    };
}
