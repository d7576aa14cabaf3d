// Role policy per resource
// `admin` passes every check, so it is never listed explicitly

use crate::models::user::Rol;

/// Any authenticated user
pub const ANY_ROLE: &[Rol] = &[Rol::Admin, Rol::Entrenador, Rol::Recepcionista, Rol::Cliente];

/// Gym staff
pub const STAFF: &[Rol] = &[Rol::Recepcionista, Rol::Entrenador];

pub const ADMIN_ONLY: &[Rol] = &[];

pub const RECEPCION: &[Rol] = &[Rol::Recepcionista];

pub const TRAINERS: &[Rol] = &[Rol::Entrenador];

pub const CLIENTS: &[Rol] = &[Rol::Cliente];

/// Allowed roles for reads and writes of one route group
#[derive(Debug, Clone, Copy)]
pub struct ResourcePolicy {
    pub read: &'static [Rol],
    pub write: &'static [Rol],
}

pub const USUARIOS: ResourcePolicy = ResourcePolicy {
    read: ADMIN_ONLY,
    write: ADMIN_ONLY,
};

pub const CLIENTES: ResourcePolicy = ResourcePolicy {
    read: STAFF,
    write: RECEPCION,
};

pub const ENTRENADORES: ResourcePolicy = ResourcePolicy {
    read: ANY_ROLE,
    write: ADMIN_ONLY,
};

/// Class catalogue and availability; registrations use `INSCRIPCIONES`.
/// Classes themselves are edited through the trainer record.
pub const CATALOGO_CLASES: &[Rol] = ANY_ROLE;

pub const INSCRIPCIONES: ResourcePolicy = ResourcePolicy {
    read: STAFF,
    write: STAFF,
};

pub const PRODUCTOS: ResourcePolicy = ResourcePolicy {
    read: RECEPCION,
    write: ADMIN_ONLY,
};

pub const PAGOS: ResourcePolicy = ResourcePolicy {
    read: RECEPCION,
    write: RECEPCION,
};

pub const CONTABILIDAD: ResourcePolicy = ResourcePolicy {
    read: ADMIN_ONLY,
    write: ADMIN_ONLY,
};

/// Routine templates
pub const RUTINAS: ResourcePolicy = ResourcePolicy {
    read: ANY_ROLE,
    write: TRAINERS,
};

pub const ASIGNACIONES: ResourcePolicy = ResourcePolicy {
    read: STAFF,
    write: TRAINERS,
};

pub const COMPOSICION_CORPORAL: ResourcePolicy = ResourcePolicy {
    read: STAFF,
    write: TRAINERS,
};

pub const SESIONES: ResourcePolicy = ResourcePolicy {
    read: STAFF,
    write: STAFF,
};

/// Dashboard, read only
pub const INDICADORES: &[Rol] = RECEPCION;

/// Uniform admin override, then membership in the allowed set
pub fn is_role_allowed(rol: Rol, allowed: &[Rol]) -> bool {
    rol == Rol::Admin || allowed.contains(&rol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_always_allowed() {
        for policy in [USUARIOS, CONTABILIDAD, PRODUCTOS, RUTINAS] {
            assert!(is_role_allowed(Rol::Admin, policy.read));
            assert!(is_role_allowed(Rol::Admin, policy.write));
        }
        assert!(is_role_allowed(Rol::Admin, INDICADORES));
        assert!(is_role_allowed(Rol::Admin, CATALOGO_CLASES));
    }

    #[test]
    fn test_admin_only_resources() {
        for rol in [Rol::Entrenador, Rol::Recepcionista, Rol::Cliente] {
            assert!(!is_role_allowed(rol, USUARIOS.read));
            assert!(!is_role_allowed(rol, CONTABILIDAD.write));
            assert!(!is_role_allowed(rol, PRODUCTOS.write));
        }
    }

    #[test]
    fn test_staff_policies() {
        assert!(is_role_allowed(Rol::Recepcionista, PAGOS.write));
        assert!(!is_role_allowed(Rol::Entrenador, PAGOS.read));
        assert!(is_role_allowed(Rol::Entrenador, CLIENTES.read));
        assert!(!is_role_allowed(Rol::Entrenador, CLIENTES.write));
        assert!(is_role_allowed(Rol::Entrenador, COMPOSICION_CORPORAL.write));
        assert!(!is_role_allowed(Rol::Recepcionista, COMPOSICION_CORPORAL.write));
    }

    #[test]
    fn test_clients_reach_only_shared_reads() {
        assert!(is_role_allowed(Rol::Cliente, ENTRENADORES.read));
        assert!(is_role_allowed(Rol::Cliente, CATALOGO_CLASES));
        assert!(!is_role_allowed(Rol::Cliente, INDICADORES));
        assert!(is_role_allowed(Rol::Cliente, RUTINAS.read));
        assert!(!is_role_allowed(Rol::Cliente, INSCRIPCIONES.read));
        assert!(!is_role_allowed(Rol::Cliente, CLIENTES.read));
        assert!(!is_role_allowed(Rol::Cliente, SESIONES.read));
    }
}
