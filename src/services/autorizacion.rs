// src/services/autorizacion.rs
//
// O avaliador de autorização: um predicado puro sobre o actor e a
// operação. Nenhum IO aqui; quem chama monta o Actor (claims do token +
// uma consulta de membresías) e decide o que fazer com o Denegar.

use std::collections::HashMap;

use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::{
    auth::{Claims, RolGlobal},
    finca::{MembresiaFinca, RolFinca},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id_usuario: Uuid,
    pub rol_global: RolGlobal,
    pub roles_finca: HashMap<Uuid, RolFinca>,
}

impl Actor {
    // Montagem do actor: claims do token + membresías consultadas por quem
    // chama. O avaliador em si nunca toca o banco.
    pub fn desde_claims(claims: &Claims, membresias: Vec<MembresiaFinca>) -> Self {
        Actor {
            id_usuario: claims.id_usuario,
            rol_global: claims.rol,
            roles_finca: membresias.into_iter().map(|m| (m.id_finca, m.rol)).collect(),
        }
    }

    pub fn es_superadmin(&self) -> bool {
        self.rol_global == RolGlobal::SuperAdmin
    }

    pub fn rol_en(&self, id_finca: Uuid) -> Option<RolFinca> {
        self.roles_finca.get(&id_finca).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operacion {
    // Escritura/administração acotada à finca: CRUD de entidades da finca,
    // atribuição de roles, mudanças de ciclo de vida, borrado de registros
    // médicos. Exige AdminFinca nessa finca.
    AdministrarFinca(Uuid),

    // Criar/editar registros médicos: qualquer rol operativo da finca.
    EscribirRegistros(Uuid),

    // Leitura acotada à finca: basta ser membro.
    LeerFinca(Uuid),

    // Operações globais (CRUD de fincas, listado/edição de usuários):
    // somente a regra 1 (SuperAdmin) permite.
    GestionarSistema,

    // Somente um SuperAdmin existente cria outro SuperAdmin.
    CrearSuperAdmin,

    // Eliminação de usuário; o contexto vem resolvido por quem chama.
    EliminarUsuario {
        objetivo_es_superadmin: bool,
        comparte_finca_administrada: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Permitir,
    Denegar,
}

// As regras, na ordem de precedência da política.
pub fn evaluar(actor: &Actor, operacion: &Operacion) -> Decision {
    // Regra 1: SuperAdmin permite tudo, com duas exceções pontuais.
    if actor.es_superadmin() {
        return match operacion {
            Operacion::EliminarUsuario {
                objetivo_es_superadmin: true,
                ..
            } => Decision::Denegar,
            _ => Decision::Permitir,
        };
    }

    match operacion {
        // Regra 2: escritura/administração exige AdminFinca na finca dona.
        Operacion::AdministrarFinca(id_finca) => {
            match actor.rol_en(*id_finca) {
                Some(RolFinca::AdminFinca) => Decision::Permitir,
                _ => Decision::Denegar,
            }
        }

        // Regra 3: registros médicos, qualquer rol operativo serve.
        Operacion::EscribirRegistros(id_finca) => match actor.rol_en(*id_finca) {
            Some(RolFinca::AdminFinca)
            | Some(RolFinca::Empleado)
            | Some(RolFinca::Veterinario) => Decision::Permitir,
            None => Decision::Denegar,
        },

        // Regra 4: leitura, basta a membresía.
        Operacion::LeerFinca(id_finca) => {
            if actor.rol_en(*id_finca).is_some() {
                Decision::Permitir
            } else {
                Decision::Denegar
            }
        }

        Operacion::EliminarUsuario {
            objetivo_es_superadmin,
            comparte_finca_administrada,
        } => {
            if !objetivo_es_superadmin && *comparte_finca_administrada {
                Decision::Permitir
            } else {
                Decision::Denegar
            }
        }

        // Regra 5: todo o resto é negado.
        Operacion::GestionarSistema | Operacion::CrearSuperAdmin => Decision::Denegar,
    }
}

// Açúcar para os services: converte Denegar no 403 da taxonomia.
pub fn exigir(actor: &Actor, operacion: &Operacion, mensaje: &str) -> Result<(), AppError> {
    match evaluar(actor, operacion) {
        Decision::Permitir => Ok(()),
        Decision::Denegar => Err(AppError::Autorizacion(mensaje.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(rol_global: RolGlobal, roles: &[(Uuid, RolFinca)]) -> Actor {
        Actor {
            id_usuario: Uuid::new_v4(),
            rol_global,
            roles_finca: roles.iter().copied().collect(),
        }
    }

    #[test]
    fn superadmin_permite_todo_lo_normal() {
        let finca = Uuid::new_v4();
        let sa = actor(RolGlobal::SuperAdmin, &[]);

        for op in [
            Operacion::AdministrarFinca(finca),
            Operacion::EscribirRegistros(finca),
            Operacion::LeerFinca(finca),
            Operacion::GestionarSistema,
            Operacion::CrearSuperAdmin,
        ] {
            assert_eq!(evaluar(&sa, &op), Decision::Permitir, "op: {:?}", op);
        }
    }

    #[test]
    fn superadmin_no_elimina_superadmin() {
        let sa = actor(RolGlobal::SuperAdmin, &[]);
        let op = Operacion::EliminarUsuario {
            objetivo_es_superadmin: true,
            comparte_finca_administrada: true,
        };
        assert_eq!(evaluar(&sa, &op), Decision::Denegar);

        let op_normal = Operacion::EliminarUsuario {
            objetivo_es_superadmin: false,
            comparte_finca_administrada: false,
        };
        assert_eq!(evaluar(&sa, &op_normal), Decision::Permitir);
    }

    #[test]
    fn solo_superadmin_crea_superadmin() {
        let finca = Uuid::new_v4();
        let admin = actor(RolGlobal::Usuario, &[(finca, RolFinca::AdminFinca)]);
        assert_eq!(evaluar(&admin, &Operacion::CrearSuperAdmin), Decision::Denegar);
    }

    #[test]
    fn administrar_exige_adminfinca_en_esa_finca() {
        let finca_a = Uuid::new_v4();
        let finca_b = Uuid::new_v4();
        let admin_a = actor(RolGlobal::Usuario, &[(finca_a, RolFinca::AdminFinca)]);

        assert_eq!(
            evaluar(&admin_a, &Operacion::AdministrarFinca(finca_a)),
            Decision::Permitir
        );
        // AdminFinca de A não administra B
        assert_eq!(
            evaluar(&admin_a, &Operacion::AdministrarFinca(finca_b)),
            Decision::Denegar
        );

        let empleado = actor(RolGlobal::Usuario, &[(finca_a, RolFinca::Empleado)]);
        assert_eq!(
            evaluar(&empleado, &Operacion::AdministrarFinca(finca_a)),
            Decision::Denegar
        );
    }

    #[test]
    fn escribir_registros_acepta_los_tres_roles() {
        let finca = Uuid::new_v4();
        for rol in [RolFinca::AdminFinca, RolFinca::Empleado, RolFinca::Veterinario] {
            let a = actor(RolGlobal::Usuario, &[(finca, rol)]);
            assert_eq!(
                evaluar(&a, &Operacion::EscribirRegistros(finca)),
                Decision::Permitir,
                "rol: {:?}",
                rol
            );
        }

        let ajeno = actor(RolGlobal::Usuario, &[]);
        assert_eq!(
            evaluar(&ajeno, &Operacion::EscribirRegistros(finca)),
            Decision::Denegar
        );
    }

    #[test]
    fn leer_basta_con_membresia() {
        let finca = Uuid::new_v4();
        let vet = actor(RolGlobal::Usuario, &[(finca, RolFinca::Veterinario)]);
        assert_eq!(evaluar(&vet, &Operacion::LeerFinca(finca)), Decision::Permitir);

        // Cenário do spec: não-membro pede o inventário de A -> 403
        let ajeno = actor(RolGlobal::Usuario, &[(Uuid::new_v4(), RolFinca::AdminFinca)]);
        assert_eq!(evaluar(&ajeno, &Operacion::LeerFinca(finca)), Decision::Denegar);
    }

    #[test]
    fn eliminar_usuario_como_adminfinca() {
        let finca = Uuid::new_v4();
        let admin = actor(RolGlobal::Usuario, &[(finca, RolFinca::AdminFinca)]);

        // Compartilham finca administrada e o alvo não é SuperAdmin
        assert_eq!(
            evaluar(
                &admin,
                &Operacion::EliminarUsuario {
                    objetivo_es_superadmin: false,
                    comparte_finca_administrada: true,
                }
            ),
            Decision::Permitir
        );
        // Alvo SuperAdmin nunca
        assert_eq!(
            evaluar(
                &admin,
                &Operacion::EliminarUsuario {
                    objetivo_es_superadmin: true,
                    comparte_finca_administrada: true,
                }
            ),
            Decision::Denegar
        );
        // Sem finca compartilhada, nada
        assert_eq!(
            evaluar(
                &admin,
                &Operacion::EliminarUsuario {
                    objetivo_es_superadmin: false,
                    comparte_finca_administrada: false,
                }
            ),
            Decision::Denegar
        );
    }

    #[test]
    fn resto_denegado() {
        let ajeno = actor(RolGlobal::Usuario, &[]);
        assert_eq!(evaluar(&ajeno, &Operacion::GestionarSistema), Decision::Denegar);
    }

    #[test]
    fn exigir_convierte_en_403() {
        let ajeno = actor(RolGlobal::Usuario, &[]);
        let err = exigir(&ajeno, &Operacion::GestionarSistema, "Sin permisos").unwrap_err();
        assert!(matches!(err, AppError::Autorizacion(_)));
    }
}
