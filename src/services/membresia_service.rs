// src/services/membresia_service.rs
//
// O registro de membresías: um rol por (usuario, finca), com o cache
// desnormalizado fincas.administrador_id mantido na mesma transação.

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{FincaRepository, MembresiaRepository},
    models::{
        auth::Claims,
        finca::{MembresiaFinca, MiembroFinca, RolFinca},
    },
    services::autorizacion::{self, Actor, Operacion},
};

// Decisão pura: depois de trocar o rol do par, há que limpar o
// administrador_id? Só quando o usuário deixava de ser AdminFinca E o
// cache ainda apontava para ele.
pub fn debe_limpiar_administrador(
    rol_anterior: Option<RolFinca>,
    rol_nuevo: Option<RolFinca>,
    administrador_actual: Option<Uuid>,
    id_usuario: Uuid,
) -> bool {
    rol_anterior == Some(RolFinca::AdminFinca)
        && rol_nuevo != Some(RolFinca::AdminFinca)
        && administrador_actual == Some(id_usuario)
}

#[derive(Clone)]
pub struct MembresiaService {
    membresia_repo: MembresiaRepository,
    finca_repo: FincaRepository,
    pool: PgPool,
}

impl MembresiaService {
    pub fn new(
        membresia_repo: MembresiaRepository,
        finca_repo: FincaRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            membresia_repo,
            finca_repo,
            pool,
        }
    }

    pub async fn listar_miembros(
        &self,
        claims: &Claims,
        id_finca: Uuid,
    ) -> Result<Vec<MiembroFinca>, AppError> {
        if self.finca_repo.find_por_id(id_finca).await?.is_none() {
            return Err(AppError::NoEncontrado("Finca no encontrada".to_string()));
        }

        let actor = self.actor(claims).await?;
        autorizacion::exigir(
            &actor,
            &Operacion::LeerFinca(id_finca),
            "Sin permisos en esta finca",
        )?;

        self.membresia_repo.listar_miembros(id_finca).await
    }

    // UPSERT do rol + fixups do administrador_id, tudo numa transação.
    pub async fn asignar_rol(
        &self,
        claims: &Claims,
        id_finca: Uuid,
        id_usuario: Uuid,
        rol: RolFinca,
    ) -> Result<MembresiaFinca, AppError> {
        let actor = self.actor(claims).await?;
        autorizacion::exigir(
            &actor,
            &Operacion::AdministrarFinca(id_finca),
            "Sólo AdminFinca de esa finca (o SuperAdmin) puede asignar miembros",
        )?;

        let mut tx = self.pool.begin().await?;
        let asignacion = self
            .asignar_rol_tx(&mut tx, id_usuario, id_finca, rol)
            .await?;
        tx.commit().await?;

        Ok(asignacion)
    }

    // O miolo do upsert, reutilizado pelo registro de usuários (que já
    // está dentro da própria transação).
    pub async fn asignar_rol_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id_usuario: Uuid,
        id_finca: Uuid,
        rol: RolFinca,
    ) -> Result<MembresiaFinca, AppError> {
        // Rol anterior (se havia) para decidir a limpeza do cache
        let rol_anterior = self
            .membresia_repo
            .obtener_rol(&mut **tx, id_usuario, id_finca)
            .await?;

        let asignacion = self
            .membresia_repo
            .upsert_rol(&mut **tx, id_usuario, id_finca, rol)
            .await?;

        if rol == RolFinca::AdminFinca {
            // Assumiu AdminFinca => o cache aponta para ele
            self.finca_repo
                .actualizar_administrador(&mut **tx, id_finca, Some(id_usuario))
                .await?;
        } else {
            let administrador_actual = self
                .finca_repo
                .administrador_actual(&mut **tx, id_finca)
                .await?;
            if debe_limpiar_administrador(rol_anterior, Some(rol), administrador_actual, id_usuario)
            {
                self.finca_repo
                    .actualizar_administrador(&mut **tx, id_finca, None)
                    .await?;
            }
        }

        Ok(asignacion)
    }

    // Remove a atribuição só quando o rol coincide exatamente; limpa o
    // administrador_id se era o AdminFinca registrado.
    pub async fn revocar_rol(
        &self,
        claims: &Claims,
        id_finca: Uuid,
        id_usuario: Uuid,
        rol: RolFinca,
    ) -> Result<(), AppError> {
        let actor = self.actor(claims).await?;
        autorizacion::exigir(
            &actor,
            &Operacion::AdministrarFinca(id_finca),
            "Sólo AdminFinca de esa finca (o SuperAdmin) puede quitar miembros",
        )?;

        let mut tx = self.pool.begin().await?;

        let eliminadas = self
            .membresia_repo
            .eliminar_rol(&mut *tx, id_usuario, id_finca, rol)
            .await?;
        if eliminadas == 0 {
            // O retorno antecipado descarta a transação (rollback no drop)
            return Err(AppError::NoEncontrado("No existía esa asignación".to_string()));
        }

        if rol == RolFinca::AdminFinca {
            let administrador_actual = self
                .finca_repo
                .administrador_actual(&mut *tx, id_finca)
                .await?;
            if debe_limpiar_administrador(
                Some(RolFinca::AdminFinca),
                None,
                administrador_actual,
                id_usuario,
            ) {
                self.finca_repo
                    .actualizar_administrador(&mut *tx, id_finca, None)
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn actor(&self, claims: &Claims) -> Result<Actor, AppError> {
        let membresias = self.membresia_repo.roles_de_usuario(claims.id_usuario).await?;
        Ok(Actor::desde_claims(claims, membresias))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limpia_cuando_degrada_al_admin_registrado() {
        let id = Uuid::new_v4();
        assert!(debe_limpiar_administrador(
            Some(RolFinca::AdminFinca),
            Some(RolFinca::Empleado),
            Some(id),
            id,
        ));
        // Revogação total também limpa
        assert!(debe_limpiar_administrador(
            Some(RolFinca::AdminFinca),
            None,
            Some(id),
            id,
        ));
    }

    #[test]
    fn no_limpia_si_el_cache_apunta_a_otro() {
        let id = Uuid::new_v4();
        let otro = Uuid::new_v4();
        assert!(!debe_limpiar_administrador(
            Some(RolFinca::AdminFinca),
            Some(RolFinca::Empleado),
            Some(otro),
            id,
        ));
        assert!(!debe_limpiar_administrador(
            Some(RolFinca::AdminFinca),
            Some(RolFinca::Empleado),
            None,
            id,
        ));
    }

    #[test]
    fn no_limpia_si_no_era_admin() {
        let id = Uuid::new_v4();
        assert!(!debe_limpiar_administrador(
            Some(RolFinca::Empleado),
            Some(RolFinca::Veterinario),
            Some(id),
            id,
        ));
        assert!(!debe_limpiar_administrador(None, Some(RolFinca::Empleado), Some(id), id));
    }

    #[test]
    fn no_limpia_si_sigue_siendo_admin() {
        let id = Uuid::new_v4();
        assert!(!debe_limpiar_administrador(
            Some(RolFinca::AdminFinca),
            Some(RolFinca::AdminFinca),
            Some(id),
            id,
        ));
    }
}
