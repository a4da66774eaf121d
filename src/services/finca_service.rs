// src/services/finca_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{FincaRepository, MembresiaRepository},
    models::{
        auth::Claims,
        finca::{ActualizarFincaPayload, CrearFincaPayload, Finca, RolFinca},
    },
    services::autorizacion::{self, Actor, Operacion},
};

#[derive(Clone)]
pub struct FincaService {
    finca_repo: FincaRepository,
    membresia_repo: MembresiaRepository,
    pool: PgPool,
}

impl FincaService {
    pub fn new(
        finca_repo: FincaRepository,
        membresia_repo: MembresiaRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            finca_repo,
            membresia_repo,
            pool,
        }
    }

    // SuperAdmin enxerga todas; os demais, só as fincas onde têm rol
    pub async fn listar(&self, claims: &Claims) -> Result<Vec<Finca>, AppError> {
        let actor = self.actor(claims).await?;
        if actor.es_superadmin() {
            self.finca_repo.listar_todas().await
        } else {
            self.finca_repo.listar_por_usuario(claims.id_usuario).await
        }
    }

    pub async fn obtener(&self, claims: &Claims, id_finca: Uuid) -> Result<Finca, AppError> {
        let finca = self
            .finca_repo
            .find_por_id(id_finca)
            .await?
            .ok_or_else(|| AppError::NoEncontrado("Finca no encontrada".to_string()))?;

        let actor = self.actor(claims).await?;
        autorizacion::exigir(
            &actor,
            &Operacion::LeerFinca(id_finca),
            "Sin acceso a esta finca",
        )?;

        Ok(finca)
    }

    pub async fn crear(
        &self,
        claims: &Claims,
        payload: &CrearFincaPayload,
    ) -> Result<Finca, AppError> {
        let actor = self.actor(claims).await?;
        autorizacion::exigir(
            &actor,
            &Operacion::GestionarSistema,
            "Solo SuperAdmin puede crear fincas",
        )?;

        // Se já vem com administrador, a membresía AdminFinca nasce na
        // mesma transação; o cache administrador_id nunca aponta para
        // alguém sem a linha de rol correspondente.
        let mut tx = self.pool.begin().await?;

        let finca = self.finca_repo.crear(&mut *tx, payload).await?;
        if let Some(administrador_id) = payload.administrador_id {
            self.membresia_repo
                .upsert_rol(&mut *tx, administrador_id, finca.id_finca, RolFinca::AdminFinca)
                .await?;
        }

        tx.commit().await?;

        tracing::info!("🏡 Finca '{}' creada", finca.nombre_finca);
        Ok(finca)
    }

    pub async fn actualizar(
        &self,
        claims: &Claims,
        id_finca: Uuid,
        parche: &ActualizarFincaPayload,
    ) -> Result<Finca, AppError> {
        if parche.es_vacio() {
            return Err(AppError::Datos("Debe enviar al menos un campo".to_string()));
        }

        let mut finca = self
            .finca_repo
            .find_por_id(id_finca)
            .await?
            .ok_or_else(|| AppError::NoEncontrado("Finca no encontrada".to_string()))?;

        let actor = self.actor(claims).await?;
        autorizacion::exigir(
            &actor,
            &Operacion::AdministrarFinca(id_finca),
            "Solo AdminFinca puede editar esta finca",
        )?;

        // O cache administrador_id só pode apontar para quem realmente tem
        // AdminFinca nesta finca; senão a desnormalização fica podre.
        if let Some(Some(nuevo_admin)) = parche.administrador_id {
            let rol = self.membresia_repo.rol_de(nuevo_admin, id_finca).await?;
            if rol != Some(RolFinca::AdminFinca) {
                return Err(AppError::Datos(
                    "El administrador_id debe tener rol AdminFinca en esta finca".to_string(),
                ));
            }
        }

        parche.aplicar(&mut finca);
        self.finca_repo.actualizar(&finca).await
    }

    pub async fn eliminar(&self, claims: &Claims, id_finca: Uuid) -> Result<(), AppError> {
        let actor = self.actor(claims).await?;
        autorizacion::exigir(
            &actor,
            &Operacion::GestionarSistema,
            "Solo SuperAdmin puede eliminar fincas",
        )?;

        let eliminadas = self.finca_repo.eliminar(id_finca).await?;
        if eliminadas == 0 {
            return Err(AppError::NoEncontrado("Finca no encontrada".to_string()));
        }
        Ok(())
    }

    async fn actor(&self, claims: &Claims) -> Result<Actor, AppError> {
        let membresias = self.membresia_repo.roles_de_usuario(claims.id_usuario).await?;
        Ok(Actor::desde_claims(claims, membresias))
    }
}
