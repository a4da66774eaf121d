// src/services/usuario_service.rs

use bcrypt::{hash, verify};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{FincaRepository, MembresiaRepository, UsuarioRepository},
    models::{
        auth::{
            ActualizarPerfilPayload, ActualizarUsuarioAdminPayload, Claims, RolGlobal, Usuario,
        },
        finca::FincaConRol,
    },
    services::autorizacion::{self, Actor, Operacion},
};

#[derive(Clone)]
pub struct UsuarioService {
    usuario_repo: UsuarioRepository,
    membresia_repo: MembresiaRepository,
    finca_repo: FincaRepository,
}

impl UsuarioService {
    pub fn new(
        usuario_repo: UsuarioRepository,
        membresia_repo: MembresiaRepository,
        finca_repo: FincaRepository,
    ) -> Self {
        Self {
            usuario_repo,
            membresia_repo,
            finca_repo,
        }
    }

    // GET /usuarios/me: perfil + fincas com o rol em cada uma. O
    // SuperAdmin enxerga todas, etiquetadas 'SuperAdmin'.
    pub async fn perfil(
        &self,
        claims: &Claims,
    ) -> Result<(Usuario, Vec<FincaConRol>), AppError> {
        let usuario = self
            .usuario_repo
            .find_por_id(claims.id_usuario)
            .await?
            .ok_or_else(|| AppError::NoEncontrado("Usuario no encontrado".to_string()))?;

        let fincas = if usuario.rol == RolGlobal::SuperAdmin {
            self.finca_repo.todas_como_superadmin().await?
        } else {
            self.finca_repo.fincas_con_rol_de(claims.id_usuario).await?
        };

        Ok((usuario, fincas))
    }

    pub async fn listar(&self, claims: &Claims) -> Result<Vec<Usuario>, AppError> {
        let actor = self.actor(claims).await?;
        autorizacion::exigir(
            &actor,
            &Operacion::GestionarSistema,
            "Sin permisos (rol global requerido)",
        )?;

        self.usuario_repo.listar().await
    }

    pub async fn actualizar_perfil(
        &self,
        claims: &Claims,
        parche: &ActualizarPerfilPayload,
    ) -> Result<Usuario, AppError> {
        if parche.es_vacio() {
            return Err(AppError::Datos("Debe enviar al menos un campo".to_string()));
        }

        let mut usuario = self
            .usuario_repo
            .find_por_id(claims.id_usuario)
            .await?
            .ok_or_else(|| AppError::NoEncontrado("Usuario no encontrado".to_string()))?;

        if let Some(v) = &parche.nombre_completo {
            usuario.nombre_completo = v.clone();
        }
        if let Some(v) = &parche.correo_electronico {
            usuario.correo_electronico = v.clone();
        }

        self.usuario_repo.actualizar_datos(&usuario).await
    }

    // Edição administrativa (solo SuperAdmin); promover a SuperAdmin passa
    // pela regra de criação de SuperAdmin.
    pub async fn actualizar_admin(
        &self,
        claims: &Claims,
        id_objetivo: Uuid,
        parche: &ActualizarUsuarioAdminPayload,
    ) -> Result<Usuario, AppError> {
        if parche.es_vacio() {
            return Err(AppError::Datos("No hay campos para actualizar".to_string()));
        }

        let actor = self.actor(claims).await?;
        autorizacion::exigir(
            &actor,
            &Operacion::GestionarSistema,
            "Sin permisos (rol global requerido)",
        )?;
        if parche.rol == Some(RolGlobal::SuperAdmin) {
            autorizacion::exigir(
                &actor,
                &Operacion::CrearSuperAdmin,
                "Sólo SuperAdmin puede crear SuperAdmin",
            )?;
        }

        let mut usuario = self
            .usuario_repo
            .find_por_id(id_objetivo)
            .await?
            .ok_or_else(|| AppError::NoEncontrado("Usuario no encontrado".to_string()))?;

        parche.aplicar(&mut usuario);
        self.usuario_repo.actualizar_datos(&usuario).await
    }

    // Eliminação de usuário:
    //  - SuperAdmin elimina qualquer um, MENOS outro SuperAdmin.
    //  - AdminFinca só elimina usuários das suas fincas, nunca SuperAdmin.
    pub async fn eliminar(&self, claims: &Claims, id_objetivo: Uuid) -> Result<(), AppError> {
        let objetivo = self
            .usuario_repo
            .find_por_id(id_objetivo)
            .await?
            .ok_or_else(|| AppError::NoEncontrado("Usuario no encontrado".to_string()))?;

        let actor = self.actor(claims).await?;

        let objetivo_es_superadmin = objetivo.rol == RolGlobal::SuperAdmin;
        let comparte = if actor.es_superadmin() {
            false // irrelevante para a regra 1
        } else {
            self.membresia_repo
                .comparte_finca_administrada(claims.id_usuario, id_objetivo)
                .await?
        };

        let mensaje = if actor.es_superadmin() {
            "Los SuperAdmin no pueden eliminar a otros SuperAdmin"
        } else {
            "Solo puede eliminar usuarios de sus fincas (y nunca SuperAdmin)"
        };
        autorizacion::exigir(
            &actor,
            &Operacion::EliminarUsuario {
                objetivo_es_superadmin,
                comparte_finca_administrada: comparte,
            },
            mensaje,
        )?;

        let eliminadas = self.usuario_repo.eliminar(id_objetivo).await?;
        if eliminadas == 0 {
            return Err(AppError::NoEncontrado("Usuario no encontrado".to_string()));
        }

        tracing::info!("🗑️ Usuario {} eliminado", id_objetivo);
        Ok(())
    }

    // PATCH /usuarios/me/password
    pub async fn cambiar_mi_contrasena(
        &self,
        claims: &Claims,
        contrasena_actual: &str,
        contrasena_nueva: &str,
    ) -> Result<(), AppError> {
        if contrasena_actual == contrasena_nueva {
            return Err(AppError::Datos(
                "La nueva contraseña no puede ser igual a la actual".to_string(),
            ));
        }

        let usuario = self
            .usuario_repo
            .find_por_id(claims.id_usuario)
            .await?
            .ok_or_else(|| AppError::NoEncontrado("Usuario no encontrado".to_string()))?;

        self.verificar(contrasena_actual, &usuario.contrasena).await?;
        self.guardar_contrasena(claims.id_usuario, contrasena_nueva).await
    }

    // PATCH /usuarios/:id/password — um só endpoint:
    //  - SuperAdmin muda a de TERCEIROS só com { nueva }
    //  - o dono muda a própria com { contrasena_actual, nueva }
    pub async fn cambiar_password(
        &self,
        claims: &Claims,
        id_objetivo: Uuid,
        contrasena_actual: Option<&str>,
        nueva: &str,
    ) -> Result<(), AppError> {
        if claims.rol == RolGlobal::SuperAdmin && claims.id_usuario != id_objetivo {
            if self.usuario_repo.find_por_id(id_objetivo).await?.is_none() {
                return Err(AppError::NoEncontrado("Usuario no encontrado".to_string()));
            }
            return self.guardar_contrasena(id_objetivo, nueva).await;
        }

        if claims.id_usuario != id_objetivo {
            return Err(AppError::Autorizacion(
                "No autorizado: solo SuperAdmin puede cambiar contraseñas de terceros".to_string(),
            ));
        }

        let actual = contrasena_actual.ok_or_else(|| {
            AppError::Datos("Debe enviar contrasena_actual".to_string())
        })?;

        let usuario = self
            .usuario_repo
            .find_por_id(id_objetivo)
            .await?
            .ok_or_else(|| AppError::NoEncontrado("Usuario no encontrado".to_string()))?;

        self.verificar(actual, &usuario.contrasena).await?;
        self.guardar_contrasena(id_objetivo, nueva).await
    }

    // PATCH /usuarios/:id/password/reset (solo SuperAdmin)
    pub async fn resetear_contrasena(
        &self,
        claims: &Claims,
        id_objetivo: Uuid,
        nueva: &str,
    ) -> Result<(), AppError> {
        let actor = self.actor(claims).await?;
        autorizacion::exigir(
            &actor,
            &Operacion::GestionarSistema,
            "Sin permisos (rol global requerido)",
        )?;

        let actualizadas = self.guardar_contrasena_contando(id_objetivo, nueva).await?;
        if actualizadas == 0 {
            return Err(AppError::NoEncontrado("Usuario no encontrado".to_string()));
        }
        Ok(())
    }

    // ---
    // Helpers
    // ---

    async fn verificar(&self, contrasena: &str, hash_guardado: &str) -> Result<(), AppError> {
        let contrasena = contrasena.to_owned();
        let hash_guardado = hash_guardado.to_owned();
        let coincide = tokio::task::spawn_blocking(move || verify(&contrasena, &hash_guardado))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !coincide {
            return Err(AppError::Autenticacion(
                "Contraseña actual incorrecta".to_string(),
            ));
        }
        Ok(())
    }

    async fn guardar_contrasena(&self, id_usuario: Uuid, nueva: &str) -> Result<(), AppError> {
        self.guardar_contrasena_contando(id_usuario, nueva).await?;
        Ok(())
    }

    async fn guardar_contrasena_contando(
        &self,
        id_usuario: Uuid,
        nueva: &str,
    ) -> Result<u64, AppError> {
        let nueva = nueva.to_owned();
        let nueva_hash = tokio::task::spawn_blocking(move || hash(&nueva, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        self.usuario_repo
            .actualizar_contrasena(id_usuario, &nueva_hash)
            .await
    }

    async fn actor(&self, claims: &Claims) -> Result<Actor, AppError> {
        let membresias = self.membresia_repo.roles_de_usuario(claims.id_usuario).await?;
        Ok(Actor::desde_claims(claims, membresias))
    }
}
