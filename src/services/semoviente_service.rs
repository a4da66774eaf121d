// src/services/semoviente_service.rs
//
// CRUD de semovientes + a máquina de estados do ciclo de vida. Toda
// transição de saída (Traslado/Venta/Muerte) muda a linha do animal E
// escreve exatamente um movimento no livro, na mesma transação. O
// override manual de estado não escreve movimento.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        FincaRepository, MembresiaRepository, MovimientoRepository,
        RegistroMedicoRepository, SemovienteRepository,
    },
    models::{
        auth::Claims,
        movimiento::{CrearMovimientoPayload, Movimiento, TipoMovimiento, TipoMovimientoSolicitado},
        registro_medico::{
            ActualizarRegistroMedicoPayload, CrearRegistroMedicoPayload, RegistroMedico,
        },
        semoviente::{
            ActualizarSemovientePayload, CambiarEstadoPayload, CrearSemovientePayload,
            EstadoSemoviente, Semoviente, TipoIngreso,
        },
    },
    services::autorizacion::{self, Actor, Operacion},
};

// ---
// A parte pura da máquina de estados
// ---

#[derive(Debug, Clone, PartialEq)]
pub enum Transicion {
    Traslado { destino: Uuid },
    Venta { valor: Decimal },
    Muerte,
}

impl Transicion {
    // Constrói a transição a partir do payload, aplicando os requisitos
    // por tipo (destino para Traslado, valor positivo para Venta).
    pub fn desde(payload: &CrearMovimientoPayload) -> Result<Self, AppError> {
        match payload.tipo {
            TipoMovimientoSolicitado::Traslado => {
                let destino = payload.destino_id.ok_or_else(|| {
                    AppError::Datos("destino_id es requerido para Traslado".to_string())
                })?;
                Ok(Transicion::Traslado { destino })
            }
            TipoMovimientoSolicitado::Venta => match payload.valor {
                Some(valor) if valor > Decimal::ZERO => Ok(Transicion::Venta { valor }),
                _ => Err(AppError::Datos(
                    "El \"valor\" (precio de venta) es requerido para una Venta".to_string(),
                )),
            },
            TipoMovimientoSolicitado::Muerte => Ok(Transicion::Muerte),
        }
    }
}

// Guardas da transição: o estado de origem tem que ser 'Activo' e um
// traslado não pode apontar para a própria finca.
pub fn validar_transicion(
    estado_actual: EstadoSemoviente,
    transicion: &Transicion,
    finca_actual: Uuid,
) -> Result<(), AppError> {
    if !estado_actual.es_activo() {
        return Err(AppError::EstadoInvalido(format!(
            "No se puede mover un semoviente que no está 'Activo' (estado actual: {})",
            estado_actual.as_str()
        )));
    }

    if let Transicion::Traslado { destino } = transicion {
        if *destino == finca_actual {
            return Err(AppError::Datos(
                "El destino debe ser distinto a la finca actual".to_string(),
            ));
        }
    }

    Ok(())
}

// ---
// Nível de acesso exigido pelas operações sobre um semovente
// ---
enum Permiso {
    Lectura,
    Escritura,
    Admin,
}

#[derive(Clone)]
pub struct SemovienteService {
    semoviente_repo: SemovienteRepository,
    registro_repo: RegistroMedicoRepository,
    movimiento_repo: MovimientoRepository,
    finca_repo: FincaRepository,
    membresia_repo: MembresiaRepository,
    pool: PgPool,
}

impl SemovienteService {
    pub fn new(
        semoviente_repo: SemovienteRepository,
        registro_repo: RegistroMedicoRepository,
        movimiento_repo: MovimientoRepository,
        finca_repo: FincaRepository,
        membresia_repo: MembresiaRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            semoviente_repo,
            registro_repo,
            movimiento_repo,
            finca_repo,
            membresia_repo,
            pool,
        }
    }

    // ---
    // CRUD
    // ---

    pub async fn listar(
        &self,
        claims: &Claims,
        id_finca: Uuid,
        incluir_inactivos: bool,
    ) -> Result<Vec<Semoviente>, AppError> {
        let actor = self.actor(claims).await?;
        autorizacion::exigir(
            &actor,
            &Operacion::LeerFinca(id_finca),
            "No autorizado para esta finca",
        )?;

        self.semoviente_repo
            .listar_por_finca(id_finca, incluir_inactivos)
            .await
    }

    // Alta do animal: nasce 'Activo' e com o movimento de origem
    // (Nacimiento ou Compra) gravado na mesma transação.
    pub async fn crear(
        &self,
        claims: &Claims,
        payload: &CrearSemovientePayload,
    ) -> Result<Semoviente, AppError> {
        payload.validar_consistencia().map_err(|e| {
            let mut errors = validator::ValidationErrors::new();
            errors.add("tipo_ingreso", e);
            AppError::Validacion(errors)
        })?;

        let actor = self.actor(claims).await?;
        autorizacion::exigir(
            &actor,
            &Operacion::AdministrarFinca(payload.id_finca),
            "No autorizado: requiere AdminFinca",
        )?;

        let ok_raza = self
            .semoviente_repo
            .raza_pertenece_a_especie(payload.id_raza, payload.id_especie)
            .await?;
        if !ok_raza {
            return Err(AppError::Datos(
                "La raza no pertenece a esa especie".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let semoviente = self.semoviente_repo.crear(&mut *tx, payload).await?;

        let (tipo, valor, obs) = match payload.tipo_ingreso {
            TipoIngreso::Compra => (
                TipoMovimiento::Compra,
                payload.valor_compra,
                "Registro de Compra",
            ),
            TipoIngreso::Nacimiento => {
                (TipoMovimiento::Nacimiento, None, "Registro de Nacimiento")
            }
        };

        self.movimiento_repo
            .insertar(
                &mut *tx,
                semoviente.id_semoviente,
                tipo,
                payload.fecha_ingreso_efectiva(),
                None,
                Some(payload.id_finca),
                valor,
                Some(obs),
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            "🐄 Semoviente '{}' dado de alta en la finca {}",
            semoviente.nro_marca,
            payload.id_finca
        );
        Ok(semoviente)
    }

    pub async fn obtener(&self, claims: &Claims, id: Uuid) -> Result<Semoviente, AppError> {
        let (semoviente, _) = self.buscar_con_permiso(claims, id, Permiso::Lectura).await?;
        Ok(semoviente)
    }

    pub async fn actualizar(
        &self,
        claims: &Claims,
        id: Uuid,
        parche: &ActualizarSemovientePayload,
    ) -> Result<Semoviente, AppError> {
        if parche.es_vacio() {
            return Err(AppError::Datos("Debe enviar al menos un campo".to_string()));
        }

        let (mut semoviente, _) = self.buscar_con_permiso(claims, id, Permiso::Admin).await?;

        parche.aplicar(&mut semoviente);

        // A consistência raza <-> especie se valida sobre o RESULTADO do
        // parche, não só quando os dois campos chegam juntos.
        let ok_raza = self
            .semoviente_repo
            .raza_pertenece_a_especie(semoviente.id_raza, semoviente.id_especie)
            .await?;
        if !ok_raza {
            return Err(AppError::Datos(
                "La raza no pertenece a esa especie".to_string(),
            ));
        }

        self.semoviente_repo.actualizar(&semoviente).await
    }

    pub async fn eliminar(&self, claims: &Claims, id: Uuid) -> Result<(), AppError> {
        self.buscar_con_permiso(claims, id, Permiso::Admin).await?;

        let eliminadas = self.semoviente_repo.eliminar(id).await?;
        if eliminadas == 0 {
            return Err(AppError::NoEncontrado(
                "Semoviente no encontrado".to_string(),
            ));
        }
        Ok(())
    }

    // Override administrativo: qualquer estado, sem movimento no livro.
    // Voltar a 'Activo' limpa os campos de baja.
    pub async fn cambiar_estado(
        &self,
        claims: &Claims,
        id: Uuid,
        payload: &CambiarEstadoPayload,
    ) -> Result<Semoviente, AppError> {
        self.buscar_con_permiso(claims, id, Permiso::Admin).await?;

        self.semoviente_repo
            .aplicar_estado_manual(
                id,
                payload.estado,
                payload.fecha,
                payload.motivo.as_deref(),
                payload.observaciones.as_deref(),
            )
            .await
    }

    // ---
    // Transições com movimento (Traslado / Venta / Muerte)
    // ---
    pub async fn registrar_movimiento(
        &self,
        claims: &Claims,
        id: Uuid,
        payload: &CrearMovimientoPayload,
    ) -> Result<Movimiento, AppError> {
        let transicion = Transicion::desde(payload)?;

        let mut tx = self.pool.begin().await?;

        // FOR UPDATE: duas transições concorrentes sobre o mesmo animal se
        // serializam aqui; a segunda relê o estado já mudado e falha na
        // guarda.
        let semoviente = self
            .semoviente_repo
            .find_por_id_para_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NoEncontrado("Semoviente no encontrado".to_string()))?;
        let finca_actual = semoviente.id_finca;

        let actor = self.actor(claims).await?;
        autorizacion::exigir(
            &actor,
            &Operacion::AdministrarFinca(finca_actual),
            "No autorizado: debe ser AdminFinca de la finca de origen",
        )?;

        validar_transicion(semoviente.estado, &transicion, finca_actual)?;

        let hoy = Utc::now().date_naive();
        let observaciones = payload.observaciones.as_deref();

        let movimiento = match transicion {
            Transicion::Traslado { destino } => {
                if !self.finca_repo.existe(destino).await? {
                    return Err(AppError::NoEncontrado(
                        "Finca destino inexistente".to_string(),
                    ));
                }

                self.semoviente_repo.trasladar(&mut *tx, id, destino).await?;
                self.movimiento_repo
                    .insertar(
                        &mut *tx,
                        id,
                        TipoMovimiento::Traslado,
                        hoy,
                        Some(finca_actual),
                        Some(destino),
                        None,
                        observaciones,
                    )
                    .await?
            }
            Transicion::Venta { valor } => {
                self.semoviente_repo
                    .dar_de_baja(&mut *tx, id, EstadoSemoviente::Vendido, "Venta", observaciones)
                    .await?;
                self.movimiento_repo
                    .insertar(
                        &mut *tx,
                        id,
                        TipoMovimiento::Venta,
                        hoy,
                        Some(finca_actual),
                        None,
                        Some(valor),
                        observaciones,
                    )
                    .await?
            }
            Transicion::Muerte => {
                self.semoviente_repo
                    .dar_de_baja(
                        &mut *tx,
                        id,
                        EstadoSemoviente::Fallecido,
                        "Muerte",
                        observaciones,
                    )
                    .await?;
                self.movimiento_repo
                    .insertar(
                        &mut *tx,
                        id,
                        TipoMovimiento::Muerte,
                        hoy,
                        Some(finca_actual),
                        None,
                        None,
                        observaciones,
                    )
                    .await?
            }
        };

        // Atualização do animal + movimento: ou os dois, ou nenhum
        tx.commit().await?;

        tracing::info!(
            "📒 Movimiento {:?} registrado para el semoviente {}",
            movimiento.tipo_movimiento,
            id
        );
        Ok(movimiento)
    }

    pub async fn listar_movimientos(
        &self,
        claims: &Claims,
        id: Uuid,
    ) -> Result<Vec<Movimiento>, AppError> {
        if self.semoviente_repo.find_por_id(id).await?.is_none() {
            return Err(AppError::NoEncontrado(
                "Semoviente no encontrado".to_string(),
            ));
        }

        let actor = self.actor(claims).await?;
        if !actor.es_superadmin() {
            // Membro de qualquer finca relacionada com o histórico serve
            let relacionado = self
                .movimiento_repo
                .es_miembro_de_finca_relacionada(claims.id_usuario, id)
                .await?;
            if !relacionado {
                return Err(AppError::Autorizacion(
                    "Acceso prohibido: no es miembro de ninguna finca relacionada con este semoviente"
                        .to_string(),
                ));
            }
        }

        self.movimiento_repo.listar_por_semoviente(id).await
    }

    // Expediente completo: dados + históricos médico e de movimentos
    pub async fn ficha_completa(
        &self,
        claims: &Claims,
        id: Uuid,
    ) -> Result<(Semoviente, Vec<RegistroMedico>, Vec<Movimiento>), AppError> {
        let (semoviente, _) = self.buscar_con_permiso(claims, id, Permiso::Lectura).await?;

        let historial_medico = self.registro_repo.listar_por_semoviente(id).await?;
        let historial_movimientos = self.movimiento_repo.listar_por_semoviente(id).await?;

        Ok((semoviente, historial_medico, historial_movimientos))
    }

    // ---
    // Registros médicos (/eventos)
    // ---

    pub async fn listar_registros(
        &self,
        claims: &Claims,
        id: Uuid,
    ) -> Result<Vec<RegistroMedico>, AppError> {
        self.buscar_con_permiso(claims, id, Permiso::Lectura).await?;
        self.registro_repo.listar_por_semoviente(id).await
    }

    pub async fn crear_registro(
        &self,
        claims: &Claims,
        id: Uuid,
        payload: &CrearRegistroMedicoPayload,
    ) -> Result<RegistroMedico, AppError> {
        self.buscar_con_permiso(claims, id, Permiso::Escritura).await?;
        self.registro_repo.crear(id, payload).await
    }

    pub async fn actualizar_registro(
        &self,
        claims: &Claims,
        id: Uuid,
        id_registro: Uuid,
        parche: &ActualizarRegistroMedicoPayload,
    ) -> Result<RegistroMedico, AppError> {
        if parche.es_vacio() {
            return Err(AppError::Datos(
                "Debe enviar al menos un campo para actualizar".to_string(),
            ));
        }

        self.buscar_con_permiso(claims, id, Permiso::Escritura).await?;

        let mut registro = self
            .registro_repo
            .find_por_id(id, id_registro)
            .await?
            .ok_or_else(|| {
                AppError::NoEncontrado(
                    "Registro médico no encontrado o no pertenece a este semoviente".to_string(),
                )
            })?;

        parche.aplicar(&mut registro);
        self.registro_repo.actualizar(&registro).await
    }

    pub async fn eliminar_registro(
        &self,
        claims: &Claims,
        id: Uuid,
        id_registro: Uuid,
    ) -> Result<(), AppError> {
        // Borrar é operação de admin da finca
        self.buscar_con_permiso(claims, id, Permiso::Admin).await?;

        let eliminadas = self.registro_repo.eliminar(id, id_registro).await?;
        if eliminadas == 0 {
            return Err(AppError::NoEncontrado(
                "Registro médico no encontrado o no pertenece a este semoviente".to_string(),
            ));
        }
        Ok(())
    }

    // ---
    // Helpers
    // ---

    // Busca o animal (404 se não existe) e exige o nível de permissão na
    // finca dona.
    async fn buscar_con_permiso(
        &self,
        claims: &Claims,
        id: Uuid,
        permiso: Permiso,
    ) -> Result<(Semoviente, Actor), AppError> {
        let semoviente = self
            .semoviente_repo
            .find_por_id(id)
            .await?
            .ok_or_else(|| AppError::NoEncontrado("Semoviente no encontrado".to_string()))?;

        let actor = self.actor(claims).await?;
        let (operacion, mensaje) = match permiso {
            Permiso::Lectura => (
                Operacion::LeerFinca(semoviente.id_finca),
                "Acceso prohibido a este semoviente",
            ),
            Permiso::Escritura => (
                Operacion::EscribirRegistros(semoviente.id_finca),
                "No autorizado para escribir registros en esta finca",
            ),
            Permiso::Admin => (
                Operacion::AdministrarFinca(semoviente.id_finca),
                "No autorizado: requiere AdminFinca",
            ),
        };
        autorizacion::exigir(&actor, &operacion, mensaje)?;

        Ok((semoviente, actor))
    }

    async fn actor(&self, claims: &Claims) -> Result<Actor, AppError> {
        let membresias = self.membresia_repo.roles_de_usuario(claims.id_usuario).await?;
        Ok(Actor::desde_claims(claims, membresias))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn payload(
        tipo: TipoMovimientoSolicitado,
        destino_id: Option<Uuid>,
        valor: Option<Decimal>,
    ) -> CrearMovimientoPayload {
        CrearMovimientoPayload {
            tipo,
            destino_id,
            observaciones: None,
            valor,
        }
    }

    #[test]
    fn traslado_exige_destino() {
        let err = Transicion::desde(&payload(TipoMovimientoSolicitado::Traslado, None, None))
            .unwrap_err();
        assert!(matches!(err, AppError::Datos(_)));

        let destino = Uuid::new_v4();
        let t = Transicion::desde(&payload(
            TipoMovimientoSolicitado::Traslado,
            Some(destino),
            None,
        ))
        .unwrap();
        assert_eq!(t, Transicion::Traslado { destino });
    }

    #[test]
    fn venta_exige_valor_positivo() {
        // Sin valor
        assert!(matches!(
            Transicion::desde(&payload(TipoMovimientoSolicitado::Venta, None, None)),
            Err(AppError::Datos(_))
        ));
        // Valor cero
        assert!(matches!(
            Transicion::desde(&payload(
                TipoMovimientoSolicitado::Venta,
                None,
                Some(Decimal::ZERO)
            )),
            Err(AppError::Datos(_))
        ));
        // Valor negativo
        assert!(matches!(
            Transicion::desde(&payload(
                TipoMovimientoSolicitado::Venta,
                None,
                Some(Decimal::new(-100, 0))
            )),
            Err(AppError::Datos(_))
        ));

        let t = Transicion::desde(&payload(
            TipoMovimientoSolicitado::Venta,
            None,
            Some(Decimal::new(500, 0)),
        ))
        .unwrap();
        assert_eq!(
            t,
            Transicion::Venta {
                valor: Decimal::new(500, 0)
            }
        );
    }

    #[test]
    fn solo_un_animal_activo_se_mueve() {
        let finca = Uuid::new_v4();
        let t = Transicion::Muerte;

        assert!(validar_transicion(EstadoSemoviente::Activo, &t, finca).is_ok());

        // Cenário do spec: segunda transição sobre um animal já
        // trasladado falha com erro de estado.
        for estado in [
            EstadoSemoviente::Traslado,
            EstadoSemoviente::Vendido,
            EstadoSemoviente::Fallecido,
            EstadoSemoviente::Inactivo,
            EstadoSemoviente::Robado,
            EstadoSemoviente::Perdido,
        ] {
            let err = validar_transicion(estado, &t, finca).unwrap_err();
            assert!(matches!(err, AppError::EstadoInvalido(_)), "estado: {:?}", estado);
        }
    }

    #[test]
    fn traslado_a_la_misma_finca_es_invalido() {
        let finca = Uuid::new_v4();
        let t = Transicion::Traslado { destino: finca };
        let err = validar_transicion(EstadoSemoviente::Activo, &t, finca).unwrap_err();
        assert!(matches!(err, AppError::Datos(_)));

        let otra = Transicion::Traslado { destino: Uuid::new_v4() };
        assert!(validar_transicion(EstadoSemoviente::Activo, &otra, finca).is_ok());
    }
}
