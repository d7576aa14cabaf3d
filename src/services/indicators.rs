// Dashboard indicators computed on request

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::instrument;

use crate::{
    app::AppState,
    db::DieselPool,
    models::{
        client::EstadoCliente,
        indicators::{expiry_window, month_bounds, Indicadores},
        transaction::TransaccionFilter,
    },
    schema::{clientes, entrenadores, rutinas_asignadas, sesiones},
    services::accounting,
    utils::ServiceError,
};

pub struct IndicatorService {
    diesel_pool: DieselPool,
}

impl IndicatorService {
    pub fn new(state: &AppState) -> Self {
        Self {
            diesel_pool: state.diesel_pool.clone(),
        }
    }

    #[instrument(skip(self))]
    pub async fn dashboard(&self) -> Result<Indicadores, ServiceError> {
        let today = Utc::now().date_naive();
        let (inicio_mes, fin_mes) = month_bounds(today);
        let (vence_desde, vence_hasta) = expiry_window(today);

        let mut conn = self.diesel_pool.get().await?;

        let clientes_activos = clientes::table
            .filter(clientes::estado.eq(EstadoCliente::Activo))
            .count()
            .get_result::<i64>(&mut conn)
            .await?;

        let clientes_nuevos_mes = clientes::table
            .filter(clientes::fecha_inscripcion.between(inicio_mes, fin_mes))
            .count()
            .get_result::<i64>(&mut conn)
            .await?;

        let membresias_por_vencer = clientes::table
            .filter(clientes::estado.eq(EstadoCliente::Activo))
            .filter(clientes::fecha_vencimiento.between(vence_desde, vence_hasta))
            .count()
            .get_result::<i64>(&mut conn)
            .await?;

        let totales_mes = accounting::totals(
            &mut conn,
            &TransaccionFilter {
                desde: Some(inicio_mes),
                hasta: Some(fin_mes),
                ..Default::default()
            },
        )
        .await?;

        let asistencias_hoy = sesiones::table
            .filter(sesiones::fecha.eq(today))
            .count()
            .get_result::<i64>(&mut conn)
            .await?;

        let sesiones_abiertas = sesiones::table
            .filter(sesiones::hora_salida.is_null())
            .count()
            .get_result::<i64>(&mut conn)
            .await?;

        let entrenadores_activos = entrenadores::table
            .filter(entrenadores::activo.eq(true))
            .count()
            .get_result::<i64>(&mut conn)
            .await?;

        let rutinas_activas = rutinas_asignadas::table
            .filter(rutinas_asignadas::activa.eq(true))
            .count()
            .get_result::<i64>(&mut conn)
            .await?;

        Ok(Indicadores {
            fecha: today,
            clientes_activos,
            clientes_nuevos_mes,
            membresias_por_vencer,
            ingresos_mes: totales_mes.total_ingresos,
            egresos_mes: totales_mes.total_egresos,
            balance_mes: totales_mes.balance,
            asistencias_hoy,
            sesiones_abiertas,
            entrenadores_activos,
            rutinas_activas,
        })
    }
}
