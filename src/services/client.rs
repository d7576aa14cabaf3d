// Client records

use chrono::Utc;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    app::AppState,
    db::DieselPool,
    middleware::AuthenticatedUser,
    models::{
        client::{
            ActualizarClienteRequest, Cliente, ClienteFilter, ClienteListResponse, ClienteUpdate,
            CrearClienteRequest, NuevoCliente,
        },
        Pagination,
    },
    schema::{clientes, pagos},
    utils::{
        normalize_email, trim_and_validate_field, trim_optional_field, AuditAction, AuditLogger,
        ServiceError,
    },
};

pub struct ClientService {
    diesel_pool: DieselPool,
}

fn filtered(filter: &ClienteFilter) -> clientes::BoxedQuery<'static, Pg> {
    let mut query = clientes::table.into_boxed();

    if let Some(estado) = filter.estado {
        query = query.filter(clientes::estado.eq(estado));
    }
    if let Some(ref buscar) = filter.buscar {
        let pattern = format!("%{}%", buscar.trim());
        query = query.filter(
            clientes::nombre
                .ilike(pattern.clone())
                .or(clientes::apellido.ilike(pattern.clone()))
                .or(clientes::identificacion.ilike(pattern.clone()))
                .or(clientes::email.ilike(pattern)),
        );
    }
    query
}

impl ClientService {
    pub fn new(state: &AppState) -> Self {
        Self {
            diesel_pool: state.diesel_pool.clone(),
        }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, filter: ClienteFilter) -> Result<ClienteListResponse, ServiceError> {
        let mut conn = self.diesel_pool.get().await?;
        let pagination = Pagination::new(filter.page, filter.per_page);

        let total = filtered(&filter).count().get_result::<i64>(&mut conn).await?;
        let data = filtered(&filter)
            .order((clientes::apellido.asc(), clientes::nombre.asc()))
            .limit(pagination.limit())
            .offset(pagination.offset())
            .select(Cliente::as_select())
            .load::<Cliente>(&mut conn)
            .await?;

        Ok(ClienteListResponse {
            data,
            paginacion: pagination.meta(total),
        })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<Cliente, ServiceError> {
        let mut conn = self.diesel_pool.get().await?;
        clientes::table
            .find(id)
            .select(Cliente::as_select())
            .first::<Cliente>(&mut conn)
            .await
            .optional()?
            .ok_or_else(|| ServiceError::not_found("Cliente"))
    }

    #[instrument(skip(self, actor, request))]
    pub async fn create(
        &self,
        actor: &AuthenticatedUser,
        request: CrearClienteRequest,
    ) -> Result<Cliente, ServiceError> {
        request.validate()?;

        let identificacion = trim_and_validate_field(&request.identificacion, true)
            .map_err(ServiceError::ValidationError)?;

        let mut conn = self.diesel_pool.get().await?;
        self.ensure_identificacion_free(&mut conn, &identificacion, None)
            .await?;

        let nuevo = NuevoCliente {
            identificacion,
            nombre: request.nombre.trim().to_string(),
            apellido: request.apellido.trim().to_string(),
            email: trim_optional_field(request.email.as_ref()).map(|e| normalize_email(&e)),
            telefono: trim_optional_field(request.telefono.as_ref()),
            fecha_nacimiento: request.fecha_nacimiento,
            direccion: trim_optional_field(request.direccion.as_ref()),
            fecha_inscripcion: request
                .fecha_inscripcion
                .unwrap_or_else(|| Utc::now().date_naive()),
            fecha_vencimiento: request.fecha_vencimiento,
            estado: request.estado.unwrap_or_default(),
            usuario_id: request.usuario_id,
        };

        let cliente = diesel::insert_into(clientes::table)
            .values(&nuevo)
            .returning(Cliente::as_returning())
            .get_result(&mut conn)
            .await?;

        AuditLogger::resource(AuditAction::Created, actor.id, "cliente", cliente.id);
        Ok(cliente)
    }

    #[instrument(skip(self, actor, request))]
    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        request: ActualizarClienteRequest,
    ) -> Result<Cliente, ServiceError> {
        request.validate()?;

        let mut conn = self.diesel_pool.get().await?;

        let identificacion = match request.identificacion {
            Some(ref value) => {
                let value = trim_and_validate_field(value, true)
                    .map_err(ServiceError::ValidationError)?;
                self.ensure_identificacion_free(&mut conn, &value, Some(id))
                    .await?;
                Some(value)
            },
            None => None,
        };

        let changes = ClienteUpdate {
            identificacion,
            nombre: request.nombre.map(|v| v.trim().to_string()),
            apellido: request.apellido.map(|v| v.trim().to_string()),
            email: request
                .email
                .as_ref()
                .map(|e| trim_optional_field(Some(e)).map(|e| normalize_email(&e))),
            telefono: request.telefono.as_ref().map(|t| trim_optional_field(Some(t))),
            fecha_nacimiento: request.fecha_nacimiento.map(Some),
            direccion: request.direccion.as_ref().map(|d| trim_optional_field(Some(d))),
            fecha_inscripcion: request.fecha_inscripcion,
            fecha_vencimiento: request.fecha_vencimiento.map(Some),
            estado: request.estado,
            usuario_id: request.usuario_id.map(Some),
            updated_at: Some(Utc::now()),
        };

        // composicion_corporal follows identificacion through ON UPDATE CASCADE
        let cliente = diesel::update(clientes::table.find(id))
            .set(&changes)
            .returning(Cliente::as_returning())
            .get_result(&mut conn)
            .await
            .optional()?
            .ok_or_else(|| ServiceError::not_found("Cliente"))?;

        AuditLogger::resource(AuditAction::Updated, actor.id, "cliente", id);
        Ok(cliente)
    }

    /// Clients with payments are kept for the ledger history.
    /// Registrations, assignments, sessions and measurements go with the client.
    #[instrument(skip(self, actor))]
    pub async fn delete(&self, actor: &AuthenticatedUser, id: Uuid) -> Result<(), ServiceError> {
        let mut conn = self.diesel_pool.get().await?;

        conn.transaction::<_, ServiceError, _>(|conn| {
            Box::pin(async move {
                let exists = clientes::table
                    .find(id)
                    .select(clientes::id)
                    .for_update()
                    .first::<Uuid>(conn)
                    .await
                    .optional()?;
                if exists.is_none() {
                    return Err(ServiceError::not_found("Cliente"));
                }

                let payments = pagos::table
                    .filter(pagos::cliente_id.eq(id))
                    .count()
                    .get_result::<i64>(conn)
                    .await?;
                if payments > 0 {
                    return Err(ServiceError::Conflict(format!(
                        "El cliente tiene {} pago(s) registrados y no puede eliminarse",
                        payments
                    )));
                }

                diesel::delete(clientes::table.find(id)).execute(conn).await?;
                Ok(())
            })
        })
        .await?;

        info!(cliente_id = %id, "Client deleted");
        AuditLogger::resource(AuditAction::Deleted, actor.id, "cliente", id);
        Ok(())
    }

    async fn ensure_identificacion_free(
        &self,
        conn: &mut diesel_async::AsyncPgConnection,
        identificacion: &str,
        except: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let mut query = clientes::table
            .filter(clientes::identificacion.eq(identificacion))
            .into_boxed();
        if let Some(id) = except {
            query = query.filter(clientes::id.ne(id));
        }

        if query.count().get_result::<i64>(conn).await? > 0 {
            return Err(ServiceError::Conflict(format!(
                "Ya existe un cliente con la identificación {}",
                identificacion
            )));
        }
        Ok(())
    }
}
