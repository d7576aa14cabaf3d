// User accounts: admin CRUD, authentication and the admin bootstrap

use chrono::Utc;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    app::AppState,
    app_config::BootstrapConfig,
    db::DieselPool,
    middleware::AuthenticatedUser,
    models::{
        auth::{CambiarPasswordRequest, RegistroRequest},
        user::{
            ActualizarUsuarioRequest, CrearUsuarioRequest, NuevoUsuario, Rol, UserError,
            Usuario, UsuarioFilter, UsuarioListResponse, UsuarioResponse, UsuarioUpdate,
        },
        Pagination,
    },
    schema::usuarios,
    utils::{
        hash_password, normalize_email, validate_password_strength, verify_password, AuditAction,
        AuditLogger, AuthError, ServiceError,
    },
};

pub struct UserService {
    diesel_pool: DieselPool,
}

fn filtered(filter: &UsuarioFilter) -> usuarios::BoxedQuery<'static, Pg> {
    let mut query = usuarios::table.into_boxed();

    if let Some(rol) = filter.rol {
        query = query.filter(usuarios::rol.eq(rol));
    }
    if let Some(activo) = filter.activo {
        query = query.filter(usuarios::activo.eq(activo));
    }
    if let Some(ref buscar) = filter.buscar {
        let pattern = format!("%{}%", buscar.trim());
        query = query.filter(
            usuarios::nombre
                .ilike(pattern.clone())
                .or(usuarios::email.ilike(pattern)),
        );
    }
    query
}

impl UserService {
    pub fn new(state: &AppState) -> Self {
        Self::with_pool(state.diesel_pool.clone())
    }

    pub fn with_pool(diesel_pool: DieselPool) -> Self {
        Self { diesel_pool }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, filter: UsuarioFilter) -> Result<UsuarioListResponse, ServiceError> {
        let mut conn = self.diesel_pool.get().await?;
        let pagination = Pagination::new(filter.page, filter.per_page);

        let total = filtered(&filter).count().get_result::<i64>(&mut conn).await?;
        let rows = filtered(&filter)
            .order(usuarios::created_at.desc())
            .limit(pagination.limit())
            .offset(pagination.offset())
            .select(Usuario::as_select())
            .load::<Usuario>(&mut conn)
            .await?;

        Ok(UsuarioListResponse {
            data: rows.into_iter().map(UsuarioResponse::from).collect(),
            paginacion: pagination.meta(total),
        })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<Usuario, ServiceError> {
        let mut conn = self.diesel_pool.get().await?;
        Ok(Usuario::find_by_id(&mut conn, id).await?)
    }

    #[instrument(skip(self, actor, request), fields(email = %request.email))]
    pub async fn create(
        &self,
        actor: &AuthenticatedUser,
        request: CrearUsuarioRequest,
    ) -> Result<Usuario, ServiceError> {
        request.validate()?;

        let email = normalize_email(&request.email);
        let mut conn = self.diesel_pool.get().await?;
        self.ensure_email_free(&mut conn, &email, None).await?;

        let usuario = Usuario::create(
            &mut conn,
            NuevoUsuario {
                nombre: request.nombre.trim().to_string(),
                email,
                password_hash: hash_password(&request.password)?,
                rol: request.rol,
                activo: true,
            },
        )
        .await?;

        AuditLogger::resource(AuditAction::Created, actor.id, "usuario", usuario.id);
        Ok(usuario)
    }

    #[instrument(skip(self, actor, request))]
    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        request: ActualizarUsuarioRequest,
    ) -> Result<Usuario, ServiceError> {
        request.validate()?;

        if actor.id == id {
            if request.activo == Some(false) {
                return Err(ServiceError::Conflict(
                    "Un administrador no puede desactivarse a sí mismo".to_string(),
                ));
            }
            if matches!(request.rol, Some(rol) if rol != Rol::Admin) {
                return Err(ServiceError::Conflict(
                    "Un administrador no puede quitarse su propio rol".to_string(),
                ));
            }
        }

        let mut conn = self.diesel_pool.get().await?;
        Usuario::find_by_id(&mut conn, id).await?;

        let email = request.email.as_deref().map(normalize_email);
        if let Some(ref email) = email {
            self.ensure_email_free(&mut conn, email, Some(id)).await?;
        }

        let password_hash = match request.password {
            Some(ref password) => Some(hash_password(password)?),
            None => None,
        };

        let changes = UsuarioUpdate {
            nombre: request.nombre.map(|n| n.trim().to_string()),
            email,
            password_hash,
            rol: request.rol,
            activo: request.activo,
            updated_at: Some(Utc::now()),
        };

        let usuario = diesel::update(usuarios::table.find(id))
            .set(&changes)
            .returning(Usuario::as_returning())
            .get_result(&mut conn)
            .await?;

        AuditLogger::resource(AuditAction::Updated, actor.id, "usuario", id);
        Ok(usuario)
    }

    #[instrument(skip(self, actor))]
    pub async fn delete(&self, actor: &AuthenticatedUser, id: Uuid) -> Result<(), ServiceError> {
        if actor.id == id {
            return Err(ServiceError::Conflict(
                "Un administrador no puede eliminarse a sí mismo".to_string(),
            ));
        }

        let mut conn = self.diesel_pool.get().await?;
        let deleted = diesel::delete(usuarios::table.find(id))
            .execute(&mut conn)
            .await?;

        if deleted == 0 {
            return Err(ServiceError::not_found("Usuario"));
        }

        AuditLogger::resource(AuditAction::Deleted, actor.id, "usuario", id);
        Ok(())
    }

    /// Verify credentials. Unknown email and wrong password are indistinguishable.
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Usuario, AuthError> {
        let mut conn = self
            .diesel_pool
            .get()
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        let usuario = match Usuario::find_by_email(&mut conn, email).await {
            Ok(usuario) => usuario,
            Err(UserError::NotFound) => return Err(AuthError::InvalidCredentials),
            Err(UserError::Database(e)) => return Err(AuthError::DatabaseError(e.to_string())),
        };

        let valid = verify_password(password, &usuario.password_hash).map_err(|e| {
            warn!(user_id = %usuario.id, "Stored password hash unusable: {}", e);
            AuthError::InternalError
        })?;
        if !valid {
            return Err(AuthError::InvalidCredentials);
        }

        if !usuario.activo {
            return Err(AuthError::AccountInactive);
        }

        Ok(usuario)
    }

    /// Public sign-up. The role is always `cliente`.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: RegistroRequest) -> Result<Usuario, ServiceError> {
        request.validate()?;

        let email = normalize_email(&request.email);
        let mut conn = self.diesel_pool.get().await?;
        self.ensure_email_free(&mut conn, &email, None).await?;

        let usuario = Usuario::create(
            &mut conn,
            NuevoUsuario {
                nombre: request.nombre.trim().to_string(),
                email,
                password_hash: hash_password(&request.password)?,
                rol: Rol::Cliente,
                activo: true,
            },
        )
        .await?;

        AuditLogger::log(
            AuditAction::Created,
            Some(usuario.id),
            "usuario",
            Some(usuario.id.to_string()),
            Some("registro".to_string()),
        );
        Ok(usuario)
    }

    #[instrument(skip(self, actor, request))]
    pub async fn change_password(
        &self,
        actor: &AuthenticatedUser,
        request: CambiarPasswordRequest,
    ) -> Result<(), AuthError> {
        request
            .validate()
            .map_err(|e| AuthError::ValidationError(e.to_string()))?;

        let mut conn = self
            .diesel_pool
            .get()
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        let usuario = Usuario::find_by_id(&mut conn, actor.id)
            .await
            .map_err(|_| AuthError::AccountInactive)?;

        let valid = verify_password(&request.password_actual, &usuario.password_hash)
            .map_err(|_| AuthError::InternalError)?;
        if !valid {
            return Err(AuthError::InvalidCredentials);
        }

        let password_hash =
            hash_password(&request.password_nueva).map_err(|_| AuthError::InternalError)?;

        diesel::update(usuarios::table.find(actor.id))
            .set((
                usuarios::password_hash.eq(password_hash),
                usuarios::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        AuditLogger::resource(AuditAction::PasswordChanged, actor.id, "usuario", actor.id);
        Ok(())
    }

    /// Create the first admin from configuration when no admin exists yet.
    /// Returns whether an account was created.
    #[instrument(skip(self, bootstrap))]
    pub async fn ensure_admin(&self, bootstrap: &BootstrapConfig) -> Result<bool, ServiceError> {
        let (Some(email), Some(password)) = (&bootstrap.admin_email, &bootstrap.admin_password)
        else {
            return Ok(false);
        };

        let mut conn = self.diesel_pool.get().await?;
        let admins = usuarios::table
            .filter(usuarios::rol.eq(Rol::Admin))
            .count()
            .get_result::<i64>(&mut conn)
            .await?;
        if admins > 0 {
            return Ok(false);
        }

        validate_password_strength(password).map_err(|_| {
            ServiceError::ValidationError(
                "ADMIN_PASSWORD no cumple los requisitos mínimos".to_string(),
            )
        })?;

        let email = normalize_email(email);
        let usuario = Usuario::create(
            &mut conn,
            NuevoUsuario {
                nombre: bootstrap.admin_nombre.clone(),
                email: email.clone(),
                password_hash: hash_password(password)?,
                rol: Rol::Admin,
                activo: true,
            },
        )
        .await?;

        info!(user_id = %usuario.id, email = %email, "Bootstrap admin account created");
        AuditLogger::log(
            AuditAction::Created,
            None,
            "usuario",
            Some(usuario.id.to_string()),
            Some("bootstrap admin".to_string()),
        );
        Ok(true)
    }

    async fn ensure_email_free(
        &self,
        conn: &mut diesel_async::AsyncPgConnection,
        email: &str,
        except: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let mut query = usuarios::table
            .filter(usuarios::email.eq(email))
            .into_boxed();
        if let Some(id) = except {
            query = query.filter(usuarios::id.ne(id));
        }

        let taken = query.count().get_result::<i64>(conn).await? > 0;
        if taken {
            return Err(ServiceError::Conflict("El email ya está registrado".to_string()));
        }
        Ok(())
    }
}
