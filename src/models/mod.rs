// Database models and request/response DTOs

/// FromSql/ToSql for enums stored as text columns.
/// The enum needs `as_str()` and a `FromStr` impl with a `String` error.
macro_rules! impl_text_sql {
    ($ty:ty) => {
        impl diesel::deserialize::FromSql<diesel::sql_types::Text, diesel::pg::Pg> for $ty {
            fn from_sql(bytes: diesel::pg::PgValue<'_>) -> diesel::deserialize::Result<Self> {
                let value = <String as diesel::deserialize::FromSql<
                    diesel::sql_types::Text,
                    diesel::pg::Pg,
                >>::from_sql(bytes)?;
                value.parse::<$ty>().map_err(|e| e.into())
            }
        }

        impl diesel::serialize::ToSql<diesel::sql_types::Text, diesel::pg::Pg> for $ty {
            fn to_sql<'b>(
                &'b self,
                out: &mut diesel::serialize::Output<'b, '_, diesel::pg::Pg>,
            ) -> diesel::serialize::Result {
                <str as diesel::serialize::ToSql<diesel::sql_types::Text, diesel::pg::Pg>>::to_sql(
                    self.as_str(),
                    out,
                )
            }
        }
    };
}

pub mod auth;
pub mod body_composition;
pub mod class_registration;
pub mod client;
pub mod indicators;
pub mod pagination;
pub mod payment;
pub mod product;
pub mod routine;
pub mod session;
pub mod trainer;
pub mod transaction;
pub mod user;

/// Keeps an explicit JSON `null` apart from an absent field:
/// absent -> `None`, `null` -> `Some(None)`, value -> `Some(Some(v))`.
/// Use together with `#[serde(default)]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    <Option<T> as serde::Deserialize>::deserialize(deserializer).map(Some)
}

pub use auth::*;
pub use pagination::{PageMeta, Pagination};
pub use user::{Rol, Usuario, UsuarioResponse};
