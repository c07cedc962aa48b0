use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit::{self, AuditAction},
    dto::addresses::{AddressList, CreateAddressRequest},
    entity::addresses::{ActiveModel as AddressActive, Column as AddressCol, Entity as Addresses},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Address, AddressType},
    response::{ApiResponse, Meta},
    routes::params::AddressQuery,
    state::AppState,
};

pub async fn list_addresses(
    state: &AppState,
    user: &AuthUser,
    query: AddressQuery,
) -> AppResult<ApiResponse<AddressList>> {
    let items = addresses_of(&state.orm, user.user_id, query.address_type).await?;
    Ok(ApiResponse::success(
        "Addresses",
        AddressList { items },
        Some(Meta::empty()),
    ))
}

pub async fn create_address(
    state: &AppState,
    user: &AuthUser,
    payload: CreateAddressRequest,
) -> AppResult<ApiResponse<Address>> {
    payload.validate()?;
    let country = normalize_country(&payload.country)?;

    let address = AddressActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        street_address: Set(payload.street_address),
        apartment_address: Set(payload.apartment_address),
        country: Set(country),
        zip_code: Set(payload.zip_code),
        address_type: Set(payload.address_type.code().to_string()),
        is_default: Set(payload.default),
        ..Default::default()
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        user.user_id,
        AuditAction::AddressCreate,
        serde_json::json!({ "address_id": address.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Address created",
        Address::try_from(address)?,
        Some(Meta::empty()),
    ))
}

/// Addresses of a user, defaults first.
pub async fn addresses_of<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    address_type: Option<AddressType>,
) -> AppResult<Vec<Address>> {
    let mut finder = Addresses::find().filter(AddressCol::UserId.eq(user_id));
    if let Some(address_type) = address_type {
        finder = finder.filter(AddressCol::AddressType.eq(address_type.code()));
    }

    finder
        .order_by_desc(AddressCol::IsDefault)
        .order_by_desc(AddressCol::CreatedAt)
        .all(conn)
        .await?
        .into_iter()
        .map(Address::try_from)
        .collect()
}

/// ISO 3166-1 alpha-2 codes are stored upper-case.
pub fn normalize_country(country: &str) -> AppResult<String> {
    let country = country.trim();
    if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(AppError::BadRequest(format!(
            "country must be a two-letter code, got {country:?}"
        )));
    }
    Ok(country.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::normalize_country;

    #[test]
    fn country_codes_are_upper_cased() {
        assert_eq!(normalize_country("fr").unwrap(), "FR");
        assert_eq!(normalize_country(" US ").unwrap(), "US");
    }

    #[test]
    fn rejects_non_alpha_codes() {
        assert!(normalize_country("F1").is_err());
        assert!(normalize_country("FRA").is_err());
        assert!(normalize_country("").is_err());
    }
}
