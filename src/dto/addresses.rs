use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{Address, AddressType};

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateAddressRequest {
    #[validate(length(min = 1, max = 100))]
    pub street_address: String,
    #[validate(length(max = 100))]
    pub apartment_address: String,
    /// ISO 3166-1 alpha-2 code, any case.
    pub country: String,
    #[validate(length(min = 1, max = 32))]
    pub zip_code: String,
    pub address_type: AddressType,
    #[serde(default)]
    pub default: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AddressList {
    pub items: Vec<Address>,
}
