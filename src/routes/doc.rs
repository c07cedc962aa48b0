use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        addresses::{AddressList, CreateAddressRequest},
        admin::{CreateCategoryRequest, CreateItemRequest, UpdateItemRequest, UpdateOrderFlagsRequest},
        auth::{Account, LoginRequest, LoginResponse, RegisterRequest},
        cart::OrderSummary,
        catalog::{CatalogPage, CategoryList, ProductDetail, SearchResults},
        orders::{CheckoutPage, CheckoutRequest, OrderList},
    },
    models::{Address, AddressType, Category, Item, ItemLabel, Order, OrderLine, Profile, User},
    response::{ApiResponse, Flash, FlashLevel, Meta, RedirectData},
    routes::{addresses, admin, auth, cart, catalog, health, orders},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::current_account,
        catalog::home,
        catalog::list_categories,
        catalog::by_category,
        catalog::product_detail,
        catalog::search,
        cart::add_to_cart,
        cart::remove_from_cart,
        cart::remove_single_item,
        cart::order_summary,
        orders::checkout_page,
        orders::checkout,
        orders::list_orders,
        orders::get_order,
        orders::request_refund,
        addresses::list_addresses,
        addresses::create_address,
        admin::create_category,
        admin::create_item,
        admin::update_item,
        admin::delete_item,
        admin::list_placed_orders,
        admin::update_order_flags
    ),
    components(
        schemas(
            User,
            Profile,
            Category,
            Item,
            ItemLabel,
            Address,
            AddressType,
            Order,
            OrderLine,
            Account,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            CatalogPage,
            CategoryList,
            ProductDetail,
            SearchResults,
            OrderSummary,
            CheckoutPage,
            CheckoutRequest,
            OrderList,
            AddressList,
            CreateAddressRequest,
            CreateCategoryRequest,
            CreateItemRequest,
            UpdateItemRequest,
            UpdateOrderFlagsRequest,
            Flash,
            FlashLevel,
            RedirectData,
            health::HealthData,
            Meta,
            ApiResponse<CatalogPage>,
            ApiResponse<ProductDetail>,
            ApiResponse<OrderSummary>,
            ApiResponse<RedirectData>,
            ApiResponse<OrderList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration and login"),
        (name = "Catalog", description = "Item listing, categories, detail and search"),
        (name = "Cart", description = "In-progress order endpoints"),
        (name = "Orders", description = "Checkout and placed orders"),
        (name = "Addresses", description = "Shipping and billing addresses"),
        (name = "Admin", description = "Catalog and order administration"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
