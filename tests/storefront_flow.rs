use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
    Statement,
};
use serial_test::serial;
use uuid::Uuid;

use storefront_api::{
    audit::AuditAction,
    config::AppConfig,
    db::{create_pool, run_migrations},
    dto::{
        addresses::CreateAddressRequest,
        admin::{
            CreateCategoryRequest, CreateItemRequest, UpdateItemRequest, UpdateOrderFlagsRequest,
        },
        auth::RegisterRequest,
        orders::CheckoutRequest,
    },
    entity::{AuditLogs, OrderItems, audit_logs, order_items},
    error::AppError,
    middleware::auth::{ADMIN_ROLE, AuthUser, USER_ROLE},
    models::{AddressType, Category, Item},
    response::FlashLevel,
    routes::params::{AddressQuery, Pagination, SearchQuery},
    services::{
        address_service, admin_service, auth_service, cart_service, catalog_service,
        order_service::{self, CheckoutOutcome},
    },
    state::AppState,
};

fn money(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

// Allow skipping when no DB is configured in the environment.
async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run storefront flow tests.");
            return Ok(None);
        }
    };

    let config = AppConfig {
        database_url,
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "flow-test-secret".into(),
        jwt_ttl_hours: 1,
    };
    let pool = create_pool(&config.database_url).await?;
    let state = AppState::new(pool, config);
    run_migrations(&state.orm).await?;

    // Clean tables between runs
    let backend = state.orm.get_database_backend();
    state
        .orm
        .execute(Statement::from_string(
            backend,
            "TRUNCATE TABLE order_items, orders, addresses, items, categories, profiles, audit_logs, users RESTART IDENTITY CASCADE",
        ))
        .await?;

    Ok(Some(state))
}

async fn create_user(state: &AppState, role: &str, email: &str) -> anyhow::Result<AuthUser> {
    let (user, _profile) = auth_service::create_account(&state.orm, email, "dummy", role).await?;
    Ok(AuthUser {
        user_id: user.id,
        role: role.into(),
    })
}

async fn create_category(state: &AppState, admin: &AuthUser, name: &str) -> anyhow::Result<Category> {
    let resp = admin_service::create_category(
        state,
        admin,
        CreateCategoryRequest {
            name: name.into(),
            slug: None,
        },
    )
    .await?;
    Ok(resp.data.expect("category"))
}

async fn create_item(
    state: &AppState,
    admin: &AuthUser,
    title: &str,
    description: &str,
    category: Option<&Category>,
    price: Decimal,
    discount_price: Option<Decimal>,
) -> anyhow::Result<Item> {
    let resp = admin_service::create_item(
        state,
        admin,
        CreateItemRequest {
            title: title.into(),
            brand: None,
            description: description.into(),
            label: None,
            image: None,
            category_id: category.map(|c| c.id),
            price,
            discount_price,
            slug: None,
        },
    )
    .await?;
    Ok(resp.data.expect("item"))
}

// A cart line whose order was never created or has gone away.
async fn insert_detached_line(state: &AppState, user: &AuthUser, item: &Item) -> anyhow::Result<()> {
    order_items::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        item_id: Set(item.id),
        order_id: Set(None),
        quantity: Set(3),
        ordered: Set(false),
        ..Default::default()
    }
    .insert(&state.orm)
    .await?;
    Ok(())
}

async fn lines_of_user(state: &AppState, user: &AuthUser) -> anyhow::Result<u64> {
    let count = OrderItems::find()
        .filter(order_items::Column::UserId.eq(user.user_id))
        .count(&state.orm)
        .await?;
    Ok(count)
}

#[tokio::test]
#[serial]
async fn cart_quantities_follow_add_and_remove() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let admin = create_user(&state, ADMIN_ROLE, "admin@example.com").await?;
    let user = create_user(&state, USER_ROLE, "user@example.com").await?;
    let shirt = create_item(&state, &admin, "Blue Shirt", "Cotton", None, money(2000), None).await?;

    let flash = cart_service::add_to_cart(&state, &user, &shirt.slug).await?;
    assert_eq!(flash.level, FlashLevel::Success);
    assert_eq!(flash.message, cart_service::ADDED_TO_NEW_CART);
    let summary = cart_service::order_summary(&state, &user).await?.data.unwrap();
    assert_eq!(summary.lines.len(), 1);
    assert_eq!(summary.lines[0].quantity, 1);
    assert_eq!(summary.total, money(2000));

    let flash = cart_service::add_to_cart(&state, &user, &shirt.slug).await?;
    assert_eq!(flash.message, cart_service::QUANTITY_UPDATED);
    let summary = cart_service::order_summary(&state, &user).await?.data.unwrap();
    assert_eq!(summary.lines.len(), 1);
    assert_eq!(summary.lines[0].quantity, 2);
    assert_eq!(summary.total, money(4000));

    cart_service::remove_single_item(&state, &user, &shirt.slug).await?;
    let summary = cart_service::order_summary(&state, &user).await?.data.unwrap();
    assert_eq!(summary.lines[0].quantity, 1);
    assert_eq!(summary.total, money(2000));

    let flash = cart_service::remove_from_cart(&state, &user, &shirt.slug).await?;
    assert_eq!(flash.message, cart_service::REMOVED_FROM_CART);
    let summary = cart_service::order_summary(&state, &user).await?.data.unwrap();
    assert!(summary.is_empty());
    assert_eq!(summary.total, Decimal::ZERO);
    assert!(!summary.order.ordered);

    Ok(())
}

#[tokio::test]
#[serial]
async fn decrementing_last_unit_removes_line_and_missing_lines_warn() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let admin = create_user(&state, ADMIN_ROLE, "admin@example.com").await?;
    let user = create_user(&state, USER_ROLE, "user@example.com").await?;
    let mug = create_item(&state, &admin, "Mug", "Ceramic mug", None, money(1200), None).await?;

    let flash = cart_service::remove_single_item(&state, &user, &mug.slug).await?;
    assert_eq!(flash.level, FlashLevel::Warning);
    assert_eq!(flash.message, cart_service::NOT_IN_CART);

    cart_service::add_to_cart(&state, &user, &mug.slug).await?;
    let flash = cart_service::remove_single_item(&state, &user, &mug.slug).await?;
    assert_eq!(flash.message, cart_service::REMOVED_FROM_CART);
    let summary = cart_service::order_summary(&state, &user).await?.data.unwrap();
    assert!(summary.is_empty());

    let flash = cart_service::remove_from_cart(&state, &user, &mug.slug).await?;
    assert_eq!(flash.level, FlashLevel::Warning);

    let err = cart_service::add_to_cart(&state, &user, "no-such-item")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    Ok(())
}

#[tokio::test]
#[serial]
async fn discounted_lines_report_savings() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let admin = create_user(&state, ADMIN_ROLE, "admin@example.com").await?;
    let user = create_user(&state, USER_ROLE, "user@example.com").await?;
    let jacket = create_item(
        &state,
        &admin,
        "Rain Jacket",
        "Keeps the rain out",
        None,
        money(3500),
        Some(money(500)),
    )
    .await?;

    cart_service::add_to_cart(&state, &user, &jacket.slug).await?;
    cart_service::add_to_cart(&state, &user, &jacket.slug).await?;

    let summary = cart_service::order_summary(&state, &user).await?.data.unwrap();
    assert_eq!(summary.lines[0].line_total, money(6000));
    assert_eq!(summary.lines[0].amount_saved, money(1000));
    assert_eq!(summary.total, money(6000));
    assert_eq!(summary.total_saved, money(1000));

    Ok(())
}

#[tokio::test]
#[serial]
async fn catalog_listing_search_and_detail() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let admin = create_user(&state, ADMIN_ROLE, "admin@example.com").await?;
    let user = create_user(&state, USER_ROLE, "user@example.com").await?;
    let shirts = create_category(&state, &admin, "Shirts").await?;
    let outwear = create_category(&state, &admin, "Outwear").await?;
    assert_eq!(shirts.slug, "shirts");

    let blue = create_item(&state, &admin, "Blue Shirt", "A blue shirt", Some(&shirts), money(2000), None).await?;
    let striped = create_item(&state, &admin, "Striped Shirt", "Stripes", Some(&shirts), money(3000), None).await?;
    create_item(&state, &admin, "Socks", "Wool socks", None, money(500), None).await?;

    let err = catalog_service::list_by_category(&state, "no-such-category", Pagination::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let page = catalog_service::list_by_category(&state, &outwear.slug, Pagination::default())
        .await?
        .data
        .unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.active_category, Some(outwear.id));

    let page = catalog_service::list_by_category(&state, &shirts.slug, Pagination::default())
        .await?
        .data
        .unwrap();
    assert_eq!(page.items.len(), 2);

    let all = catalog_service::list_items(&state, Pagination::default()).await?.data.unwrap();
    assert_eq!(all.items.len(), 3);
    assert_eq!(all.categories.len(), 2);

    // "Blue Shirt" matches on both title and description but shows up once.
    let results = catalog_service::search(&state, SearchQuery::new(Some("SHIRT")))
        .await?
        .data
        .unwrap();
    assert_eq!(results.items.len(), 2);
    assert_eq!(results.items.iter().filter(|i| i.id == blue.id).count(), 1);

    let results = catalog_service::search(&state, SearchQuery::new(Some("   "))).await?.data.unwrap();
    assert_eq!(results.items.len(), 3);

    let results = catalog_service::search(&state, SearchQuery::new(Some("100%"))).await?.data.unwrap();
    assert!(results.items.is_empty());

    let detail = catalog_service::product_detail(&state, None, &blue.slug).await?.data.unwrap();
    assert_eq!(detail.related_items.len(), 1);
    assert_eq!(detail.related_items[0].id, striped.id);
    assert!(!detail.already_added);

    cart_service::add_to_cart(&state, &user, &blue.slug).await?;
    let detail = catalog_service::product_detail(&state, Some(&user), &blue.slug).await?.data.unwrap();
    assert!(detail.already_added);

    Ok(())
}

#[tokio::test]
#[serial]
async fn registration_creates_profile_and_rejects_duplicates() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let account = auth_service::register_user(
        &state,
        RegisterRequest {
            email: "Shopper@Example.com".into(),
            password: "long-enough".into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(account.user.email, "shopper@example.com");
    assert_eq!(account.profile.user_id, account.user.id);

    let err = auth_service::register_user(
        &state,
        RegisterRequest {
            email: "shopper@example.com".into(),
            password: "long-enough".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let err = auth_service::register_user(
        &state,
        RegisterRequest {
            email: "short@example.com".into(),
            password: "short".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    Ok(())
}

#[tokio::test]
#[serial]
async fn checkout_places_order_and_refund_is_granted() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let admin = create_user(&state, ADMIN_ROLE, "admin@example.com").await?;
    let user = create_user(&state, USER_ROLE, "user@example.com").await?;
    let shirt = create_item(&state, &admin, "Blue Shirt", "Cotton", None, money(2000), None).await?;

    let outcome = order_service::checkout(&state, &user, CheckoutRequest::default()).await?;
    assert!(matches!(outcome, CheckoutOutcome::EmptyCart));

    let shipping = address_service::create_address(
        &state,
        &user,
        CreateAddressRequest {
            street_address: "1 Main St".into(),
            apartment_address: String::new(),
            country: "fr".into(),
            zip_code: "75001".into(),
            address_type: AddressType::Shipping,
            default: true,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(shipping.country, "FR");

    let listed = address_service::list_addresses(
        &state,
        &user,
        AddressQuery {
            address_type: Some(AddressType::Billing),
        },
    )
    .await?
    .data
    .unwrap();
    assert!(listed.items.is_empty());

    cart_service::add_to_cart(&state, &user, &shirt.slug).await?;

    // A shipping address cannot stand in for billing.
    let err = order_service::checkout(
        &state,
        &user,
        CheckoutRequest {
            shipping_address_id: None,
            billing_address_id: Some(shipping.id),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let outcome = order_service::checkout(
        &state,
        &user,
        CheckoutRequest {
            shipping_address_id: Some(shipping.id),
            billing_address_id: None,
        },
    )
    .await?;
    let order = match outcome {
        CheckoutOutcome::Placed(order) => order,
        CheckoutOutcome::EmptyCart => panic!("expected a placed order"),
    };
    assert!(order.ordered);
    assert_eq!(order.shipping_address_id, Some(shipping.id));

    // Placed lines are no longer part of the cart.
    let summary = cart_service::order_summary(&state, &user).await?.data.unwrap();
    assert!(summary.is_empty());
    assert_ne!(summary.order.id, order.id);
    let detail = catalog_service::product_detail(&state, Some(&user), &shirt.slug).await?.data.unwrap();
    assert!(!detail.already_added);

    let placed = order_service::get_order(&state, &user, order.id).await?.data.unwrap();
    assert_eq!(placed.total, money(2000));
    assert!(placed.lines.iter().all(|line| line.ordered));

    let orders = order_service::list_orders(&state, &user, Pagination::default()).await?.data.unwrap();
    assert_eq!(orders.items.len(), 1);

    let checkouts = AuditLogs::find()
        .filter(audit_logs::Column::UserId.eq(user.user_id))
        .filter(audit_logs::Column::Action.eq(AuditAction::Checkout.as_str()))
        .count(&state.orm)
        .await?;
    assert_eq!(checkouts, 1);

    let err = admin_service::update_order_flags(
        &state,
        &admin,
        order.id,
        UpdateOrderFlagsRequest {
            refund_granted: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let refunded = order_service::request_refund(&state, &user, order.id).await?.data.unwrap();
    assert!(refunded.refund_requested);

    let updated = admin_service::update_order_flags(
        &state,
        &admin,
        order.id,
        UpdateOrderFlagsRequest {
            being_delivered: Some(true),
            refund_granted: Some(true),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert!(updated.being_delivered);
    assert!(updated.refund_granted);

    let err = admin_service::list_placed_orders(&state, &user, Pagination::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    Ok(())
}

#[tokio::test]
#[serial]
async fn removing_missing_item_leaves_cart_untouched() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let admin = create_user(&state, ADMIN_ROLE, "admin@example.com").await?;
    let user = create_user(&state, USER_ROLE, "user@example.com").await?;
    let shirt = create_item(&state, &admin, "Blue Shirt", "Cotton", None, money(2000), None).await?;
    let mug = create_item(&state, &admin, "Mug", "Ceramic mug", None, money(1200), None).await?;

    cart_service::add_to_cart(&state, &user, &shirt.slug).await?;
    cart_service::add_to_cart(&state, &user, &shirt.slug).await?;

    let flash = cart_service::remove_from_cart(&state, &user, &mug.slug).await?;
    assert_eq!(flash.level, FlashLevel::Warning);
    assert_eq!(flash.message, cart_service::NOT_IN_CART);
    let flash = cart_service::remove_single_item(&state, &user, &mug.slug).await?;
    assert_eq!(flash.message, cart_service::NOT_IN_CART);

    let summary = cart_service::order_summary(&state, &user).await?.data.unwrap();
    assert_eq!(summary.lines.len(), 1);
    assert_eq!(summary.lines[0].item.id, shirt.id);
    assert_eq!(summary.lines[0].quantity, 2);
    assert_eq!(summary.total, money(4000));

    Ok(())
}

#[tokio::test]
#[serial]
async fn line_without_open_order_is_dropped_with_warning() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let admin = create_user(&state, ADMIN_ROLE, "admin@example.com").await?;
    let user = create_user(&state, USER_ROLE, "user@example.com").await?;
    let shirt = create_item(&state, &admin, "Blue Shirt", "Cotton", None, money(2000), None).await?;

    insert_detached_line(&state, &user, &shirt).await?;
    let flash = cart_service::remove_from_cart(&state, &user, &shirt.slug).await?;
    assert_eq!(flash.level, FlashLevel::Warning);
    assert_eq!(flash.message, cart_service::NO_ACTIVE_ORDER);
    assert_eq!(lines_of_user(&state, &user).await?, 0);

    insert_detached_line(&state, &user, &shirt).await?;
    let flash = cart_service::remove_single_item(&state, &user, &shirt.slug).await?;
    assert_eq!(flash.level, FlashLevel::Warning);
    assert_eq!(flash.message, cart_service::NO_ACTIVE_ORDER);
    assert_eq!(lines_of_user(&state, &user).await?, 0);

    Ok(())
}

#[tokio::test]
#[serial]
async fn admin_patch_clears_discount_with_null() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let admin = create_user(&state, ADMIN_ROLE, "admin@example.com").await?;
    let jacket = create_item(
        &state,
        &admin,
        "Rain Jacket",
        "Keeps the rain out",
        None,
        money(3500),
        Some(money(500)),
    )
    .await?;

    let renamed = admin_service::update_item(
        &state,
        &admin,
        jacket.id,
        UpdateItemRequest {
            title: Some("Storm Jacket".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(renamed.discount_price, Some(money(500)));

    let cleared = admin_service::update_item(
        &state,
        &admin,
        jacket.id,
        UpdateItemRequest {
            discount_price: Some(None),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(cleared.discount_price, None);
    assert_eq!(cleared.effective_price, money(3500));

    Ok(())
}
