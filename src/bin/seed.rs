use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use uuid::Uuid;

use storefront_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    entity::{
        categories::{self, ActiveModel as CategoryActive, Column as CategoryCol, Entity as Categories},
        items::{ActiveModel as ItemActive, Column as ItemCol, Entity as Items},
        users::{Column as UserCol, Entity as Users},
    },
    middleware::auth::{ADMIN_ROLE, USER_ROLE},
    models::ItemLabel,
    services::auth_service::{create_account, hash_password},
    slugs,
    state::AppState,
};

struct SeedItem {
    title: &'static str,
    slug: &'static str,
    category: &'static str,
    description: &'static str,
    label: Option<ItemLabel>,
    price_cents: i64,
    discount_cents: Option<i64>,
}

const CATEGORIES: &[&str] = &["Shirts", "Sport Wear", "Outwear"];

const ITEMS: &[SeedItem] = &[
    SeedItem {
        title: "Blue Shirt",
        slug: "blue-shirt",
        category: "Shirts",
        description: "Cotton shirt in a calm blue",
        label: Some(ItemLabel::New),
        price_cents: 2000,
        discount_cents: None,
    },
    SeedItem {
        title: "Striped Shirt",
        slug: "striped-shirt",
        category: "Shirts",
        description: "Classic stripes, slim fit",
        label: None,
        price_cents: 3500,
        discount_cents: Some(500),
    },
    SeedItem {
        title: "Running Shorts",
        slug: "running-shorts",
        category: "Sport Wear",
        description: "Light shorts for long runs",
        label: Some(ItemLabel::Top),
        price_cents: 2500,
        discount_cents: None,
    },
    SeedItem {
        title: "Rain Jacket",
        slug: "rain-jacket",
        category: "Outwear",
        description: "Keeps the rain out, packs small",
        label: None,
        price_cents: 8900,
        discount_cents: Some(1000),
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    let state = AppState::new(pool, config);
    // Ensure migrations are applied.
    run_migrations(&state.orm).await?;

    let admin_id = ensure_user(&state.orm, "admin@example.com", "admin12345", ADMIN_ROLE).await?;
    let user_id = ensure_user(&state.orm, "user@example.com", "user12345", USER_ROLE).await?;
    seed_catalog(&state.orm).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    orm: &DatabaseConnection,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    if let Some(existing) = Users::find()
        .filter(UserCol::Email.eq(email))
        .one(orm)
        .await?
    {
        println!("User {email} already present");
        return Ok(existing.id);
    }

    let password_hash = hash_password(password)?;
    let txn = orm.begin().await?;
    let (user, _profile) = create_account(&txn, email, &password_hash, role).await?;
    txn.commit().await?;

    println!("Created user {email} (role={role})");
    Ok(user.id)
}

async fn ensure_category(orm: &DatabaseConnection, name: &str) -> anyhow::Result<categories::Model> {
    let slug = slugs::category_slug(name);
    if let Some(existing) = Categories::find()
        .filter(CategoryCol::Slug.eq(slug.as_str()))
        .one(orm)
        .await?
    {
        return Ok(existing);
    }

    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        slug: Set(slug),
    }
    .insert(orm)
    .await?;
    Ok(category)
}

async fn seed_catalog(orm: &DatabaseConnection) -> anyhow::Result<()> {
    let mut categories = Vec::with_capacity(CATEGORIES.len());
    for name in CATEGORIES {
        categories.push(ensure_category(orm, name).await?);
    }

    for seed in ITEMS {
        let exists = Items::find()
            .filter(ItemCol::Slug.eq(seed.slug))
            .one(orm)
            .await?
            .is_some();
        if exists {
            continue;
        }

        let category_id = categories
            .iter()
            .find(|c| c.name == seed.category)
            .map(|c| c.id);
        let now = Utc::now();
        ItemActive {
            id: Set(Uuid::new_v4()),
            title: Set(seed.title.to_string()),
            brand: Set(None),
            description: Set(seed.description.to_string()),
            label: Set(seed.label.map(|label| label.code().to_string())),
            image: Set(None),
            slug: Set(seed.slug.to_string()),
            category_id: Set(category_id),
            price: Set(Decimal::new(seed.price_cents, 2)),
            discount_price: Set(seed.discount_cents.map(|cents| Decimal::new(cents, 2))),
            date_added: Set(now.into()),
            date_modified: Set(now.into()),
        }
        .insert(orm)
        .await?;
    }

    println!("Seeded catalog");
    Ok(())
}
