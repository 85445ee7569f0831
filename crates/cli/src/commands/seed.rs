//! Demo data seeding command.
//!
//! Creates the `admin`/`admin123` and `user`/`user123` accounts if they are
//! missing, and the demo catalog if no product exists yet. Re-running it is
//! a no-op.
//!
//! # Usage
//!
//! ```bash
//! shop-cli seed
//! ```

use rust_decimal::Decimal;
use thiserror::Error;

use shopcart_core::{ProductInput, Role};
use shopcart_storefront::db::{CatalogStore, PgCatalogStore, PgUserStore, UserStore};
use shopcart_storefront::services::{CatalogService, ServiceError};
use shopcart_storefront::services::auth::{AuthError, AuthService};

use super::ConnectError;

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("failed to seed users: {0}")]
    Users(#[from] AuthError),

    #[error("failed to seed products: {0}")]
    Products(#[from] ServiceError),
}

/// Demo accounts: username, password, role.
const DEMO_USERS: [(&str, &str, Role); 2] = [
    ("admin", "admin123", Role::Admin),
    ("user", "user123", Role::User),
];

struct DemoProduct {
    name: &'static str,
    description: &'static str,
    /// Price in cents.
    cents: i64,
    image_url: &'static str,
}

const DEMO_PRODUCTS: [DemoProduct; 10] = [
    DemoProduct {
        name: "iPhone 15 Pro",
        description: "Titanium design, A17 Pro chip, 48MP Main camera.",
        cents: 99_900,
        image_url: "https://m.media-amazon.com/images/I/71657TiFeHL._SX679_.jpg",
    },
    DemoProduct {
        name: "Samsung Galaxy S24 Ultra",
        description: "Galaxy AI is here. Epic design, epic performance.",
        cents: 129_900,
        image_url: "https://m.media-amazon.com/images/I/418mFfRZu-L._SY300_SX300_QL70_FMwebp_.jpg",
    },
    DemoProduct {
        name: "Sony WH-1000XM5",
        description: "Wireless Noise Cancelling Headphones with Auto NC Optimizer.",
        cents: 34_800,
        image_url: "https://m.media-amazon.com/images/I/51SKmu2G9FL._AC_UF894,1000_QL80_.jpg",
    },
    DemoProduct {
        name: "MacBook Air 15-inch",
        description: "Supercharged by M2. Impossibly thin and incredibly fast.",
        cents: 129_900,
        image_url: "https://store.storeimages.cdn-apple.com/4668/as-images.apple.com/is/mba15-midnight-select-202306?wid=904&hei=840&fmt=jpeg&qlt=90&.v=1684518479433",
    },
    DemoProduct {
        name: "Nintendo Switch OLED",
        description: "7-inch OLED screen, wide adjustable stand, wired LAN port.",
        cents: 34_999,
        image_url: "https://assets.nintendo.com/image/upload/f_auto/q_auto/dpr_1.5/c_scale,w_600/ncom/en_US/switch/site-design-update/hardware/switch/nintendo-switch-oled-model-white-set/gallery/image01",
    },
    DemoProduct {
        name: "Dell XPS 13",
        description: "13.4-inch FHD+ display, Intel Core i7, 16GB RAM, 512GB SSD.",
        cents: 109_900,
        image_url: "https://m.media-amazon.com/images/I/712CAwRf6xL._SX679_.jpg",
    },
    DemoProduct {
        name: "iPad Air",
        description: "Liquid Retina display, M1 chip, 5G capable.",
        cents: 59_900,
        image_url: "https://store.storeimages.cdn-apple.com/4982/as-images.apple.com/is/ipad-air-select-wifi-blue-202203?wid=940&hei=1112&fmt=png-alpha&.v=1645065732688",
    },
    DemoProduct {
        name: "Bose QuietComfort 45",
        description: "Iconic quiet, comfort, and sound.",
        cents: 32_900,
        image_url: "https://m.media-amazon.com/images/I/31+fg95OcqL._SY300_SX300_QL70_FMwebp_.jpg",
    },
    DemoProduct {
        name: "Canon EOS R6",
        description: "Full-frame mirrorless camera with 20MP CMOS sensor.",
        cents: 249_900,
        image_url: "https://static.bhphoto.com/images/images500x500/canon_eos_r6_mirrorless_digital_1594281472_1547009.jpg",
    },
    DemoProduct {
        name: "Logitech MX Master 3S",
        description: "Performance Wireless Mouse with Ultra-fast Scrolling.",
        cents: 9_999,
        image_url: "https://resource.logitech.com/w_692,c_lpad,ar_4:3,q_auto,f_auto,dpr_1.0/d_transparent.gif/content/dam/logitech/en/products/mice/mx-master-3s/gallery/mx-master-3s-mouse-top-view-graphite.png?v=1",
    },
];

impl DemoProduct {
    fn input(&self) -> ProductInput {
        ProductInput {
            name: self.name.to_owned(),
            description: self.description.to_owned(),
            price: Decimal::new(self.cents, 2),
            image_url: self.image_url.to_owned(),
        }
    }
}

/// What a seeding run created.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users_created: usize,
    pub products_created: usize,
}

/// Seed the configured database.
///
/// # Errors
///
/// Returns `SeedError` if the database is unreachable or a write fails.
pub async fn run() -> Result<(), SeedError> {
    let pool = super::connect().await?;
    let users = PgUserStore::new(pool.clone());
    let catalog = PgCatalogStore::new(pool);

    let report = seed(&users, &catalog).await?;
    tracing::info!(
        users_created = report.users_created,
        products_created = report.products_created,
        "Seeding complete"
    );
    Ok(())
}

/// Seed arbitrary stores.
///
/// # Errors
///
/// Returns `SeedError` if a store write fails.
pub async fn seed(
    users: &dyn UserStore,
    catalog: &dyn CatalogStore,
) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();

    let auth = AuthService::new(users);
    for (username, password, role) in DEMO_USERS {
        if auth.exists(username).await? {
            tracing::debug!(username, "User already exists, skipping");
            continue;
        }
        auth.register(username, password, role).await?;
        report.users_created += 1;
    }

    let catalog = CatalogService::new(catalog);
    if catalog.count().await? > 0 {
        tracing::info!("Catalog already has products, skipping demo products");
        return Ok(report);
    }
    for product in &DEMO_PRODUCTS {
        catalog.create(product.input()).await?;
        report.products_created += 1;
    }

    Ok(report)
}
