//! # Seed Data Generator
//!
//! Fills a development database with demo customers, products, invoices
//! and one API key.
//!
//! ## Usage
//! ```bash
//! # Defaults: ./data/pos.db, 25 customers, 200 products
//! cargo run -p pos-db --bin seed
//!
//! # Custom sizes and key
//! cargo run -p pos-db --bin seed -- --customers 100 --products 1000 --api-key dev-key
//!
//! # Specify database path
//! cargo run -p pos-db --bin seed -- --db ./data/pos.db
//! ```
//!
//! ## Generated Data
//! - Customers with rotating first/last names and Vietnamese-style mobile numbers
//! - Products across drink and food groups, all Active, stock 20-119
//! - One invoice per customer in the current year, 1-3 lines each
//! - API key `dev-api-key` unless `--api-key` is given

use chrono::{Datelike, NaiveDate, Utc};
use std::env;
use uuid::Uuid;

use pos_core::{Customer, Invoice, InvoiceItem, Product, Status};
use pos_db::{Database, DbConfig};

const FIRST_NAMES: &[&str] = &[
    "An", "Binh", "Chi", "Dung", "Giang", "Hoa", "Khanh", "Linh", "Minh", "Ngoc", "Phuong",
    "Quan", "Son", "Thao", "Trang", "Vy",
];

const LAST_NAMES: &[&str] = &["Nguyen", "Tran", "Le", "Pham", "Hoang", "Vo", "Dang", "Bui"];

/// Product groups with a base price in cents.
const PRODUCT_GROUPS: &[(&str, i64, &[&str])] = &[
    (
        "Drink",
        150,
        &[
            "Espresso",
            "Americano",
            "Latte",
            "Cappuccino",
            "Green Tea",
            "Peach Tea",
            "Orange Juice",
            "Mineral Water",
            "Iced Milk Coffee",
            "Coconut Smoothie",
        ],
    ),
    (
        "Food",
        250,
        &[
            "Croissant",
            "Banh Mi",
            "Cheesecake",
            "Tiramisu",
            "Muffin",
            "Club Sandwich",
            "Spring Rolls",
            "Fried Rice",
        ],
    ),
];

const SIZES: &[(&str, i64)] = &[("Small", 0), ("Regular", 50), ("Large", 100)];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut customer_count: usize = 25;
    let mut product_count: usize = 200;
    let mut db_path = String::from("./data/pos.db");
    let mut api_key = String::from("dev-api-key");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--customers" => {
                if i + 1 < args.len() {
                    customer_count = args[i + 1].parse().unwrap_or(customer_count);
                    i += 1;
                }
            }
            "--products" | "-p" => {
                if i + 1 < args.len() {
                    product_count = args[i + 1].parse().unwrap_or(product_count);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--api-key" => {
                if i + 1 < args.len() {
                    api_key = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("POS Back-Office Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("      --customers <N>  Number of customers (default: 25)");
                println!("  -p, --products <N>   Number of products (default: 200)");
                println!("  -d, --db <PATH>      Database file path (default: ./data/pos.db)");
                println!("      --api-key <KEY>  API key to store (default: dev-api-key)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 POS Back-Office Seed Data Generator");
    println!("======================================");
    println!("Database:  {}", db_path);
    println!("Customers: {}", customer_count);
    println!("Products:  {}", product_count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    if db.api_keys().find_active_by_key(&api_key).await?.is_none() {
        db.api_keys().insert(&api_key).await?;
        println!("✓ API key stored: {}", api_key);
    } else {
        println!("✓ API key already present: {}", api_key);
    }

    let existing = db.customers().count().await? + db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} customers/products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();

    let products: Vec<Product> = (0..product_count).map(generate_product).collect();
    db.products().insert_many(&products).await?;
    println!("✓ Generated {} products", products.len());

    let mut customers = Vec::with_capacity(customer_count);
    for seed in 0..customer_count {
        let customer = generate_customer(seed);
        db.customers().insert(&customer).await?;
        customers.push(customer);
    }
    println!("✓ Generated {} customers", customers.len());

    let mut invoices = 0;
    if !products.is_empty() {
        for (seed, customer) in customers.iter().enumerate() {
            let invoice = generate_invoice(seed, customer, &products)?;
            if let Err(e) = db.invoices().create(&invoice).await {
                eprintln!("Failed to insert invoice {}: {}", invoice.id, e);
                continue;
            }
            invoices += 1;
        }
    }
    println!("✓ Generated {} invoices", invoices);

    println!();
    println!("✓ Seed complete in {:?}", start.elapsed());

    Ok(())
}

fn generate_customer(seed: usize) -> Customer {
    let now = Utc::now();
    let first = FIRST_NAMES[seed % FIRST_NAMES.len()];
    let last = LAST_NAMES[(seed / FIRST_NAMES.len()) % LAST_NAMES.len()];

    Customer {
        id: Uuid::new_v4().to_string(),
        name: format!("{} {}", last, first),
        phone_number: format!("09{:08}", (seed * 7919) % 100_000_000),
        status: Status::Active,
        created_at: now,
        updated_at: now,
    }
}

fn generate_product(seed: usize) -> Product {
    let today = Utc::now().date_naive();

    let names: Vec<(&str, i64, &str)> = PRODUCT_GROUPS
        .iter()
        .flat_map(|(group, base, names)| names.iter().map(move |n| (*group, *base, *n)))
        .collect();
    let (group, base_price, name) = names[seed % names.len()];
    let (size, size_addon) = SIZES[(seed / names.len()) % SIZES.len()];
    let batch = seed / (names.len() * SIZES.len());

    let full_name = if batch == 0 {
        format!("{} {}", name, size)
    } else {
        format!("{} {} #{}", name, size, batch + 1)
    };

    Product {
        id: format!("{}-{:04}", group.to_uppercase(), seed + 1),
        name: full_name,
        price_cents: base_price + size_addon + ((seed * 37) % 200) as i64,
        quantity: 20 + (seed % 100) as i64,
        status: Status::Active,
        created_at: today,
        updated_at: today,
    }
}

fn generate_invoice(
    seed: usize,
    customer: &Customer,
    products: &[Product],
) -> pos_core::CoreResult<Invoice> {
    let now = Utc::now();
    let today = now.date_naive();
    let month = 1 + (seed % today.month() as usize) as u32;
    let invoice_date = NaiveDate::from_ymd_opt(today.year(), month, 1 + (seed % 28) as u32)
        .filter(|d| *d <= today)
        .unwrap_or(today);

    let id = Uuid::new_v4().to_string();
    let lines = 1 + seed % 3;
    let items = (0..lines)
        .map(|line| {
            let product = &products[(seed * 3 + line * 7) % products.len()];
            InvoiceItem::snapshot(&id, product, 1 + (line as i64))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let total = Invoice::compute_total(&items)?;

    Ok(Invoice {
        id,
        customer_id: customer.id.clone(),
        customer_name: customer.name.clone(),
        invoice_date,
        total_cents: total.cents(),
        created_at: now,
        updated_at: now,
        items,
    })
}
