//! Table definitions applied by [`Db::migrate`](crate::Db::migrate).
//!
//! Money columns hold integer cents and timestamps hold unix seconds.

pub const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('user', 'admin', 'logistics')),
    address TEXT NOT NULL DEFAULT '',
    contact TEXT NOT NULL DEFAULT '',
    created_at INTEGER NOT NULL
)
"#;

pub const CREATE_PRODUCTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    price_cents INTEGER NOT NULL DEFAULT 0,
    stock INTEGER NOT NULL DEFAULT 0 CHECK (stock >= 0),
    image TEXT
)
"#;

pub const CREATE_CART_ITEMS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS cart_items (
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    product_id INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
    quantity INTEGER NOT NULL CHECK (quantity > 0),
    PRIMARY KEY (user_id, product_id)
)
"#;

// Orders keep their user_id after the account is removed.
pub const CREATE_ORDERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS orders (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    delivery_address TEXT NOT NULL,
    delivery_method TEXT NOT NULL DEFAULT 'normal',
    delivery_fee_cents INTEGER NOT NULL DEFAULT 0,
    total_cents INTEGER NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    created_at INTEGER NOT NULL
)
"#;

pub const CREATE_ORDER_ITEMS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS order_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    order_id INTEGER NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
    product_id INTEGER NOT NULL,
    product_name TEXT NOT NULL,
    quantity INTEGER NOT NULL CHECK (quantity > 0),
    price_cents INTEGER NOT NULL
)
"#;

pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_orders_user ON orders (user_id)",
    "CREATE INDEX IF NOT EXISTS idx_orders_created ON orders (created_at)",
    "CREATE INDEX IF NOT EXISTS idx_order_items_order ON order_items (order_id)",
    "CREATE INDEX IF NOT EXISTS idx_products_name ON products (name)",
];

/// Every statement needed for a fresh database, in dependency order.
pub fn statements() -> impl Iterator<Item = &'static str> {
    [
        CREATE_USERS_TABLE,
        CREATE_PRODUCTS_TABLE,
        CREATE_CART_ITEMS_TABLE,
        CREATE_ORDERS_TABLE,
        CREATE_ORDER_ITEMS_TABLE,
    ]
    .into_iter()
    .chain(CREATE_INDEXES.iter().copied())
}
