use anyhow::{Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use shared::domain::{CartItem, InventoryItem, ItemId, NewCartEntry};

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn inventory_is_empty(&self) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM inventory")
            .fetch_one(&self.pool)
            .await
            .context("failed to count inventory rows")?;
        Ok(count == 0)
    }

    pub async fn insert_inventory_item(&self, content: &str, price: f64) -> Result<InventoryItem> {
        let row = sqlx::query(
            "INSERT INTO inventory (content, price) VALUES (?, ?)
             RETURNING id, content, price",
        )
        .bind(content)
        .bind(price)
        .fetch_one(&self.pool)
        .await
        .context("failed to insert inventory item")?;
        Ok(inventory_from_row(&row))
    }

    pub async fn list_inventory(&self) -> Result<Vec<InventoryItem>> {
        let rows = sqlx::query("SELECT id, content, price FROM inventory ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(inventory_from_row).collect())
    }

    pub async fn inventory_item(&self, id: ItemId) -> Result<Option<InventoryItem>> {
        let row = sqlx::query("SELECT id, content, price FROM inventory WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(inventory_from_row))
    }

    pub async fn list_cart(&self) -> Result<Vec<CartItem>> {
        let rows = sqlx::query("SELECT id, content, quantity FROM cart ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(cart_from_row).collect())
    }

    /// Inserts a cart entry. Returns `None` when an entry with the same id
    /// already exists; the existing row is left unchanged.
    pub async fn insert_cart_entry(&self, entry: &NewCartEntry) -> Result<Option<CartItem>> {
        let row = sqlx::query(
            "INSERT INTO cart (id, content, price, quantity) VALUES (?, ?, ?, ?)
             ON CONFLICT(id) DO NOTHING
             RETURNING id, content, quantity",
        )
        .bind(entry.id.0)
        .bind(&entry.content)
        .bind(entry.price)
        .bind(i64::from(entry.quantity))
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to insert cart entry {}", entry.id))?;
        Ok(row.as_ref().map(cart_from_row))
    }

    /// Replaces content and quantity of an existing entry. Returns `None` if
    /// no entry has this id.
    pub async fn update_cart_entry(
        &self,
        id: ItemId,
        content: &str,
        quantity: u32,
    ) -> Result<Option<CartItem>> {
        let row = sqlx::query(
            "UPDATE cart SET content = ?, quantity = ? WHERE id = ?
             RETURNING id, content, quantity",
        )
        .bind(content)
        .bind(i64::from(quantity))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to update cart entry {id}"))?;
        Ok(row.as_ref().map(cart_from_row))
    }

    /// Deletes an entry, returning the removed row or `None` if it was absent.
    pub async fn delete_cart_entry(&self, id: ItemId) -> Result<Option<CartItem>> {
        let row = sqlx::query("DELETE FROM cart WHERE id = ? RETURNING id, content, quantity")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to delete cart entry {id}"))?;
        Ok(row.as_ref().map(cart_from_row))
    }
}

fn inventory_from_row(row: &SqliteRow) -> InventoryItem {
    InventoryItem {
        id: ItemId(row.get::<i64, _>("id")),
        content: row.get("content"),
        price: row.get("price"),
    }
}

fn cart_from_row(row: &SqliteRow) -> CartItem {
    // CHECK (quantity > 0) keeps this in range
    let quantity: i64 = row.get("quantity");
    CartItem {
        id: ItemId(row.get::<i64, _>("id")),
        content: row.get("content"),
        quantity: u32::try_from(quantity).unwrap_or(u32::MAX),
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
