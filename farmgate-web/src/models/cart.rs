use super::product::{load_images, Product};
use chrono::Utc;
use serde::Serialize;
use sqlx::{FromRow, Row, SqlitePool};

#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error("quantity must be at least {minimum}")]
    InvalidQuantity { minimum: i64 },
    #[error("product {0} not found")]
    ProductNotFound(i64),
    #[error("product {0} is not available")]
    ProductUnavailable(i64),
    #[error("only {available} units of product {product_id} are available")]
    InsufficientStock { product_id: i64, available: i64 },
    #[error("product {0} is not in the cart")]
    LineNotFound(i64),
    #[error(transparent)]
    Storage(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: i64,
    pub line_total: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Cart {
    pub lines: Vec<CartLine>,
    pub item_count: i64,
    pub total: f64,
}

#[derive(Debug, Clone)]
pub struct CartStore {
    pool: SqlitePool,
}

impl CartStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Add `quantity` units, creating the line or growing an existing one
    ///
    /// Returns the quantity now in the cart.
    pub async fn add(&self, buyer_id: i64, product_id: i64, quantity: i64) -> Result<i64, CartError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity { minimum: 1 });
        }

        let mut tx = self.pool.begin().await?;

        let stock = sqlx::query("SELECT quantity, is_active FROM products WHERE id = ?")
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(CartError::ProductNotFound(product_id))?;
        let available: i64 = stock.try_get("quantity")?;
        if !stock.try_get::<bool, _>("is_active")? {
            return Err(CartError::ProductUnavailable(product_id));
        }

        let in_cart: i64 = sqlx::query_scalar(
            "SELECT quantity FROM cart_items WHERE buyer_id = ? AND product_id = ?",
        )
        .bind(buyer_id)
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?
        .unwrap_or(0);

        let wanted = in_cart
            .checked_add(quantity)
            .filter(|wanted| *wanted <= available)
            .ok_or(CartError::InsufficientStock {
                product_id,
                available,
            })?;

        sqlx::query(
            r#"
            INSERT INTO cart_items (buyer_id, product_id, quantity, added_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (buyer_id, product_id) DO UPDATE SET quantity = excluded.quantity
            "#,
        )
        .bind(buyer_id)
        .bind(product_id)
        .bind(wanted)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(wanted)
    }

    /// Set a line's quantity; zero removes the line
    pub async fn update(&self, buyer_id: i64, product_id: i64, quantity: i64) -> Result<(), CartError> {
        if quantity < 0 {
            return Err(CartError::InvalidQuantity { minimum: 0 });
        }
        if quantity == 0 {
            return self.remove(buyer_id, product_id).await;
        }

        let stock = sqlx::query("SELECT quantity, is_active FROM products WHERE id = ?")
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?;
        if let Some(stock) = stock {
            if !stock.try_get::<bool, _>("is_active")? {
                return Err(CartError::ProductUnavailable(product_id));
            }
            let available: i64 = stock.try_get("quantity")?;
            if quantity > available {
                return Err(CartError::InsufficientStock {
                    product_id,
                    available,
                });
            }
        }

        let result = sqlx::query(
            "UPDATE cart_items SET quantity = ? WHERE buyer_id = ? AND product_id = ?",
        )
        .bind(quantity)
        .bind(buyer_id)
        .bind(product_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CartError::LineNotFound(product_id));
        }
        Ok(())
    }

    pub async fn remove(&self, buyer_id: i64, product_id: i64) -> Result<(), CartError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE buyer_id = ? AND product_id = ?")
            .bind(buyer_id)
            .bind(product_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CartError::LineNotFound(product_id));
        }
        Ok(())
    }

    pub async fn load(&self, buyer_id: i64) -> Result<Cart, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT p.*, ci.quantity AS cart_quantity
            FROM cart_items ci
            JOIN products p ON p.id = ci.product_id
            WHERE ci.buyer_id = ?
            ORDER BY ci.added_at, p.id
            "#,
        )
        .bind(buyer_id)
        .fetch_all(&self.pool)
        .await?;

        let mut products = Vec::with_capacity(rows.len());
        let mut quantities = Vec::with_capacity(rows.len());
        for row in &rows {
            products.push(Product::from_row(row)?);
            quantities.push(row.try_get::<i64, _>("cart_quantity")?);
        }
        load_images(&self.pool, &mut products).await?;

        let lines: Vec<CartLine> = products
            .into_iter()
            .zip(quantities)
            .map(|(product, quantity)| CartLine {
                line_total: product.price * quantity as f64,
                product,
                quantity,
            })
            .collect();

        Ok(Cart {
            item_count: lines.iter().map(|line| line.quantity).sum(),
            total: lines.iter().map(|line| line.line_total).sum(),
            lines,
        })
    }
}
