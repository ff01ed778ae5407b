use chrono::{DateTime, Utc};
use farmgate_core::{CatalogQuery, CategoryFilter};
use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: i64,
    pub farmer_id: i64,
    pub name: String,
    pub category_id: i64,
    pub price: f64,
    pub quantity: i64,
    pub description: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Image URLs in display order, loaded from `product_images`
    #[sqlx(skip)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub category_id: i64,
    pub price: f64,
    pub quantity: i64,
    pub description: String,
    pub images: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ProductUpdate {
    pub name: String,
    pub category_id: i64,
    pub price: f64,
    pub quantity: i64,
    pub description: String,
    pub is_active: bool,
    /// `None` leaves the stored images alone
    pub images: Option<Vec<String>>,
}

/// One page of a catalogue listing
#[derive(Debug, Clone, Serialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
}

#[derive(Debug, Clone)]
pub struct ProductStore {
    pool: SqlitePool,
}

async fn replace_images(
    conn: &mut SqliteConnection,
    product_id: i64,
    images: &[String],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM product_images WHERE product_id = ?")
        .bind(product_id)
        .execute(&mut *conn)
        .await?;

    for (order, url) in images.iter().enumerate() {
        sqlx::query("INSERT INTO product_images (product_id, image_url, image_order) VALUES (?, ?, ?)")
            .bind(product_id)
            .bind(url)
            .bind(order as i64)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

/// Fill in `images` for each product
pub(crate) async fn load_images(
    pool: &SqlitePool,
    products: &mut [Product],
) -> Result<(), sqlx::Error> {
    for product in products.iter_mut() {
        product.images = sqlx::query_scalar(
            "SELECT image_url FROM product_images WHERE product_id = ? ORDER BY image_order",
        )
        .bind(product.id)
        .fetch_all(pool)
        .await?;
    }
    Ok(())
}

fn push_catalog_filters(builder: &mut QueryBuilder<'_, Sqlite>, query: &CatalogQuery) {
    builder.push(" WHERE is_active = 1");
    match query.category {
        CategoryFilter::Any => {}
        CategoryFilter::Only(category) => {
            builder.push(" AND category_id = ").push_bind(category.id());
        }
        CategoryFilter::Unknown => {
            builder.push(" AND 0");
        }
    }
    // Plain substring match, so `%` and `_` in the term are literal.
    // LOWER only folds ASCII, matching CatalogQuery's folding.
    if let Some(term) = &query.search {
        builder
            .push(" AND instr(LOWER(name), ")
            .push_bind(term.clone())
            .push(") > 0");
    }
}

impl ProductStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, farmer_id: i64, product: &NewProduct) -> Result<Product, sqlx::Error> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let mut created = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                farmer_id, name, category_id, price, quantity, description,
                is_active, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, 1, ?, ?)
            RETURNING *
            "#,
        )
        .bind(farmer_id)
        .bind(&product.name)
        .bind(product.category_id)
        .bind(product.price)
        .bind(product.quantity)
        .bind(&product.description)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        replace_images(&mut tx, created.id, &product.images).await?;
        tx.commit().await?;

        created.images = product.images.clone();
        Ok(created)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Product>, sqlx::Error> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match product {
            Some(product) => {
                let mut products = [product];
                load_images(&self.pool, &mut products).await?;
                let [product] = products;
                Ok(Some(product))
            }
            None => Ok(None),
        }
    }

    /// A product buyers can see
    pub async fn find_listed(&self, id: i64) -> Result<Option<Product>, sqlx::Error> {
        Ok(self.find_by_id(id).await?.filter(|p| p.is_active))
    }

    pub async fn list_for_farmer(&self, farmer_id: i64) -> Result<Vec<Product>, sqlx::Error> {
        let mut products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE farmer_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(farmer_id)
        .fetch_all(&self.pool)
        .await?;
        load_images(&self.pool, &mut products).await?;
        Ok(products)
    }

    /// Active products at or below `threshold` units
    pub async fn low_stock(&self, farmer_id: i64, threshold: i64) -> Result<Vec<Product>, sqlx::Error> {
        sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE farmer_id = ? AND is_active = 1 AND quantity <= ? ORDER BY quantity, id",
        )
        .bind(farmer_id)
        .bind(threshold)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn count_for_farmer(&self, farmer_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE farmer_id = ?")
            .bind(farmer_id)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn count_active(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await
    }

    /// Update a product owned by `farmer_id`; `None` when there is no such product
    pub async fn update(
        &self,
        farmer_id: i64,
        id: i64,
        update: &ProductUpdate,
    ) -> Result<Option<Product>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = ?, category_id = ?, price = ?, quantity = ?, description = ?,
                is_active = ?, updated_at = ?
            WHERE id = ? AND farmer_id = ?
            RETURNING *
            "#,
        )
        .bind(&update.name)
        .bind(update.category_id)
        .bind(update.price)
        .bind(update.quantity)
        .bind(&update.description)
        .bind(update.is_active)
        .bind(Utc::now())
        .bind(id)
        .bind(farmer_id)
        .fetch_optional(&mut *tx)
        .await?;

        if updated.is_none() {
            return Ok(None);
        }
        if let Some(images) = &update.images {
            replace_images(&mut tx, id, images).await?;
        }
        tx.commit().await?;

        self.find_by_id(id).await
    }

    pub async fn delete(&self, farmer_id: i64, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM products WHERE id = ? AND farmer_id = ?")
            .bind(id)
            .bind(farmer_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Active products matching `query`, with the total before paging
    pub async fn search(&self, query: &CatalogQuery) -> Result<ProductPage, sqlx::Error> {
        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM products");
        push_catalog_filters(&mut count, query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Sqlite>::new("SELECT * FROM products");
        push_catalog_filters(&mut select, query);
        select
            .push(" ORDER BY ")
            .push(query.sort.order_by())
            .push(" LIMIT ")
            .push_bind(i64::from(query.limit))
            .push(" OFFSET ")
            .push_bind(i64::from(query.offset()));

        let mut products = select
            .build_query_as::<Product>()
            .fetch_all(&self.pool)
            .await?;
        load_images(&self.pool, &mut products).await?;

        Ok(ProductPage {
            products,
            total,
            page: query.page,
            limit: query.limit,
        })
    }
}
