//! PostgreSQL-backed `WishlistRepository` implementation using Diesel ORM.
//!
//! Item membership lives in `wishlist_items`; replacing the set deletes and
//! re-inserts the rows inside the same transaction as the wishlist update.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{WishlistRepository, WishlistRepositoryError};
use crate::domain::{NewWishlist, UserId, WishId, Wishlist, WishlistId, WishlistPatch};

use super::diesel_helpers::{DbFailure, classify, pool_message};
use super::models::{
    NewWishlistRow, WishlistChangeset, WishlistItemRow, WishlistRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{wishlist_items, wishlists};

/// Diesel-backed implementation of the wishlist store.
#[derive(Clone)]
pub struct DieselWishlistRepository {
    pool: DbPool,
}

impl DieselWishlistRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> WishlistRepositoryError {
    WishlistRepositoryError::connection(pool_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> WishlistRepositoryError {
    match classify(error) {
        DbFailure::Connection(message) => WishlistRepositoryError::connection(message),
        DbFailure::Unique { .. } => WishlistRepositoryError::query("duplicate wishlist item"),
        DbFailure::Check { .. } => WishlistRepositoryError::query("check constraint violated"),
        DbFailure::Query(message) => WishlistRepositoryError::query(message),
    }
}

/// Load item ids for every wishlist in `ids`, each in stored order.
async fn load_items(
    conn: &mut AsyncPgConnection,
    ids: &[i64],
) -> Result<HashMap<i64, Vec<WishId>>, diesel::result::Error> {
    let rows: Vec<WishlistItemRow> = wishlist_items::table
        .filter(wishlist_items::wishlist_id.eq_any(ids))
        .select(WishlistItemRow::as_select())
        .order_by((wishlist_items::wishlist_id, wishlist_items::position))
        .load(conn)
        .await?;
    let mut grouped: HashMap<i64, Vec<WishId>> = HashMap::new();
    for row in rows {
        grouped
            .entry(row.wishlist_id)
            .or_default()
            .push(WishId::new(row.wish_id));
    }
    Ok(grouped)
}

async fn replace_items(
    conn: &mut AsyncPgConnection,
    wishlist_id: i64,
    item_ids: &[WishId],
) -> Result<(), diesel::result::Error> {
    diesel::delete(wishlist_items::table.filter(wishlist_items::wishlist_id.eq(wishlist_id)))
        .execute(conn)
        .await?;
    let rows = WishlistItemRow::for_items(wishlist_id, item_ids);
    if !rows.is_empty() {
        diesel::insert_into(wishlist_items::table)
            .values(&rows)
            .execute(conn)
            .await?;
    }
    Ok(())
}

#[async_trait]
impl WishlistRepository for DieselWishlistRepository {
    async fn list_by_owner(
        &self,
        owner_id: UserId,
    ) -> Result<Vec<Wishlist>, WishlistRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<WishlistRow> = wishlists::table
            .filter(wishlists::owner_id.eq(owner_id.get()))
            .select(WishlistRow::as_select())
            .order_by(wishlists::id.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let mut items = load_items(&mut conn, &ids)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let item_ids = items.remove(&row.id).unwrap_or_default();
                row.into_wishlist(item_ids)
            })
            .collect())
    }

    async fn find_by_id(
        &self,
        id: WishlistId,
    ) -> Result<Option<Wishlist>, WishlistRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let Some(row) = wishlists::table
            .find(id.get())
            .select(WishlistRow::as_select())
            .first::<WishlistRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
        else {
            return Ok(None);
        };
        let mut items = load_items(&mut conn, &[row.id])
            .await
            .map_err(map_diesel_error)?;
        let item_ids = items.remove(&row.id).unwrap_or_default();
        Ok(Some(row.into_wishlist(item_ids)))
    }

    async fn insert(&self, wishlist: NewWishlist) -> Result<Wishlist, WishlistRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move {
                let new_row = NewWishlistRow {
                    name: &wishlist.name,
                    description: &wishlist.description,
                    image: &wishlist.image,
                    owner_id: wishlist.owner_id.get(),
                    created_at: wishlist.created_at,
                    updated_at: wishlist.created_at,
                };
                let row: WishlistRow = diesel::insert_into(wishlists::table)
                    .values(&new_row)
                    .returning(WishlistRow::as_returning())
                    .get_result(conn)
                    .await?;
                replace_items(conn, row.id, &wishlist.item_ids).await?;
                Ok(row.into_wishlist(wishlist.item_ids))
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn update(
        &self,
        id: WishlistId,
        patch: WishlistPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Wishlist>, WishlistRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move {
                let changeset = WishlistChangeset {
                    name: patch.name.as_deref(),
                    description: patch.description.as_deref(),
                    image: patch.image.as_deref(),
                    updated_at: now,
                };
                let Some(row) = diesel::update(wishlists::table.find(id.get()))
                    .set(&changeset)
                    .returning(WishlistRow::as_returning())
                    .get_result::<WishlistRow>(conn)
                    .await
                    .optional()?
                else {
                    return Ok(None);
                };
                if let Some(item_ids) = patch.item_ids.as_deref() {
                    replace_items(conn, row.id, item_ids).await?;
                }
                let mut items = load_items(conn, &[row.id]).await?;
                let item_ids = items.remove(&row.id).unwrap_or_default();
                Ok(Some(row.into_wishlist(item_ids)))
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn delete(&self, id: WishlistId) -> Result<bool, WishlistRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(wishlists::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
