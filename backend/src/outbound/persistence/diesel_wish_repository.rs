//! PostgreSQL-backed `WishRepository` implementation using Diesel ORM.
//!
//! Every write bumps `revision`. `record_copy` increments the source's
//! `copied` counter under a revision guard and inserts the copy in the same
//! transaction; the `(owner_id, original_wish_id)` unique index rejects a
//! second copy that slipped past the service's check.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{WishRepository, WishRepositoryError};
use crate::domain::{NewWish, UserId, Wish, WishId, WishPatch};

use super::diesel_helpers::{DbFailure, classify, conversion_message, convert_rows, pool_message};
use super::models::{
    NewWishRow, RowConversionError, WishChangeset, WishRow, cents, revision_for_db,
    revision_from_db,
};
use super::pool::{DbPool, PoolError};
use super::schema::wishes;

/// Diesel-backed implementation of the wish store.
#[derive(Clone)]
pub struct DieselWishRepository {
    pool: DbPool,
}

impl DieselWishRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> WishRepositoryError {
    WishRepositoryError::connection(pool_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> WishRepositoryError {
    match classify(error) {
        DbFailure::Connection(message) => WishRepositoryError::connection(message),
        DbFailure::Unique { constraint } => WishRepositoryError::duplicate_copy(
            constraint.unwrap_or_else(|| "owner already holds a copy".to_owned()),
        ),
        DbFailure::Check { constraint } => WishRepositoryError::query(format!(
            "check constraint violated: {}",
            constraint.as_deref().unwrap_or("unknown")
        )),
        DbFailure::Query(message) => WishRepositoryError::query(message),
    }
}

/// Like [`map_diesel_error`], but a `CHECK` violation on `wish_id` means the
/// write would have broken `raised <= price`.
fn map_write_error(error: diesel::result::Error, wish_id: WishId) -> WishRepositoryError {
    match classify(error) {
        DbFailure::Check { .. } => WishRepositoryError::funding_bounds(wish_id.get()),
        DbFailure::Connection(message) => WishRepositoryError::connection(message),
        DbFailure::Unique { constraint } => WishRepositoryError::duplicate_copy(
            constraint.unwrap_or_else(|| "owner already holds a copy".to_owned()),
        ),
        DbFailure::Query(message) => WishRepositoryError::query(message),
    }
}

fn map_conversion_error(error: RowConversionError) -> WishRepositoryError {
    WishRepositoryError::query(conversion_message(&error))
}

fn to_wish(row: WishRow) -> Result<Wish, WishRepositoryError> {
    Wish::try_from(row).map_err(map_conversion_error)
}

fn to_wishes(rows: Vec<WishRow>) -> Result<Vec<Wish>, WishRepositoryError> {
    convert_rows(rows).map_err(map_conversion_error)
}

fn listing_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// Work out why a revision-guarded write touched no rows.
async fn handle_guarded_write_failure<C>(
    conn: &mut C,
    wish_id: WishId,
    expected_revision: u32,
) -> WishRepositoryError
where
    C: AsyncConnection<Backend = diesel::pg::Pg> + Send,
{
    let current: Result<Option<i32>, WishRepositoryError> = wishes::table
        .find(wish_id.get())
        .select(wishes::revision)
        .first(conn)
        .await
        .optional()
        .map_err(map_diesel_error);

    match current {
        Ok(Some(actual)) => {
            WishRepositoryError::revision_mismatch(expected_revision, revision_from_db(actual))
        }
        Ok(None) => WishRepositoryError::not_found(wish_id.get()),
        Err(err) => err,
    }
}

#[async_trait]
impl WishRepository for DieselWishRepository {
    async fn find_by_id(&self, id: WishId) -> Result<Option<Wish>, WishRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<WishRow> = wishes::table
            .find(id.get())
            .select(WishRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_wish).transpose()
    }

    async fn find_by_ids(&self, ids: &[WishId]) -> Result<Vec<Wish>, WishRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let raw: Vec<i64> = ids.iter().map(|id| id.get()).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<WishRow> = wishes::table
            .filter(wishes::id.eq_any(&raw))
            .select(WishRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let mut found = to_wishes(rows)?;
        // Preserve the caller's order.
        found.sort_by_key(|wish| raw.iter().position(|id| *id == wish.id.get()));
        Ok(found)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<Wish>, WishRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<WishRow> = wishes::table
            .select(WishRow::as_select())
            .order_by((wishes::created_at.desc(), wishes::id.desc()))
            .limit(listing_limit(limit))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        to_wishes(rows)
    }

    async fn list_top(&self, limit: usize) -> Result<Vec<Wish>, WishRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<WishRow> = wishes::table
            .select(WishRow::as_select())
            .order_by((wishes::copied.desc(), wishes::id.asc()))
            .limit(listing_limit(limit))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        to_wishes(rows)
    }

    async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<Wish>, WishRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<WishRow> = wishes::table
            .filter(wishes::owner_id.eq(owner_id.get()))
            .select(WishRow::as_select())
            .order_by(wishes::id.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        to_wishes(rows)
    }

    async fn find_copy(
        &self,
        owner_id: UserId,
        source_id: WishId,
    ) -> Result<Option<Wish>, WishRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<WishRow> = wishes::table
            .filter(
                wishes::owner_id
                    .eq(owner_id.get())
                    .and(wishes::original_wish_id.eq(source_id.get())),
            )
            .select(WishRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_wish).transpose()
    }

    async fn insert(&self, wish: NewWish) -> Result<Wish, WishRepositoryError> {
        let price_cents = cents(wish.price).map_err(map_conversion_error)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let new_row = NewWishRow {
            name: &wish.name,
            link: &wish.link,
            image: &wish.image,
            description: &wish.description,
            price_cents,
            owner_id: wish.owner_id.get(),
            original_wish_id: wish.original_wish_id.map(WishId::get),
            created_at: wish.created_at,
            updated_at: wish.created_at,
        };
        let row: WishRow = diesel::insert_into(wishes::table)
            .values(&new_row)
            .returning(WishRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        to_wish(row)
    }

    async fn update(
        &self,
        id: WishId,
        patch: WishPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Wish>, WishRepositoryError> {
        let price_cents = patch
            .price
            .map(cents)
            .transpose()
            .map_err(map_conversion_error)?;
        let raised_cents = patch
            .raised
            .map(cents)
            .transpose()
            .map_err(map_conversion_error)?;
        let changeset = WishChangeset {
            name: patch.name.as_deref(),
            link: patch.link.as_deref(),
            image: patch.image.as_deref(),
            description: patch.description.as_deref(),
            price_cents,
            raised_cents,
            updated_at: now,
        };

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<WishRow> = diesel::update(wishes::table.find(id.get()))
            .set((&changeset, wishes::revision.eq(wishes::revision + 1)))
            .returning(WishRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_write_error(err, id))?;
        row.map(to_wish).transpose()
    }

    async fn delete(&self, id: WishId) -> Result<bool, WishRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(wishes::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn record_copy(
        &self,
        source_id: WishId,
        expected_revision: u32,
        copy: NewWish,
    ) -> Result<Wish, WishRepositoryError> {
        let price_cents = cents(copy.price).map_err(map_conversion_error)?;
        let expected = revision_for_db(expected_revision);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let inserted: Option<WishRow> = conn
            .transaction(|conn| {
                async move {
                    let bumped = diesel::update(
                        wishes::table.filter(
                            wishes::id
                                .eq(source_id.get())
                                .and(wishes::revision.eq(expected)),
                        ),
                    )
                    .set((
                        wishes::copied.eq(wishes::copied + 1),
                        wishes::revision.eq(wishes::revision + 1),
                    ))
                    .execute(conn)
                    .await?;

                    if bumped == 0 {
                        return Ok(None);
                    }

                    let new_row = NewWishRow {
                        name: &copy.name,
                        link: &copy.link,
                        image: &copy.image,
                        description: &copy.description,
                        price_cents,
                        owner_id: copy.owner_id.get(),
                        original_wish_id: copy.original_wish_id.map(WishId::get),
                        created_at: copy.created_at,
                        updated_at: copy.created_at,
                    };
                    diesel::insert_into(wishes::table)
                        .values(&new_row)
                        .returning(WishRow::as_returning())
                        .get_result(conn)
                        .await
                        .map(Some)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        match inserted {
            Some(row) => to_wish(row),
            None => {
                Err(handle_guarded_write_failure(&mut conn, source_id, expected_revision).await)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let repo_err = map_pool_error(PoolError::checkout("timed out"));

        assert!(matches!(repo_err, WishRepositoryError::Connection { .. }));
    }

    #[rstest]
    fn not_found_maps_to_query_error() {
        let repo_err = map_diesel_error(diesel::result::Error::NotFound);

        assert!(matches!(repo_err, WishRepositoryError::Query { .. }));
    }

    #[rstest]
    #[case(0, 0)]
    #[case(10, 10)]
    #[case(usize::MAX, i64::MAX)]
    fn listing_limit_saturates(#[case] limit: usize, #[case] expected: i64) {
        assert_eq!(listing_limit(limit), expected);
    }
}
