//! PostgreSQL-backed `OfferRepository` implementation using Diesel ORM.
//!
//! `fund` is the only path that moves `wishes.raised_cents` on behalf of a
//! contributor. It runs the revision-guarded wish update and the offer insert
//! in one transaction.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{OfferRepository, OfferRepositoryError};
use crate::domain::{FundingRequest, Offer, OfferId, WishId};

use super::diesel_helpers::{DbFailure, classify, conversion_message, convert_rows, pool_message};
use super::models::{
    NewOfferRow, OfferRow, RowConversionError, cents, revision_for_db, revision_from_db,
};
use super::pool::{DbPool, PoolError};
use super::schema::{offers, wishes};

/// Diesel-backed implementation of the offer store.
#[derive(Clone)]
pub struct DieselOfferRepository {
    pool: DbPool,
}

impl DieselOfferRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> OfferRepositoryError {
    OfferRepositoryError::connection(pool_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> OfferRepositoryError {
    match classify(error) {
        DbFailure::Connection(message) => OfferRepositoryError::connection(message),
        DbFailure::Unique { .. } => OfferRepositoryError::query("unique constraint violated"),
        DbFailure::Check { constraint } => OfferRepositoryError::query(format!(
            "check constraint violated: {}",
            constraint.as_deref().unwrap_or("unknown")
        )),
        DbFailure::Query(message) => OfferRepositoryError::query(message),
    }
}

fn map_conversion_error(error: RowConversionError) -> OfferRepositoryError {
    OfferRepositoryError::query(conversion_message(&error))
}

async fn handle_funding_failure<C>(
    conn: &mut C,
    wish_id: WishId,
    expected_revision: u32,
) -> OfferRepositoryError
where
    C: AsyncConnection<Backend = diesel::pg::Pg> + Send,
{
    let current: Result<Option<i32>, OfferRepositoryError> = wishes::table
        .find(wish_id.get())
        .select(wishes::revision)
        .first(conn)
        .await
        .optional()
        .map_err(map_diesel_error);

    match current {
        Ok(Some(actual)) => {
            let actual = revision_from_db(actual);
            debug!(%wish_id, expected_revision, actual, "funding lost revision race");
            OfferRepositoryError::revision_mismatch(expected_revision, actual)
        }
        Ok(None) => OfferRepositoryError::wish_not_found(wish_id.get()),
        Err(err) => err,
    }
}

#[async_trait]
impl OfferRepository for DieselOfferRepository {
    async fn list_all(&self) -> Result<Vec<Offer>, OfferRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<OfferRow> = offers::table
            .select(OfferRow::as_select())
            .order_by(offers::id.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        convert_rows(rows).map_err(map_conversion_error)
    }

    async fn find_by_id(&self, id: OfferId) -> Result<Option<Offer>, OfferRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<OfferRow> = offers::table
            .find(id.get())
            .select(OfferRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Offer::try_from)
            .transpose()
            .map_err(map_conversion_error)
    }

    async fn list_by_item(&self, item_id: WishId) -> Result<Vec<Offer>, OfferRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<OfferRow> = offers::table
            .filter(offers::item_id.eq(item_id.get()))
            .select(OfferRow::as_select())
            .order_by((offers::created_at.asc(), offers::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        convert_rows(rows).map_err(map_conversion_error)
    }

    async fn fund(&self, request: FundingRequest) -> Result<Offer, OfferRepositoryError> {
        let FundingRequest {
            offer,
            expected_revision,
            raised,
        } = request;
        let wish_id = offer.item_id;
        let raised_cents = cents(raised).map_err(map_conversion_error)?;
        let new_row = NewOfferRow {
            user_id: offer.user_id.get(),
            item_id: wish_id.get(),
            amount_cents: cents(offer.amount).map_err(map_conversion_error)?,
            hidden: offer.hidden,
            created_at: offer.created_at,
        };
        let expected = revision_for_db(expected_revision);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let inserted: Option<OfferRow> = conn
            .transaction(|conn| {
                async move {
                    let funded = diesel::update(
                        wishes::table.filter(
                            wishes::id
                                .eq(wish_id.get())
                                .and(wishes::revision.eq(expected)),
                        ),
                    )
                    .set((
                        wishes::raised_cents.eq(raised_cents),
                        wishes::revision.eq(wishes::revision + 1),
                        wishes::updated_at.eq(new_row.created_at),
                    ))
                    .execute(conn)
                    .await?;

                    if funded == 0 {
                        return Ok(None);
                    }

                    diesel::insert_into(offers::table)
                        .values(&new_row)
                        .returning(OfferRow::as_returning())
                        .get_result(conn)
                        .await
                        .map(Some)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        match inserted {
            Some(row) => Offer::try_from(row).map_err(map_conversion_error),
            None => Err(handle_funding_failure(&mut conn, wish_id, expected_revision).await),
        }
    }
}
