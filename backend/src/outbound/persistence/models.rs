//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain types are
//! fallible because the column types are wider than the domain's.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::{
    Money, Offer, OfferId, User, UserCredentials, UserId, Wish, WishId, Wishlist, WishlistId,
};

use super::schema::{offers, users, wishes, wishlist_items, wishlists};

/// A stored value did not fit its domain type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("column {column} holds out-of-range value {value}")]
pub(crate) struct RowConversionError {
    column: &'static str,
    value: i64,
}

fn non_negative<T: TryFrom<i64>>(column: &'static str, value: i64) -> Result<T, RowConversionError> {
    T::try_from(value).map_err(|_| RowConversionError { column, value })
}

fn money(column: &'static str, cents: i64) -> Result<Money, RowConversionError> {
    non_negative::<u64>(column, cents).map(Money::from_cents)
}

/// Money to `BIGINT`, failing only for amounts beyond `i64::MAX` cents.
pub(crate) fn cents(amount: Money) -> Result<i64, RowConversionError> {
    i64::try_from(amount.cents()).map_err(|_| RowConversionError {
        column: "cents",
        value: i64::MAX,
    })
}

/// Revision to `INTEGER`. Revisions wrap rather than fail.
#[expect(
    clippy::cast_possible_wrap,
    reason = "revision only needs to differ between consecutive writes"
)]
pub(crate) fn revision_for_db(revision: u32) -> i32 {
    revision as i32
}

#[expect(
    clippy::cast_sign_loss,
    reason = "revision is compared for equality only"
)]
pub(crate) fn revision_from_db(revision: i32) -> u32 {
    revision as u32
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub about: String,
    pub avatar: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    pub fn credentials(&self) -> UserCredentials {
        UserCredentials {
            user_id: UserId::new(self.id),
            username: self.username.clone(),
            password_hash: self.password.clone(),
        }
    }
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::new(row.id),
            username: row.username,
            email: row.email,
            about: row.about,
            avatar: row.avatar,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub about: &'a str,
    pub avatar: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Absent fields are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserChangeset<'a> {
    pub username: Option<&'a str>,
    pub email: Option<&'a str>,
    pub password: Option<&'a str>,
    pub about: Option<&'a str>,
    pub avatar: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Wishes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = wishes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct WishRow {
    pub id: i64,
    pub name: String,
    pub link: String,
    pub image: String,
    pub description: String,
    pub price_cents: i64,
    pub raised_cents: i64,
    pub copied: i32,
    pub owner_id: i64,
    pub original_wish_id: Option<i64>,
    pub revision: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<WishRow> for Wish {
    type Error = RowConversionError;

    fn try_from(row: WishRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: WishId::new(row.id),
            name: row.name,
            link: row.link,
            image: row.image,
            description: row.description,
            price: money("price_cents", row.price_cents)?,
            raised: money("raised_cents", row.raised_cents)?,
            copied: non_negative("copied", i64::from(row.copied))?,
            owner_id: UserId::new(row.owner_id),
            original_wish_id: row.original_wish_id.map(WishId::new),
            created_at: row.created_at,
            updated_at: row.updated_at,
            revision: revision_from_db(row.revision),
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = wishes)]
pub(crate) struct NewWishRow<'a> {
    pub name: &'a str,
    pub link: &'a str,
    pub image: &'a str,
    pub description: &'a str,
    pub price_cents: i64,
    pub owner_id: i64,
    pub original_wish_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Owner patch. The revision bump is added by the repository.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = wishes)]
pub(crate) struct WishChangeset<'a> {
    pub name: Option<&'a str>,
    pub link: Option<&'a str>,
    pub image: Option<&'a str>,
    pub description: Option<&'a str>,
    pub price_cents: Option<i64>,
    pub raised_cents: Option<i64>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Offers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = offers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OfferRow {
    pub id: i64,
    pub user_id: i64,
    pub item_id: i64,
    pub amount_cents: i64,
    pub hidden: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<OfferRow> for Offer {
    type Error = RowConversionError;

    fn try_from(row: OfferRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: OfferId::new(row.id),
            amount: money("amount_cents", row.amount_cents)?,
            hidden: row.hidden,
            user_id: UserId::new(row.user_id),
            item_id: WishId::new(row.item_id),
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = offers)]
pub(crate) struct NewOfferRow {
    pub user_id: i64,
    pub item_id: i64,
    pub amount_cents: i64,
    pub hidden: bool,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Wishlists
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = wishlists)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct WishlistRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub image: String,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WishlistRow {
    pub fn into_wishlist(self, item_ids: Vec<WishId>) -> Wishlist {
        Wishlist {
            id: WishlistId::new(self.id),
            name: self.name,
            description: self.description,
            image: self.image,
            owner_id: UserId::new(self.owner_id),
            item_ids,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = wishlists)]
pub(crate) struct NewWishlistRow<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub image: &'a str,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = wishlists)]
pub(crate) struct WishlistChangeset<'a> {
    pub name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub image: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Queryable, Selectable, Insertable)]
#[diesel(table_name = wishlist_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct WishlistItemRow {
    pub wishlist_id: i64,
    pub wish_id: i64,
    pub position: i32,
}

impl WishlistItemRow {
    /// Rows for `item_ids`, numbered in order.
    pub fn for_items(wishlist_id: i64, item_ids: &[WishId]) -> Vec<Self> {
        item_ids
            .iter()
            .zip(0_i32..)
            .map(|(wish_id, position)| Self {
                wishlist_id,
                wish_id: wish_id.get(),
                position,
            })
            .collect()
    }
}
