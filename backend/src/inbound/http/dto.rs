//! Response bodies shared by several handler modules.
//!
//! Domain types stay free of serde and utoipa; these views decide which fields
//! reach the wire. Ids serialise as integers, money as two-decimal strings and
//! timestamps as RFC 3339.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Money, Offer, OfferDetails, OfferId, User, UserId, Wish, WishDetails, WishId,
    WishlistDetails, WishlistId,
};
use crate::inbound::http::schemas::MoneySchema;

/// User as shown to other users. Never carries the e-mail address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicUserBody {
    #[schema(value_type = i64, example = 1)]
    pub id: UserId,
    #[schema(example = "alice")]
    pub username: String,
    pub about: String,
    #[schema(example = "https://i.pravatar.cc/300")]
    pub avatar: String,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for PublicUserBody {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            about: user.about.clone(),
            avatar: user.avatar.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// The caller's own profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileBody {
    #[schema(value_type = i64, example = 1)]
    pub id: UserId,
    pub username: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    pub about: String,
    pub avatar: String,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTime<Utc>,
}

impl From<User> for ProfileBody {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            about: user.about,
            avatar: user.avatar,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WishBody {
    #[schema(value_type = i64, example = 5)]
    pub id: WishId,
    #[schema(example = "Bike")]
    pub name: String,
    pub link: String,
    pub image: String,
    pub description: String,
    #[schema(value_type = MoneySchema, example = "300.00")]
    pub price: Money,
    #[schema(value_type = MoneySchema, example = "100.00")]
    pub raised: Money,
    pub copied: u32,
    #[schema(value_type = i64)]
    pub owner_id: UserId,
    #[schema(value_type = Option<i64>)]
    pub original_wish_id: Option<WishId>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTime<Utc>,
}

impl From<Wish> for WishBody {
    fn from(wish: Wish) -> Self {
        Self {
            id: wish.id,
            name: wish.name,
            link: wish.link,
            image: wish.image,
            description: wish.description,
            price: wish.price,
            raised: wish.raised,
            copied: wish.copied,
            owner_id: wish.owner_id,
            original_wish_id: wish.original_wish_id,
            created_at: wish.created_at,
            updated_at: wish.updated_at,
        }
    }
}

pub fn wish_bodies(wishes: Vec<Wish>) -> Vec<WishBody> {
    wishes.into_iter().map(WishBody::from).collect()
}

/// An offer as listed on its wish.
///
/// Hidden offers omit `amount` and `user` unless the viewer is the
/// contributor or the wish owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OfferSummaryBody {
    #[schema(value_type = i64)]
    pub id: OfferId,
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<MoneySchema>, example = "50.00")]
    pub amount: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<PublicUserBody>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

impl OfferSummaryBody {
    pub fn for_viewer(
        offer: &Offer,
        contributor: &User,
        item_owner: UserId,
        viewer: Option<UserId>,
    ) -> Self {
        let disclosed = offer.is_disclosed_to(viewer, item_owner);
        Self {
            id: offer.id,
            hidden: offer.hidden,
            amount: disclosed.then_some(offer.amount),
            user: disclosed.then(|| PublicUserBody::from(contributor)),
            created_at: offer.created_at,
        }
    }
}

/// A wish with its owner and the offers made on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WishDetailsBody {
    #[serde(flatten)]
    pub wish: WishBody,
    pub owner: PublicUserBody,
    pub offers: Vec<OfferSummaryBody>,
}

impl WishDetailsBody {
    pub fn for_viewer(details: WishDetails, viewer: Option<UserId>) -> Self {
        let WishDetails {
            wish,
            owner,
            offers,
        } = details;
        let offers = offers
            .iter()
            .map(|(offer, contributor)| {
                OfferSummaryBody::for_viewer(offer, contributor, wish.owner_id, viewer)
            })
            .collect();
        Self {
            wish: WishBody::from(wish),
            owner: PublicUserBody::from(&owner),
            offers,
        }
    }
}

/// An offer with the funded wish, as returned by the offers endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OfferBody {
    #[serde(flatten)]
    pub offer: OfferSummaryBody,
    pub item: WishBody,
}

impl OfferBody {
    pub fn for_viewer(details: OfferDetails, viewer: Option<UserId>) -> Self {
        let OfferDetails { offer, user, item } = details;
        Self {
            offer: OfferSummaryBody::for_viewer(&offer, &user, item.owner_id, viewer),
            item: WishBody::from(item),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WishlistBody {
    #[schema(value_type = i64)]
    pub id: WishlistId,
    #[schema(example = "Birthday")]
    pub name: String,
    pub description: String,
    pub image: String,
    pub owner: PublicUserBody,
    pub items: Vec<WishBody>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTime<Utc>,
}

impl From<WishlistDetails> for WishlistBody {
    fn from(details: WishlistDetails) -> Self {
        let WishlistDetails {
            wishlist,
            owner,
            items,
        } = details;
        Self {
            id: wishlist.id,
            name: wishlist.name,
            description: wishlist.description,
            image: wishlist.image,
            owner: PublicUserBody::from(&owner),
            items: wish_bodies(items),
            created_at: wishlist.created_at,
            updated_at: wishlist.updated_at,
        }
    }
}
