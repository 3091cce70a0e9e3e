//! Mounts every API handler under `/api/v1`.
//!
//! Literal segments (`/users/me`, `/wishes/last`, `/wishes/top`) are
//! registered before the parameterised routes they would otherwise match.

use actix_web::web;

use super::validation::{json_error_handler, path_error_handler};
use super::{offers, users, wishes, wishlists};

/// Register the API scope together with its JSON and path error handlers.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use wishlist_backend::inbound::http::routes::configure;
///
/// let _app = App::new().configure(configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::PathConfig::default().error_handler(path_error_handler))
            .service(users::sign_up)
            .service(users::sign_in)
            .service(users::current_user)
            .service(users::update_current_user)
            .service(users::current_user_wishes)
            .service(users::find_users)
            .service(users::user_by_username)
            .service(users::wishes_by_username)
            .service(wishes::create_wish)
            .service(wishes::last_wishes)
            .service(wishes::top_wishes)
            .service(wishes::get_wish)
            .service(wishes::update_wish)
            .service(wishes::delete_wish)
            .service(wishes::copy_wish)
            .service(offers::create_offer)
            .service(offers::list_offers)
            .service(offers::get_offer)
            .service(wishlists::list_wishlists)
            .service(wishlists::create_wishlist)
            .service(wishlists::get_wishlist)
            .service(wishlists::update_wishlist)
            .service(wishlists::delete_wishlist),
    );
}
