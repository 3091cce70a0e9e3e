//! Shared test doubles and sample records for unit tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{
    ConflictRetry, DEFAULT_ABOUT, DEFAULT_AVATAR, Money, Offer, OfferId, RetryPolicy,
    RetrySleeper, User, UserId, Wish, WishId,
};

pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Fixed instant used across tests.
pub fn fixed_now() -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).single() {
        Some(now) => now,
        None => panic!("valid fixture timestamp"),
    }
}

pub fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(MutableClock::new(fixed_now()))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateSleeper;

#[async_trait]
impl RetrySleeper for ImmediateSleeper {
    async fn sleep(&self, _duration: Duration) {}
}

/// Conflict retry that never pauses.
pub fn immediate_retry(max_attempts: u32) -> ConflictRetry {
    ConflictRetry::new(
        RetryPolicy {
            max_attempts,
            ..RetryPolicy::default()
        },
        Arc::new(ImmediateSleeper),
    )
}

pub fn sample_user(id: i64, username: &str) -> User {
    User {
        id: UserId::new(id),
        username: username.to_owned(),
        email: format!("{username}@example.com"),
        about: DEFAULT_ABOUT.to_owned(),
        avatar: DEFAULT_AVATAR.to_owned(),
        created_at: fixed_now(),
        updated_at: fixed_now(),
    }
}

pub fn sample_wish(id: i64, owner: i64, price_cents: u64, raised_cents: u64) -> Wish {
    Wish {
        id: WishId::new(id),
        name: "Bike".to_owned(),
        link: "https://shop.example/bike".to_owned(),
        image: "https://shop.example/bike.png".to_owned(),
        description: "A red bike".to_owned(),
        price: Money::from_cents(price_cents),
        raised: Money::from_cents(raised_cents),
        copied: 0,
        owner_id: UserId::new(owner),
        original_wish_id: None,
        created_at: fixed_now(),
        updated_at: fixed_now(),
        revision: 0,
    }
}

pub fn sample_offer(id: i64, user: i64, item: i64, amount_cents: u64, hidden: bool) -> Offer {
    Offer {
        id: OfferId::new(id),
        amount: Money::from_cents(amount_cents),
        hidden,
        user_id: UserId::new(user),
        item_id: WishId::new(item),
        created_at: fixed_now(),
    }
}
