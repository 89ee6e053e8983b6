//! In-memory storage backend.
//!
//! Implements every repository trait over `tokio` `RwLock`-guarded maps.
//! Each cart primitive holds the cart map's write lock for its whole
//! duration, giving the same atomicity as the single-statement `PostgreSQL`
//! implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use pearl_treasure_core::{
    CartId, CartLineId, Email, PearlId, Quantity, SessionId, SessionToken, UserId,
};

use super::{CartRepository, PearlRepository, RepositoryError, SessionRepository, UserRepository};
use crate::models::pearl::LIST_LIMIT;
use crate::models::{Cart, CartLine, Pearl, PearlQuery, PearlUpdate, Session, User};

/// In-memory store for tests and database-less runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<UserId, User>>,
    sessions: RwLock<HashMap<SessionId, Session>>,
    pearls: RwLock<HashMap<PearlId, Pearl>>,
    carts: RwLock<HashMap<UserId, Cart>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions, expired or not.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Number of stored carts.
    pub async fn cart_count(&self) -> usize {
        self.carts.read().await.len()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn get_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| &u.email == email).cloned())
    }

    async fn create(&self, user: &User) -> Result<User, RepositoryError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) || users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(user.clone())
    }
}

#[async_trait]
impl SessionRepository for MemoryStore {
    async fn create(&self, session: &Session) -> Result<(), RepositoryError> {
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| s.token != session.token);
        sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn get_by_token(
        &self,
        token: &SessionToken,
    ) -> Result<Option<Session>, RepositoryError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.values().find(|s| &s.token == token).cloned())
    }

    async fn delete(&self, id: &SessionId) -> Result<bool, RepositoryError> {
        Ok(self.sessions.write().await.remove(id).is_some())
    }

    async fn delete_for_user(&self, user_id: &UserId) -> Result<u64, RepositoryError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| &s.user_id != user_id);
        Ok((before - sessions.len()) as u64)
    }
}

#[async_trait]
impl PearlRepository for MemoryStore {
    async fn list(&self, query: &PearlQuery) -> Result<Vec<Pearl>, RepositoryError> {
        let pearls = self.pearls.read().await;
        let mut result: Vec<Pearl> = pearls
            .values()
            .filter(|p| query.matches(p))
            .cloned()
            .collect();
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        result.truncate(LIST_LIMIT);
        Ok(result)
    }

    async fn get(&self, id: &PearlId) -> Result<Option<Pearl>, RepositoryError> {
        Ok(self.pearls.read().await.get(id).cloned())
    }

    async fn create(&self, pearl: &Pearl) -> Result<Pearl, RepositoryError> {
        let mut pearls = self.pearls.write().await;
        if pearls.contains_key(&pearl.id) {
            return Err(RepositoryError::Conflict("pearl id already exists".to_owned()));
        }
        pearls.insert(pearl.id.clone(), pearl.clone());
        Ok(pearl.clone())
    }

    async fn update(
        &self,
        id: &PearlId,
        update: PearlUpdate,
    ) -> Result<Option<Pearl>, RepositoryError> {
        let mut pearls = self.pearls.write().await;
        Ok(pearls.get_mut(id).map(|pearl| {
            update.apply_to(pearl);
            pearl.clone()
        }))
    }

    async fn delete(&self, id: &PearlId) -> Result<bool, RepositoryError> {
        Ok(self.pearls.write().await.remove(id).is_some())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.pearls.read().await.len() as u64)
    }
}

#[async_trait]
impl CartRepository for MemoryStore {
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<Cart>, RepositoryError> {
        Ok(self.carts.read().await.get(user_id).cloned())
    }

    async fn get_or_create(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<CartId, RepositoryError> {
        let mut carts = self.carts.write().await;
        let cart = carts
            .entry(user_id.clone())
            .or_insert_with(|| Cart::empty(user_id.clone(), now));
        Ok(cart.id.clone())
    }

    async fn add_or_merge_line(
        &self,
        cart_id: &CartId,
        pearl_id: &PearlId,
        quantity: Quantity,
        now: DateTime<Utc>,
    ) -> Result<CartLine, RepositoryError> {
        let mut carts = self.carts.write().await;
        let cart = carts
            .values_mut()
            .find(|c| &c.id == cart_id)
            .ok_or(RepositoryError::NotFound)?;

        cart.updated_at = now;
        if let Some(line) = cart.lines.iter_mut().find(|l| &l.pearl_id == pearl_id) {
            line.quantity = line.quantity.merged_with(quantity);
            return Ok(line.clone());
        }

        let line = CartLine::new(pearl_id.clone(), quantity, now);
        cart.lines.push(line.clone());
        Ok(line)
    }

    async fn set_line_quantity(
        &self,
        user_id: &UserId,
        line_id: &CartLineId,
        quantity: Quantity,
        now: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let mut carts = self.carts.write().await;
        let cart = carts.get_mut(user_id).ok_or(RepositoryError::NotFound)?;

        cart.updated_at = now;
        let Some(line) = cart.lines.iter_mut().find(|l| &l.id == line_id) else {
            return Ok(false);
        };
        line.quantity = quantity;
        Ok(true)
    }

    async fn remove_line(
        &self,
        user_id: &UserId,
        line_id: &CartLineId,
        now: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let mut carts = self.carts.write().await;
        let Some(cart) = carts.get_mut(user_id) else {
            return Ok(false);
        };

        cart.updated_at = now;
        let before = cart.lines.len();
        cart.lines.retain(|l| &l.id != line_id);
        Ok(cart.lines.len() < before)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use pearl_treasure_core::{PearlCategory, Price};

    use super::*;

    fn quantity(n: i64) -> Quantity {
        Quantity::new(n).unwrap()
    }

    fn pearl(id: &str, in_stock: bool, created_at: DateTime<Utc>) -> Pearl {
        Pearl {
            id: PearlId::new(id),
            name: format!("Pearl {id}"),
            price: Price::from_units(100),
            category: PearlCategory::Akoya,
            image: String::new(),
            description: String::new(),
            size: "7mm".to_owned(),
            origin: "Japan".to_owned(),
            in_stock,
            created_at,
        }
    }

    #[tokio::test]
    async fn test_add_same_pearl_merges_into_one_line() {
        let store = MemoryStore::new();
        let user = UserId::new("u-1");
        let now = Utc::now();
        let pearl_id = PearlId::new("akoya-1");

        let cart_id = store.get_or_create(&user, now).await.unwrap();
        let first = store.add_or_merge_line(&cart_id, &pearl_id, quantity(2), now).await.unwrap();
        let second = store.add_or_merge_line(&cart_id, &pearl_id, quantity(3), now).await.unwrap();

        assert_eq!(first.id, second.id);
        let cart = store.find_by_user(&user).await.unwrap().unwrap();
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines[0].quantity, quantity(5));
    }

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let store = MemoryStore::new();
        let user = UserId::new("u-1");

        let a = store.get_or_create(&user, Utc::now()).await.unwrap();
        let b = store.get_or_create(&user, Utc::now()).await.unwrap();

        assert_eq!(a, b);
        assert_eq!(store.cart_count().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_adds_do_not_lose_updates() {
        let store = Arc::new(MemoryStore::new());
        let user = UserId::new("u-1");
        let cart_id = store.get_or_create(&user, Utc::now()).await.unwrap();

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let store = Arc::clone(&store);
                let cart_id = cart_id.clone();
                tokio::spawn(async move {
                    store
                        .add_or_merge_line(&cart_id, &PearlId::new("akoya-1"), Quantity::ONE, Utc::now())
                        .await
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let cart = store.find_by_user(&user).await.unwrap().unwrap();
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines[0].quantity, quantity(20));
    }

    #[tokio::test]
    async fn test_set_line_quantity_without_cart_is_not_found() {
        let store = MemoryStore::new();
        let result = store
            .set_line_quantity(&UserId::new("u-1"), &CartLineId::new("x"), quantity(2), Utc::now())
            .await;
        assert!(matches!(result, Err(RepositoryError::NotFound)));
    }

    #[tokio::test]
    async fn test_set_line_quantity_missing_line_bumps_updated_at() {
        let store = MemoryStore::new();
        let user = UserId::new("u-1");
        let created = Utc::now();
        store.get_or_create(&user, created).await.unwrap();

        let later = created + chrono::Duration::minutes(5);
        let found = store
            .set_line_quantity(&user, &CartLineId::new("missing"), quantity(2), later)
            .await
            .unwrap();

        assert!(!found);
        let cart = store.find_by_user(&user).await.unwrap().unwrap();
        assert_eq!(cart.updated_at, later);
    }

    #[tokio::test]
    async fn test_remove_line_is_idempotent() {
        let store = MemoryStore::new();
        let user = UserId::new("u-1");
        let now = Utc::now();
        let cart_id = store.get_or_create(&user, now).await.unwrap();
        let line = store
            .add_or_merge_line(&cart_id, &PearlId::new("akoya-1"), Quantity::ONE, now)
            .await
            .unwrap();

        assert!(store.remove_line(&user, &line.id, now).await.unwrap());
        assert!(!store.remove_line(&user, &line.id, now).await.unwrap());
        assert!(!store.remove_line(&UserId::new("nobody"), &line.id, now).await.unwrap());
        assert_eq!(store.cart_count().await, 1);
    }

    #[tokio::test]
    async fn test_session_token_rebinds_instead_of_duplicating() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let token = SessionToken::new("tok");
        let ttl = chrono::Duration::days(7);

        SessionRepository::create(&store, &Session::issue(UserId::new("a"), token.clone(), now, ttl))
            .await
            .unwrap();
        SessionRepository::create(&store, &Session::issue(UserId::new("b"), token.clone(), now, ttl))
            .await
            .unwrap();

        assert_eq!(store.session_count().await, 1);
        let session = store.get_by_token(&token).await.unwrap().unwrap();
        assert_eq!(session.user_id, UserId::new("b"));
    }

    #[tokio::test]
    async fn test_delete_for_user_only_touches_that_user() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let ttl = chrono::Duration::days(7);
        for (user, token) in [("a", "t1"), ("a", "t2"), ("b", "t3")] {
            SessionRepository::create(
                &store,
                &Session::issue(UserId::new(user), SessionToken::new(token), now, ttl),
            )
            .await
            .unwrap();
        }

        assert_eq!(store.delete_for_user(&UserId::new("a")).await.unwrap(), 2);
        assert_eq!(store.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_list_skips_out_of_stock_and_orders_by_creation() {
        let store = MemoryStore::new();
        let now = Utc::now();
        for p in [
            pearl("b", true, now),
            pearl("a", true, now + chrono::Duration::seconds(1)),
            pearl("c", false, now),
        ] {
            PearlRepository::create(&store, &p).await.unwrap();
        }

        let ids: Vec<String> = store
            .list(&PearlQuery::default())
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id.into_inner())
            .collect();
        assert_eq!(ids, ["b", "a"]);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        let email = Email::parse("diver@pearls.example").unwrap();
        let user = |id: &str| User {
            id: UserId::new(id),
            email: email.clone(),
            name: "Diver".to_owned(),
            picture: None,
            created_at: Utc::now(),
        };

        UserRepository::create(&store, &user("1")).await.unwrap();
        let result = UserRepository::create(&store, &user("2")).await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    }
}
