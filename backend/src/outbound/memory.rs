//! In-memory implementation of [`DbRepository`].
//!
//! The store is deterministic: rows live in `BTreeMap`s keyed by id and ids
//! come from per-table counters that start at 1 and never reuse a value. The
//! same invariants as the relational schema hold (unique email, post owner
//! must exist, deleting a user removes its posts).
//!
//! Every operation can be replaced by a closure registered on an
//! [`InMemoryStrategy`], either at construction or temporarily through
//! [`InMemoryRepository::override_with`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use async_trait::async_trait;

use crate::domain::ports::{ConnectionStats, DbRepository, RepositoryError};
use crate::domain::{NewPost, NewUser, Post, PostUpdate, User, UserUpdate};

type Hook<A, T> = Arc<dyn Fn(A) -> Result<T, RepositoryError> + Send + Sync>;

macro_rules! strategy_hooks {
    ($($op:ident: $arg:ty => $out:ty),* $(,)?) => {
        /// Per-operation replacements for the default in-memory behaviour.
        ///
        /// Unset operations fall through to the store.
        ///
        /// # Examples
        /// ```
        /// use userpost_api::domain::ports::RepositoryError;
        /// use userpost_api::outbound::memory::InMemoryStrategy;
        ///
        /// let strategy = InMemoryStrategy::default()
        ///     .on_ping(|()| Err(RepositoryError::unavailable("down")));
        /// assert!(format!("{strategy:?}").contains("ping: true"));
        /// ```
        #[derive(Clone, Default)]
        pub struct InMemoryStrategy {
            $($op: Option<Hook<$arg, $out>>,)*
        }

        impl InMemoryStrategy {
            $(
                ::paste::paste! {
                    #[doc = concat!("Replace `", stringify!($op), "` with `hook`.")]
                    #[must_use]
                    pub fn [<on_ $op>]<F>(mut self, hook: F) -> Self
                    where
                        F: Fn($arg) -> Result<$out, RepositoryError> + Send + Sync + 'static,
                    {
                        self.$op = Some(Arc::new(hook));
                        self
                    }
                }
            )*
        }

        impl fmt::Debug for InMemoryStrategy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct("InMemoryStrategy")
                    $(.field(stringify!($op), &self.$op.is_some()))*
                    .finish()
            }
        }
    };
}

strategy_hooks! {
    ping: () => (),
    user_create: NewUser => User,
    user_get_all: () => Vec<User>,
    user_get_by_id: u64 => User,
    user_delete_by_id: u64 => (),
    user_update: UserUpdate => User,
    post_create: NewPost => Post,
    post_get_all: () => Vec<Post>,
    post_get_by_id: u64 => Post,
    post_delete_by_id: u64 => (),
    post_update: PostUpdate => Post,
}

#[derive(Debug, Default)]
struct Store {
    users: BTreeMap<u64, User>,
    posts: BTreeMap<u64, Post>,
    last_user_id: u64,
    last_post_id: u64,
}

impl Store {
    fn email_taken(&self, email: &str, except: Option<u64>) -> bool {
        self.users
            .values()
            .any(|user| user.email == email && Some(user.id) != except)
    }
}

/// Deterministic in-process store with injectable per-operation behaviour.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    store: Mutex<Store>,
    strategy: RwLock<InMemoryStrategy>,
}

/// Restores the strategy that was active before
/// [`InMemoryRepository::override_with`] when dropped.
#[must_use = "the override is reverted as soon as the guard is dropped"]
pub struct StrategyGuard<'a> {
    slot: &'a RwLock<InMemoryStrategy>,
    previous: Option<InMemoryStrategy>,
}

impl Drop for StrategyGuard<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            *self.slot.write().unwrap_or_else(PoisonError::into_inner) = previous;
        }
    }
}

impl InMemoryRepository {
    /// Empty store with default behaviour for every operation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty store whose operations are replaced by `strategy` where set.
    pub fn with_strategy(strategy: InMemoryStrategy) -> Self {
        Self {
            store: Mutex::default(),
            strategy: RwLock::new(strategy),
        }
    }

    /// Install `strategy` until the returned guard is dropped.
    ///
    /// The guard also restores the previous strategy while unwinding, so a
    /// failed assertion cannot leak an override into the next test.
    pub fn override_with(&self, strategy: InMemoryStrategy) -> StrategyGuard<'_> {
        let mut slot = self.strategy.write().unwrap_or_else(PoisonError::into_inner);
        let previous = std::mem::replace(&mut *slot, strategy);
        StrategyGuard {
            slot: &self.strategy,
            previous: Some(previous),
        }
    }

    fn hook<A, T>(
        &self,
        pick: impl FnOnce(&InMemoryStrategy) -> Option<Hook<A, T>>,
    ) -> Option<Hook<A, T>> {
        let strategy = self.strategy.read().unwrap_or_else(PoisonError::into_inner);
        pick(&strategy)
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl DbRepository for InMemoryRepository {
    async fn ping(&self) -> Result<(), RepositoryError> {
        if let Some(hook) = self.hook(|s| s.ping.clone()) {
            return hook(());
        }
        Ok(())
    }

    fn connection(&self) -> Option<ConnectionStats> {
        None
    }

    async fn user_create(&self, user: &NewUser) -> Result<User, RepositoryError> {
        if let Some(hook) = self.hook(|s| s.user_create.clone()) {
            return hook(user.clone());
        }
        let mut store = self.lock();
        if store.email_taken(user.email(), None) {
            return Err(RepositoryError::constraint_violation(format!(
                "email {} already stored",
                user.email()
            )));
        }
        store.last_user_id += 1;
        let created = user.clone().into_user(store.last_user_id);
        store.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn user_get_all(&self) -> Result<Vec<User>, RepositoryError> {
        if let Some(hook) = self.hook(|s| s.user_get_all.clone()) {
            return hook(());
        }
        Ok(self.lock().users.values().cloned().collect())
    }

    async fn user_get_by_id(&self, id: u64) -> Result<User, RepositoryError> {
        if let Some(hook) = self.hook(|s| s.user_get_by_id.clone()) {
            return hook(id);
        }
        self.lock()
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("user {id}")))
    }

    async fn user_delete_by_id(&self, id: u64) -> Result<(), RepositoryError> {
        if let Some(hook) = self.hook(|s| s.user_delete_by_id.clone()) {
            return hook(id);
        }
        let mut store = self.lock();
        if store.users.remove(&id).is_none() {
            return Err(RepositoryError::not_found(format!("user {id}")));
        }
        store.posts.retain(|_, post| post.user_id != id);
        Ok(())
    }

    async fn user_update(&self, update: &UserUpdate) -> Result<User, RepositoryError> {
        if let Some(hook) = self.hook(|s| s.user_update.clone()) {
            return hook(update.clone());
        }
        let mut store = self.lock();
        let id = update.id();
        if !store.users.contains_key(&id) {
            return Err(RepositoryError::not_found(format!("user {id}")));
        }
        if store.email_taken(update.email(), Some(id)) {
            return Err(RepositoryError::constraint_violation(format!(
                "email {} already stored",
                update.email()
            )));
        }
        let updated = update.clone().into_user();
        store.users.insert(id, updated.clone());
        Ok(updated)
    }

    async fn post_create(&self, post: &NewPost) -> Result<Post, RepositoryError> {
        if let Some(hook) = self.hook(|s| s.post_create.clone()) {
            return hook(post.clone());
        }
        let mut store = self.lock();
        if !store.users.contains_key(&post.user_id()) {
            return Err(RepositoryError::constraint_violation(format!(
                "owner {} does not exist",
                post.user_id()
            )));
        }
        store.last_post_id += 1;
        let created = post.clone().into_post(store.last_post_id);
        store.posts.insert(created.id, created.clone());
        Ok(created)
    }

    async fn post_get_all(&self) -> Result<Vec<Post>, RepositoryError> {
        if let Some(hook) = self.hook(|s| s.post_get_all.clone()) {
            return hook(());
        }
        Ok(self.lock().posts.values().cloned().collect())
    }

    async fn post_get_by_id(&self, id: u64) -> Result<Post, RepositoryError> {
        if let Some(hook) = self.hook(|s| s.post_get_by_id.clone()) {
            return hook(id);
        }
        self.lock()
            .posts
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("post {id}")))
    }

    async fn post_delete_by_id(&self, id: u64) -> Result<(), RepositoryError> {
        if let Some(hook) = self.hook(|s| s.post_delete_by_id.clone()) {
            return hook(id);
        }
        self.lock()
            .posts
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found(format!("post {id}")))
    }

    async fn post_update(&self, update: &PostUpdate) -> Result<Post, RepositoryError> {
        if let Some(hook) = self.hook(|s| s.post_update.clone()) {
            return hook(update.clone());
        }
        let mut store = self.lock();
        let id = update.id();
        let Some(current) = store.posts.get(&id) else {
            return Err(RepositoryError::not_found(format!("post {id}")));
        };
        let updated = update.clone().apply_to(current);
        store.posts.insert(id, updated.clone());
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use rstest::{fixture, rstest};

    use super::*;

    fn new_user(name: &str, email: &str) -> NewUser {
        NewUser::try_new(name, email).expect("valid user")
    }

    fn new_post(user_id: u64) -> NewPost {
        NewPost::try_new("title", "content", user_id).expect("valid post")
    }

    #[fixture]
    fn repo() -> InMemoryRepository {
        InMemoryRepository::new()
    }

    #[rstest]
    #[tokio::test]
    async fn ids_are_monotonic_and_never_reused(repo: InMemoryRepository) {
        let first = repo.user_create(&new_user("A", "a@x.com")).await.expect("create");
        repo.user_delete_by_id(first.id).await.expect("delete");
        let second = repo.user_create(&new_user("B", "b@x.com")).await.expect("create");

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_email_is_a_constraint_violation(repo: InMemoryRepository) {
        repo.user_create(&new_user("A", "a@x.com")).await.expect("create");
        let err = repo
            .user_create(&new_user("Other", "a@x.com"))
            .await
            .expect_err("duplicate email");

        assert!(matches!(err, RepositoryError::ConstraintViolation { .. }));
        assert_eq!(repo.user_get_all().await.expect("list").len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn update_may_keep_own_email_but_not_take_another(repo: InMemoryRepository) {
        let a = repo.user_create(&new_user("A", "a@x.com")).await.expect("create");
        repo.user_create(&new_user("B", "b@x.com")).await.expect("create");

        let renamed = repo
            .user_update(&UserUpdate::try_new(a.id, "A2", "a@x.com").expect("valid"))
            .await
            .expect("same email allowed");
        assert_eq!(renamed.name, "A2");

        let err = repo
            .user_update(&UserUpdate::try_new(a.id, "A2", "b@x.com").expect("valid"))
            .await
            .expect_err("email taken");
        assert!(matches!(err, RepositoryError::ConstraintViolation { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn missing_rows_are_not_found(repo: InMemoryRepository) {
        let update = UserUpdate::try_new(9, "A", "a@x.com").expect("valid");
        assert!(matches!(
            repo.user_get_by_id(9).await,
            Err(RepositoryError::NotFound { .. })
        ));
        assert!(matches!(
            repo.user_delete_by_id(9).await,
            Err(RepositoryError::NotFound { .. })
        ));
        assert!(matches!(
            repo.user_update(&update).await,
            Err(RepositoryError::NotFound { .. })
        ));
        assert!(matches!(
            repo.post_delete_by_id(9).await,
            Err(RepositoryError::NotFound { .. })
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn post_requires_existing_owner(repo: InMemoryRepository) {
        let err = repo.post_create(&new_post(5)).await.expect_err("no owner");
        assert!(matches!(err, RepositoryError::ConstraintViolation { .. }));
        assert!(repo.post_get_all().await.expect("list").is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn deleting_user_removes_owned_posts(repo: InMemoryRepository) {
        let a = repo.user_create(&new_user("A", "a@x.com")).await.expect("create");
        let b = repo.user_create(&new_user("B", "b@x.com")).await.expect("create");
        repo.post_create(&new_post(a.id)).await.expect("post");
        let kept = repo.post_create(&new_post(b.id)).await.expect("post");

        repo.user_delete_by_id(a.id).await.expect("delete");

        assert_eq!(repo.post_get_all().await.expect("list"), vec![kept]);
    }

    #[rstest]
    #[tokio::test]
    async fn post_update_keeps_owner(repo: InMemoryRepository) {
        let owner = repo.user_create(&new_user("A", "a@x.com")).await.expect("create");
        let post = repo.post_create(&new_post(owner.id)).await.expect("post");

        let updated = repo
            .post_update(&PostUpdate::try_new(post.id, "new", "body").expect("valid"))
            .await
            .expect("update");

        assert_eq!(updated.user_id, owner.id);
        assert_eq!(repo.post_get_by_id(post.id).await.expect("get"), updated);
    }

    #[tokio::test]
    async fn strategy_replaces_default_behaviour() {
        let repo = InMemoryRepository::with_strategy(
            InMemoryStrategy::default()
                .on_user_get_all(|()| Err(RepositoryError::unavailable("down"))),
        );

        assert!(matches!(
            repo.user_get_all().await,
            Err(RepositoryError::Unavailable { .. })
        ));
        assert!(repo.post_get_all().await.expect("default").is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn override_guard_restores_previous_strategy(repo: InMemoryRepository) {
        {
            let _guard = repo.override_with(
                InMemoryStrategy::default().on_ping(|()| Err(RepositoryError::unavailable("x"))),
            );
            assert!(repo.ping().await.is_err());
        }
        assert!(repo.ping().await.is_ok());
    }

    #[rstest]
    #[tokio::test]
    async fn override_guard_restores_during_unwind(repo: InMemoryRepository) {
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            let _guard = repo.override_with(
                InMemoryStrategy::default().on_ping(|()| Err(RepositoryError::unavailable("x"))),
            );
            panic!("assertion failed inside override");
        }));

        assert!(outcome.is_err());
        assert!(repo.ping().await.is_ok());
    }

    #[rstest]
    fn memory_store_has_no_pool(repo: InMemoryRepository) {
        assert!(repo.connection().is_none());
    }
}
