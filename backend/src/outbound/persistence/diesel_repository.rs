//! PostgreSQL-backed [`DbRepository`] implementation using Diesel.
//!
//! Every operation checks out one pooled connection and issues a single
//! statement. Writes use `RETURNING` so the stored row comes back without a
//! second round trip.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ConnectionStats, DbRepository, RepositoryError};
use crate::domain::{NewPost, NewUser, Post, PostUpdate, User, UserUpdate};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewPostRow, NewUserRow, PostChangeset, PostRow, UserChangeset, UserRow};
use super::pool::DbPool;
use super::schema::{posts, users};

/// Diesel-backed implementation of the [`DbRepository`] port.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Keys are `int8`; anything above `i64::MAX` cannot match a row.
fn db_id(id: u64, entity: &str) -> Result<i64, RepositoryError> {
    i64::try_from(id).map_err(|_| RepositoryError::not_found(format!("{entity} {id}")))
}

#[expect(clippy::cast_sign_loss, reason = "BIGSERIAL keys are always positive")]
fn domain_id(id: i64) -> u64 {
    id as u64
}

fn row_to_user(row: UserRow) -> User {
    User {
        id: domain_id(row.id),
        name: row.name,
        email: row.email,
    }
}

fn row_to_post(row: PostRow) -> Post {
    Post {
        id: domain_id(row.id),
        title: row.title,
        content: row.content,
        user_id: domain_id(row.user_id),
    }
}

fn expect_deleted(affected: usize, entity: &str, id: u64) -> Result<(), RepositoryError> {
    if affected == 0 {
        return Err(RepositoryError::not_found(format!("{entity} {id}")));
    }
    Ok(())
}

#[async_trait]
impl DbRepository for DieselRepository {
    async fn ping(&self) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::sql_query("SELECT 1")
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    fn connection(&self) -> Option<ConnectionStats> {
        Some(self.pool.stats())
    }

    async fn user_create(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserRow {
            name: user.name(),
            email: user.email(),
        };

        diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map(row_to_user)
            .map_err(map_diesel_error)
    }

    async fn user_get_all(&self) -> Result<Vec<User>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .order(users::id.asc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(row_to_user).collect())
    }

    async fn user_get_by_id(&self, id: u64) -> Result<User, RepositoryError> {
        let key = db_id(id, "user")?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        users::table
            .find(key)
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .map(row_to_user)
            .map_err(map_diesel_error)
    }

    async fn user_delete_by_id(&self, id: u64) -> Result<(), RepositoryError> {
        let key = db_id(id, "user")?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::delete(users::table.find(key))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        expect_deleted(affected, "user", id)
    }

    async fn user_update(&self, update: &UserUpdate) -> Result<User, RepositoryError> {
        let key = db_id(update.id(), "user")?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = UserChangeset {
            name: update.name(),
            email: update.email(),
        };

        diesel::update(users::table.find(key))
            .set((changes, users::updated_at.eq(diesel::dsl::now)))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map(row_to_user)
            .map_err(map_diesel_error)
    }

    async fn post_create(&self, post: &NewPost) -> Result<Post, RepositoryError> {
        // An owner id beyond int8 cannot exist, which is a referential failure.
        let owner = i64::try_from(post.user_id()).map_err(|_| {
            RepositoryError::constraint_violation(format!("owner {} out of range", post.user_id()))
        })?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewPostRow {
            title: post.title(),
            content: post.content(),
            user_id: owner,
        };

        diesel::insert_into(posts::table)
            .values(&row)
            .returning(PostRow::as_returning())
            .get_result(&mut conn)
            .await
            .map(row_to_post)
            .map_err(map_diesel_error)
    }

    async fn post_get_all(&self) -> Result<Vec<Post>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<PostRow> = posts::table
            .order(posts::id.asc())
            .select(PostRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(row_to_post).collect())
    }

    async fn post_get_by_id(&self, id: u64) -> Result<Post, RepositoryError> {
        let key = db_id(id, "post")?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        posts::table
            .find(key)
            .select(PostRow::as_select())
            .first(&mut conn)
            .await
            .map(row_to_post)
            .map_err(map_diesel_error)
    }

    async fn post_delete_by_id(&self, id: u64) -> Result<(), RepositoryError> {
        let key = db_id(id, "post")?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::delete(posts::table.find(key))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        expect_deleted(affected, "post", id)
    }

    async fn post_update(&self, update: &PostUpdate) -> Result<Post, RepositoryError> {
        let key = db_id(update.id(), "post")?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = PostChangeset {
            title: update.title(),
            content: update.content(),
        };

        diesel::update(posts::table.find(key))
            .set((changes, posts::updated_at.eq(diesel::dsl::now)))
            .returning(PostRow::as_returning())
            .get_result(&mut conn)
            .await
            .map(row_to_post)
            .map_err(map_diesel_error)
    }
}
