//! Data access for the `users` table.

use super::sql::{self, Table};
use super::{push_field, Dao, Field, FieldSet};
use crate::DbSession;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use fourier_core::{FourierResult, NewUser, PageRequest, User, UserFilter, UserPatch};
use sqlx::FromRow;
use tracing::debug;

/// Database row representation of a user.
#[derive(Debug, FromRow)]
pub(crate) struct UserRow {
    id: i64,
    email: String,
    password: String,
    role_id: i64,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            password_hash: row.password,
            role_id: row.role_id,
            created_at: row.created_at.and_utc(),
            updated_at: row.updated_at.and_utc(),
        }
    }
}

pub(crate) struct UserTable;

impl Table for UserTable {
    const ENTITY: &'static str = "User";
    const NAME: &'static str = "users";
    const COLUMNS: &'static str = "id, email, password, role_id, created_at, updated_at";

    type Row = UserRow;
    type Entity = User;
}

impl FieldSet for UserFilter {
    fn fields(&self) -> Vec<Field> {
        let mut fields = Vec::new();
        push_field(&mut fields, "id", self.id);
        push_field(&mut fields, "email", self.email.clone());
        push_field(&mut fields, "role_id", self.role_id);
        fields
    }
}

impl FieldSet for NewUser {
    fn fields(&self) -> Vec<Field> {
        let mut fields = vec![
            Field::new("email", self.email.as_str()),
            Field::new("password", self.password_hash.as_str()),
        ];
        push_field(&mut fields, "role_id", self.role_id);
        fields
    }
}

impl FieldSet for UserPatch {
    fn fields(&self) -> Vec<Field> {
        let mut fields = Vec::new();
        push_field(&mut fields, "id", self.id);
        push_field(&mut fields, "email", self.email.clone());
        push_field(&mut fields, "password", self.password_hash.clone());
        push_field(&mut fields, "role_id", self.role_id);
        fields
    }
}

/// SQLite-backed [`Dao`] for users.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserDao;

impl UserDao {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Looks a user up by email.
    pub async fn find_by_email(
        &self,
        session: &mut DbSession,
        email: &str,
    ) -> FourierResult<Option<User>> {
        debug!("DAO: find user by email");
        self.find_one_or_none(session, &UserFilter::by_email(email)).await
    }
}

fn filter_fields(filter: Option<&UserFilter>) -> Vec<Field> {
    filter.map(FieldSet::fields).unwrap_or_default()
}

#[async_trait]
impl Dao for UserDao {
    type Entity = User;
    type Filter = UserFilter;
    type Values = NewUser;
    type Patch = UserPatch;

    async fn find_one_or_none_by_id(
        &self,
        session: &mut DbSession,
        id: i64,
    ) -> FourierResult<Option<User>> {
        sql::find_one_or_none_by_id::<UserTable>(session, id).await
    }

    async fn find_one_or_none(
        &self,
        session: &mut DbSession,
        filter: &UserFilter,
    ) -> FourierResult<Option<User>> {
        sql::find_one_or_none::<UserTable>(session, &filter.fields()).await
    }

    async fn find_all(
        &self,
        session: &mut DbSession,
        filter: Option<&UserFilter>,
    ) -> FourierResult<Vec<User>> {
        sql::find_all::<UserTable>(session, &filter_fields(filter)).await
    }

    async fn paginate(
        &self,
        session: &mut DbSession,
        page: PageRequest,
        filter: Option<&UserFilter>,
    ) -> FourierResult<Vec<User>> {
        sql::paginate::<UserTable>(session, page, &filter_fields(filter)).await
    }

    async fn add(&self, session: &mut DbSession, values: &NewUser) -> FourierResult<User> {
        sql::add::<UserTable>(session, &values.fields()).await
    }

    async fn add_many(
        &self,
        session: &mut DbSession,
        values: &[NewUser],
    ) -> FourierResult<Vec<User>> {
        sql::add_many::<UserTable>(session, values.iter().map(FieldSet::fields).collect()).await
    }

    async fn update(
        &self,
        session: &mut DbSession,
        filter: &UserFilter,
        values: &UserPatch,
    ) -> FourierResult<u64> {
        sql::update::<UserTable>(session, &filter.fields(), &values.fields()).await
    }

    async fn delete(&self, session: &mut DbSession, filter: &UserFilter) -> FourierResult<u64> {
        sql::delete::<UserTable>(session, &filter.fields()).await
    }

    async fn count(
        &self,
        session: &mut DbSession,
        filter: Option<&UserFilter>,
    ) -> FourierResult<u64> {
        sql::count::<UserTable>(session, &filter_fields(filter)).await
    }

    async fn find_by_ids(&self, session: &mut DbSession, ids: &[i64]) -> FourierResult<Vec<User>> {
        sql::find_by_ids::<UserTable>(session, ids).await
    }

    async fn upsert(
        &self,
        session: &mut DbSession,
        unique_fields: &[&str],
        values: &NewUser,
    ) -> FourierResult<User> {
        sql::upsert::<UserTable>(session, unique_fields, &values.fields()).await
    }

    async fn bulk_update(
        &self,
        session: &mut DbSession,
        records: &[UserPatch],
    ) -> FourierResult<u64> {
        sql::bulk_update::<UserTable>(session, records.iter().map(FieldSet::fields).collect())
            .await
    }
}
