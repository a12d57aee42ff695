//! Data access for the `roles` table.

use super::sql::{self, Table};
use super::{push_field, Dao, Field, FieldSet};
use crate::DbSession;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use fourier_core::{FourierResult, NewRole, PageRequest, Role, RoleFilter, RolePatch};
use sqlx::FromRow;

#[derive(Debug, FromRow)]
pub(crate) struct RoleRow {
    id: i64,
    name: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl From<RoleRow> for Role {
    fn from(row: RoleRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            created_at: row.created_at.and_utc(),
            updated_at: row.updated_at.and_utc(),
        }
    }
}

pub(crate) struct RoleTable;

impl Table for RoleTable {
    const ENTITY: &'static str = "Role";
    const NAME: &'static str = "roles";
    const COLUMNS: &'static str = "id, name, created_at, updated_at";

    type Row = RoleRow;
    type Entity = Role;
}

impl FieldSet for RoleFilter {
    fn fields(&self) -> Vec<Field> {
        let mut fields = Vec::new();
        push_field(&mut fields, "id", self.id);
        push_field(&mut fields, "name", self.name.clone());
        fields
    }
}

impl FieldSet for NewRole {
    fn fields(&self) -> Vec<Field> {
        let mut fields = Vec::new();
        push_field(&mut fields, "id", self.id);
        fields.push(Field::new("name", self.name.as_str()));
        fields
    }
}

impl FieldSet for RolePatch {
    fn fields(&self) -> Vec<Field> {
        let mut fields = Vec::new();
        push_field(&mut fields, "id", self.id);
        push_field(&mut fields, "name", self.name.clone());
        fields
    }
}

/// SQLite-backed [`Dao`] for roles.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleDao;

impl RoleDao {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn filter_fields(filter: Option<&RoleFilter>) -> Vec<Field> {
    filter.map(FieldSet::fields).unwrap_or_default()
}

#[async_trait]
impl Dao for RoleDao {
    type Entity = Role;
    type Filter = RoleFilter;
    type Values = NewRole;
    type Patch = RolePatch;

    async fn find_one_or_none_by_id(
        &self,
        session: &mut DbSession,
        id: i64,
    ) -> FourierResult<Option<Role>> {
        sql::find_one_or_none_by_id::<RoleTable>(session, id).await
    }

    async fn find_one_or_none(
        &self,
        session: &mut DbSession,
        filter: &RoleFilter,
    ) -> FourierResult<Option<Role>> {
        sql::find_one_or_none::<RoleTable>(session, &filter.fields()).await
    }

    async fn find_all(
        &self,
        session: &mut DbSession,
        filter: Option<&RoleFilter>,
    ) -> FourierResult<Vec<Role>> {
        sql::find_all::<RoleTable>(session, &filter_fields(filter)).await
    }

    async fn paginate(
        &self,
        session: &mut DbSession,
        page: PageRequest,
        filter: Option<&RoleFilter>,
    ) -> FourierResult<Vec<Role>> {
        sql::paginate::<RoleTable>(session, page, &filter_fields(filter)).await
    }

    async fn add(&self, session: &mut DbSession, values: &NewRole) -> FourierResult<Role> {
        sql::add::<RoleTable>(session, &values.fields()).await
    }

    async fn add_many(
        &self,
        session: &mut DbSession,
        values: &[NewRole],
    ) -> FourierResult<Vec<Role>> {
        sql::add_many::<RoleTable>(session, values.iter().map(FieldSet::fields).collect()).await
    }

    async fn update(
        &self,
        session: &mut DbSession,
        filter: &RoleFilter,
        values: &RolePatch,
    ) -> FourierResult<u64> {
        sql::update::<RoleTable>(session, &filter.fields(), &values.fields()).await
    }

    async fn delete(&self, session: &mut DbSession, filter: &RoleFilter) -> FourierResult<u64> {
        sql::delete::<RoleTable>(session, &filter.fields()).await
    }

    async fn count(
        &self,
        session: &mut DbSession,
        filter: Option<&RoleFilter>,
    ) -> FourierResult<u64> {
        sql::count::<RoleTable>(session, &filter_fields(filter)).await
    }

    async fn find_by_ids(&self, session: &mut DbSession, ids: &[i64]) -> FourierResult<Vec<Role>> {
        sql::find_by_ids::<RoleTable>(session, ids).await
    }

    async fn upsert(
        &self,
        session: &mut DbSession,
        unique_fields: &[&str],
        values: &NewRole,
    ) -> FourierResult<Role> {
        sql::upsert::<RoleTable>(session, unique_fields, &values.fields()).await
    }

    async fn bulk_update(
        &self,
        session: &mut DbSession,
        records: &[RolePatch],
    ) -> FourierResult<u64> {
        sql::bulk_update::<RoleTable>(session, records.iter().map(FieldSet::fields).collect())
            .await
    }
}
