//! Data-access objects.
//!
//! [`Dao`] is the capability contract every entity repository offers.
//! Filters, insert values and patches describe themselves as a list of
//! [`Field`]s; only fields that are set take part in a statement, so unset
//! values fall back to column defaults and unset filters do not constrain.

mod role_dao;
mod sql;
mod user_dao;

pub use role_dao::RoleDao;
pub use user_dao::UserDao;

use crate::DbSession;
use async_trait::async_trait;
use fourier_core::{FourierResult, PageRequest};

/// A value bound into a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Integer(i64),
    Text(String),
    Null,
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// One column/value pair of a filter or value object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub column: &'static str,
    pub value: SqlValue,
}

impl Field {
    #[must_use]
    pub fn new(column: &'static str, value: impl Into<SqlValue>) -> Self {
        Self {
            column,
            value: value.into(),
        }
    }
}

/// Describes the set fields of a filter, value or patch object, in column
/// order.
pub trait FieldSet {
    fn fields(&self) -> Vec<Field>;

    fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }
}

/// Pushes `column` onto `fields` when `value` is set.
pub(crate) fn push_field<V: Into<SqlValue>>(
    fields: &mut Vec<Field>,
    column: &'static str,
    value: Option<V>,
) {
    if let Some(value) = value {
        fields.push(Field::new(column, value));
    }
}

/// CRUD and query operations over one entity table.
///
/// Every operation runs on the caller's session. Write operations roll the
/// session back before returning a data-layer error.
#[async_trait]
pub trait Dao: Send + Sync {
    type Entity: Send;
    type Filter: FieldSet + Send + Sync;
    type Values: FieldSet + Send + Sync;
    type Patch: FieldSet + Send + Sync;

    async fn find_one_or_none_by_id(
        &self,
        session: &mut DbSession,
        id: i64,
    ) -> FourierResult<Option<Self::Entity>>;

    /// Returns the single row matching `filter`. More than one match is an
    /// error.
    async fn find_one_or_none(
        &self,
        session: &mut DbSession,
        filter: &Self::Filter,
    ) -> FourierResult<Option<Self::Entity>>;

    async fn find_all(
        &self,
        session: &mut DbSession,
        filter: Option<&Self::Filter>,
    ) -> FourierResult<Vec<Self::Entity>>;

    async fn paginate(
        &self,
        session: &mut DbSession,
        page: PageRequest,
        filter: Option<&Self::Filter>,
    ) -> FourierResult<Vec<Self::Entity>>;

    async fn add(&self, session: &mut DbSession, values: &Self::Values)
        -> FourierResult<Self::Entity>;

    async fn add_many(
        &self,
        session: &mut DbSession,
        values: &[Self::Values],
    ) -> FourierResult<Vec<Self::Entity>>;

    /// Applies `values` to every row matching `filter` and returns the number
    /// of rows changed. An empty filter matches every row.
    async fn update(
        &self,
        session: &mut DbSession,
        filter: &Self::Filter,
        values: &Self::Patch,
    ) -> FourierResult<u64>;

    /// Deletes the rows matching `filter`. An empty filter is rejected before
    /// the session is touched.
    async fn delete(&self, session: &mut DbSession, filter: &Self::Filter) -> FourierResult<u64>;

    async fn count(
        &self,
        session: &mut DbSession,
        filter: Option<&Self::Filter>,
    ) -> FourierResult<u64>;

    async fn find_by_ids(
        &self,
        session: &mut DbSession,
        ids: &[i64],
    ) -> FourierResult<Vec<Self::Entity>>;

    /// Updates the row whose `unique_fields` equal those in `values`, or
    /// inserts `values` when no such row exists.
    async fn upsert(
        &self,
        session: &mut DbSession,
        unique_fields: &[&str],
        values: &Self::Values,
    ) -> FourierResult<Self::Entity>;

    /// Updates each record by its id, one statement per record. Records
    /// without an id are skipped.
    async fn bulk_update(
        &self,
        session: &mut DbSession,
        records: &[Self::Patch],
    ) -> FourierResult<u64>;
}
