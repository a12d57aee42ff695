//! Statement builders shared by the entity DAOs.
//!
//! Column and table names only ever come from [`Table`] constants and
//! [`Field::column`]; caller data is always bound as a parameter.

use super::{Field, SqlValue};
use crate::DbSession;
use fourier_core::{FourierError, FourierResult, PageRequest};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Sqlite};
use tracing::{error, info, warn};

/// Static description of an entity table.
pub(crate) trait Table {
    /// Entity name used in log lines.
    const ENTITY: &'static str;
    const NAME: &'static str;
    /// Select list, matching the fields of `Row`.
    const COLUMNS: &'static str;

    type Row: for<'r> FromRow<'r, SqliteRow> + Send + Unpin;
    type Entity: From<Self::Row> + Send;
}

fn columns(fields: &[Field]) -> Vec<&'static str> {
    fields.iter().map(|f| f.column).collect()
}

fn push_bind_value(qb: &mut QueryBuilder<'_, Sqlite>, value: SqlValue) {
    match value {
        SqlValue::Integer(v) => {
            qb.push_bind(v);
        }
        SqlValue::Text(v) => {
            qb.push_bind(v);
        }
        SqlValue::Null => {
            qb.push_bind(Option::<i64>::None);
        }
    }
}

fn push_where(qb: &mut QueryBuilder<'_, Sqlite>, fields: &[Field]) {
    for (i, field) in fields.iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        qb.push(field.column);
        if field.value == SqlValue::Null {
            qb.push(" IS NULL");
        } else {
            qb.push(" = ");
            push_bind_value(qb, field.value.clone());
        }
    }
}

fn push_assignments(qb: &mut QueryBuilder<'_, Sqlite>, fields: &[Field]) {
    for field in fields {
        qb.push(field.column);
        qb.push(" = ");
        push_bind_value(qb, field.value.clone());
        qb.push(", ");
    }
    qb.push("updated_at = CURRENT_TIMESTAMP");
}

fn select<T: Table>() -> QueryBuilder<'static, Sqlite> {
    QueryBuilder::new(format!("SELECT {} FROM {}", T::COLUMNS, T::NAME))
}

/// Logs a failed write, rolls the session back and hands the error on.
async fn rollback_with<T: Table>(
    session: &mut DbSession,
    action: &str,
    err: FourierError,
) -> FourierError {
    error!("Error while {} {} records: {}", action, T::ENTITY, err);
    if let Err(rollback_err) = session.rollback().await {
        warn!(
            "Rollback after failed {} on {} failed: {}",
            action,
            T::ENTITY,
            rollback_err
        );
    }
    err
}

pub(crate) async fn find_one_or_none_by_id<T: Table>(
    session: &mut DbSession,
    id: i64,
) -> FourierResult<Option<T::Entity>> {
    info!("Finding {} with ID: {}", T::ENTITY, id);
    let mut qb = select::<T>();
    qb.push(" WHERE id = ").push_bind(id);
    let conn = session.connection().await?;
    let row = qb.build_query_as::<T::Row>().fetch_optional(conn).await?;
    if row.is_none() {
        info!("{} with ID {} not found", T::ENTITY, id);
    }
    Ok(row.map(T::Entity::from))
}

pub(crate) async fn find_one_or_none<T: Table>(
    session: &mut DbSession,
    filter: &[Field],
) -> FourierResult<Option<T::Entity>> {
    info!("Finding one {} by filter on {:?}", T::ENTITY, columns(filter));
    let mut qb = select::<T>();
    push_where(&mut qb, filter);
    qb.push(" LIMIT 2");
    let conn = session.connection().await?;
    let mut rows = qb.build_query_as::<T::Row>().fetch_all(conn).await?;
    if rows.len() > 1 {
        return Err(FourierError::database(format!(
            "Multiple {} records match filter on {:?}",
            T::ENTITY,
            columns(filter)
        )));
    }
    Ok(rows.pop().map(T::Entity::from))
}

pub(crate) async fn find_all<T: Table>(
    session: &mut DbSession,
    filter: &[Field],
) -> FourierResult<Vec<T::Entity>> {
    info!("Finding all {} records with filter on {:?}", T::ENTITY, columns(filter));
    let mut qb = select::<T>();
    push_where(&mut qb, filter);
    qb.push(" ORDER BY id");
    let conn = session.connection().await?;
    let rows = qb.build_query_as::<T::Row>().fetch_all(conn).await?;
    info!("Found {} {} records", rows.len(), T::ENTITY);
    Ok(rows.into_iter().map(T::Entity::from).collect())
}

pub(crate) async fn paginate<T: Table>(
    session: &mut DbSession,
    page: PageRequest,
    filter: &[Field],
) -> FourierResult<Vec<T::Entity>> {
    info!(
        "Paginating {} records: page {}, size {}",
        T::ENTITY,
        page.page,
        page.size
    );
    let mut qb = select::<T>();
    push_where(&mut qb, filter);
    qb.push(" ORDER BY id LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    let conn = session.connection().await?;
    let rows = qb.build_query_as::<T::Row>().fetch_all(conn).await?;
    Ok(rows.into_iter().map(T::Entity::from).collect())
}

pub(crate) async fn add<T: Table>(
    session: &mut DbSession,
    values: &[Field],
) -> FourierResult<T::Entity> {
    info!("Adding {} record with columns {:?}", T::ENTITY, columns(values));
    let mut qb = QueryBuilder::new(format!("INSERT INTO {}", T::NAME));
    if values.is_empty() {
        qb.push(" DEFAULT VALUES");
    } else {
        qb.push(" (");
        qb.push(columns(values).join(", "));
        qb.push(") VALUES (");
        for (i, field) in values.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            push_bind_value(&mut qb, field.value.clone());
        }
        qb.push(")");
    }
    qb.push(" RETURNING ").push(T::COLUMNS);

    let result = {
        let conn = session.connection().await?;
        qb.build_query_as::<T::Row>().fetch_one(conn).await
    };
    match result {
        Ok(row) => {
            info!("{} record added", T::ENTITY);
            Ok(T::Entity::from(row))
        }
        Err(e) => Err(rollback_with::<T>(session, "adding", e.into()).await),
    }
}

pub(crate) async fn add_many<T: Table>(
    session: &mut DbSession,
    records: Vec<Vec<Field>>,
) -> FourierResult<Vec<T::Entity>> {
    info!("Adding {} {} records", records.len(), T::ENTITY);
    let mut added = Vec::with_capacity(records.len());
    for values in records {
        added.push(add::<T>(session, &values).await?);
    }
    Ok(added)
}

pub(crate) async fn update<T: Table>(
    session: &mut DbSession,
    filter: &[Field],
    values: &[Field],
) -> FourierResult<u64> {
    info!(
        "Updating {} records matching {:?} with columns {:?}",
        T::ENTITY,
        columns(filter),
        columns(values)
    );
    if values.is_empty() {
        return Err(FourierError::validation(
            "At least one value is required for update.",
        ));
    }
    let mut qb = QueryBuilder::new(format!("UPDATE {} SET ", T::NAME));
    push_assignments(&mut qb, values);
    push_where(&mut qb, filter);

    let result = {
        let conn = session.connection().await?;
        qb.build().execute(conn).await
    };
    match result {
        Ok(done) => {
            info!("Updated {} {} records", done.rows_affected(), T::ENTITY);
            Ok(done.rows_affected())
        }
        Err(e) => Err(rollback_with::<T>(session, "updating", e.into()).await),
    }
}

pub(crate) async fn delete<T: Table>(
    session: &mut DbSession,
    filter: &[Field],
) -> FourierResult<u64> {
    info!("Deleting {} records matching {:?}", T::ENTITY, columns(filter));
    if filter.is_empty() {
        error!("Refusing to delete {} records without a filter", T::ENTITY);
        return Err(FourierError::validation(
            "At least one filter is required for deletion.",
        ));
    }
    let mut qb = QueryBuilder::new(format!("DELETE FROM {}", T::NAME));
    push_where(&mut qb, filter);

    let result = {
        let conn = session.connection().await?;
        qb.build().execute(conn).await
    };
    match result {
        Ok(done) => {
            info!("Deleted {} {} records", done.rows_affected(), T::ENTITY);
            Ok(done.rows_affected())
        }
        Err(e) => Err(rollback_with::<T>(session, "deleting", e.into()).await),
    }
}

pub(crate) async fn count<T: Table>(
    session: &mut DbSession,
    filter: &[Field],
) -> FourierResult<u64> {
    info!("Counting {} records with filter on {:?}", T::ENTITY, columns(filter));
    let mut qb = QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", T::NAME));
    push_where(&mut qb, filter);
    let conn = session.connection().await?;
    let total: i64 = qb.build_query_scalar().fetch_one(conn).await?;
    Ok(u64::try_from(total).unwrap_or_default())
}

pub(crate) async fn find_by_ids<T: Table>(
    session: &mut DbSession,
    ids: &[i64],
) -> FourierResult<Vec<T::Entity>> {
    info!("Finding {} records by {} IDs", T::ENTITY, ids.len());
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut qb = select::<T>();
    qb.push(" WHERE id IN (");
    {
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
    }
    qb.push(") ORDER BY id");
    let conn = session.connection().await?;
    let rows = qb.build_query_as::<T::Row>().fetch_all(conn).await?;
    Ok(rows.into_iter().map(T::Entity::from).collect())
}

pub(crate) async fn upsert<T: Table>(
    session: &mut DbSession,
    unique_fields: &[&str],
    values: &[Field],
) -> FourierResult<T::Entity> {
    let keys: Vec<Field> = values
        .iter()
        .filter(|f| unique_fields.contains(&f.column))
        .cloned()
        .collect();
    info!("Upserting {} record keyed on {:?}", T::ENTITY, columns(&keys));
    if keys.is_empty() {
        return Err(FourierError::validation(
            "Upsert requires at least one unique field present in the values.",
        ));
    }

    let mut lookup = QueryBuilder::new(format!("SELECT id FROM {}", T::NAME));
    push_where(&mut lookup, &keys);
    lookup.push(" LIMIT 2");
    let lookup_result = {
        let conn = session.connection().await?;
        lookup.build_query_scalar::<i64>().fetch_all(conn).await
    };
    let existing = match lookup_result {
        Ok(ids) => ids,
        Err(e) => return Err(rollback_with::<T>(session, "upserting", e.into()).await),
    };

    match existing.as_slice() {
        [] => add::<T>(session, values).await,
        [id] => {
            info!("{} with ID {} exists, updating in place", T::ENTITY, id);
            let mut qb = QueryBuilder::new(format!("UPDATE {} SET ", T::NAME));
            push_assignments(&mut qb, values);
            qb.push(" WHERE id = ").push_bind(*id);
            qb.push(" RETURNING ").push(T::COLUMNS);

            let result = {
                let conn = session.connection().await?;
                qb.build_query_as::<T::Row>().fetch_one(conn).await
            };
            match result {
                Ok(row) => Ok(T::Entity::from(row)),
                Err(e) => Err(rollback_with::<T>(session, "upserting", e.into()).await),
            }
        }
        _ => Err(FourierError::database(format!(
            "Multiple {} records match upsert keys {:?}",
            T::ENTITY,
            columns(&keys)
        ))),
    }
}

pub(crate) async fn bulk_update<T: Table>(
    session: &mut DbSession,
    records: Vec<Vec<Field>>,
) -> FourierResult<u64> {
    info!("Bulk updating {} {} records", records.len(), T::ENTITY);
    let mut updated = 0;
    for fields in records {
        let (ids, values): (Vec<Field>, Vec<Field>) =
            fields.into_iter().partition(|f| f.column == "id");
        let Some(SqlValue::Integer(id)) = ids.into_iter().next().map(|f| f.value) else {
            warn!("Skipping {} record without an ID", T::ENTITY);
            continue;
        };
        if values.is_empty() {
            warn!("Skipping {} record {} with nothing to update", T::ENTITY, id);
            continue;
        }

        let mut qb = QueryBuilder::new(format!("UPDATE {} SET ", T::NAME));
        push_assignments(&mut qb, &values);
        qb.push(" WHERE id = ").push_bind(id);

        let result = {
            let conn = session.connection().await?;
            qb.build().execute(conn).await
        };
        match result {
            Ok(done) => updated += done.rows_affected(),
            Err(e) => return Err(rollback_with::<T>(session, "bulk updating", e.into()).await),
        }
    }
    info!("Bulk updated {} {} records", updated, T::ENTITY);
    Ok(updated)
}
