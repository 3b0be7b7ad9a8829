//! Table descriptor shared by every entity served through the generic
//! repository.

use async_trait::async_trait;
use diesel::QueryResult;
use diesel_async::AsyncPgConnection;

/// A row type with an `i32` primary key and CRUD statements for its table.
///
/// `list` and `count` take an optional text filter. Each entity decides which
/// columns the filter matches; a blank filter is treated as absent.
#[async_trait]
pub trait Entity: Sized + Send + Sync + 'static {
    /// Payload for inserts.
    type New: Send + Sync + 'static;
    /// Payload for full-record updates.
    type Changes: Send + Sync + 'static;

    /// Lowercase singular name, used in log fields.
    const NAME: &'static str;

    fn id(&self) -> i32;

    async fn insert(conn: &mut AsyncPgConnection, new: Self::New) -> QueryResult<Self>;

    async fn find(conn: &mut AsyncPgConnection, id: i32) -> QueryResult<Option<Self>>;

    /// Rows in the entity's default order, optionally filtered and windowed
    /// by `(offset, limit)`.
    async fn list(
        conn: &mut AsyncPgConnection,
        filter: Option<&str>,
        window: Option<(i64, i64)>,
    ) -> QueryResult<Vec<Self>>;

    async fn count(conn: &mut AsyncPgConnection, filter: Option<&str>) -> QueryResult<i64>;

    /// `None` when no row has `id`.
    async fn update(
        conn: &mut AsyncPgConnection,
        id: i32,
        changes: Self::Changes,
    ) -> QueryResult<Option<Self>>;

    /// Number of deleted rows.
    async fn delete(conn: &mut AsyncPgConnection, id: i32) -> QueryResult<usize>;
}

/// Returns the trimmed filter, or `None` when it is blank.
pub fn non_blank(filter: Option<&str>) -> Option<&str> {
    filter.map(str::trim).filter(|text| !text.is_empty())
}

/// Builds an `ILIKE` pattern matching `text` anywhere, with `%`, `_` and
/// `\` in the input matched literally.
pub fn contains_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Implements [`Entity`] for a diesel model.
///
/// ```ignore
/// impl_entity!(Category {
///     name: "category",
///     table: categories,
///     new: NewCategory,
///     changes: CategoryChanges,
///     order: (categories::name.asc(), categories::id.asc()),
///     filter: |pattern| categories::name.ilike(pattern),
/// });
/// ```
///
/// `filter` receives the escaped `ILIKE` pattern as an owned `String`.
macro_rules! impl_entity {
    ($model:ident {
        name: $name:literal,
        table: $table:ident,
        new: $new:ty,
        changes: $changes:ty,
        order: $order:expr,
        filter: |$pattern:ident| $predicate:expr $(,)?
    }) => {
        const _: () = {
            use diesel::prelude::*;
            use diesel_async::RunQueryDsl as AsyncRunQueryDsl;

            #[async_trait::async_trait]
            impl $crate::models::entity::Entity for $model {
                type New = $new;
                type Changes = $changes;

                const NAME: &'static str = $name;

                fn id(&self) -> i32 {
                    self.id
                }

                async fn insert(
                    conn: &mut diesel_async::AsyncPgConnection,
                    new: Self::New,
                ) -> diesel::QueryResult<Self> {
                    let query = diesel::insert_into($crate::schema::$table::table)
                        .values(&new)
                        .returning($model::as_returning());
                    AsyncRunQueryDsl::get_result(query, conn).await
                }

                async fn find(
                    conn: &mut diesel_async::AsyncPgConnection,
                    id: i32,
                ) -> diesel::QueryResult<Option<Self>> {
                    let query = $crate::schema::$table::table
                        .find(id)
                        .select($model::as_select());
                    AsyncRunQueryDsl::first(query, conn).await.optional()
                }

                async fn list(
                    conn: &mut diesel_async::AsyncPgConnection,
                    filter: Option<&str>,
                    window: Option<(i64, i64)>,
                ) -> diesel::QueryResult<Vec<Self>> {
                    let mut query = $crate::schema::$table::table
                        .select($model::as_select())
                        .into_boxed();
                    if let Some(text) = $crate::models::entity::non_blank(filter) {
                        let $pattern = $crate::models::entity::contains_pattern(text);
                        query = query.filter($predicate);
                    }
                    query = query.order_by($order);
                    if let Some((offset, limit)) = window {
                        query = query.offset(offset).limit(limit);
                    }
                    AsyncRunQueryDsl::load(query, conn).await
                }

                async fn count(
                    conn: &mut diesel_async::AsyncPgConnection,
                    filter: Option<&str>,
                ) -> diesel::QueryResult<i64> {
                    let mut query = $crate::schema::$table::table.into_boxed();
                    if let Some(text) = $crate::models::entity::non_blank(filter) {
                        let $pattern = $crate::models::entity::contains_pattern(text);
                        query = query.filter($predicate);
                    }
                    AsyncRunQueryDsl::get_result(query.count(), conn).await
                }

                async fn update(
                    conn: &mut diesel_async::AsyncPgConnection,
                    id: i32,
                    changes: Self::Changes,
                ) -> diesel::QueryResult<Option<Self>> {
                    let query = diesel::update($crate::schema::$table::table.find(id))
                        .set(&changes)
                        .returning($model::as_returning());
                    AsyncRunQueryDsl::get_result(query, conn).await.optional()
                }

                async fn delete(
                    conn: &mut diesel_async::AsyncPgConnection,
                    id: i32,
                ) -> diesel::QueryResult<usize> {
                    let query = diesel::delete($crate::schema::$table::table.find(id));
                    AsyncRunQueryDsl::execute(query, conn).await
                }
            }
        };
    };
}

pub(crate) use impl_entity;
