use std::marker::PhantomData;
use std::sync::Arc;

use sqlx::postgres::PgRow;
use sqlx::query_builder::Separated;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use super::paged_list::{Page, PagedList};

/// A persisted entity the generic repository can manage.
///
/// `TABLE` is the schema-qualified table name, `ALIAS` the alias used in
/// select queries (filters and relations reference columns through it). The
/// primary key column is `id` by convention, serial-assigned on insert.
pub trait Entity: for<'r> FromRow<'r, PgRow> + Send + Sync + Unpin {
    type Id: for<'q> sqlx::Encode<'q, Postgres> + sqlx::Type<Postgres> + Send + Copy + 'static;
    type Filter: QueryFilter;
    type Relation: Relation + Copy;
    type SortKey: SortKey + Copy;

    const TABLE: &'static str;
    const ALIAS: &'static str;
    const INSERT_COLUMNS: &'static [&'static str];

    fn id(&self) -> Self::Id;

    /// Bind one value per `INSERT_COLUMNS` entry, in order.
    fn push_insert_values(&self, values: &mut Separated<'_, '_, Postgres, &'static str>);

    /// Push `column = <bind>` pairs for every updatable column.
    fn push_update_assignments(&self, assignments: &mut Separated<'_, '_, Postgres, &'static str>);
}

/// A predicate over one entity type, rendered to a SQL `WHERE` fragment with
/// bound parameters. Each entity declares its own finite set of predicates;
/// no query-expression abstraction crosses the service boundary.
pub trait QueryFilter: Send + Sync {
    fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>);
}

/// A relation-expansion key: one allowed eager load for an entity, resolved
/// here to a join clause plus a JSON projection selected alongside the row.
pub trait Relation {
    fn select_expr(&self) -> &'static str;
    fn join_clause(&self) -> &'static str;
    /// Whether the projection aggregates joined rows (forces a `GROUP BY`).
    fn aggregated(&self) -> bool {
        false
    }
}

pub trait SortKey {
    fn column(&self) -> &'static str;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => " ASC",
            SortDirection::Desc => " DESC",
        }
    }
}

/// Generic CRUD and query wrapper over one entity type, instantiated per
/// entity. Every mutation commits before returning; lookups return `Option`
/// and never treat not-found as an error. Storage faults propagate uncaught.
pub struct PgRepository<T: Entity> {
    db: Arc<PgPool>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> PgRepository<T> {
    pub fn new(db: Arc<PgPool>) -> Self {
        PgRepository {
            db,
            _entity: PhantomData,
        }
    }

    pub async fn add(&self, entity: T) -> Result<T, sqlx::Error> {
        let mut qb = Self::insert_query(std::iter::once(&entity));
        qb.build_query_as::<T>().fetch_one(self.db.as_ref()).await
    }

    pub async fn add_range(&self, entities: Vec<T>) -> Result<Vec<T>, sqlx::Error> {
        if entities.is_empty() {
            return Ok(vec![]);
        }
        let mut qb = Self::insert_query(entities.iter());
        qb.build_query_as::<T>().fetch_all(self.db.as_ref()).await
    }

    pub async fn update(&self, entity: &T) -> Result<(), sqlx::Error> {
        let mut qb = Self::update_query(entity);
        qb.build().execute(self.db.as_ref()).await?;
        Ok(())
    }

    pub async fn update_range(&self, entities: &[T]) -> Result<(), sqlx::Error> {
        for entity in entities {
            self.update(entity).await?;
        }
        Ok(())
    }

    pub async fn remove(&self, entity: &T) -> Result<(), sqlx::Error> {
        let mut qb = Self::delete_query(entity.id());
        qb.build().execute(self.db.as_ref()).await?;
        Ok(())
    }

    pub async fn remove_range(&self, entities: &[T]) -> Result<(), sqlx::Error> {
        for entity in entities {
            self.remove(entity).await?;
        }
        Ok(())
    }

    pub async fn get(
        &self,
        id: T::Id,
        relations: &[T::Relation],
    ) -> Result<Option<T>, sqlx::Error> {
        let mut qb = Self::select_query(relations);
        qb.push(" WHERE ").push(T::ALIAS).push(".id = ").push_bind(id);
        Self::push_group_by(&mut qb, relations);
        qb.build_query_as::<T>()
            .fetch_optional(self.db.as_ref())
            .await
    }

    pub async fn get_by(
        &self,
        filter: &T::Filter,
        relations: &[T::Relation],
    ) -> Result<Option<T>, sqlx::Error> {
        let mut qb = Self::select_query(relations);
        qb.push(" WHERE ");
        filter.push_where(&mut qb);
        Self::push_group_by(&mut qb, relations);
        qb.build_query_as::<T>()
            .fetch_optional(self.db.as_ref())
            .await
    }

    pub async fn exists(
        &self,
        filter: &T::Filter,
        relations: &[T::Relation],
    ) -> Result<bool, sqlx::Error> {
        let mut qb: QueryBuilder<'static, Postgres> =
            QueryBuilder::new("SELECT EXISTS (SELECT 1 FROM ");
        qb.push(T::TABLE).push(" ").push(T::ALIAS);
        for relation in relations {
            qb.push(" ").push(relation.join_clause());
        }
        qb.push(" WHERE ");
        filter.push_where(&mut qb);
        qb.push(")");
        let exists: bool = qb.build_query_scalar().fetch_one(self.db.as_ref()).await?;
        Ok(exists)
    }

    pub async fn get_all(&self, relations: &[T::Relation]) -> Result<Vec<T>, sqlx::Error> {
        let mut qb = Self::select_query(relations);
        Self::push_group_by(&mut qb, relations);
        qb.build_query_as::<T>().fetch_all(self.db.as_ref()).await
    }

    pub async fn get_all_by(
        &self,
        filter: &T::Filter,
        relations: &[T::Relation],
    ) -> Result<Vec<T>, sqlx::Error> {
        let mut qb = Self::select_query(relations);
        qb.push(" WHERE ");
        filter.push_where(&mut qb);
        Self::push_group_by(&mut qb, relations);
        qb.build_query_as::<T>().fetch_all(self.db.as_ref()).await
    }

    pub async fn count_by(&self, filter: &T::Filter) -> Result<i64, sqlx::Error> {
        let mut qb: QueryBuilder<'static, Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM ");
        qb.push(T::TABLE).push(" ").push(T::ALIAS).push(" WHERE ");
        filter.push_where(&mut qb);
        let total: i64 = qb.build_query_scalar().fetch_one(self.db.as_ref()).await?;
        Ok(total)
    }

    /// Filtered, optionally ordered page plus total-count metadata: one count
    /// query and one sliced fetch.
    pub async fn get_paged_by(
        &self,
        filter: &T::Filter,
        order: Option<(T::SortKey, SortDirection)>,
        page: &Page,
        relations: &[T::Relation],
    ) -> Result<PagedList<T>, sqlx::Error> {
        let total_count = self.count_by(filter).await?;

        let mut qb = Self::select_query(relations);
        qb.push(" WHERE ");
        filter.push_where(&mut qb);
        Self::push_group_by(&mut qb, relations);
        if let Some((key, direction)) = order {
            qb.push(" ORDER BY ").push(key.column()).push(direction.sql());
        }
        qb.push(" LIMIT ")
            .push_bind(page.size as i64)
            .push(" OFFSET ")
            .push_bind(page.offset());

        let items = qb.build_query_as::<T>().fetch_all(self.db.as_ref()).await?;
        Ok(PagedList::new(items, total_count, page))
    }

    fn select_query(relations: &[T::Relation]) -> QueryBuilder<'static, Postgres> {
        let mut qb: QueryBuilder<'static, Postgres> = QueryBuilder::new("SELECT ");
        qb.push(T::ALIAS).push(".*");
        for relation in relations {
            qb.push(", ").push(relation.select_expr());
        }
        qb.push(" FROM ").push(T::TABLE).push(" ").push(T::ALIAS);
        for relation in relations {
            qb.push(" ").push(relation.join_clause());
        }
        qb
    }

    fn push_group_by(qb: &mut QueryBuilder<'_, Postgres>, relations: &[T::Relation]) {
        if relations.iter().any(|r| r.aggregated()) {
            qb.push(" GROUP BY ").push(T::ALIAS).push(".id");
        }
    }

    fn insert_query<'a>(
        entities: impl IntoIterator<Item = &'a T>,
    ) -> QueryBuilder<'static, Postgres>
    where
        T: 'a,
    {
        let mut qb: QueryBuilder<'static, Postgres> = QueryBuilder::new("INSERT INTO ");
        qb.push(T::TABLE)
            .push(" (")
            .push(T::INSERT_COLUMNS.join(", "))
            .push(") ");
        qb.push_values(entities, |mut row, entity| {
            entity.push_insert_values(&mut row);
        });
        qb.push(" RETURNING *");
        qb
    }

    fn update_query(entity: &T) -> QueryBuilder<'static, Postgres> {
        let mut qb: QueryBuilder<'static, Postgres> = QueryBuilder::new("UPDATE ");
        qb.push(T::TABLE).push(" SET ");
        {
            let mut assignments = qb.separated(", ");
            entity.push_update_assignments(&mut assignments);
        }
        qb.push(" WHERE id = ").push_bind(entity.id());
        qb
    }

    fn delete_query(id: T::Id) -> QueryBuilder<'static, Postgres> {
        let mut qb: QueryBuilder<'static, Postgres> = QueryBuilder::new("DELETE FROM ");
        qb.push(T::TABLE).push(" WHERE id = ").push_bind(id);
        qb
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::follows::{Follow, FollowFilter, FollowRelation};
    use crate::models::users::User;
    use chrono::TimeZone;
    use chrono::Utc;

    #[test]
    fn select_without_relations_is_a_plain_scan() {
        let qb = PgRepository::<Follow>::select_query(&[]);
        assert_eq!(qb.sql(), "SELECT uf.* FROM social.follows uf");
    }

    #[test]
    fn select_with_relation_joins_and_projects_json() {
        let qb = PgRepository::<Follow>::select_query(&[FollowRelation::Follower]);
        assert_eq!(
            qb.sql(),
            "SELECT uf.*, TO_JSONB(fu) AS follower FROM social.follows uf \
             LEFT JOIN social.users fu ON fu.id = uf.follower_id"
        );
    }

    #[test]
    fn aggregated_relation_forces_group_by() {
        use crate::models::users::UserRelation;

        let mut qb = PgRepository::<User>::select_query(&[UserRelation::Posts]);
        PgRepository::<User>::push_group_by(&mut qb, &[UserRelation::Posts]);
        let sql = qb.sql();
        assert!(sql.contains("JSON_AGG"));
        assert!(sql.ends_with(" GROUP BY u.id"));
    }

    #[test]
    fn insert_binds_one_placeholder_per_column() {
        let follow = Follow::new(1, 2);
        let qb = PgRepository::<Follow>::insert_query(std::iter::once(&follow));
        assert_eq!(
            qb.sql(),
            "INSERT INTO social.follows (follower_id, following_id, created_at) \
             VALUES ($1, $2, $3) RETURNING *"
        );
    }

    #[test]
    fn insert_range_extends_the_values_list() {
        let follows = vec![Follow::new(1, 2), Follow::new(1, 3)];
        let qb = PgRepository::<Follow>::insert_query(follows.iter());
        assert_eq!(
            qb.sql(),
            "INSERT INTO social.follows (follower_id, following_id, created_at) \
             VALUES ($1, $2, $3), ($4, $5, $6) RETURNING *"
        );
    }

    #[test]
    fn update_targets_the_entity_row() {
        let user = User {
            id: 9,
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            image: None,
            bio: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            posts: None,
        };
        let qb = PgRepository::<User>::update_query(&user);
        assert_eq!(
            qb.sql(),
            "UPDATE social.users SET first_name = $1, last_name = $2, email = $3, \
             image = $4, bio = $5 WHERE id = $6"
        );
    }

    #[test]
    fn delete_targets_by_id() {
        let qb = PgRepository::<Follow>::delete_query(4);
        assert_eq!(qb.sql(), "DELETE FROM social.follows WHERE id = $1");
    }

    #[test]
    fn filters_render_where_fragments() {
        let mut qb: QueryBuilder<'static, Postgres> = QueryBuilder::new("");
        FollowFilter::Edge {
            follower_id: 1,
            following_id: 2,
        }
        .push_where(&mut qb);
        assert_eq!(qb.sql(), "uf.follower_id = $1 AND uf.following_id = $2");
    }
}
