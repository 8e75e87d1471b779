//! In-memory relational store for testing and development
//!
//! Tables hold JSON rows keyed by id, in insertion order. A
//! [`DatabaseSchema`] declares how tables relate so that single-row reads can
//! join them, and so that writes keep foreign keys and unique columns
//! consistent the way a relational backend would.

use crate::core::entity::Entity;
use crate::core::error::{CatalogResult, StorageError};
use crate::core::field::FieldValue;
use crate::core::query::{Condition, compare_json_values, matches_all};
use crate::core::relation::{JoinPlan, JoinStep, SortDirection};
use crate::core::store::Repository;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

const BACKEND: &str = "memory";

type Row = Map<String, Value>;
type Tables = HashMap<String, IndexMap<Uuid, Row>>;

/// How a named relation of a table is resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationKind {
    /// The row holds `foreign_key`, pointing at one row of `target`
    ToOne { target: String, foreign_key: String },
    /// Rows of `target` whose `mapped_by` column holds this row's id
    ToMany { target: String, mapped_by: String },
}

#[derive(Debug, Clone, Default)]
struct TableSchema {
    relations: IndexMap<String, RelationKind>,
    unique: Vec<String>,
}

/// Relations and constraints of every table
#[derive(Debug, Clone, Default)]
pub struct DatabaseSchema {
    tables: HashMap<String, TableSchema>,
}

impl DatabaseSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject a second row holding the same value in `column`
    pub fn unique(mut self, table: &str, column: &str) -> Self {
        self.table_mut(table).unique.push(column.to_string());
        self
    }

    pub fn to_one(mut self, table: &str, relation: &str, target: &str, foreign_key: &str) -> Self {
        self.table_mut(table).relations.insert(
            relation.to_string(),
            RelationKind::ToOne {
                target: target.to_string(),
                foreign_key: foreign_key.to_string(),
            },
        );
        self
    }

    pub fn to_many(mut self, table: &str, relation: &str, target: &str, mapped_by: &str) -> Self {
        self.table_mut(table).relations.insert(
            relation.to_string(),
            RelationKind::ToMany {
                target: target.to_string(),
                mapped_by: mapped_by.to_string(),
            },
        );
        self
    }

    pub fn relation(&self, table: &str, relation: &str) -> Option<&RelationKind> {
        self.tables.get(table)?.relations.get(relation)
    }

    fn table_mut(&mut self, table: &str) -> &mut TableSchema {
        self.tables.entry(table.to_string()).or_default()
    }

    fn relations_of(&self, table: &str) -> impl Iterator<Item = (&String, &RelationKind)> {
        self.tables
            .get(table)
            .into_iter()
            .flat_map(|t| t.relations.iter())
    }

    fn unique_of(&self, table: &str) -> &[String] {
        self.tables
            .get(table)
            .map(|t| t.unique.as_slice())
            .unwrap_or_default()
    }
}

/// Shared handle on every in-memory table
///
/// Cloning is cheap; clones see the same data.
#[derive(Clone, Default)]
pub struct MemoryDatabase {
    schema: Arc<DatabaseSchema>,
    tables: Arc<RwLock<Tables>>,
}

impl MemoryDatabase {
    pub fn new(schema: DatabaseSchema) -> Self {
        Self {
            schema: Arc::new(schema),
            tables: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn schema(&self) -> &DatabaseSchema {
        &self.schema
    }

    /// Typed repository over the table named after `T::entity_type()`
    pub fn repository<T: Entity>(&self) -> MemoryRepository<T> {
        MemoryRepository {
            db: self.clone(),
            _entity: PhantomData,
        }
    }

    fn read(&self) -> CatalogResult<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|e| {
            StorageError::LockError {
                message: format!("Failed to acquire read lock: {}", e),
            }
            .into()
        })
    }

    fn write(&self) -> CatalogResult<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|e| {
            StorageError::LockError {
                message: format!("Failed to acquire write lock: {}", e),
            }
            .into()
        })
    }

    /// Value stored under `step.relation` once joined onto `row`
    fn join(
        &self,
        tables: &Tables,
        table: &str,
        row: &Row,
        step: &JoinStep,
        plan: &JoinPlan,
    ) -> CatalogResult<Value> {
        let kind = self.schema.relation(table, &step.relation).ok_or_else(|| {
            StorageError::QueryError {
                backend: BACKEND.to_string(),
                message: format!("unknown relation '{}' on '{}'", step.relation, table),
            }
        })?;

        match kind {
            RelationKind::ToOne {
                target,
                foreign_key,
            } => {
                let related = row
                    .get(foreign_key)
                    .and_then(Value::as_str)
                    .and_then(|s| Uuid::parse_str(s).ok())
                    .and_then(|id| tables.get(target)?.get(&id));
                match related {
                    Some(related) => {
                        let mut related = related.clone();
                        self.join_children(tables, target, &mut related, step, plan)?;
                        Ok(Value::Object(related))
                    }
                    None => Ok(Value::Null),
                }
            }
            RelationKind::ToMany { target, mapped_by } => {
                let owner = row.get("id").cloned().unwrap_or(Value::Null);
                let mut related: Vec<Row> = tables
                    .get(target)
                    .map(|rows| {
                        rows.values()
                            .filter(|r| !owner.is_null() && r.get(mapped_by) == Some(&owner))
                            .cloned()
                            .collect()
                    })
                    .unwrap_or_default();

                if let Some(order) = &step.order {
                    related.sort_by(|a, b| {
                        let a = a.get(&order.column).unwrap_or(&Value::Null);
                        let b = b.get(&order.column).unwrap_or(&Value::Null);
                        compare_json_values(a, b)
                    });
                    if order.direction == SortDirection::Desc {
                        related.reverse();
                    }
                }

                let mut joined = Vec::with_capacity(related.len());
                for mut r in related {
                    self.join_children(tables, target, &mut r, step, plan)?;
                    joined.push(Value::Object(r));
                }
                Ok(Value::Array(joined))
            }
        }
    }

    fn join_children(
        &self,
        tables: &Tables,
        table: &str,
        row: &mut Row,
        step: &JoinStep,
        plan: &JoinPlan,
    ) -> CatalogResult<()> {
        // Only first-level joins carry children
        if step.parent.is_some() {
            return Ok(());
        }
        for child in plan.children_of(&step.relation) {
            let value = self.join(tables, table, row, child, plan)?;
            row.insert(child.relation.clone(), value);
        }
        Ok(())
    }

    /// Foreign keys must resolve and unique columns must stay unique
    fn check_row(&self, tables: &Tables, table: &str, id: &Uuid, row: &Row) -> CatalogResult<()> {
        for (relation, kind) in self.schema.relations_of(table) {
            let RelationKind::ToOne {
                target,
                foreign_key,
            } = kind
            else {
                continue;
            };
            let value = row.get(foreign_key).unwrap_or(&Value::Null);
            if value.is_null() {
                continue;
            }
            let resolves = value
                .as_str()
                .and_then(|s| Uuid::parse_str(s).ok())
                .is_some_and(|fk| tables.get(target).is_some_and(|rows| rows.contains_key(&fk)));
            if !resolves {
                return Err(integrity(format!(
                    "{}.{} references a missing {} ({}) through '{}'",
                    table, foreign_key, target, value, relation
                )));
            }
        }

        for column in self.schema.unique_of(table) {
            let Some(value) = row.get(column).filter(|v| !v.is_null()) else {
                continue;
            };
            let taken = tables.get(table).is_some_and(|rows| {
                rows.iter()
                    .any(|(other, r)| other != id && r.get(column) == Some(value))
            });
            if taken {
                return Err(integrity(format!(
                    "duplicate value {} for unique column {}.{}",
                    value, table, column
                )));
            }
        }
        Ok(())
    }

    /// No row of any table may still point at a row being deleted
    fn check_unreferenced(&self, tables: &Tables, table: &str, ids: &[Uuid]) -> CatalogResult<()> {
        for (owner, schema) in &self.schema.tables {
            for kind in schema.relations.values() {
                let RelationKind::ToOne {
                    target,
                    foreign_key,
                } = kind
                else {
                    continue;
                };
                if target != table {
                    continue;
                }
                let Some(rows) = tables.get(owner) else {
                    continue;
                };
                for id in ids {
                    let key = FieldValue::Uuid(*id);
                    if rows
                        .values()
                        .any(|r| key.matches_json(r.get(foreign_key).unwrap_or(&Value::Null)))
                    {
                        return Err(integrity(format!(
                            "{} {} is still referenced by {}.{}",
                            table, id, owner, foreign_key
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// [`Repository`] over one table of a [`MemoryDatabase`]
pub struct MemoryRepository<T: Entity> {
    db: MemoryDatabase,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> Clone for MemoryRepository<T> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> MemoryRepository<T> {
    fn table() -> &'static str {
        T::entity_type()
    }

    /// Serialised entity without joined relation values
    fn to_row(&self, entity: &T) -> CatalogResult<Row> {
        let value = serde_json::to_value(entity).map_err(serialization::<T>)?;
        let Value::Object(mut row) = value else {
            return Err(StorageError::SerializationError {
                entity_type: T::entity_type().to_string(),
                message: "entity is not a JSON object".to_string(),
            }
            .into());
        };
        for (relation, _) in self.db.schema.relations_of(Self::table()) {
            row.remove(relation);
        }
        row.insert("id".to_string(), Value::String(entity.id().to_string()));
        Ok(row)
    }

    fn from_row(row: Row) -> CatalogResult<T> {
        serde_json::from_value(Value::Object(row)).map_err(serialization::<T>)
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for MemoryRepository<T> {
    async fn find(&self, conditions: &[Condition]) -> CatalogResult<Vec<T>> {
        let tables = self.db.read()?;
        let Some(rows) = tables.get(Self::table()) else {
            return Ok(Vec::new());
        };
        rows.values()
            .filter(|row| matches_all(row, conditions))
            .map(|row| Self::from_row(row.clone()))
            .collect()
    }

    async fn find_one(&self, id: &Uuid, joins: &JoinPlan) -> CatalogResult<Option<T>> {
        let tables = self.db.read()?;
        let Some(row) = tables.get(Self::table()).and_then(|rows| rows.get(id)) else {
            return Ok(None);
        };

        let mut row = row.clone();
        for step in joins.roots() {
            let value = self.db.join(&tables, Self::table(), &row, step, joins)?;
            row.insert(step.relation.clone(), value);
        }
        Self::from_row(row).map(Some)
    }

    async fn find_one_by(&self, field: &str, value: FieldValue) -> CatalogResult<Option<T>> {
        let tables = self.db.read()?;
        let found = tables.get(Self::table()).and_then(|rows| {
            rows.values()
                .find(|row| value.matches_json(row.get(field).unwrap_or(&Value::Null)))
        });
        found.map(|row| Self::from_row(row.clone())).transpose()
    }

    async fn exists(&self, id: &Uuid) -> CatalogResult<bool> {
        let tables = self.db.read()?;
        Ok(tables
            .get(Self::table())
            .is_some_and(|rows| rows.contains_key(id)))
    }

    async fn insert(&self, entity: T) -> CatalogResult<T> {
        let id = entity.id();
        let row = self.to_row(&entity)?;
        let mut tables = self.db.write()?;

        if tables
            .get(Self::table())
            .is_some_and(|rows| rows.contains_key(&id))
        {
            return Err(integrity(format!("duplicate id {} in {}", id, Self::table())));
        }
        self.db.check_row(&tables, Self::table(), &id, &row)?;

        tables
            .entry(Self::table().to_string())
            .or_default()
            .insert(id, row);
        Ok(entity)
    }

    async fn save(&self, entity: T) -> CatalogResult<T> {
        let id = entity.id();
        let row = self.to_row(&entity)?;
        let mut tables = self.db.write()?;

        self.db.check_row(&tables, Self::table(), &id, &row)?;
        tables
            .entry(Self::table().to_string())
            .or_default()
            .insert(id, row);
        Ok(entity)
    }

    async fn update_many(&self, ids: &[Uuid], patch: Value) -> CatalogResult<usize> {
        let Value::Object(patch) = patch else {
            return Err(StorageError::QueryError {
                backend: BACKEND.to_string(),
                message: "update patch must be a JSON object".to_string(),
            }
            .into());
        };

        let mut tables = self.db.write()?;
        let mut updated = Vec::new();
        if let Some(rows) = tables.get(Self::table()) {
            for id in ids {
                let Some(row) = rows.get(id) else {
                    continue;
                };
                let mut row = row.clone();
                for (key, value) in &patch {
                    if key != "id" {
                        row.insert(key.clone(), value.clone());
                    }
                }
                updated.push((*id, row));
            }
        }

        // All rows are checked before any is written
        for (id, row) in &updated {
            self.db.check_row(&tables, Self::table(), id, row)?;
        }
        let count = updated.len();
        if let Some(rows) = tables.get_mut(Self::table()) {
            for (id, row) in updated {
                rows.insert(id, row);
            }
        }
        Ok(count)
    }

    async fn delete(&self, id: &Uuid) -> CatalogResult<()> {
        let mut tables = self.db.write()?;
        self.db
            .check_unreferenced(&tables, Self::table(), std::slice::from_ref(id))?;
        if let Some(rows) = tables.get_mut(Self::table()) {
            rows.shift_remove(id);
        }
        Ok(())
    }

    async fn delete_many(&self, ids: &[Uuid]) -> CatalogResult<usize> {
        let mut tables = self.db.write()?;
        self.db.check_unreferenced(&tables, Self::table(), ids)?;
        let Some(rows) = tables.get_mut(Self::table()) else {
            return Ok(0);
        };
        Ok(ids.iter().filter(|id| rows.shift_remove(*id).is_some()).count())
    }
}

fn integrity(message: String) -> crate::core::error::CatalogError {
    tracing::warn!(backend = BACKEND, %message, "integrity check failed");
    StorageError::IntegrityError { message }.into()
}

fn serialization<T: Entity>(e: serde_json::Error) -> crate::core::error::CatalogError {
    StorageError::SerializationError {
        entity_type: T::entity_type().to_string(),
        message: e.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::relation::{RelationSpec, SubRelationSpec};
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Author {
        id: Uuid,
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        books: Option<Vec<Book>>,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Book {
        id: Uuid,
        title: String,
        author_id: Option<Uuid>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        author: Option<Author>,
    }

    impl Entity for Author {
        fn entity_type() -> &'static str {
            "author"
        }
        fn resource_name() -> &'static str {
            "authors"
        }
        fn id(&self) -> Uuid {
            self.id
        }
    }

    impl Entity for Book {
        fn entity_type() -> &'static str {
            "book"
        }
        fn resource_name() -> &'static str {
            "books"
        }
        fn id(&self) -> Uuid {
            self.id
        }
    }

    fn database() -> MemoryDatabase {
        MemoryDatabase::new(
            DatabaseSchema::new()
                .to_one("book", "author", "author", "authorId")
                .to_many("author", "books", "book", "authorId")
                .unique("author", "name"),
        )
    }

    fn author(name: &str) -> Author {
        Author {
            id: Uuid::new_v4(),
            name: name.to_string(),
            books: None,
        }
    }

    fn book(title: &str, author_id: Option<Uuid>) -> Book {
        Book {
            id: Uuid::new_v4(),
            title: title.to_string(),
            author_id,
            author: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_by_condition() {
        let db = database();
        let books = db.repository::<Book>();
        books.insert(book("Dune", None)).await.unwrap();
        books.insert(book("Emma", None)).await.unwrap();

        let found = books.find(&[Condition::eq("title", "Emma")]).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Emma");
        assert_eq!(books.find(&[]).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_find_one_joins_to_one_relation() {
        let db = database();
        let herbert = db.repository::<Author>().insert(author("Herbert")).await.unwrap();
        let books = db.repository::<Book>();
        let dune = books.insert(book("Dune", Some(herbert.id))).await.unwrap();

        let plain = books.find_one(&dune.id, &JoinPlan::none()).await.unwrap().unwrap();
        assert!(plain.author.is_none());

        let joined = books
            .find_one(&dune.id, &JoinPlan::single("author"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(joined.author.unwrap().name, "Herbert");
    }

    #[tokio::test]
    async fn test_to_many_join_is_ordered_with_subrelation() {
        let db = database();
        let herbert = db.repository::<Author>().insert(author("Herbert")).await.unwrap();
        let books = db.repository::<Book>();
        for title in ["Dune Messiah", "Children of Dune", "Dune"] {
            books.insert(book(title, Some(herbert.id))).await.unwrap();
        }
        books.insert(book("Unrelated", None)).await.unwrap();

        let plan = JoinPlan::from_specs(&[RelationSpec::new("books")
            .order_by("title", SortDirection::Asc)
            .with_subrelation(SubRelationSpec::new("author"))]);
        let joined = db
            .repository::<Author>()
            .find_one(&herbert.id, &plan)
            .await
            .unwrap()
            .unwrap();

        let joined_books = joined.books.unwrap();
        let titles: Vec<&str> = joined_books.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Children of Dune", "Dune", "Dune Messiah"]);
        assert!(joined_books.iter().all(|b| b.author.as_ref().map(|a| a.id) == Some(herbert.id)));
    }

    #[tokio::test]
    async fn test_joined_relations_are_not_persisted() {
        let db = database();
        let herbert = db.repository::<Author>().insert(author("Herbert")).await.unwrap();
        let books = db.repository::<Book>();
        let mut dune = book("Dune", Some(herbert.id));
        dune.author = Some(herbert.clone());
        books.insert(dune.clone()).await.unwrap();

        let stored = books.find_one(&dune.id, &JoinPlan::none()).await.unwrap().unwrap();
        assert!(stored.author.is_none());
    }

    #[tokio::test]
    async fn test_missing_foreign_key_is_rejected() {
        let db = database();
        let err = db
            .repository::<Book>()
            .insert(book("Orphan", Some(Uuid::new_v4())))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "STORAGE_ERROR");
    }

    #[tokio::test]
    async fn test_unique_column_is_enforced() {
        let db = database();
        let authors = db.repository::<Author>();
        authors.insert(author("Austen")).await.unwrap();
        assert!(authors.insert(author("Austen")).await.is_err());
    }

    #[tokio::test]
    async fn test_referenced_row_cannot_be_deleted() {
        let db = database();
        let herbert = db.repository::<Author>().insert(author("Herbert")).await.unwrap();
        let books = db.repository::<Book>();
        let dune = books.insert(book("Dune", Some(herbert.id))).await.unwrap();

        assert!(db.repository::<Author>().delete(&herbert.id).await.is_err());
        books.delete(&dune.id).await.unwrap();
        db.repository::<Author>().delete(&herbert.id).await.unwrap();
        assert!(!db.repository::<Author>().exists(&herbert.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_many_patches_listed_rows_only() {
        let db = database();
        let herbert = db.repository::<Author>().insert(author("Herbert")).await.unwrap();
        let books = db.repository::<Book>();
        let a = books.insert(book("A", None)).await.unwrap();
        let b = books.insert(book("B", None)).await.unwrap();

        let count = books
            .update_many(&[a.id, Uuid::new_v4()], json!({ "authorId": herbert.id }))
            .await
            .unwrap();
        assert_eq!(count, 1);

        let unassigned = books.find(&[Condition::is_null("authorId")]).await.unwrap();
        assert_eq!(unassigned.len(), 1);
        assert_eq!(unassigned[0].id, b.id);
    }

    #[tokio::test]
    async fn test_delete_many_counts_removed_rows() {
        let db = database();
        let books = db.repository::<Book>();
        let a = books.insert(book("A", None)).await.unwrap();
        let b = books.insert(book("B", None)).await.unwrap();

        let removed = books.delete_many(&[a.id, b.id, Uuid::new_v4()]).await.unwrap();
        assert_eq!(removed, 2);
        assert!(books.find(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_one_by_unique_field() {
        let db = database();
        let authors = db.repository::<Author>();
        let austen = authors.insert(author("Austen")).await.unwrap();

        let found = authors.find_one_by("name", "Austen".into()).await.unwrap();
        assert_eq!(found.map(|a| a.id), Some(austen.id));
        assert!(authors.find_one_by("name", "Woolf".into()).await.unwrap().is_none());
    }
}
