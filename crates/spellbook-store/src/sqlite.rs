//! SQLite-backed catalog and variant store.
//!
//! The catalog lives in `card`, `feature` and `combo` tables plus one link
//! table per relation. A variant row is keyed by its unique id; its cards
//! are kept with their display position, its combos and features in link
//! tables that cascade on delete.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use spellbook_core::{
    CardId, Catalog, CatalogBuilder, Combo, ComboId, FeatureId, UniqueId, Variant, VariantStatus,
};
use tracing::{debug, info, warn};

use crate::{StoreError, VariantFilter, VariantStore, VariantTransaction};

const SCHEMA: &str = "
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS card (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS feature (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL
    );

    -- Cards granting a feature on their own
    CREATE TABLE IF NOT EXISTS feature_card (
        feature_id INTEGER NOT NULL REFERENCES feature(id) ON DELETE CASCADE,
        card_id INTEGER NOT NULL REFERENCES card(id) ON DELETE CASCADE,
        PRIMARY KEY (feature_id, card_id)
    );

    CREATE TABLE IF NOT EXISTS combo (
        id INTEGER PRIMARY KEY,
        prerequisites TEXT NOT NULL DEFAULT '',
        description TEXT NOT NULL DEFAULT '',
        generator INTEGER NOT NULL DEFAULT 0
    );

    CREATE TABLE IF NOT EXISTS combo_include (
        combo_id INTEGER NOT NULL REFERENCES combo(id) ON DELETE CASCADE,
        card_id INTEGER NOT NULL REFERENCES card(id) ON DELETE CASCADE,
        PRIMARY KEY (combo_id, card_id)
    );

    CREATE TABLE IF NOT EXISTS combo_need (
        combo_id INTEGER NOT NULL REFERENCES combo(id) ON DELETE CASCADE,
        feature_id INTEGER NOT NULL REFERENCES feature(id) ON DELETE CASCADE,
        PRIMARY KEY (combo_id, feature_id)
    );

    CREATE TABLE IF NOT EXISTS combo_produce (
        combo_id INTEGER NOT NULL REFERENCES combo(id) ON DELETE CASCADE,
        feature_id INTEGER NOT NULL REFERENCES feature(id) ON DELETE CASCADE,
        PRIMARY KEY (combo_id, feature_id)
    );

    CREATE TABLE IF NOT EXISTS combo_remove (
        combo_id INTEGER NOT NULL REFERENCES combo(id) ON DELETE CASCADE,
        feature_id INTEGER NOT NULL REFERENCES feature(id) ON DELETE CASCADE,
        PRIMARY KEY (combo_id, feature_id)
    );

    CREATE TABLE IF NOT EXISTS variant (
        unique_id TEXT PRIMARY KEY,
        prerequisites TEXT NOT NULL DEFAULT '',
        description TEXT NOT NULL DEFAULT '',
        status TEXT NOT NULL,
        created INTEGER NOT NULL,
        updated INTEGER NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_variant_status ON variant(status);

    CREATE TABLE IF NOT EXISTS variant_include (
        unique_id TEXT NOT NULL REFERENCES variant(unique_id) ON DELETE CASCADE,
        card_id INTEGER NOT NULL,
        position INTEGER NOT NULL,
        PRIMARY KEY (unique_id, card_id)
    );

    CREATE TABLE IF NOT EXISTS variant_of (
        unique_id TEXT NOT NULL REFERENCES variant(unique_id) ON DELETE CASCADE,
        combo_id INTEGER NOT NULL,
        PRIMARY KEY (unique_id, combo_id)
    );

    CREATE TABLE IF NOT EXISTS variant_produce (
        unique_id TEXT NOT NULL REFERENCES variant(unique_id) ON DELETE CASCADE,
        feature_id INTEGER NOT NULL,
        PRIMARY KEY (unique_id, feature_id)
    );
";

/// SQLite-backed store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(SCHEMA)?;
        debug!(event = "schema_initialized");
        Ok(())
    }

    pub fn insert_card(&self, id: i64, name: &str) -> Result<(), StoreError> {
        CatalogWriter { conn: &self.conn }.card(id, name)
    }

    /// Inserts a feature with the cards granting it directly.
    pub fn insert_feature(&self, id: i64, name: &str, cards: &[i64]) -> Result<(), StoreError> {
        CatalogWriter { conn: &self.conn }.feature(id, name, cards)
    }

    /// Inserts a combo with its relations. Cards and features it refers to
    /// must already exist.
    pub fn insert_combo(&self, combo: &Combo) -> Result<(), StoreError> {
        CatalogWriter { conn: &self.conn }.combo(combo)
    }

    /// Inserts every card, feature and combo of `catalog` in one
    /// transaction.
    pub fn insert_catalog(&mut self, catalog: &Catalog) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        {
            let writer = CatalogWriter { conn: &*tx };
            for card in catalog.cards() {
                writer.card(card.id.get(), &card.name)?;
            }
            for feature in catalog.features() {
                let cards: Vec<i64> = feature.cards.iter().map(|c| c.get()).collect();
                writer.feature(feature.id.get(), &feature.name, &cards)?;
            }
            for combo in catalog.combos() {
                writer.combo(combo)?;
            }
        }
        tx.commit()?;
        info!(
            event = "catalog_inserted",
            cards = catalog.card_count(),
            features = catalog.feature_count(),
            combos = catalog.combo_count(),
        );
        Ok(())
    }

    /// Sets the status of a variant outside any generation pass.
    pub fn set_status(&self, id: &UniqueId, status: VariantStatus) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE variant SET status = ?1 WHERE unique_id = ?2",
            params![status.as_str(), id.as_str()],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }

    pub fn variant_count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM variant", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn variant(&self, id: &UniqueId) -> Result<Option<Variant>, StoreError> {
        read_variant(&self.conn, id)
    }

    /// Variants matching `filter`, in its listing order.
    pub fn list_variants(&self, filter: &VariantFilter) -> Result<Vec<Variant>, StoreError> {
        list_variants(&self.conn, filter)
    }
}

impl VariantStore for SqliteStore {
    fn atomic<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut dyn VariantTransaction) -> Result<T, E>,
    {
        let tx = self.conn.transaction().map_err(StoreError::from)?;
        let result = {
            let mut unit = SqliteTransaction { conn: &*tx };
            f(&mut unit)
        };
        match result {
            Ok(value) => {
                tx.commit().map_err(StoreError::from)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback) = tx.rollback() {
                    warn!(event = "rollback_failed", error = %rollback);
                }
                Err(err)
            }
        }
    }
}

struct SqliteTransaction<'a> {
    conn: &'a Connection,
}

impl SqliteTransaction<'_> {
    fn insert_links(&self, variant: &Variant) -> Result<(), StoreError> {
        let id = variant.unique_id.as_str();
        let mut of = self
            .conn
            .prepare_cached("INSERT INTO variant_of (unique_id, combo_id) VALUES (?1, ?2)")?;
        for combo in &variant.of {
            of.execute(params![id, combo.get()])?;
        }
        let mut produces = self.conn.prepare_cached(
            "INSERT INTO variant_produce (unique_id, feature_id) VALUES (?1, ?2)",
        )?;
        for feature in &variant.produces {
            produces.execute(params![id, feature.get()])?;
        }
        Ok(())
    }
}

/// Catalog inserts sharing one connection or transaction.
struct CatalogWriter<'a> {
    conn: &'a Connection,
}

impl CatalogWriter<'_> {
    fn card(&self, id: i64, name: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO card (id, name) VALUES (?1, ?2)",
            params![id, name],
        )?;
        Ok(())
    }

    fn feature(&self, id: i64, name: &str, cards: &[i64]) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO feature (id, name) VALUES (?1, ?2)",
            params![id, name],
        )?;
        let mut stmt = self
            .conn
            .prepare_cached("INSERT INTO feature_card (feature_id, card_id) VALUES (?1, ?2)")?;
        for &card in cards {
            stmt.execute(params![id, card])?;
        }
        Ok(())
    }

    fn combo(&self, combo: &Combo) -> Result<(), StoreError> {
        let id = combo.id.get();
        self.conn.execute(
            "INSERT INTO combo (id, prerequisites, description, generator)
             VALUES (?1, ?2, ?3, ?4)",
            params![id, combo.prerequisites, combo.description, combo.generator],
        )?;
        let links: [(&str, Vec<i64>); 4] = [
            (
                "INSERT INTO combo_include (combo_id, card_id) VALUES (?1, ?2)",
                combo.includes.iter().map(|c| c.get()).collect(),
            ),
            (
                "INSERT INTO combo_need (combo_id, feature_id) VALUES (?1, ?2)",
                combo.needs.iter().map(|f| f.get()).collect(),
            ),
            (
                "INSERT INTO combo_produce (combo_id, feature_id) VALUES (?1, ?2)",
                combo.produces.iter().map(|f| f.get()).collect(),
            ),
            (
                "INSERT INTO combo_remove (combo_id, feature_id) VALUES (?1, ?2)",
                combo.removes.iter().map(|f| f.get()).collect(),
            ),
        ];
        for (sql, targets) in links {
            let mut stmt = self.conn.prepare_cached(sql)?;
            for target in targets {
                stmt.execute(params![id, target])?;
            }
        }
        Ok(())
    }
}

impl VariantTransaction for SqliteTransaction<'_> {
    fn load_catalog(&mut self) -> Result<Catalog, StoreError> {
        let conn = self.conn;
        let mut builder = CatalogBuilder::new();

        let mut stmt = conn.prepare("SELECT id, name FROM card ORDER BY id")?;
        let cards = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        for (id, name) in cards {
            builder = builder.card(id, &name);
        }

        let mut feature_cards = grouped(conn, "SELECT feature_id, card_id FROM feature_card")?;
        let mut stmt = conn.prepare("SELECT id, name FROM feature ORDER BY id")?;
        let features = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        for (id, name) in features {
            let cards = feature_cards.remove(&id).unwrap_or_default();
            builder = builder.feature(id, &name, cards);
        }

        let mut includes = grouped(conn, "SELECT combo_id, card_id FROM combo_include")?;
        let mut needs = grouped(conn, "SELECT combo_id, feature_id FROM combo_need")?;
        let mut produces = grouped(conn, "SELECT combo_id, feature_id FROM combo_produce")?;
        let mut removes = grouped(conn, "SELECT combo_id, feature_id FROM combo_remove")?;
        let mut stmt = conn.prepare(
            "SELECT id, prerequisites, description, generator FROM combo ORDER BY id",
        )?;
        let combos = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, bool>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        for (id, prerequisites, description, generator) in combos {
            let combo = Combo::new(id)
                .includes(includes.remove(&id).unwrap_or_default())
                .needs(needs.remove(&id).unwrap_or_default())
                .produces(produces.remove(&id).unwrap_or_default())
                .removes(removes.remove(&id).unwrap_or_default())
                .with_text(&prerequisites, &description)
                .with_generator(generator);
            builder = builder.combo(combo);
        }

        let catalog = builder
            .build()
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        debug!(
            event = "catalog_loaded",
            cards = catalog.card_count(),
            features = catalog.feature_count(),
            combos = catalog.combo_count(),
        );
        Ok(catalog)
    }

    fn variant_ids(&mut self) -> Result<BTreeSet<UniqueId>, StoreError> {
        let mut stmt = self.conn.prepare("SELECT unique_id FROM variant")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .map(|id| id.map(UniqueId::from_hex))
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(ids)
    }

    fn variant_ids_with_status(
        &mut self,
        status: VariantStatus,
    ) -> Result<BTreeSet<UniqueId>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT unique_id FROM variant WHERE status = ?1")?;
        let ids = stmt
            .query_map([status.as_str()], |row| row.get::<_, String>(0))?
            .map(|id| id.map(UniqueId::from_hex))
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(ids)
    }

    fn card_sets_with_status(
        &mut self,
        status: VariantStatus,
    ) -> Result<Vec<Vec<CardId>>, StoreError> {
        let ids = self.variant_ids_with_status(status)?;
        ids.iter()
            .map(|id| variant_cards(self.conn, id))
            .collect()
    }

    fn get_variant(&mut self, id: &UniqueId) -> Result<Option<Variant>, StoreError> {
        read_variant(self.conn, id)
    }

    fn list_variants(&mut self, filter: &VariantFilter) -> Result<Vec<Variant>, StoreError> {
        list_variants(self.conn, filter)
    }

    fn create_variant(&mut self, variant: &Variant) -> Result<(), StoreError> {
        if read_variant_row(self.conn, &variant.unique_id)?.is_some() {
            return Err(StoreError::Duplicate(variant.unique_id.clone()));
        }
        let id = variant.unique_id.as_str();
        self.conn.execute(
            "INSERT INTO variant (unique_id, prerequisites, description, status, created, updated)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                id,
                variant.prerequisites,
                variant.description,
                variant.status.as_str(),
                variant.created,
                variant.updated,
            ],
        )?;
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO variant_include (unique_id, card_id, position) VALUES (?1, ?2, ?3)",
        )?;
        for (position, card) in variant.includes.iter().enumerate() {
            stmt.execute(params![id, card.get(), position as i64])?;
        }
        self.insert_links(variant)
    }

    fn update_variant(&mut self, variant: &Variant) -> Result<(), StoreError> {
        let id = variant.unique_id.as_str();
        let changed = self.conn.execute(
            "UPDATE variant
             SET prerequisites = ?2, description = ?3, status = ?4, updated = ?5
             WHERE unique_id = ?1",
            params![
                id,
                variant.prerequisites,
                variant.description,
                variant.status.as_str(),
                variant.updated,
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(variant.unique_id.clone()));
        }
        self.conn
            .execute("DELETE FROM variant_of WHERE unique_id = ?1", [id])?;
        self.conn
            .execute("DELETE FROM variant_produce WHERE unique_id = ?1", [id])?;
        self.insert_links(variant)
    }

    fn delete_variants(&mut self, ids: &BTreeSet<UniqueId>) -> Result<usize, StoreError> {
        let mut stmt = self
            .conn
            .prepare_cached("DELETE FROM variant WHERE unique_id = ?1")?;
        let mut deleted = 0;
        for id in ids {
            deleted += stmt.execute([id.as_str()])?;
        }
        Ok(deleted)
    }
}

type VariantRow = (String, String, String, i64, i64);

fn read_variant_row(conn: &Connection, id: &UniqueId) -> Result<Option<VariantRow>, StoreError> {
    let row = conn
        .query_row(
            "SELECT prerequisites, description, status, created, updated
             FROM variant WHERE unique_id = ?1",
            [id.as_str()],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
        )
        .optional()?;
    Ok(row)
}

fn read_variant(conn: &Connection, id: &UniqueId) -> Result<Option<Variant>, StoreError> {
    let Some((prerequisites, description, status, created, updated)) = read_variant_row(conn, id)?
    else {
        return Ok(None);
    };
    let status = status
        .parse::<VariantStatus>()
        .map_err(|e| StoreError::Corrupt(e.to_string()))?;
    let of = linked_ids(
        conn,
        "SELECT combo_id FROM variant_of WHERE unique_id = ?1",
        id,
    )?;
    let produces = linked_ids(
        conn,
        "SELECT feature_id FROM variant_produce WHERE unique_id = ?1",
        id,
    )?;
    Ok(Some(Variant {
        unique_id: id.clone(),
        includes: variant_cards(conn, id)?,
        of: of.into_iter().map(ComboId).collect(),
        produces: produces.into_iter().map(FeatureId).collect(),
        prerequisites,
        description,
        status,
        created,
        updated,
    }))
}

fn list_variants(conn: &Connection, filter: &VariantFilter) -> Result<Vec<Variant>, StoreError> {
    let mut sql = String::from("SELECT v.unique_id FROM variant v WHERE 1 = 1");
    let mut args: Vec<Value> = Vec::new();
    if let Some(status) = filter.status {
        args.push(Value::Text(status.as_str().to_string()));
        sql.push_str(&format!(" AND v.status = ?{}", args.len()));
    }
    let links = [
        ("variant_include", "card_id", filter.card.map(|c| c.get())),
        ("variant_produce", "feature_id", filter.feature.map(|f| f.get())),
        ("variant_of", "combo_id", filter.combo.map(|b| b.get())),
    ];
    for (table, column, id) in links {
        let Some(id) = id else {
            continue;
        };
        args.push(Value::Integer(id));
        sql.push_str(&format!(
            " AND EXISTS (SELECT 1 FROM {table} l WHERE l.unique_id = v.unique_id AND l.{column} = ?{})",
            args.len()
        ));
    }
    sql.push(' ');
    sql.push_str(filter.order_clause());

    let mut stmt = conn.prepare(&sql)?;
    let ids = stmt
        .query_map(params_from_iter(args), |row| row.get::<_, String>(0))?
        .map(|id| id.map(UniqueId::from_hex))
        .collect::<Result<Vec<_>, _>>()?;

    let mut variants = Vec::with_capacity(ids.len());
    for id in &ids {
        let variant = read_variant(conn, id)?
            .ok_or_else(|| StoreError::Corrupt(format!("variant {id} vanished while listing")))?;
        variants.push(variant);
    }
    debug!(event = "variants_listed", variants = variants.len());
    Ok(variants)
}

/// Cards of a variant in display order.
fn variant_cards(conn: &Connection, id: &UniqueId) -> Result<Vec<CardId>, StoreError> {
    let ids = linked_ids(
        conn,
        "SELECT card_id FROM variant_include WHERE unique_id = ?1 ORDER BY position",
        id,
    )?;
    Ok(ids.into_iter().map(CardId).collect())
}

fn linked_ids(conn: &Connection, sql: &str, id: &UniqueId) -> Result<Vec<i64>, StoreError> {
    let mut stmt = conn.prepare_cached(sql)?;
    let ids = stmt
        .query_map([id.as_str()], |row| row.get::<_, i64>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ids)
}

/// Rows of a two-column link table, grouped by the first column.
fn grouped(conn: &Connection, sql: &str) -> Result<HashMap<i64, Vec<i64>>, StoreError> {
    let mut stmt = conn.prepare(sql)?;
    let mut groups: HashMap<i64, Vec<i64>> = HashMap::new();
    let rows = stmt.query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))?;
    for row in rows {
        let (key, value) = row?;
        groups.entry(key).or_default().push(value);
    }
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VariantOrder;
    use spellbook_core::unique_id_from_card_ids;
    use spellbook_test::scenarios::{self, card_ids, combo_ids, feature_ids};

    fn variant(cards: &[i64], status: VariantStatus) -> Variant {
        let includes = card_ids(cards);
        Variant {
            unique_id: unique_id_from_card_ids(&includes),
            includes,
            of: combo_ids(&[100]),
            produces: feature_ids(&[10]),
            prerequisites: "pre".to_string(),
            description: "desc".to_string(),
            status,
            created: 1_700_000_000,
            updated: 1_700_000_000,
        }
    }

    fn store_with(catalog: &Catalog) -> SqliteStore {
        let mut store = SqliteStore::in_memory().expect("store");
        store.insert_catalog(catalog).expect("catalog");
        store
    }

    #[test]
    fn test_catalog_round_trip() {
        for catalog in [
            scenarios::chained_combo(),
            scenarios::single_requirement_combo(),
            scenarios::alternative_routes(),
            scenarios::removing_combo(),
        ] {
            let mut store = store_with(&catalog);
            let loaded = store
                .atomic::<_, StoreError, _>(|tx| tx.load_catalog())
                .expect("load");
            assert_eq!(
                loaded.cards().collect::<Vec<_>>(),
                catalog.cards().collect::<Vec<_>>()
            );
            assert_eq!(
                loaded.features().collect::<Vec<_>>(),
                catalog.features().collect::<Vec<_>>()
            );
            assert_eq!(
                loaded.combos().collect::<Vec<_>>(),
                catalog.combos().collect::<Vec<_>>()
            );
        }
    }

    #[test]
    fn test_stored_generator_flag_wins() {
        let mut store = SqliteStore::in_memory().expect("store");
        store.insert_card(1, "One").expect("card");
        store.insert_card(2, "Two").expect("card");
        store
            .insert_combo(&Combo::new(5).includes([1, 2]).with_generator(false))
            .expect("combo");
        let catalog = store
            .atomic::<_, StoreError, _>(|tx| tx.load_catalog())
            .expect("load");
        assert_eq!(catalog.generators().count(), 0);
    }

    #[test]
    fn test_variant_crud() {
        let mut store = store_with(&scenarios::two_card_combo());
        let v = variant(&[2, 1], VariantStatus::New);

        store
            .atomic::<_, StoreError, _>(|tx| tx.create_variant(&v))
            .expect("create");
        assert_eq!(store.variant(&v.unique_id).expect("read"), Some(v.clone()));

        let mut changed = v.clone();
        changed.includes = card_ids(&[1, 2]);
        changed.of = combo_ids(&[100, 200]);
        changed.produces = feature_ids(&[]);
        changed.status = VariantStatus::Ok;
        changed.created = 0;
        changed.updated = 1_800_000_000;
        store
            .atomic::<_, StoreError, _>(|tx| tx.update_variant(&changed))
            .expect("update");

        let stored = store.variant(&v.unique_id).expect("read").expect("exists");
        // cards and creation time are kept
        assert_eq!(stored.includes, card_ids(&[2, 1]));
        assert_eq!(stored.created, 1_700_000_000);
        assert_eq!(stored.of, combo_ids(&[100, 200]));
        assert!(stored.produces.is_empty());
        assert_eq!(stored.status, VariantStatus::Ok);
        assert_eq!(stored.updated, 1_800_000_000);
    }

    #[test]
    fn test_duplicate_and_missing() {
        let mut store = store_with(&scenarios::two_card_combo());
        let v = variant(&[1, 2], VariantStatus::New);
        store
            .atomic::<_, StoreError, _>(|tx| tx.create_variant(&v))
            .expect("create");

        let err = store
            .atomic::<_, StoreError, _>(|tx| tx.create_variant(&v))
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));

        let other = variant(&[1], VariantStatus::New);
        let err = store
            .atomic::<_, StoreError, _>(|tx| tx.update_variant(&other))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert!(matches!(
            store.set_status(&other.unique_id, VariantStatus::Ok),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_status_queries() {
        let mut store = store_with(&scenarios::two_card_combo());
        let broken = variant(&[1, 2], VariantStatus::NotWorking);
        let fresh = variant(&[1], VariantStatus::New);
        store
            .atomic::<_, StoreError, _>(|tx| {
                tx.create_variant(&broken)?;
                tx.create_variant(&fresh)
            })
            .expect("create");

        let (ids, broken_ids, sets) = store
            .atomic::<_, StoreError, _>(|tx| {
                Ok((
                    tx.variant_ids()?,
                    tx.variant_ids_with_status(VariantStatus::NotWorking)?,
                    tx.card_sets_with_status(VariantStatus::NotWorking)?,
                ))
            })
            .expect("query");
        assert_eq!(ids.len(), 2);
        assert_eq!(broken_ids.into_iter().collect::<Vec<_>>(), vec![broken.unique_id.clone()]);
        assert_eq!(sets, vec![card_ids(&[1, 2])]);
    }

    fn listed(store: &SqliteStore, filter: &VariantFilter) -> Vec<UniqueId> {
        store
            .list_variants(filter)
            .expect("list")
            .into_iter()
            .map(|v| v.unique_id)
            .collect()
    }

    #[test]
    fn test_list_variants_filters_and_orders() {
        let mut store = store_with(&scenarios::two_card_combo());
        let mut pair = variant(&[1, 2], VariantStatus::Ok);
        pair.created = 300;
        let mut single = variant(&[1], VariantStatus::Ok);
        single.of = combo_ids(&[200]);
        single.produces = feature_ids(&[20]);
        single.created = 200;
        let fresh = variant(&[2], VariantStatus::New);
        store
            .atomic::<_, StoreError, _>(|tx| {
                tx.create_variant(&pair)?;
                tx.create_variant(&single)?;
                tx.create_variant(&fresh)
            })
            .expect("create");

        let oldest_first = VariantFilter::published().ordered_by(VariantOrder::Created, false);
        let published = store.list_variants(&oldest_first).expect("list");
        assert_eq!(published, vec![single.clone(), pair.clone()]);

        let mut with_card_2 = vec![pair.unique_id.clone(), fresh.unique_id.clone()];
        with_card_2.sort();
        let filter = VariantFilter::all().with_card(CardId(2));
        assert_eq!(listed(&store, &filter), with_card_2);
        with_card_2.reverse();
        let filter = filter.ordered_by(VariantOrder::UniqueId, true);
        assert_eq!(listed(&store, &filter), with_card_2);

        let filter = VariantFilter::all().with_feature(FeatureId(20));
        assert_eq!(listed(&store, &filter), vec![single.unique_id.clone()]);

        let filter = VariantFilter::published()
            .with_card(CardId(1))
            .with_combo(ComboId(100));
        assert_eq!(listed(&store, &filter), vec![pair.unique_id.clone()]);

        let filter = VariantFilter::all().with_status(VariantStatus::Restore);
        assert!(listed(&store, &filter).is_empty());
    }

    #[test]
    fn test_list_variants_matches_memory_store() {
        let catalog = scenarios::chained_combo();
        let mut sqlite = store_with(&catalog);
        let mut memory = crate::MemoryStore::new(catalog);
        let variants = [
            variant(&[1, 2], VariantStatus::Ok),
            variant(&[1, 2, 3], VariantStatus::NotWorking),
            variant(&[3], VariantStatus::Ok),
        ];
        create_all(&mut sqlite, &variants);
        create_all(&mut memory, &variants);

        for filter in [
            VariantFilter::all(),
            VariantFilter::published(),
            VariantFilter::all().with_card(CardId(3)),
            VariantFilter::all().ordered_by(VariantOrder::Updated, true),
        ] {
            assert_eq!(
                sqlite.list_variants(&filter).expect("list"),
                memory.list_variants(&filter),
                "{filter:?}"
            );
        }
    }

    fn create_all<S: VariantStore>(store: &mut S, variants: &[Variant]) {
        store
            .atomic::<_, StoreError, _>(|tx| variants.iter().try_for_each(|v| tx.create_variant(v)))
            .expect("create");
    }

    #[test]
    fn test_delete_cascades() {
        let mut store = store_with(&scenarios::two_card_combo());
        let v = variant(&[1, 2], VariantStatus::New);
        let deleted = store
            .atomic::<_, StoreError, _>(|tx| {
                tx.create_variant(&v)?;
                let ids: BTreeSet<UniqueId> = [v.unique_id.clone()].into_iter().collect();
                tx.delete_variants(&ids)
            })
            .expect("delete");
        assert_eq!(deleted, 1);
        assert_eq!(store.variant_count().expect("count"), 0);

        let links: i64 = store
            .conn
            .query_row("SELECT COUNT(*) FROM variant_include", [], |row| row.get(0))
            .expect("count");
        assert_eq!(links, 0);
    }

    #[test]
    fn test_error_rolls_back() {
        let mut store = store_with(&scenarios::two_card_combo());
        let v = variant(&[1, 2], VariantStatus::New);
        let result = store.atomic::<(), StoreError, _>(|tx| {
            tx.create_variant(&v)?;
            Err(StoreError::Corrupt("abort".to_string()))
        });
        assert!(result.is_err());
        assert_eq!(store.variant_count().expect("count"), 0);
    }

    #[test]
    fn test_open_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("spellbook.db");
        {
            let mut store = SqliteStore::open(&path).expect("open");
            store
                .insert_catalog(&scenarios::two_card_combo())
                .expect("catalog");
        }
        let mut store = SqliteStore::open(&path).expect("reopen");
        let catalog = store
            .atomic::<_, StoreError, _>(|tx| tx.load_catalog())
            .expect("load");
        assert_eq!(catalog.card_count(), 2);
    }
}
