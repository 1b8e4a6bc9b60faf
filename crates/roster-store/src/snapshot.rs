use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use roster_types::{construct, serialize, Entity, Fields, ID_FIELD};
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::registry::Registry;

/// On-disk JSON image of one type's registry.
///
/// File format: a single JSON object whose keys are entity ids and whose
/// values are the full field maps (private fields included) of each entity.
#[derive(Clone, Debug)]
pub struct Snapshot {
    path: PathBuf,
    sync: bool,
}

impl Snapshot {
    /// The snapshot file for a declared type under `config`.
    pub fn for_type(config: &StoreConfig, type_name: &str) -> Self {
        Self {
            path: config.snapshot_path(type_name),
            sync: config.sync,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read the raw records, in file order.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    pub fn read_records(&self) -> StoreResult<Option<Vec<(String, Fields)>>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let root: Value =
            serde_json::from_slice(&bytes).map_err(|e| self.malformed(e.to_string()))?;
        let Value::Object(map) = root else {
            return Err(self.malformed("expected a JSON object keyed by id"));
        };

        map.into_iter()
            .map(|(key, value)| match value {
                Value::Object(fields) => Ok((key, fields)),
                _ => Err(self.malformed(format!("record {key} is not an object"))),
            })
            .collect::<StoreResult<Vec<_>>>()
            .map(Some)
    }

    /// Load the registry for `T`. A missing file yields an empty registry.
    ///
    /// Each record is rebuilt through [`construct`], so stored timestamps are
    /// parsed rather than regenerated. A record whose `id` disagrees with its
    /// key, or that fails construction, makes the whole snapshot malformed.
    pub fn load<T: Entity>(&self) -> StoreResult<Registry<T>> {
        let mut registry = Registry::new();
        let Some(records) = self.read_records()? else {
            debug!(path = %self.path.display(), "no snapshot; starting empty");
            return Ok(registry);
        };

        for (key, mut fields) in records {
            match fields.get(ID_FIELD) {
                None => {
                    fields.insert(ID_FIELD.to_string(), Value::String(key.clone()));
                }
                Some(Value::String(id)) if *id == key => {}
                Some(other) => {
                    return Err(self.malformed(format!("record {key} carries id {other}")));
                }
            }
            let entity: T = construct(fields)
                .map_err(|e| self.malformed(format!("record {key}: {e}")))?;
            registry.insert(entity);
        }

        debug!(
            path = %self.path.display(),
            records = registry.len(),
            "snapshot loaded"
        );
        Ok(registry)
    }

    /// Rewrite the file with every entity in `registry`.
    pub fn save<T: Entity>(&self, registry: &Registry<T>) -> StoreResult<()> {
        self.write(registry.iter())
    }

    /// Rewrite the file with exactly `entities`, recorded in id order.
    ///
    /// The JSON is written to a temporary file in the same directory and then
    /// renamed over the target, so a failed write never leaves a truncated
    /// snapshot behind.
    pub fn write<'a, T: Entity>(&self, entities: impl IntoIterator<Item = &'a T>) -> StoreResult<()> {
        let mut entities: Vec<&T> = entities.into_iter().collect();
        entities.sort_by(|a, b| a.id().cmp(b.id()));

        let mut root = Fields::new();
        for entity in &entities {
            root.insert(entity.id().to_string(), Value::Object(serialize(*entity, true)));
        }
        self.write_atomic(&Value::Object(root))
            .map_err(|source| StoreError::Persistence {
                path: self.path.clone(),
                source,
            })?;

        debug!(
            path = %self.path.display(),
            records = entities.len(),
            "snapshot written"
        );
        Ok(())
    }

    fn write_atomic(&self, root: &Value) -> io::Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer(&mut writer, root)?;
            writer.flush()?;
        }
        if self.sync {
            tmp.as_file().sync_all()?;
        }
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    fn malformed(&self, reason: impl Into<String>) -> StoreError {
        StoreError::MalformedSnapshot {
            path: self.path.clone(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::{json, Number};

    use super::*;
    use crate::testing::{contact, Contact};

    fn json_leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            any::<u64>().prop_map(|n| json!(n)),
            Just(json!(u64::MAX)),
            Just(json!(i64::MIN)),
            any::<f64>().prop_filter_map("finite", |f| Number::from_f64(f).map(Value::Number)),
            ".{0,12}".prop_map(Value::String),
        ]
    }

    fn json_value() -> impl Strategy<Value = Value> {
        json_leaf().prop_recursive(3, 32, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::btree_map("[a-z_]{1,6}", inner, 0..6)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    fn same_bits(a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Number(x), Value::Number(y)) if x.is_f64() || y.is_f64() => {
                x.is_f64() && y.is_f64() && x.as_f64().map(f64::to_bits) == y.as_f64().map(f64::to_bits)
            }
            (Value::Array(xs), Value::Array(ys)) => {
                xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| same_bits(x, y))
            }
            (Value::Object(xs), Value::Object(ys)) => {
                xs.len() == ys.len()
                    && xs.iter().all(|(k, x)| ys.get(k).is_some_and(|y| same_bits(x, y)))
            }
            _ => a == b,
        }
    }

    proptest! {
        #[test]
        fn arbitrary_values_survive_the_file(values in prop::collection::vec(json_value(), 1..8)) {
            let dir = tempfile::tempdir().unwrap();
            let snap = snapshot_in(dir.path());
            let mut reg = Registry::new();
            let mut saved = Vec::new();
            for (i, value) in values.into_iter().enumerate() {
                let mut c = contact(&format!("{i}@b.com"), None);
                c.extra = value;
                saved.push(c.clone());
                reg.insert(c);
            }
            snap.save(&reg).unwrap();

            let loaded = snap.load::<Contact>().unwrap();
            prop_assert_eq!(loaded.len(), saved.len());
            for c in &saved {
                let back = loaded.get(c.id()).unwrap();
                prop_assert!(same_bits(&back.extra, &c.extra), "{} became {}", c.extra, back.extra);
                prop_assert_eq!(&back.meta, &c.meta);
            }
        }

        #[test]
        fn finite_floats_keep_their_bits(f in any::<f64>().prop_filter("finite", |f| f.is_finite())) {
            let dir = tempfile::tempdir().unwrap();
            let snap = snapshot_in(dir.path());
            let mut c = contact("a@b.com", None);
            c.extra = json!(f);
            let mut reg = Registry::new();
            reg.insert(c.clone());
            snap.save(&reg).unwrap();

            let back = snap.load::<Contact>().unwrap();
            let got = back.get(c.id()).unwrap().extra.as_f64().unwrap();
            prop_assert_eq!(got.to_bits(), f.to_bits(), "{} became {}", f, got);
        }
    }

    #[test]
    fn floats_near_ulp_boundaries_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let snap = snapshot_in(dir.path());
        let values = [
            1.079907802215119e-66,
            1.862392953319225e-60,
            1.1362275116276523e-8,
            f64::MIN_POSITIVE,
            f64::MAX,
            -0.1,
        ];
        let mut reg = Registry::new();
        let mut ids = Vec::new();
        for (i, f) in values.iter().enumerate() {
            let mut c = contact(&format!("{i}@b.com"), None);
            c.extra = json!(f);
            ids.push((c.id().clone(), *f));
            reg.insert(c);
        }
        snap.save(&reg).unwrap();

        let loaded = snap.load::<Contact>().unwrap();
        for (id, f) in ids {
            let got = loaded.get(&id).unwrap().extra.as_f64().unwrap();
            assert_eq!(got.to_bits(), f.to_bits(), "{f} became {got}");
        }
    }

    #[test]
    fn write_records_in_id_order() {
        let dir = tempfile::tempdir().unwrap();
        let snap = snapshot_in(dir.path());
        let a: Contact = construct(fields_of(json!({ "id": "a", "email": "a@b.com" }))).unwrap();
        let b: Contact = construct(fields_of(json!({ "id": "b", "email": "b@b.com" }))).unwrap();
        snap.write([&b, &a]).unwrap();

        let raw: Value = serde_json::from_slice(&fs::read(snap.path()).unwrap()).unwrap();
        let keys: Vec<_> = raw.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["a", "b"]);
    }

    fn fields_of(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn snapshot_in(dir: &Path) -> Snapshot {
        Snapshot::for_type(&StoreConfig::new(dir), "Contact")
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let snap = snapshot_in(dir.path());
        assert!(!snap.exists());
        assert!(snap.read_records().unwrap().is_none());
        assert!(snap.load::<Contact>().unwrap().is_empty());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let snap = snapshot_in(dir.path());

        let mut c = contact("a@b.com", Some("Ada"));
        c.extra = json!({ "score": 3, "ratio": 1.5, "tags": ["x", null, true] });
        c.token = Some("opaque".into());
        let mut reg = Registry::new();
        reg.insert(c.clone());
        reg.insert(contact("b@b.com", None));
        snap.save(&reg).unwrap();

        let loaded = snap.load::<Contact>().unwrap();
        assert_eq!(loaded.len(), 2);
        let back = loaded.get(c.id()).unwrap();
        assert_eq!(back.meta, c.meta);
        assert_eq!(back.email, c.email);
        assert_eq!(back.name, c.name);
        assert_eq!(back.extra, c.extra);
        assert_eq!(back.token.as_deref(), Some("opaque"));
    }

    #[test]
    fn file_is_keyed_by_id_with_private_fields() {
        let dir = tempfile::tempdir().unwrap();
        let snap = snapshot_in(dir.path());
        let mut c = contact("a@b.com", None);
        c.token = Some("t".into());
        let mut reg = Registry::new();
        reg.insert(c.clone());
        snap.save(&reg).unwrap();

        let raw: Value = serde_json::from_slice(&fs::read(snap.path()).unwrap()).unwrap();
        let record = &raw[c.id().as_str()];
        assert_eq!(record["id"], json!(c.id().as_str()));
        assert_eq!(record["email"], json!("a@b.com"));
        assert_eq!(record["_token"], json!("t"));
        assert_eq!(record["created_at"], json!(c.meta.created_at.to_string()));
    }

    #[test]
    fn save_replaces_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let snap = snapshot_in(dir.path());
        let mut reg = Registry::new();
        let c = contact("a@b.com", None);
        reg.insert(c.clone());
        snap.save(&reg).unwrap();
        reg.remove(c.id());
        snap.save(&reg).unwrap();

        assert_eq!(fs::read_to_string(snap.path()).unwrap(), "{}");
        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1, "temporary file left behind");
    }

    #[test]
    fn save_creates_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let snap = snapshot_in(&nested);
        snap.save(&Registry::<Contact>::new()).unwrap();
        assert!(snap.exists());
    }

    #[test]
    fn invalid_json_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let snap = snapshot_in(dir.path());
        fs::write(snap.path(), "{ not json").unwrap();
        assert!(matches!(
            snap.load::<Contact>(),
            Err(StoreError::MalformedSnapshot { .. })
        ));
    }

    #[test]
    fn wrong_shape_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let snap = snapshot_in(dir.path());
        for body in ["[]", "42", "{\"x\": 1}", ""] {
            fs::write(snap.path(), body).unwrap();
            assert!(
                matches!(snap.load::<Contact>(), Err(StoreError::MalformedSnapshot { .. })),
                "accepted {body:?}"
            );
        }
    }

    #[test]
    fn mismatched_id_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let snap = snapshot_in(dir.path());
        fs::write(snap.path(), r#"{"k1": {"id": "k2", "email": "a@b.com"}}"#).unwrap();
        assert!(matches!(
            snap.load::<Contact>(),
            Err(StoreError::MalformedSnapshot { .. })
        ));
    }

    #[test]
    fn bad_timestamp_in_record_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let snap = snapshot_in(dir.path());
        fs::write(
            snap.path(),
            r#"{"k1": {"id": "k1", "email": "a@b.com", "created_at": "yesterday"}}"#,
        )
        .unwrap();
        match snap.load::<Contact>() {
            Err(StoreError::MalformedSnapshot { reason, .. }) => {
                assert!(reason.contains("created_at"), "{reason}");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn record_without_id_takes_its_key() {
        let dir = tempfile::tempdir().unwrap();
        let snap = snapshot_in(dir.path());
        fs::write(
            snap.path(),
            r#"{"k1": {"email": "a@b.com", "created_at": "2017-09-28T21:05:54", "updated_at": "2017-09-28T21:05:54"}}"#,
        )
        .unwrap();
        let reg = snap.load::<Contact>().unwrap();
        let c = reg.get("k1").unwrap();
        assert_eq!(c.meta.created_at.to_string(), "2017-09-28T21:05:54");
    }
}
