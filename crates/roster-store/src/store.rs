use std::borrow::Borrow;
use std::iter;
use std::path::Path;

use roster_types::{construct, Entity, EntityId, Fields};
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::error::StoreResult;
use crate::filter::Filter;
use crate::registry::Registry;
use crate::snapshot::Snapshot;

/// Registry plus snapshot for one declared entity type.
///
/// Reads (`get`, `all`, `search`, `count`) only touch memory. `save` and
/// `remove` rewrite the whole snapshot with the change applied and only then
/// update the registry. If the rewrite fails, the registry is left as it was
/// and the error returned.
///
/// The registry is loaded once in [`Store::open`] and is not reloaded behind
/// the caller's back. Entities are handed out as shared borrows of the
/// registry; to change one, clone it, mutate the clone and [`Store::save`] it.
#[derive(Debug)]
pub struct Store<T: Entity> {
    registry: Registry<T>,
    snapshot: Snapshot,
}

impl<T: Entity> Store<T> {
    /// Open the store for `T`, loading its snapshot if one exists.
    pub fn open(config: &StoreConfig) -> StoreResult<Self> {
        let snapshot = Snapshot::for_type(config, T::TYPE_NAME);
        let registry = snapshot.load()?;
        info!(
            entity = T::TYPE_NAME,
            path = %snapshot.path().display(),
            records = registry.len(),
            "store opened"
        );
        Ok(Self { registry, snapshot })
    }

    /// Replace the registry with the snapshot's current content.
    ///
    /// Meant for startup; on error the existing registry is kept.
    pub fn load(&mut self) -> StoreResult<()> {
        self.registry = self.snapshot.load()?;
        Ok(())
    }

    /// Build a new entity from `fields`. Nothing is registered until `save`.
    pub fn construct(&self, fields: Fields) -> StoreResult<T> {
        Ok(construct::<T>(fields)?)
    }

    pub fn get<Q>(&self, id: &Q) -> Option<&T>
    where
        EntityId: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.registry.get(id)
    }

    /// Every registered entity. Same as searching with an empty filter.
    pub fn all(&self) -> Vec<&T> {
        self.search(&Filter::new())
    }

    pub fn search(&self, filter: &Filter) -> Vec<&T> {
        self.registry.search(filter)
    }

    pub fn count(&self) -> usize {
        self.registry.len()
    }

    /// Stamp `updated_at`, insert or overwrite by id, and rewrite the snapshot.
    ///
    /// The file is written first; the registry only changes once it is durable.
    pub fn save(&mut self, mut entity: T) -> StoreResult<&T> {
        entity.meta_mut().touch();
        let staged = self
            .registry
            .iter()
            .filter(|current| current.id() != entity.id())
            .chain(iter::once(&entity));

        if let Err(err) = self.snapshot.write(staged) {
            warn!(entity = T::TYPE_NAME, id = %entity.id(), error = %err, "save failed; registry unchanged");
            return Err(err);
        }

        debug!(entity = T::TYPE_NAME, id = %entity.id(), "saved");
        Ok(self.registry.put(entity))
    }

    /// Remove the entity with `id` and rewrite the snapshot.
    ///
    /// Returns the removed entity, or `Ok(None)` without touching the file
    /// when no such id is registered.
    pub fn remove<Q>(&mut self, id: &Q) -> StoreResult<Option<T>>
    where
        EntityId: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let Some(target) = self.registry.get(id) else {
            return Ok(None);
        };
        let target = target.id().clone();

        let staged = self.registry.iter().filter(|current| *current.id() != target);
        if let Err(err) = self.snapshot.write(staged) {
            warn!(entity = T::TYPE_NAME, id = %target, error = %err, "remove failed; registry unchanged");
            return Err(err);
        }

        debug!(entity = T::TYPE_NAME, id = %target, "removed");
        Ok(self.registry.remove::<EntityId>(&target))
    }

    /// Rewrite the snapshot from the current registry.
    pub fn flush(&self) -> StoreResult<()> {
        self.snapshot.save(&self.registry)
    }

    pub fn snapshot_path(&self) -> &Path {
        self.snapshot.path()
    }
}
