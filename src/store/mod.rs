//! Persistence of effects. A store keeps `{id, name, json}` records; the [`Repository`] sits on top
//! of an injected store and converts between records and effects.

use std::collections::BTreeMap;
use std::io::{Error, ErrorKind, Result};

use serde::{Deserialize, Serialize};

use crate::effects::Effect;

/// An in-process store, mostly useful for tests and one-shot tooling.
pub mod memory;

/// A store kept inside a redis hash.
pub mod redis;

pub use memory::MemoryStore;
pub use redis::{RedisConfiguration, RedisStore};

/// A single persisted effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEffect {
  /// Assigned by the store; `0` asks the store to pick the next free id.
  pub id: u64,

  /// The effect's wire name.
  pub name: String,

  /// The encoded properties, as json text.
  pub json: String,
}

impl StoredEffect {
  /// A record for `effect` that has not been assigned an id yet.
  pub fn pending(effect: &Effect) -> Result<Self> {
    Ok(Self {
      id: 0,
      name: effect.name().to_string(),
      json: effect.to_json_string()?,
    })
  }

  /// Decodes the record back into an effect.
  pub fn effect(&self) -> Result<Effect> {
    Effect::from_json_str(&self.name, &self.json).map_err(|error| {
      log::warn!("stored effect {} is not decodable - {error}", self.id);
      Error::from(error)
    })
  }
}

/// Records plus the id handed to the next auto-assigned insert. Both backends keep their state in
/// this shape; the redis store round-trips it through json.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Table {
  #[allow(clippy::missing_docs_in_private_items)]
  next_id: u64,

  #[allow(clippy::missing_docs_in_private_items)]
  records: BTreeMap<u64, StoredEffect>,
}

impl Default for Table {
  fn default() -> Self {
    Self {
      next_id: 1,
      records: BTreeMap::new(),
    }
  }
}

impl Table {
  /// Adds the record unless its id is taken, assigning the next id when it has none. Fails once no
  /// id is left after the one being inserted.
  pub(crate) fn insert(&mut self, mut record: StoredEffect) -> Result<u64> {
    if record.id == 0 {
      record.id = self.next_id;
    }

    let id = record.id;

    if self.records.contains_key(&id) {
      log::debug!("record {id} already present, ignoring insert");
      return Ok(id);
    }

    let following = id.checked_add(1).ok_or_else(|| {
      log::warn!("effect ids exhausted, refusing insert of {id}");
      Error::new(ErrorKind::Other, "ids-exhausted")
    })?;

    self.next_id = self.next_id.max(following);
    self.records.insert(id, record);
    Ok(id)
  }

  #[allow(clippy::missing_docs_in_private_items)]
  pub(crate) fn get(&self, id: u64) -> Option<StoredEffect> {
    self.records.get(&id).cloned()
  }

  /// Returns whether anything was removed.
  pub(crate) fn delete(&mut self, id: u64) -> bool {
    self.records.remove(&id).is_some()
  }

  #[allow(clippy::missing_docs_in_private_items)]
  pub(crate) fn all(&self) -> Vec<StoredEffect> {
    self.records.values().cloned().collect()
  }
}

/// The operations every backend provides. Inserting a record whose id is already taken leaves the
/// existing record untouched.
#[allow(async_fn_in_trait)]
pub trait EffectStore {
  /// Stores the record, returning its id.
  async fn insert(&self, record: StoredEffect) -> Result<u64>;

  #[allow(clippy::missing_docs_in_private_items)]
  async fn get(&self, id: u64) -> Result<Option<StoredEffect>>;

  /// Removes the record; missing ids are not an error.
  async fn delete(&self, id: u64) -> Result<()>;

  /// Every record, ordered by id.
  async fn all(&self) -> Result<Vec<StoredEffect>>;
}

/// Stores and retrieves effects.
pub struct Repository<S> {
  #[allow(clippy::missing_docs_in_private_items)]
  store: S,
}

impl<S> Repository<S>
where
  S: EffectStore,
{
  #[allow(clippy::missing_docs_in_private_items)]
  pub fn new(store: S) -> Self {
    Self { store }
  }

  /// Stores an effect, returning the id used to retrieve or delete it later.
  pub async fn insert(&self, effect: &Effect) -> Result<u64> {
    let id = self.store.insert(StoredEffect::pending(effect)?).await?;
    log::debug!("stored '{}' effect as {id}", effect.name());
    Ok(id)
  }

  /// Loads the effect stored under `id`.
  pub async fn get(&self, id: u64) -> Result<Effect> {
    self
      .store
      .get(id)
      .await?
      .ok_or_else(|| Error::new(ErrorKind::NotFound, format!("no stored effect '{id}'")))?
      .effect()
  }

  #[allow(clippy::missing_docs_in_private_items)]
  pub async fn delete(&self, id: u64) -> Result<()> {
    self.store.delete(id).await
  }

  /// Every stored effect, keyed by id.
  pub async fn all(&self) -> Result<BTreeMap<u64, Effect>> {
    self
      .store
      .all()
      .await?
      .into_iter()
      .map(|record| record.effect().map(|effect| (record.id, effect)))
      .collect()
  }
}
