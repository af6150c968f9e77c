use std::io::{Error, ErrorKind, Result};

use serde::Deserialize;

use super::{EffectStore, StoredEffect, Table};

/// The hash used when the configuration does not name one.
pub const DEFAULT_KEY: &str = "ledclient:effects";

/// The hash field holding the serialized table.
const TABLE_FIELD: &str = "_effects";

/// Deserializable redis connection details.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RedisConfiguration {
  /// `host:port` of the redis server.
  pub addr: String,

  /// Sent with `AUTH` after connecting, when present.
  pub password: Option<String>,

  /// The hash the effects live in.
  pub key: Option<String>,
}

/// Keeps every record, as one json document, in a single field of a redis hash. Every operation
/// opens its own connection; writes are read-modify-write and assume a single writer.
#[derive(Debug, Clone)]
pub struct RedisStore {
  #[allow(clippy::missing_docs_in_private_items)]
  config: RedisConfiguration,
}

impl RedisStore {
  #[allow(clippy::missing_docs_in_private_items)]
  pub fn new(config: RedisConfiguration) -> Self {
    Self { config }
  }

  /// The hash the table is stored in.
  fn key(&self) -> &str {
    self.config.key.as_deref().unwrap_or(DEFAULT_KEY)
  }

  /// Opens a connection, authenticating when a password is configured.
  async fn connect(&self) -> Result<async_std::net::TcpStream> {
    let mut stream = async_std::net::TcpStream::connect(&self.config.addr)
      .await
      .map_err(|error| Error::new(ErrorKind::Other, format!("unable to connect to redis - {error}")))?;

    if let Some(password) = &self.config.password {
      let command = kramer::Command::Auth::<&str, &str>(kramer::AuthCredentials::Password(password.as_str()));
      let result = kramer::execute(&mut stream, command).await?;
      log::debug!("authenticated with redis - {result:?}");
    }

    Ok(stream)
  }

  /// Reads the table; an absent field is an empty table.
  async fn load(&self) -> Result<Table> {
    let mut stream = self.connect().await?;
    let command = kramer::Command::Hashes::<&str, &str>(kramer::HashCommand::Get(
      self.key(),
      Some(kramer::Arity::One(TABLE_FIELD)),
    ));

    let result = kramer::execute(&mut stream, command).await.map_err(|error| {
      log::warn!("unable to read stored effects - {error}");
      Error::new(ErrorKind::Other, format!("unable to read stored effects - {error}"))
    })?;

    match &result {
      kramer::Response::Item(kramer::ResponseValue::String(content)) => decode_table(content),
      kramer::Response::Item(kramer::ResponseValue::Empty) => Ok(Table::default()),
      response => {
        log::warn!("unrecognized response from effect lookup");
        Err(Error::new(ErrorKind::Other, format!("bad lookup - {response:?}")))
      }
    }
  }

  /// Writes the table back.
  async fn save(&self, table: &Table) -> Result<()> {
    let contents = serde_json::to_string(table)?;
    let mut stream = self.connect().await?;
    let command = kramer::Command::Hashes::<&str, &str>(kramer::HashCommand::Set(
      self.key(),
      kramer::Arity::One((TABLE_FIELD, contents.as_str())),
      kramer::Insertion::Always,
    ));

    let result = kramer::execute(&mut stream, command).await?;
    log::debug!("saved effect table to '{}' -> {result:?}", self.key());
    Ok(())
  }
}

/// Parses the json document stored in the hash field.
fn decode_table(content: &str) -> Result<Table> {
  serde_json::from_str::<Table>(content).map_err(|error| {
    log::warn!("stored effect table is not valid json - {error}");
    Error::new(ErrorKind::InvalidData, error)
  })
}

impl EffectStore for RedisStore {
  async fn insert(&self, record: StoredEffect) -> Result<u64> {
    let mut table = self.load().await?;
    let id = table.insert(record)?;
    self.save(&table).await?;
    Ok(id)
  }

  async fn get(&self, id: u64) -> Result<Option<StoredEffect>> {
    self.load().await.map(|table| table.get(id))
  }

  async fn delete(&self, id: u64) -> Result<()> {
    let mut table = self.load().await?;

    if table.delete(id) {
      self.save(&table).await?;
    }

    Ok(())
  }

  async fn all(&self) -> Result<Vec<StoredEffect>> {
    self.load().await.map(|table| table.all())
  }
}
