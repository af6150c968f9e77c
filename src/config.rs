use std::io::{Error, ErrorKind, Result};

use serde::Deserialize;

use crate::controller::ControllerConfiguration;
use crate::store::RedisConfiguration;

/// Deserializable configuration data, loaded from a toml file.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
  /// Where effects are sent.
  pub controller: ControllerConfiguration,

  /// Where effects are stored; only the persistence commands need it.
  pub redis: Option<RedisConfiguration>,
}

impl Configuration {
  /// Parses toml source.
  pub fn parse(contents: &str) -> Result<Self> {
    toml::from_str::<Self>(contents).map_err(|error| Error::new(ErrorKind::InvalidData, format!("bad config - {error}")))
  }

  /// Reads and parses the file at `path`.
  pub async fn load<P>(path: P) -> Result<Self>
  where
    P: AsRef<async_std::path::Path>,
  {
    log::info!("loading config from '{:?}'", path.as_ref());
    let contents = async_std::fs::read_to_string(path).await?;
    Self::parse(&contents)
  }
}
