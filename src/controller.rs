use std::io::{Error, ErrorKind, Result};

use serde::Deserialize;

use crate::effects::Effect;

/// The content type the led server expects effect payloads to be sent with.
pub const CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Where the led server lives.
#[derive(Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct ControllerConfiguration {
  /// The complete http url of the led server, including scheme and port.
  pub server_url: String,
}

/// Sends effects to a remote led server.
#[derive(Debug, Clone)]
pub struct Controller {
  #[allow(clippy::missing_docs_in_private_items)]
  server_url: String,
}

impl From<ControllerConfiguration> for Controller {
  fn from(config: ControllerConfiguration) -> Self {
    Self::new(config.server_url)
  }
}

impl Controller {
  #[allow(clippy::missing_docs_in_private_items)]
  pub fn new<S>(server_url: S) -> Self
  where
    S: Into<String>,
  {
    let server_url = server_url.into().trim_end_matches('/').to_string();
    Self { server_url }
  }

  /// The url an effect is posted to, `<server>/effect/<name>`.
  pub fn endpoint(&self, effect: &Effect) -> String {
    format!("{}/effect/{}", self.server_url, effect.name())
  }

  /// Prepares, but does not send, the request that triggers `effect`.
  pub fn request(&self, effect: &Effect) -> Result<surf::RequestBuilder> {
    let url = surf::Url::parse(&self.endpoint(effect)).map_err(|error| {
      log::warn!("invalid led server url '{}' - {error}", self.server_url);
      Error::new(ErrorKind::InvalidInput, format!("bad-server-url - {error}"))
    })?;

    let payload = effect.to_json_string()?;
    log::info!("payload for {url}: {payload}");

    Ok(
      surf::RequestBuilder::new(surf::http::Method::Post, url)
        .body_string(payload)
        .header("Content-Type", CONTENT_TYPE),
    )
  }

  /// Sends the effect and waits for the server's answer. Anything but a 2xx status is an error.
  pub async fn send(&self, effect: &Effect) -> Result<()> {
    let response = self.request(effect)?.await.map_err(|error| {
      log::warn!("unable to reach led server - {error}");
      Error::new(ErrorKind::Other, format!("transport-failure - {error}"))
    })?;

    if !response.status().is_success() {
      log::warn!("bad led server response status - '{:?}'", response.status());
      return Err(Error::new(
        ErrorKind::Other,
        format!("transport-failure - status {}", response.status()),
      ));
    }

    log::debug!("triggered '{}' ({})", effect.name(), response.status());
    Ok(())
  }

  /// The fire-and-forget entry point for library callers that should not wait on the led server. The
  /// request runs on its own task and failures are only logged. The handle may be awaited, or
  /// dropped to detach. Callers that need the outcome use [`Controller::send`].
  pub fn trigger(&self, effect: Effect) -> async_std::task::JoinHandle<()> {
    let controller = self.clone();

    async_std::task::spawn(async move {
      if let Err(error) = controller.send(&effect).await {
        log::error!("exception triggering effect '{}' - {error}", effect.name());
      }
    })
  }
}
