use anyhow::Result;
use aws_config::{imds::client::Client, provider_config::ProviderConfig};
use http::Uri;
use tokio::time::Duration;
use tracing::{debug, info};

/// Get the IMDS client
///
/// The wizard runs interactively, well after the instance has booted, so the
/// client makes a single attempt with short timeouts instead of retrying
async fn get_client() -> Result<Client> {
  let config = ProviderConfig::with_default_region().await;
  let mut client = Client::builder()
    .configure(&config)
    .max_attempts(1)
    .token_ttl(Duration::from_secs(900))
    .connect_timeout(Duration::from_secs(1))
    .read_timeout(Duration::from_secs(1));

  if let Ok(endpoint) = std::env::var("IMDS_ENDPOINT") {
    client = client.endpoint(endpoint.parse::<Uri>()?);
  }

  Ok(client.build().await?)
}

/// Region of the instance, from the instance metadata service
///
/// `None` when the metadata service is unreachable - the host is most likely
/// not an EC2 instance
pub async fn default_region() -> Option<String> {
  info!("Trying to fetch the default region from instance metadata");

  let client = match get_client().await {
    Ok(client) => client,
    Err(err) => {
      debug!("Unable to construct the IMDS client: {err}");
      return None;
    }
  };

  match client.get("/latest/meta-data/placement/region").await {
    Ok(region) => Some(region),
    Err(err) => {
      info!("Could not get region from instance metadata: {err}");
      None
    }
  }
}
