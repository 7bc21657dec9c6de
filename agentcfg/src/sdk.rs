use aws_config::{
  environment::EnvironmentVariableRegionProvider, meta::region::RegionProviderChain,
  profile::ProfileFileRegionProvider,
};
use aws_credential_types::{provider::ProvideCredentials, Credentials};
use aws_types::region::Region;
use tracing::debug;

/// Resolve the region from the environment and the shared AWS config files
///
/// Instance metadata is deliberately not part of this chain - it is consulted
/// separately (see [`crate::ec2::default_region`]) so the wizard can tell the
/// operator it is reaching out to the metadata service
pub async fn region() -> Option<Region> {
  RegionProviderChain::first_try(EnvironmentVariableRegionProvider::new())
    .or_else(ProfileFileRegionProvider::builder().build())
    .region()
    .await
}

/// Resolve the region configured for a named shared-config profile
pub async fn region_with_profile(profile: &str) -> Option<Region> {
  let provider = ProfileFileRegionProvider::builder().profile_name(profile).build();

  RegionProviderChain::first_try(provider).region().await
}

/// Resolve credentials through the default provider chain
///
/// `None` means nothing resolved; the wizard degrades to telling the operator
/// to configure credentials before starting the agent
pub async fn credentials() -> Option<Credentials> {
  let config = aws_config::from_env().load().await;
  let provider = config.credentials_provider()?;

  match provider.provide_credentials().await {
    Ok(credentials) => Some(credentials),
    Err(err) => {
      debug!("No credentials resolved from the default provider chain: {err}");
      None
    }
  }
}
