use std::{
  io::{BufRead, Write},
  path::PathBuf,
  str::FromStr,
};

use anyhow::{anyhow, Result};
use clap::Args;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::{
  config::{self, Context, ToMapEntry, MAP_KEY_INSTANCES, MAP_KEY_MEASUREMENT, MAP_KEY_METRICS_COLLECTION_INTERVAL},
  ec2,
  prompt::Prompter,
  sdk, OsType,
};

const OS_MENU: [&str; 3] = ["linux", "windows", "darwin"];
const INTERVAL_MENU: [&str; 4] = ["1", "10", "30", "60"];
const METRIC_SET_MENU: [&str; 3] = ["Basic", "Standard", "Advanced"];

/// Interactively generate the agent configuration file
#[derive(Args, Debug, Default, Serialize, Deserialize)]
pub struct Wizard {
  /// AWS profile consulted for the default region
  #[arg(long)]
  pub profile: Option<String>,

  /// Where to write the generated configuration
  ///
  /// Defaults to config.json next to the running executable
  #[arg(long)]
  pub output: Option<PathBuf>,
}

impl Wizard {
  pub async fn run(&self) -> Result<()> {
    let path = match &self.output {
      Some(path) => path.clone(),
      None => config::default_config_path()?,
    };
    config::check_write_permission(&path)?;

    let region = self.detect_region().await.unwrap_or_default();
    match sdk::credentials().await {
      Some(credentials) => info!("Found AWS credentials with access key {}", credentials.access_key_id()),
      None => warn!("No AWS credentials found. Configure credentials before starting the agent"),
    }

    let mut prompter = Prompter::new();
    let map = collect(&mut prompter, &region)?;

    println!("{}", String::from_utf8(config::to_json_bytes(&map)?)?);
    if prompter.yes("Do you want to store the config in the configuration file?")? {
      config::save_config(&path, &map)?;
      println!("Saved config file to {} successfully.", path.display());
    }

    if OsType::current() == OsType::Windows {
      prompter.enter_to_exit()?;
    }

    Ok(())
  }

  /// Default region offered to the operator
  ///
  /// The SDK chains (environment, shared config) are consulted first; the
  /// instance metadata service is the fallback for hosts running on EC2
  async fn detect_region(&self) -> Option<String> {
    let region = match &self.profile {
      Some(profile) => sdk::region_with_profile(profile).await,
      None => sdk::region().await,
    };

    match region {
      Some(region) => Some(region.to_string()),
      None => ec2::default_region().await,
    }
  }
}

/// Walk the operator through the questions and assemble the configuration map
fn collect<R: BufRead, W: Write>(prompter: &mut Prompter<R, W>, detected_region: &str) -> Result<Map<String, Value>> {
  let os = prompter.choice(
    "Which operating system will the agent run on?",
    default_os_option(OsType::current()),
    &OS_MENU,
  )?;
  let os = match os.as_str() {
    "windows" => OsType::Windows,
    "darwin" => OsType::Darwin,
    _ => OsType::Linux,
  };

  let region = prompter.ask_with_default("Which AWS region should telemetry be sent to?", detected_region)?;
  let ctx = Context {
    os,
    region: region.clone(),
  };

  let mut map = Map::new();
  map.insert("os".to_string(), json!(os.as_str()));
  if !region.is_empty() {
    map.insert("region".to_string(), json!(region));
  }

  let interval = prompter.choice("How often in seconds should metrics be collected?", 4, &INTERVAL_MENU)?;
  let interval = interval.parse::<u64>()?;
  config::add_to_map(&ctx, &mut map, &AgentSection {
    metrics_collection_interval: interval,
  });

  if prompter.yes("Do you want to monitor host metrics such as CPU, memory, and disk?")? {
    let set = prompter.choice("Which predefined set of metrics do you want?", 1, &METRIC_SET_MENU)?;
    config::add_to_map(&ctx, &mut map, &MetricsSection {
      set: set.parse()?,
      metrics_collection_interval: interval,
    });
  }

  Ok(map)
}

/// 1-based menu position of the detected host OS
fn default_os_option(os: OsType) -> usize {
  OS_MENU.iter().position(|value| *value == os.as_str()).unwrap_or(0) + 1
}

/// Top-level agent settings
struct AgentSection {
  metrics_collection_interval: u64,
}

impl ToMapEntry for AgentSection {
  fn to_map_entry(&self, _ctx: &Context) -> (String, Option<Value>) {
    (
      "agent".to_string(),
      Some(json!({ MAP_KEY_METRICS_COLLECTION_INTERVAL: self.metrics_collection_interval })),
    )
  }
}

/// Predefined host-metric sets offered by the wizard
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum MetricSet {
  Basic,
  Standard,
  Advanced,
}

impl FromStr for MetricSet {
  type Err = anyhow::Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "Basic" => Ok(Self::Basic),
      "Standard" => Ok(Self::Standard),
      "Advanced" => Ok(Self::Advanced),
      _ => Err(anyhow!("{s} is not a predefined metric set")),
    }
  }
}

impl MetricSet {
  /// Measurement names collected for the set, using the counter names the
  /// target OS exposes
  fn measurement(&self, os: OsType) -> Vec<&'static str> {
    let mut measurement: Vec<&'static str> = match os {
      OsType::Windows => vec!["Memory % Committed Bytes In Use", "LogicalDisk % Free Space"],
      _ => vec!["mem_used_percent", "disk_used_percent"],
    };

    if matches!(self, Self::Standard | Self::Advanced) {
      measurement.extend(match os {
        OsType::Windows => vec!["Processor % Idle Time", "Processor % Interrupt Time", "Paging File % Usage"],
        _ => vec!["cpu_usage_idle", "cpu_usage_iowait", "diskio_io_time", "swap_used_percent"],
      });
    }

    if matches!(self, Self::Advanced) {
      measurement.extend(match os {
        OsType::Windows => vec![
          "Processor % User Time",
          "TCPv4 Connections Established",
          "TCPv6 Connections Established",
        ],
        _ => vec![
          "cpu_usage_user",
          "cpu_usage_system",
          "netstat_tcp_established",
          "netstat_tcp_time_wait",
        ],
      });
    }

    measurement
  }
}

/// Host metrics section, present only when the operator opts in
struct MetricsSection {
  set: MetricSet,
  metrics_collection_interval: u64,
}

impl ToMapEntry for MetricsSection {
  fn to_map_entry(&self, ctx: &Context) -> (String, Option<Value>) {
    (
      "metrics".to_string(),
      Some(json!({
        MAP_KEY_MEASUREMENT: self.set.measurement(ctx.os),
        MAP_KEY_INSTANCES: ["*"],
        MAP_KEY_METRICS_COLLECTION_INTERVAL: self.metrics_collection_interval,
      })),
    )
  }
}
