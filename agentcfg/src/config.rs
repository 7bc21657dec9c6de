use std::{
  env, fs,
  fs::OpenOptions,
  io::Write,
  os::unix::fs::OpenOptionsExt,
  path::{Path, PathBuf},
};

use anyhow::{anyhow, Result};
use serde::Serialize;
use serde_json::{ser::PrettyFormatter, Map, Serializer, Value};
use tracing::debug;

use crate::OsType;

pub const CONFIG_FILE_NAME: &str = "config.json";

/// Map keys recognized by the agent when it loads the configuration
pub const MAP_KEY_METRICS_COLLECTION_INTERVAL: &str = "metrics_collection_interval";
pub const MAP_KEY_INSTANCES: &str = "resources";
pub const MAP_KEY_MEASUREMENT: &str = "measurement";

/// Directory containing the running executable
pub fn current_exe_dir() -> Result<PathBuf> {
  let exe = env::current_exe()?;
  match exe.parent() {
    Some(dir) => Ok(dir.to_path_buf()),
    None => Err(anyhow!("Unable to determine the directory containing {}", exe.display())),
  }
}

/// Default location of the generated configuration file, next to the binary
pub fn default_config_path() -> Result<PathBuf> {
  Ok(current_exe_dir()?.join(CONFIG_FILE_NAME))
}

/// Verify the configuration file can be created or appended to at `path`
pub fn check_write_permission<P: AsRef<Path>>(path: P) -> Result<()> {
  let path = path.as_ref();
  OpenOptions::new()
    .append(true)
    .create(true)
    .open(path)
    .map_err(|err| anyhow!("No write permission to {}: {err}", path.display()))?;

  Ok(())
}

/// Read a previously generated configuration file
pub fn read_config<P: AsRef<Path>>(path: P) -> Result<String> {
  let path = path.as_ref();
  fs::read_to_string(path).map_err(|err| anyhow!("Error in reading config from file {}: {err}", path.display()))
}

/// Serialize the result map as pretty JSON, indented with tabs
///
/// Tab indentation is part of the file format the agent ships with
pub fn to_json_bytes(map: &Map<String, Value>) -> Result<Vec<u8>> {
  let mut buf = Vec::new();
  let formatter = PrettyFormatter::with_indent(b"\t");
  let mut serializer = Serializer::with_formatter(&mut buf, formatter);
  map.serialize(&mut serializer)?;

  Ok(buf)
}

/// Write `contents` to disk, setting the file mode
fn write_file<P: AsRef<Path>>(contents: &[u8], path: P, mode: u32) -> Result<()> {
  let mut file = OpenOptions::new()
    .write(true)
    .create(true)
    .truncate(true)
    .mode(mode)
    .open(&path)?;
  file.write_all(contents)?;

  Ok(())
}

/// Serialize and save the result map to `path`
pub fn save_config<P: AsRef<Path>>(path: P, map: &Map<String, Value>) -> Result<()> {
  let path = path.as_ref();
  let contents = to_json_bytes(map)?;
  write_file(&contents, path, 0o755)
    .map_err(|err| anyhow!("Error in writing file to {}: {err}", path.display()))?;
  debug!("Wrote {} bytes to {}", contents.len(), path.display());

  Ok(())
}

/// Host context the wizard collects before asking section questions
#[derive(Clone, Debug, Default)]
pub struct Context {
  pub os: OsType,
  pub region: String,
}

/// A wizard section that contributes one entry to the configuration map
pub trait ToMapEntry {
  /// The key and value this section stores in the configuration
  ///
  /// An empty key or an absent value means the section has nothing to store
  fn to_map_entry(&self, ctx: &Context) -> (String, Option<Value>);
}

/// Insert the entry produced by `section`, skipping empty keys and absent values
pub fn add_to_map<T: ToMapEntry>(ctx: &Context, map: &mut Map<String, Value>, section: &T) {
  let (key, value) = section.to_map_entry(ctx);
  if key.is_empty() {
    return;
  }
  if let Some(value) = value {
    map.insert(key, value);
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  struct Fixed {
    key: &'static str,
    value: Option<Value>,
  }

  impl ToMapEntry for Fixed {
    fn to_map_entry(&self, _ctx: &Context) -> (String, Option<Value>) {
      (self.key.to_string(), self.value.clone())
    }
  }

  fn sample_map() -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("region".to_string(), json!("us-west-2"));
    map.insert("agent".to_string(), json!({ MAP_KEY_METRICS_COLLECTION_INTERVAL: 60 }));
    map
  }

  #[test]
  fn it_serializes_with_tab_indentation() {
    let bytes = to_json_bytes(&sample_map()).unwrap();
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.contains("\n\t\"region\""));
    assert!(text.contains("\n\t\"agent\": {\n\t\t\"metrics_collection_interval\": 60\n\t}"));
  }

  #[test]
  fn it_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);

    let map = sample_map();
    save_config(&path, &map).unwrap();

    let contents = read_config(&path).unwrap();
    let parsed: Map<String, Value> = serde_json::from_str(&contents).unwrap();
    assert_eq!(parsed, map);
  }

  #[test]
  fn it_errors_with_the_path_when_the_file_is_missing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.json");

    let err = read_config(&path).unwrap_err();
    assert!(err.to_string().contains("missing.json"));
  }

  #[test]
  fn it_accepts_a_writable_location() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);

    check_write_permission(&path).unwrap();
    assert!(path.exists());
  }

  #[test]
  fn it_adds_present_entries_to_the_map() {
    let ctx = Context::default();
    let mut map = Map::new();

    add_to_map(&ctx, &mut map, &Fixed {
      key: "metrics",
      value: Some(json!({ MAP_KEY_MEASUREMENT: ["mem_used_percent"] })),
    });

    assert_eq!(map["metrics"][MAP_KEY_MEASUREMENT][0], "mem_used_percent");
  }

  #[test]
  fn it_skips_absent_values_and_empty_keys() {
    let ctx = Context::default();
    let mut map = Map::new();

    add_to_map(&ctx, &mut map, &Fixed { key: "metrics", value: None });
    add_to_map(&ctx, &mut map, &Fixed { key: "", value: Some(json!(1)) });

    assert!(map.is_empty());
  }
}
