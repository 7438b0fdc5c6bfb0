//! Bring an existing configuration file up to the current set of fields.
//! Missing keys are added with their default value; present keys are never
//! rewritten.

use super::Config;
use crate::errors::{AppError, AppResult};
use serde_yaml::Value;
use std::fs;
use std::path::Path;

/// Every key the current configuration knows about, in file order.
pub const FIELDS: &[&str] = &["database", "bind", "timezone", "list_default_days", "log_level"];

fn read_mapping(content: &str) -> AppResult<serde_yaml::Mapping> {
    if content.trim().is_empty() {
        return Ok(serde_yaml::Mapping::new());
    }
    match serde_yaml::from_str::<Value>(content)? {
        Value::Mapping(map) => Ok(map),
        Value::Null => Ok(serde_yaml::Mapping::new()),
        _ => Err(AppError::Config(
            "configuration file is not a YAML mapping".into(),
        )),
    }
}

pub fn missing_fields(content: &str) -> AppResult<Vec<&'static str>> {
    let map = read_mapping(content)?;
    Ok(FIELDS
        .iter()
        .copied()
        .filter(|f| !map.contains_key(Value::String((*f).to_string())))
        .collect())
}

/// Write the missing keys into `path`. Returns the keys that were added.
pub fn add_missing_fields(path: &Path) -> AppResult<Vec<&'static str>> {
    let content = if path.exists() {
        fs::read_to_string(path)?
    } else {
        String::new()
    };
    let mut map = read_mapping(&content)?;

    let defaults = match serde_yaml::to_value(Config::default())? {
        Value::Mapping(m) => m,
        _ => return Err(AppError::Config("cannot serialize default configuration".into())),
    };

    let mut added = Vec::new();
    for field in FIELDS {
        let key = Value::String((*field).to_string());
        if !map.contains_key(&key)
            && let Some(value) = defaults.get(&key)
        {
            map.insert(key, value.clone());
            added.push(*field);
        }
    }

    if added.is_empty() {
        return Ok(added);
    }

    let serialized = serde_yaml::to_string(&Value::Mapping(map))?;
    let mut new_content = String::new();
    for line in serialized.lines() {
        new_content.push_str(line);
        new_content.push('\n');

        if line.starts_with("timezone:") {
            new_content.push_str(
                "# timezone options:\n\
                 #   UTC     → calendar days in UTC (default)\n\
                 #   local   → timezone of the host\n\
                 #   +02:00  → fixed offset from UTC\n",
            );
        }
    }

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, new_content)?;
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_missing_fields() {
        let missing = missing_fields("database: /tmp/a.sqlite\ntimezone: UTC\n").unwrap();
        assert_eq!(missing, vec!["bind", "list_default_days", "log_level"]);
        assert!(missing_fields("").unwrap().len() == FIELDS.len());
    }

    #[test]
    fn adds_defaults_without_touching_existing_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rattendance.conf");
        fs::write(&path, "database: /tmp/a.sqlite\nbind: 0.0.0.0:9000\n").unwrap();

        let added = add_missing_fields(&path).unwrap();
        assert_eq!(added, vec!["timezone", "list_default_days", "log_level"]);

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.database, "/tmp/a.sqlite");
        assert_eq!(cfg.bind, "0.0.0.0:9000");
        assert_eq!(cfg.timezone, "UTC");

        assert!(add_missing_fields(&path).unwrap().is_empty());
        assert!(missing_fields(&fs::read_to_string(&path).unwrap()).unwrap().is_empty());
    }
}
