use anyhow::{Result, anyhow};
use thiserror::Error as ThisError;

fn get_value(table: &mut toml::Table, key: &str, path: &str) -> Result<toml::Value> {
    table
        .remove(key)
        .ok_or_else(|| anyhow!(format!("missing key: '{}'", path.to_owned() + key)))
}

#[derive(Debug, ThisError)]
#[error("expected type: '{0}' for '{1}'")]
pub struct ExpectedType(&'static str, String);

pub(crate) fn get_string(table: &mut toml::Table, key: &str, path: &str) -> Result<String> {
    if let toml::Value::String(s) = get_value(table, key, path)? {
        Ok(s)
    } else {
        Err(ExpectedType("string", path.to_owned() + key).into())
    }
}

pub(crate) fn get_bool(table: &mut toml::Table, key: &str, path: &str) -> Result<bool> {
    get_value(table, key, path).and_then(|v| {
        if let toml::Value::Boolean(b) = v {
            Ok(b)
        } else {
            Err(ExpectedType("bool", path.to_owned() + key).into())
        }
    })
}

/// Like [`get_table`], but a missing key is an error.
pub(crate) fn get_required_table(
    table: &mut toml::Table,
    key: &str,
    path: &str,
) -> Result<toml::Table> {
    if let toml::Value::Table(t) = get_value(table, key, path)? {
        Ok(t)
    } else {
        Err(ExpectedType("table", path.to_owned() + key).into())
    }
}

pub(crate) fn get_table(table: &mut toml::Table, key: &str, path: &str) -> Result<toml::Table> {
    if let Some(v) = table.remove(key) {
        if let toml::Value::Table(t) = v {
            Ok(t)
        } else {
            Err(ExpectedType("table", path.to_owned() + key).into())
        }
    } else {
        Ok(toml::Table::new())
    }
}

pub(crate) fn get_string_array(
    table: &mut toml::Table,
    key: &str,
    path: &str,
) -> Result<Vec<String>> {
    let Some(v) = table.remove(key) else {
        return Ok(Vec::new());
    };
    let toml::Value::Array(values) = v else {
        return Err(ExpectedType("array", path.to_owned() + key).into());
    };

    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| match v {
            toml::Value::String(s) => Ok(s),
            _ => Err(ExpectedType("string", format!("{path}{key}[{i}]")).into()),
        })
        .collect()
}
