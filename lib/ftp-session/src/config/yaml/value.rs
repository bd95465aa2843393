/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, anyhow};
use humanize_rs::ParseError;
use humanize_rs::bytes::Bytes;
use yaml_rust::{Yaml, yaml};

pub(super) fn foreach_kv<F>(table: &yaml::Hash, mut f: F) -> anyhow::Result<()>
where
    F: FnMut(&str, &Yaml) -> anyhow::Result<()>,
{
    for (k, v) in table.iter() {
        if let Yaml::String(key) = k {
            f(key, v).context(format!("failed to parse value of key {key}"))?;
        } else {
            return Err(anyhow!("key in hash should be string"));
        }
    }
    Ok(())
}

pub(super) fn normalize_key(raw: &str) -> String {
    raw.to_lowercase().replace('-', "_")
}

pub(super) fn as_usize(v: &Yaml) -> anyhow::Result<usize> {
    match v {
        Yaml::String(s) => usize::from_str(s).map_err(|e| anyhow!("invalid usize string: {e}")),
        Yaml::Integer(i) => Ok(usize::try_from(*i)?),
        _ => Err(anyhow!(
            "yaml value type for 'usize' should be 'string' or 'integer'"
        )),
    }
}

pub(super) fn as_humanize_usize(v: &Yaml) -> anyhow::Result<usize> {
    match v {
        Yaml::String(value) => {
            let v = value.parse::<Bytes>()?;
            Ok(v.size())
        }
        Yaml::Integer(value) => Ok(usize::try_from(*value)?),
        _ => Err(anyhow!(
            "yaml value type for humanize usize should be 'string' or 'integer'"
        )),
    }
}

pub(super) fn as_humanize_duration(v: &Yaml) -> anyhow::Result<Duration> {
    match v {
        Yaml::String(value) => match humanize_rs::duration::parse(value) {
            Ok(v) => Ok(v),
            Err(ParseError::MissingUnit) => {
                if let Ok(u) = u64::from_str(value) {
                    Ok(Duration::from_secs(u))
                } else if let Ok(f) = f64::from_str(value) {
                    Duration::try_from_secs_f64(f).map_err(anyhow::Error::new)
                } else {
                    Err(anyhow!("invalid duration string"))
                }
            }
            Err(e) => Err(anyhow!("invalid humanize duration string: {e}")),
        },
        Yaml::Integer(value) => {
            if let Ok(u) = u64::try_from(*value) {
                Ok(Duration::from_secs(u))
            } else {
                Err(anyhow!("unsupported duration string"))
            }
        }
        Yaml::Real(s) => {
            let f = f64::from_str(s).map_err(|e| anyhow!("invalid f64 value: {e}"))?;
            Duration::try_from_secs_f64(f).map_err(anyhow::Error::new)
        }
        _ => Err(anyhow!(
            "yaml value type for humanize duration should be 'string' or 'integer' or 'real'"
        )),
    }
}

pub(super) fn as_bool(v: &Yaml) -> anyhow::Result<bool> {
    match v {
        Yaml::String(s) => match s.to_lowercase().as_str() {
            "on" | "true" | "yes" | "1" => Ok(true),
            "off" | "false" | "no" | "0" => Ok(false),
            _ => Err(anyhow!("invalid yaml string value for 'bool': {s}")),
        },
        Yaml::Boolean(value) => Ok(*value),
        Yaml::Integer(i) => Ok(*i != 0),
        _ => Err(anyhow!(
            "yaml value type for 'bool' should be 'boolean' / 'string' / 'integer'"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key() {
        assert_eq!(normalize_key("Command-Timeout"), "command_timeout");
        assert_eq!(normalize_key("max_line_len"), "max_line_len");
    }

    #[test]
    fn humanize_usize() {
        let v = Yaml::String("1KiB".to_string());
        assert_eq!(as_humanize_usize(&v).unwrap(), 1024);

        let v = Yaml::Integer(-1);
        assert!(as_humanize_usize(&v).is_err());
    }

    #[test]
    fn humanize_duration() {
        let v = Yaml::String("500ms".to_string());
        assert_eq!(
            as_humanize_duration(&v).unwrap(),
            Duration::from_millis(500)
        );

        let v = Yaml::String("90".to_string());
        assert_eq!(as_humanize_duration(&v).unwrap(), Duration::from_secs(90));

        let v = Yaml::Integer(-3);
        assert!(as_humanize_duration(&v).is_err());
    }

    #[test]
    fn bool_value() {
        assert!(as_bool(&Yaml::String("on".to_string())).unwrap());
        assert!(!as_bool(&Yaml::Boolean(false)).unwrap());
        assert!(as_bool(&Yaml::String("maybe".to_string())).is_err());
    }
}
