/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use anyhow::{Context, anyhow};
use yaml_rust::Yaml;

use super::{FtpControlConfig, FtpSessionConfig, FtpTransferConfig};

mod value;

impl FtpControlConfig {
    pub fn parse_yaml(value: &Yaml) -> anyhow::Result<Self> {
        if let Yaml::Hash(map) = value {
            let mut config = FtpControlConfig::default();
            value::foreach_kv(map, |k, v| match value::normalize_key(k).as_str() {
                "max_line_len" | "max_line_length" => {
                    config.max_line_len = value::as_humanize_usize(v)
                        .context(format!("invalid humanize usize value for key {k}"))?;
                    Ok(())
                }
                "max_multi_lines" => {
                    config.max_multi_lines = value::as_usize(v)
                        .context(format!("invalid usize value for key {k}"))?;
                    Ok(())
                }
                "command_timeout" => {
                    config.command_timeout = value::as_humanize_duration(v)
                        .context(format!("invalid humanize duration value for key {k}"))?;
                    Ok(())
                }
                "keepalive_interval" => {
                    config.keepalive_interval = value::as_humanize_duration(v)
                        .context(format!("invalid humanize duration value for key {k}"))?;
                    Ok(())
                }
                _ => Err(anyhow!("invalid key {k}")),
            })?;
            Ok(config)
        } else {
            Err(anyhow!("invalid yaml type"))
        }
    }
}

impl FtpTransferConfig {
    pub fn parse_yaml(value: &Yaml) -> anyhow::Result<Self> {
        if let Yaml::Hash(map) = value {
            let mut config = FtpTransferConfig::default();
            value::foreach_kv(map, |k, v| match value::normalize_key(k).as_str() {
                "data_idle_timeout" => {
                    config.data_idle_timeout = value::as_humanize_duration(v)
                        .context(format!("invalid humanize duration value for key {k}"))?;
                    Ok(())
                }
                "transfer_timeout" => {
                    config.transfer_timeout = value::as_humanize_duration(v)
                        .context(format!("invalid humanize duration value for key {k}"))?;
                    Ok(())
                }
                "max_receive_size" => {
                    config.max_receive_size = value::as_humanize_usize(v)
                        .context(format!("invalid humanize usize value for key {k}"))?;
                    Ok(())
                }
                _ => Err(anyhow!("invalid key {k}")),
            })?;
            Ok(config)
        } else {
            Err(anyhow!("invalid yaml type"))
        }
    }
}

impl FtpSessionConfig {
    pub fn parse_yaml(value: &Yaml) -> anyhow::Result<Self> {
        if let Yaml::Hash(map) = value {
            let mut config = FtpSessionConfig::default();
            value::foreach_kv(map, |k, v| match value::normalize_key(k).as_str() {
                "control" => {
                    config.control = FtpControlConfig::parse_yaml(v).context(format!(
                        "invalid ftp control connection config value for key {k}"
                    ))?;
                    Ok(())
                }
                "transfer" => {
                    config.transfer = FtpTransferConfig::parse_yaml(v).context(format!(
                        "invalid ftp transfer connection config value for key {k}"
                    ))?;
                    Ok(())
                }
                "connect_timeout" => {
                    config.connect_timeout = value::as_humanize_duration(v)
                        .context(format!("invalid humanize duration value for key {k}"))?;
                    Ok(())
                }
                "greeting_timeout" => {
                    config.greeting_timeout = value::as_humanize_duration(v)
                        .context(format!("invalid humanize duration value for key {k}"))?;
                    Ok(())
                }
                "passive_use_control_host" => {
                    config.passive_use_control_host = value::as_bool(v)
                        .context(format!("invalid bool value for key {k}"))?;
                    Ok(())
                }
                _ => Err(anyhow!("invalid key {k}")),
            })?;
            Ok(config)
        } else {
            Err(anyhow!("invalid yaml type"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use yaml_rust::YamlLoader;

    fn load(s: &str) -> Yaml {
        YamlLoader::load_from_str(s).unwrap().pop().unwrap()
    }

    #[test]
    fn ftp_control_config_parse_ok() {
        let yaml = load(
            r#"
                max_line_len: "2KB"
                max_multi_lines: 256
                command_timeout: "30s"
                keepalive-interval: "5m"
            "#,
        );
        let config = FtpControlConfig::parse_yaml(&yaml).unwrap();
        assert_eq!(config.max_line_len, 2000);
        assert_eq!(config.max_multi_lines, 256);
        assert_eq!(config.command_timeout, Duration::from_secs(30));
        assert_eq!(config.keepalive_interval, Duration::from_secs(300));
    }

    #[test]
    fn ftp_control_config_parse_err() {
        let yaml = load("invalid_key: value");
        assert!(FtpControlConfig::parse_yaml(&yaml).is_err());

        let yaml = load("max_multi_lines: -1");
        assert!(FtpControlConfig::parse_yaml(&yaml).is_err());

        let yaml = load(r#"command_timeout: "invalid_duration""#);
        assert!(FtpControlConfig::parse_yaml(&yaml).is_err());

        let yaml = Yaml::String("invalid".to_string());
        assert!(FtpControlConfig::parse_yaml(&yaml).is_err());
    }

    #[test]
    fn ftp_transfer_config_parse_ok() {
        let yaml = load(
            r#"
                data_idle_timeout: "2s"
                transfer_timeout: "1h"
                max_receive_size: "1MiB"
            "#,
        );
        let config = FtpTransferConfig::parse_yaml(&yaml).unwrap();
        assert_eq!(config.data_idle_timeout, Duration::from_secs(2));
        assert_eq!(config.transfer_timeout, Duration::from_secs(3600));
        assert_eq!(config.max_receive_size, 1024 * 1024);
    }

    #[test]
    fn ftp_transfer_config_parse_err() {
        let yaml = load(r#"data_idle_timeout: "-500ms""#);
        assert!(FtpTransferConfig::parse_yaml(&yaml).is_err());

        let yaml = load(r#"max_receive_size: "4KBX""#);
        assert!(FtpTransferConfig::parse_yaml(&yaml).is_err());

        let yaml = Yaml::Array(vec![]);
        assert!(FtpTransferConfig::parse_yaml(&yaml).is_err());
    }

    #[test]
    fn ftp_session_config_parse_ok() {
        let yaml = load(
            r#"
                control:
                  max_line_len: 4096
                  command_timeout: "15s"
                transfer:
                  data_idle_timeout: "1s"
                connect_timeout: "10s"
                greeting_timeout: "5s"
                passive_use_control_host: false
            "#,
        );
        let config = FtpSessionConfig::parse_yaml(&yaml).unwrap();
        assert_eq!(config.control.max_line_len, 4096);
        assert_eq!(config.control.command_timeout, Duration::from_secs(15));
        assert_eq!(config.transfer.data_idle_timeout, Duration::from_secs(1));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.greeting_timeout, Duration::from_secs(5));
        assert!(!config.passive_use_control_host);
    }

    #[test]
    fn ftp_session_config_parse_err() {
        let yaml = load(r#"control: "invalid""#);
        assert!(FtpSessionConfig::parse_yaml(&yaml).is_err());

        let yaml = load("transfer: 1234");
        assert!(FtpSessionConfig::parse_yaml(&yaml).is_err());

        let yaml = load(r#"passive_use_control_host: "not_a_boolean""#);
        assert!(FtpSessionConfig::parse_yaml(&yaml).is_err());

        let yaml = Yaml::Null;
        assert!(FtpSessionConfig::parse_yaml(&yaml).is_err());
    }
}
