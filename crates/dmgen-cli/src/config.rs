//! Configuration-file loading.
//!
//! The configuration is a flat `key = value` file with `#` comments.
//! Output keys come in a unified form (`<profile>.output`) and split
//! forms (`<profile>.output.headers` / `.sources` / `.includes`).

use std::fs;
use std::path::{Path, PathBuf};

use dmgen_model::{Config, Profile};

use crate::error::RunError;

pub fn load(path: &Path) -> Result<Config, RunError> {
    let text = fs::read_to_string(path)
        .map_err(|e| RunError::Config(format!("cannot read {}: {e}", path.display())))?;
    let mut config = parse(&text)?;

    if config.input_path.as_os_str().is_empty() {
        return Err(RunError::Config("missing `input` path".into()));
    }
    // relative paths resolve against the configuration file's directory
    if let Some(base) = path.parent() {
        config.input_path = absolute(base, &config.input_path);
        config.template_path = config.template_path.map(|p| absolute(base, &p));
        for profile in Profile::ALL {
            config.out_headers[profile] = absolute(base, &config.out_headers[profile]);
            config.out_sources[profile] = absolute(base, &config.out_sources[profile]);
        }
    }
    if !config.input_path.is_dir() {
        return Err(RunError::Config(format!(
            "invalid input path {}",
            config.input_path.display()
        )));
    }
    if let Some(dir) = &config.template_path {
        if !dir.is_dir() {
            return Err(RunError::Config(format!(
                "invalid template path {}",
                dir.display()
            )));
        }
    }
    Ok(config)
}

fn absolute(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() || path.as_os_str().is_empty() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

pub fn parse(text: &str) -> Result<Config, RunError> {
    let mut config = Config::default();
    // build everything unless the export key narrows it down
    for profile in Profile::ALL {
        config.build[profile] = true;
    }

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        match key {
            "author" => config.author = value.to_string(),
            "input" => config.input_path = PathBuf::from(value),
            "templates" => config.template_path = Some(PathBuf::from(value)),
            "version" => {
                config.version = value
                    .parse()
                    .map_err(|_| RunError::Config(format!("invalid version `{value}`")))?;
            }
            "hppext" => config.hpp_ext = value.to_string(),
            "cppext" => config.cpp_ext = value.to_string(),
            "composite" => {
                config.composite = matches!(value, "true" | "yes" | "1");
            }
            "export" => {
                for profile in Profile::ALL {
                    config.build[profile] = false;
                }
                for token in value
                    .split(|c: char| c == ',' || c.is_whitespace())
                    .filter(|t| !t.is_empty())
                {
                    if token == "all" {
                        for profile in Profile::ALL {
                            config.build[profile] = true;
                        }
                    } else if let Some(profile) = Profile::from_name(token) {
                        config.build[profile] = true;
                    } else {
                        return Err(RunError::Config(format!("unknown export target `{token}`")));
                    }
                }
            }
            _ => {
                let Some((prefix, rest)) = key.split_once('.') else {
                    return Err(RunError::Config(format!("unknown key `{key}`")));
                };
                let Some(profile) = Profile::from_name(prefix) else {
                    return Err(RunError::Config(format!("unknown key `{key}`")));
                };
                match rest {
                    "namespace" => config.namespaces[profile] = value.to_string(),
                    "output" => {
                        config.out_headers[profile] = PathBuf::from(value);
                        config.out_sources[profile] = PathBuf::from(value);
                    }
                    "output.headers" => config.out_headers[profile] = PathBuf::from(value),
                    "output.sources" => config.out_sources[profile] = PathBuf::from(value),
                    "output.includes" => config.include_paths[profile] = value.to_string(),
                    _ => return Err(RunError::Config(format!("unknown key `{key}`"))),
                }
            }
        }
    }
    Ok(config)
}
