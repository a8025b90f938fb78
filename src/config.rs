//! Repository configuration: a flat `dotted.key=value` property file,
//! mirroring `.got/config`.

use std::collections::BTreeMap;

use crate::error::{Error, Result};

const DEFAULT_BRANCH: &str = "main";
const DEFAULT_MAX_CACHE: &str = "1000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub user_owner: Option<String>,
    pub bare: bool,
    pub branch: String,
    pub core_bare: bool,
    pub core_filemode: bool,
    pub max_cache: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            user_name: None,
            user_email: None,
            user_owner: None,
            bare: false,
            branch: DEFAULT_BRANCH.to_string(),
            core_bare: false,
            core_filemode: true,
            max_cache: DEFAULT_MAX_CACHE.parse().unwrap(),
        }
    }
}

impl Config {
    /// Serializes in a fixed key order so the file is stable across writes.
    pub fn marshal(&self) -> Result<Vec<u8>> {
        let mut out = String::new();
        if let Some(v) = &self.user_name {
            out.push_str(&format!("user.name={v}\n"));
        }
        if let Some(v) = &self.user_email {
            out.push_str(&format!("user.email={v}\n"));
        }
        if let Some(v) = &self.user_owner {
            out.push_str(&format!("user.owner={v}\n"));
        }
        out.push_str(&format!("bare={}\n", self.bare));
        out.push_str(&format!("branch={}\n", self.branch));
        out.push_str(&format!("core.bare={}\n", self.core_bare));
        out.push_str(&format!("core.filemode={}\n", self.core_filemode));
        out.push_str(&format!("max_cache={}\n", self.max_cache));
        Ok(out.into_bytes())
    }

    pub fn unmarshal(bytes: &[u8]) -> Result<Config> {
        let text = std::str::from_utf8(bytes)
            .map_err(|_| Error::MalformedObject("config is not utf-8".into()))?;

        let mut kv = BTreeMap::new();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (key, value) = line.split_once('=').ok_or_else(|| {
                Error::MalformedObject(format!("config line {}: missing `=`", lineno + 1))
            })?;
            kv.insert(key.trim().to_string(), value.trim().to_string());
        }

        let mut config = Config::default();
        if let Some(v) = kv.remove("user.name") {
            config.user_name = Some(v);
        }
        if let Some(v) = kv.remove("user.email") {
            config.user_email = Some(v);
        }
        if let Some(v) = kv.remove("user.owner") {
            config.user_owner = Some(v);
        }
        if let Some(v) = kv.remove("bare") {
            config.bare = parse_bool(&v)?;
        }
        if let Some(v) = kv.remove("branch") {
            config.branch = v;
        }
        if let Some(v) = kv.remove("core.bare") {
            config.core_bare = parse_bool(&v)?;
        }
        if let Some(v) = kv.remove("core.filemode") {
            config.core_filemode = parse_bool(&v)?;
        }
        if let Some(v) = kv.remove("max_cache") {
            config.max_cache = v
                .parse()
                .map_err(|_| Error::MalformedObject(format!("max_cache is not a number: {v}")))?;
        }
        Ok(config)
    }
}

fn parse_bool(v: &str) -> Result<bool> {
    match v {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(Error::MalformedObject(format!("not a bool: {other}"))),
    }
}
