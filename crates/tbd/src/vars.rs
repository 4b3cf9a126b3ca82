//! Variable sources: built-in variables and user variable files.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use tbd_template::Value;
use thiserror::Error;

use crate::fetch::{self, FetchError};
use crate::vcs;

pub const TIMESTAMP: &str = "TIMESTAMP";
pub const OS: &str = "OS";
pub const ARCH: &str = "ARCH";

/// The variables available to templates, sorted by name.
pub type Vars = BTreeMap<String, Value>;

#[derive(Debug, Error)]
pub enum VarsError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("{uri}: {source}")]
    Dotenv {
        uri: String,
        #[source]
        source: dotenvy::Error,
    },

    #[error("{uri}: invalid JSON: {source}")]
    Json {
        uri: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{uri}: expected a JSON object at the top level")]
    NotAnObject { uri: String },

    #[error("{uri}: not valid UTF-8")]
    InvalidUtf8 { uri: String },
}

/// Built-in variables: `TIMESTAMP`, `OS`, `ARCH`, plus the git metadata of
/// the repository containing `dir`, if any.
pub fn builtin_vars(dir: Option<&Path>) -> Vars {
    let mut meta = BTreeMap::new();
    meta.insert(
        TIMESTAMP.to_string(),
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    );
    meta.insert(OS.to_string(), std::env::consts::OS.to_string());
    meta.insert(ARCH.to_string(), std::env::consts::ARCH.to_string());

    if let Some(dir) = dir {
        vcs::repo_metadata(dir, &mut meta);
    }

    meta.into_iter().map(|(k, v)| (k, Value::Text(v))).collect()
}

/// Loads each variable file in order into `vars`; later files override
/// earlier keys.
///
/// Files whose location ends in `.json` hold a JSON object; everything else
/// is parsed as dotenv.
pub fn load_user_vars<S: AsRef<str>>(
    vars: &mut Vars,
    sources: &[S],
    max_size: u64,
) -> Result<(), VarsError> {
    for uri in sources {
        let uri = uri.as_ref();
        let data = fetch::fetch(uri, max_size)?;
        let text = String::from_utf8(data).map_err(|_| VarsError::InvalidUtf8 {
            uri: uri.to_string(),
        })?;
        let before = vars.len();
        if is_json(uri) {
            parse_json_into(&text, uri, vars)?;
        } else {
            parse_dotenv_into(&text, uri, vars)?;
        }
        tracing::debug!(uri, added = vars.len() - before, "loaded variables");
    }
    Ok(())
}

fn is_json(uri: &str) -> bool {
    let path = uri.split(['?', '#']).next().unwrap_or(uri);
    path.to_ascii_lowercase().ends_with(".json")
}

/// Parses dotenv text without touching the process environment.
///
/// `${NAME}` references resolve against the process environment first, then
/// against keys defined earlier in the same file.
fn parse_dotenv_into(text: &str, uri: &str, vars: &mut Vars) -> Result<(), VarsError> {
    for entry in dotenvy::from_read_iter(text.as_bytes()) {
        let (key, value) = entry.map_err(|source| VarsError::Dotenv {
            uri: uri.to_string(),
            source,
        })?;
        vars.insert(key, Value::Text(value));
    }
    Ok(())
}

fn parse_json_into(text: &str, uri: &str, vars: &mut Vars) -> Result<(), VarsError> {
    let doc: serde_json::Value = serde_json::from_str(text).map_err(|source| VarsError::Json {
        uri: uri.to_string(),
        source,
    })?;
    let serde_json::Value::Object(object) = doc else {
        return Err(VarsError::NotAnObject {
            uri: uri.to_string(),
        });
    };
    vars.extend(object.into_iter().map(|(k, v)| (k, Value::from(v))));
    Ok(())
}
