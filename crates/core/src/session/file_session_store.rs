//! Cookie-jar style session persistence in a JSON file.
//!
//! Each entry carries its own expiry, like a browser cookie. The token entry
//! expires with the server-issued token; the user profile is stored as a
//! base64-encoded JSON blob next to it.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::PathBuf, sync::Mutex};

use super::session_model::Session;
use super::session_traits::SessionStore;
use crate::constants::{DEFAULT_COOKIE_TOKEN, DEFAULT_COOKIE_USERDATA, LOCALE_COOKIE};
use crate::errors::{Error, Result};
use crate::users::User;

const CURRENT_VERSION: u32 = 1;

/// Names of the jar entries holding the token and the user profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieNames {
    pub token: String,
    pub user_data: String,
}

impl Default for CookieNames {
    fn default() -> Self {
        Self {
            token: DEFAULT_COOKIE_TOKEN.to_string(),
            user_data: DEFAULT_COOKIE_USERDATA.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CookieEntry {
    value: String,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    expires: Option<DateTime<Utc>>,
}

impl CookieEntry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires.map_or(true, |expires| expires > now)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CookieJar {
    version: u32,
    #[serde(default)]
    cookies: BTreeMap<String, CookieEntry>,
}

#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    names: CookieNames,
    lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(path: PathBuf, names: CookieNames) -> Self {
        Self {
            path,
            names,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn with_jar<F>(&self, op: F) -> Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, CookieEntry>),
    {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| Error::Session("Session store lock poisoned".into()))?;
        let mut jar = self.load_jar_locked()?;
        op(&mut jar);
        jar.retain(|_, entry| entry.is_live(Utc::now()));
        self.persist_jar_locked(jar)
    }

    fn read_jar(&self) -> Result<BTreeMap<String, CookieEntry>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| Error::Session("Session store lock poisoned".into()))?;
        let now = Utc::now();
        let mut jar = self.load_jar_locked()?;
        jar.retain(|_, entry| entry.is_live(now));
        Ok(jar)
    }

    fn load_jar_locked(&self) -> Result<BTreeMap<String, CookieEntry>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = fs::read(&self.path)?;
        if raw.is_empty() {
            return Ok(BTreeMap::new());
        }
        let jar: CookieJar = match serde_json::from_slice(&raw) {
            Ok(jar) => jar,
            Err(e) => {
                warn!(
                    "Ignoring unreadable session file {}: {}",
                    self.path.display(),
                    e
                );
                return Ok(BTreeMap::new());
            }
        };
        if jar.version != CURRENT_VERSION {
            warn!(
                "Ignoring session file {} with unsupported version {}",
                self.path.display(),
                jar.version
            );
            return Ok(BTreeMap::new());
        }
        Ok(jar.cookies)
    }

    fn persist_jar_locked(&self, cookies: BTreeMap<String, CookieEntry>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let jar = CookieJar {
            version: CURRENT_VERSION,
            cookies,
        };
        let json = serde_json::to_string_pretty(&jar)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>> {
        let jar = self.read_jar()?;
        let (Some(token), Some(user_data)) =
            (jar.get(&self.names.token), jar.get(&self.names.user_data))
        else {
            return Ok(None);
        };
        let Some(expiration) = token.expires else {
            warn!("Stored token has no expiry; discarding it");
            return Ok(None);
        };
        let user = decode_user(&user_data.value)?;
        debug!("Restored session for {}", user.username);
        Ok(Some(Session {
            token: token.value.clone(),
            expiration,
            user,
        }))
    }

    fn save(&self, session: &Session) -> Result<()> {
        let user_data = encode_user(&session.user)?;
        self.with_jar(|jar| {
            jar.insert(
                self.names.token.clone(),
                CookieEntry {
                    value: session.token.clone(),
                    expires: Some(session.expiration),
                },
            );
            jar.insert(
                self.names.user_data.clone(),
                CookieEntry {
                    value: user_data,
                    expires: Some(session.expiration),
                },
            );
        })
    }

    fn clear(&self) -> Result<()> {
        self.with_jar(|jar| {
            jar.remove(&self.names.token);
            jar.remove(&self.names.user_data);
        })
    }

    fn load_locale(&self) -> Result<Option<String>> {
        Ok(self
            .read_jar()?
            .get(LOCALE_COOKIE)
            .map(|entry| entry.value.clone()))
    }

    fn save_locale(&self, locale: &str) -> Result<()> {
        self.with_jar(|jar| {
            jar.insert(
                LOCALE_COOKIE.to_string(),
                CookieEntry {
                    value: locale.to_string(),
                    expires: None,
                },
            );
        })
    }
}

fn encode_user(user: &User) -> Result<String> {
    Ok(BASE64.encode(serde_json::to_vec(user)?))
}

fn decode_user(encoded: &str) -> Result<User> {
    let bytes = BASE64
        .decode(encoded.trim())
        .map_err(|e| Error::Session(format!("Failed to decode stored user data: {e}")))?;
    Ok(serde_json::from_slice(&bytes)?)
}
