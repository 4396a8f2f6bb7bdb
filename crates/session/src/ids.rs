//! Strongly typed identifiers for sessions, searches and local players.

use core::fmt;
use std::borrow::Borrow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Generic generator for incrementing ids.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    counter: Arc<AtomicU64>,
}

impl IdGenerator {
    pub fn new(start: u64) -> Self {
        Self {
            counter: Arc::new(AtomicU64::new(start)),
        }
    }

    #[inline]
    pub fn next(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new(1)
    }
}

macro_rules! id_type {
    ($name:ident, $repr:ty) => {
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name($repr);

        impl $name {
            pub const fn new(value: $repr) -> Self {
                Self(value)
            }

            pub const fn get(self) -> $repr {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(SearchId, u64);
id_type!(UserIndex, u32);

impl SearchId {
    /// Draws the next search id from `generator`.
    pub fn next(generator: &IdGenerator) -> Self {
        Self(generator.next())
    }
}

/// Name under which the backend tracks a session (e.g. `GameSession`).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionName(String);

impl SessionName {
    /// Well-known name used for the one session a game instance hosts or joins.
    pub const GAME_SESSION: &'static str = "GameSession";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn game_session() -> Self {
        Self::new(Self::GAME_SESSION)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionName {
    fn default() -> Self {
        Self::game_session()
    }
}

impl fmt::Display for SessionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for SessionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionName({})", self.0)
    }
}

impl From<&str> for SessionName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SessionName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for SessionName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Identity of the online subsystem behind a backend (`NULL`, `STEAM`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubsystemName(String);

impl SubsystemName {
    /// Offline subsystem; sessions are discovered over the local network only.
    pub const NULL: &'static str = "NULL";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn null() -> Self {
        Self::new(Self::NULL)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the offline subsystem, which forces LAN sessions.
    pub fn is_null(&self) -> bool {
        self.0.eq_ignore_ascii_case(Self::NULL)
    }
}

impl fmt::Display for SubsystemName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
