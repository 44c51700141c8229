//! Store commands issued by the cache and the raw replies they produce.

use crate::config::ProtocolProfile;
use crate::error::{Error, Result};
use std::fmt;

/// Relative expiry of a written entry, in whole seconds. Never zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Expiry(u64);

impl Expiry {
    /// Map a cache TTL onto a store expiry. A TTL of 0 means "never expire".
    pub fn from_ttl(ttl_seconds: u64) -> Option<Expiry> {
        if ttl_seconds == 0 {
            None
        } else {
            Some(Expiry(ttl_seconds))
        }
    }

    pub fn seconds(&self) -> u64 {
        self.0
    }
}

/// Whether a write may replace an existing entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteCondition {
    /// Plain `set`: always overwrite.
    Always,
    /// `add`: write only when the key is absent (`NX`).
    IfAbsent,
}

/// A single store command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Get {
        key: &'a str,
    },
    /// `SET key value [EX seconds] [NX]`
    Set {
        key: &'a str,
        value: &'a [u8],
        expiry: Option<Expiry>,
        condition: WriteCondition,
    },
    /// `SETEX key seconds value`, for profiles without `SET` options.
    SetEx {
        key: &'a str,
        expiry: Expiry,
        value: &'a [u8],
    },
    /// `SETNX key value`, for profiles without `SET` options.
    SetNx {
        key: &'a str,
        value: &'a [u8],
    },
    Del {
        key: &'a str,
    },
    MGet {
        keys: &'a [&'a str],
    },
    Select {
        database: u32,
    },
    FlushDb,
    Ping,
}

impl<'a> Command<'a> {
    /// Build the write command for `set` (`Always`) and `add` (`IfAbsent`).
    ///
    /// This is the only place a TTL becomes store syntax.
    ///
    /// # Errors
    /// `Error::Unsupported` for an expiring `add` under a profile without
    /// `SET` options: `SETNX` followed by `EXPIRE` would not be atomic.
    pub fn write(
        key: &'a str,
        value: &'a [u8],
        ttl_seconds: u64,
        condition: WriteCondition,
        profile: ProtocolProfile,
    ) -> Result<Command<'a>> {
        let expiry = Expiry::from_ttl(ttl_seconds);

        if profile.supports_set_options() {
            return Ok(Command::Set {
                key,
                value,
                expiry,
                condition,
            });
        }

        match (expiry, condition) {
            (None, WriteCondition::Always) => Ok(Command::Set {
                key,
                value,
                expiry: None,
                condition,
            }),
            (Some(expiry), WriteCondition::Always) => Ok(Command::SetEx { key, expiry, value }),
            (None, WriteCondition::IfAbsent) => Ok(Command::SetNx { key, value }),
            (Some(_), WriteCondition::IfAbsent) => Err(Error::Unsupported(format!(
                "add with expiry needs SET .. EX .. NX, not available in profile {}",
                profile
            ))),
        }
    }

    /// Command name as sent on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Get { .. } => "GET",
            Command::Set { .. } => "SET",
            Command::SetEx { .. } => "SETEX",
            Command::SetNx { .. } => "SETNX",
            Command::Del { .. } => "DEL",
            Command::MGet { .. } => "MGET",
            Command::Select { .. } => "SELECT",
            Command::FlushDb => "FLUSHDB",
            Command::Ping => "PING",
        }
    }

    /// Arguments following the command name, in wire order.
    pub fn args(&self) -> Vec<Vec<u8>> {
        match self {
            Command::Get { key } | Command::Del { key } => vec![key.as_bytes().to_vec()],
            Command::Set {
                key,
                value,
                expiry,
                condition,
            } => {
                let mut args = vec![key.as_bytes().to_vec(), value.to_vec()];
                if let Some(expiry) = expiry {
                    args.push(b"EX".to_vec());
                    args.push(expiry.seconds().to_string().into_bytes());
                }
                if *condition == WriteCondition::IfAbsent {
                    args.push(b"NX".to_vec());
                }
                args
            }
            Command::SetEx { key, expiry, value } => vec![
                key.as_bytes().to_vec(),
                expiry.seconds().to_string().into_bytes(),
                value.to_vec(),
            ],
            Command::SetNx { key, value } => vec![key.as_bytes().to_vec(), value.to_vec()],
            Command::MGet { keys } => keys.iter().map(|k| k.as_bytes().to_vec()).collect(),
            Command::Select { database } => vec![database.to_string().into_bytes()],
            Command::FlushDb | Command::Ping => Vec::new(),
        }
    }
}

/// Log form: values are shown by size only.
impl fmt::Display for Command<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Get { key } | Command::Del { key } => write!(f, "{} {}", self.name(), key),
            Command::Set {
                key,
                value,
                expiry,
                condition,
            } => {
                write!(f, "SET {} <{} bytes>", key, value.len())?;
                if let Some(expiry) = expiry {
                    write!(f, " EX {}", expiry.seconds())?;
                }
                if *condition == WriteCondition::IfAbsent {
                    write!(f, " NX")?;
                }
                Ok(())
            }
            Command::SetEx { key, expiry, value } => {
                write!(f, "SETEX {} {} <{} bytes>", key, expiry.seconds(), value.len())
            }
            Command::SetNx { key, value } => write!(f, "SETNX {} <{} bytes>", key, value.len()),
            Command::MGet { keys } => write!(f, "MGET <{} keys>", keys.len()),
            Command::Select { database } => write!(f, "SELECT {}", database),
            Command::FlushDb | Command::Ping => write!(f, "{}", self.name()),
        }
    }
}

/// Raw store reply, before the cache interprets it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    Nil,
    Status(String),
    Integer(i64),
    Bulk(Vec<u8>),
    Array(Vec<Reply>),
}

impl Reply {
    pub fn ok() -> Reply {
        Reply::Status("OK".to_string())
    }

    /// The `+OK` status reply.
    pub fn is_ok(&self) -> bool {
        matches!(self, Reply::Status(status) if status == "OK")
    }

    /// Short description for error messages.
    pub fn kind(&self) -> String {
        match self {
            Reply::Nil => "nil".to_string(),
            Reply::Status(status) => format!("status {:?}", status),
            Reply::Integer(n) => format!("integer {}", n),
            Reply::Bulk(bytes) => format!("bulk <{} bytes>", bytes.len()),
            Reply::Array(items) => format!("array of {}", items.len()),
        }
    }
}
