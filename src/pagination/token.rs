//! Structured custom ids for pagination components.
//!
//! A token carries the action, the owning user and the session key so that an
//! incoming component event can be authenticated by comparison alone.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

const TOKEN_PREFIX: &str = "pg";
/// Discord rejects custom ids longer than this.
pub const MAX_CUSTOM_ID_LEN: usize = 100;

/// What a component asks the controller to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Prev,
    Next,
    Stop,
    Select,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Prev => "prev",
            ActionKind::Next => "next",
            ActionKind::Stop => "stop",
            ActionKind::Select => "select",
        }
    }
}

impl FromStr for ActionKind {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prev" => Ok(ActionKind::Prev),
            "next" => Ok(ActionKind::Next),
            "stop" => Ok(ActionKind::Stop),
            "select" => Ok(ActionKind::Select),
            other => Err(TokenError::UnknownAction(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("custom id is not a pagination token")]
    NotPagination,
    #[error("unknown pagination action `{0}`")]
    UnknownAction(String),
    #[error("malformed owner id `{0}`")]
    BadOwner(String),
    #[error("pagination token is missing the {0} segment")]
    Missing(&'static str),
    #[error("pagination token has trailing segments")]
    Trailing,
}

/// Parsed form of `pg:<kind>:<owner_id>:<session>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentToken {
    pub kind: ActionKind,
    pub owner_id: u64,
    pub session: String,
}

impl ComponentToken {
    pub fn new(kind: ActionKind, owner_id: u64, session: impl Into<String>) -> Self {
        Self {
            kind,
            owner_id,
            session: session.into(),
        }
    }

    /// Serialized custom id for this token.
    pub fn custom_id(&self) -> String {
        self.to_string()
    }

    /// Whether the token was minted for `session` and `owner_id`.
    pub fn belongs_to(&self, session: &str, owner_id: u64) -> bool {
        self.session == session && self.owner_id == owner_id
    }
}

impl fmt::Display for ComponentToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{TOKEN_PREFIX}:{}:{}:{}",
            self.kind.as_str(),
            self.owner_id,
            self.session
        )
    }
}

impl FromStr for ComponentToken {
    type Err = TokenError;

    fn from_str(custom_id: &str) -> Result<Self, Self::Err> {
        let mut parts = custom_id.split(':');

        if parts.next() != Some(TOKEN_PREFIX) {
            return Err(TokenError::NotPagination);
        }

        let kind = parts.next().ok_or(TokenError::Missing("action"))?.parse()?;
        let owner = parts.next().ok_or(TokenError::Missing("owner"))?;
        let owner_id = owner
            .parse::<u64>()
            .map_err(|_| TokenError::BadOwner(owner.to_string()))?;
        let session = parts.next().ok_or(TokenError::Missing("session"))?;
        if session.is_empty() {
            return Err(TokenError::Missing("session"));
        }

        if parts.next().is_some() {
            return Err(TokenError::Trailing);
        }

        Ok(Self {
            kind,
            owner_id,
            session: session.to_string(),
        })
    }
}
