//! Keys under which services are registered.

use std::any::TypeId;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Identifies one registration in a [`Container`](crate::Container).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DiKey {
    /// A well-known string name, e.g. `"vyuh.cms"`.
    Named(String),
    /// Keyed by the Rust type of the service.
    Type { id: TypeId, name: &'static str },
    /// A process-unique symbol. Two tokens never compare equal, even with
    /// the same label.
    Token { id: u64, label: &'static str },
}

impl DiKey {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Key for the service type `T`.
    pub fn of<T: 'static>() -> Self {
        Self::Type {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Mints a new process-unique key.
    pub fn unique(label: &'static str) -> Self {
        Self::Token {
            id: NEXT_TOKEN.fetch_add(1, Ordering::Relaxed),
            label,
        }
    }
}

impl From<&str> for DiKey {
    fn from(value: &str) -> Self {
        Self::Named(value.to_string())
    }
}

impl From<String> for DiKey {
    fn from(value: String) -> Self {
        Self::Named(value)
    }
}

impl From<&DiKey> for DiKey {
    fn from(value: &DiKey) -> Self {
        value.clone()
    }
}

impl fmt::Display for DiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::Type { name, .. } => write!(f, "type:{name}"),
            Self::Token { id, label } => write!(f, "token:{label}#{id}"),
        }
    }
}
