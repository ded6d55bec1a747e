use std::fmt;
use std::sync::Arc;

/// The type identity of a port. An output can only be wired to an input whose
/// socket has exactly the same name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Socket {
    name: Arc<str>,
}

impl Socket {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self { name: name.into() }
    }

    /// The socket carried by execution ports.
    pub fn exec() -> Self {
        Self::new("exec")
    }

    /// The socket carried by text-valued data ports.
    pub fn text() -> Self {
        Self::new("text")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_compatible_with(&self, other: &Socket) -> bool {
        self.name == other.name
    }
}

impl fmt::Display for Socket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
