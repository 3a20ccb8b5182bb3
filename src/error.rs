use crate::host::AddressFamily;
use std::io;
use std::net::IpAddr;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("unable to find interface with IP address {ip}")]
    NotFound { ip: IpAddr },

    #[error("no usable tunnel IP found")]
    NoUsableAddress,

    #[error("malformed {table}: {reason}")]
    MalformedKernelTable { table: String, reason: String },

    #[error("no {family} default route in kernel table")]
    NoDefaultRoute { family: AddressFamily },

    #[error("host query failed: {0}")]
    OsQuery(String),

    #[error("namespace switch failed: {0}")]
    NamespaceSwitch(String),

    #[error("namespace restore failed: {0}")]
    NamespaceRestore(String),

    #[error("chain element failed: {0}")]
    Chain(String),

    #[error("worker thread failed: {0}")]
    Worker(String),
}

impl Error {
    pub(crate) fn malformed(table: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedKernelTable {
            table: table.into(),
            reason: reason.into(),
        }
    }

    /// A failed restore leaves the thread in the wrong namespace; the thread
    /// must not be reused.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::NamespaceRestore(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
