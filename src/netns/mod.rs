//! Network namespace switching
//!
//! The active network namespace belongs to the OS thread, not to a task. A
//! switch must therefore stay on one thread from enter to restore: the guard
//! is `!Send`, and async callers go through [`run_pinned`].

mod guard;
mod pinned;

pub use guard::NetnsGuard;
pub use pinned::run_pinned;

use crate::{Error, Result};
use nix::sched::{setns, CloneFlags};
use std::cell::Cell;
use std::fmt;
use std::fs::File;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Directory where `ip netns` bind-mounts named namespaces
pub const NAMED_NETNS_DIR: &str = "/var/run/netns";

/// Depth value marking a thread left in a foreign namespace by a failed restore
const STRANDED: u32 = u32::MAX;

thread_local! {
    static SWITCH_DEPTH: Cell<u32> = const { Cell::new(0) };
}

/// Number of guards currently held on this thread. Guards nest: a chain may
/// enter one namespace and, further down, switch into another.
pub fn switch_depth() -> u32 {
    SWITCH_DEPTH.with(|d| d.get())
}

/// Whether this thread is currently outside its original namespace, or was
/// left stranded by a failed restore.
pub fn switch_pending() -> bool {
    switch_depth() != 0
}

/// Whether a failed restore left this thread in the wrong namespace for good
pub fn is_stranded() -> bool {
    switch_depth() == STRANDED
}

pub(crate) fn push_switch() {
    SWITCH_DEPTH.with(|d| {
        if d.get() != STRANDED {
            d.set(d.get().saturating_add(1).min(STRANDED - 1));
        }
    });
}

pub(crate) fn pop_switch() {
    SWITCH_DEPTH.with(|d| {
        if d.get() != STRANDED {
            d.set(d.get().saturating_sub(1));
        }
    });
}

pub(crate) fn mark_stranded() {
    SWITCH_DEPTH.with(|d| d.set(STRANDED));
}

/// Open handle to a network namespace.
///
/// Two handles are equal when they refer to the same namespace inode,
/// however they were opened.
#[derive(Clone)]
pub struct NetnsHandle {
    file: Arc<File>,
    path: PathBuf,
    dev: u64,
    ino: u64,
}

impl NetnsHandle {
    /// Namespace of the calling thread
    pub fn current() -> Result<Self> {
        Self::from_path("/proc/thread-self/ns/net")
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            Error::NamespaceSwitch(format!("failed to open {}: {}", path.display(), e))
        })?;
        let meta = file.metadata().map_err(|e| {
            Error::NamespaceSwitch(format!("failed to stat {}: {}", path.display(), e))
        })?;
        Ok(Self {
            file: Arc::new(file),
            path: path.to_path_buf(),
            dev: meta.dev(),
            ino: meta.ino(),
        })
    }

    /// Namespace created with `ip netns add <name>`
    pub fn from_name(name: &str) -> Result<Self> {
        if name.is_empty() || name.contains('/') {
            return Err(Error::NamespaceSwitch(format!(
                "invalid namespace name {:?}",
                name
            )));
        }
        Self::from_path(Path::new(NAMED_NETNS_DIR).join(name))
    }

    /// Namespace of a running process
    pub fn from_pid(pid: u32) -> Result<Self> {
        Self::from_path(format!("/proc/{}/ns/net", pid))
    }
}

impl PartialEq for NetnsHandle {
    fn eq(&self, other: &Self) -> bool {
        self.dev == other.dev && self.ino == other.ino
    }
}

impl Eq for NetnsHandle {}

impl fmt::Debug for NetnsHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NetnsHandle({} net:[{}])", self.path.display(), self.ino)
    }
}

impl fmt::Display for NetnsHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "net:[{}]", self.ino)
    }
}

/// Reads and sets the calling thread's network namespace
pub trait NamespaceSwitcher {
    type Handle;

    fn current(&self) -> Result<Self::Handle>;

    /// Move the calling thread into `target`
    fn switch_to(&self, target: &Self::Handle) -> Result<()>;
}

/// Switcher backed by `setns(2)`. Needs CAP_SYS_ADMIN.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinuxNetns;

impl NamespaceSwitcher for LinuxNetns {
    type Handle = NetnsHandle;

    fn current(&self) -> Result<NetnsHandle> {
        NetnsHandle::current()
    }

    fn switch_to(&self, target: &NetnsHandle) -> Result<()> {
        setns(&*target.file, CloneFlags::CLONE_NEWNET)
            .map_err(|e| Error::NamespaceSwitch(format!("setns to {}: {}", target, e)))
    }
}
