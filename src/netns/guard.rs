//! Scoped namespace switch

use super::{is_stranded, mark_stranded, pop_switch, push_switch, NamespaceSwitcher};
use crate::{Error, Result};
use std::marker::PhantomData;
use tracing::{debug, error};

/// Holds the calling thread inside a target namespace until restored.
///
/// Call [`NetnsGuard::restore`] to return and observe failures. If the guard
/// is dropped instead (early return, panic) the drop restores; a failed
/// restore there aborts the process, since the thread can no longer be
/// trusted and there is no caller left to tell.
///
/// Guards nest. An inner guard captures the namespace the outer one entered
/// and returns there, so guards must be released in reverse order of entry.
#[must_use = "the namespace is restored when the guard is dropped"]
pub struct NetnsGuard<'a, S: NamespaceSwitcher> {
    switcher: &'a S,
    original: Option<S::Handle>,
    // Pins the guard to the thread whose namespace it changed.
    _not_send: PhantomData<*const ()>,
}

impl<'a, S: NamespaceSwitcher> NetnsGuard<'a, S> {
    /// Capture the current namespace and switch into `target`.
    ///
    /// Fails without switching if an earlier restore on this thread failed.
    /// If the switch itself fails the thread is put back before returning.
    pub fn enter(switcher: &'a S, target: &S::Handle) -> Result<Self> {
        if is_stranded() {
            return Err(Error::NamespaceSwitch(
                "thread was left in a foreign namespace by a failed restore".to_string(),
            ));
        }

        let original = switcher.current()?;
        push_switch();

        if let Err(e) = switcher.switch_to(target) {
            return match switcher.switch_to(&original) {
                Ok(()) => {
                    pop_switch();
                    Err(e)
                }
                Err(restore) => {
                    mark_stranded();
                    error!("Failed to restore network namespace after failed switch: {}", restore);
                    Err(Error::NamespaceRestore(reason(restore)))
                }
            };
        }

        debug!("Entered target network namespace");
        Ok(Self {
            switcher,
            original: Some(original),
            _not_send: PhantomData,
        })
    }

    /// Return to the captured namespace.
    ///
    /// On failure the thread is marked stranded: later guards and host
    /// queries on it are refused for the rest of its life.
    pub fn restore(mut self) -> Result<()> {
        let Some(original) = self.original.take() else {
            return Ok(());
        };
        if let Err(e) = self.switcher.switch_to(&original) {
            mark_stranded();
            return Err(Error::NamespaceRestore(reason(e)));
        }
        pop_switch();
        debug!("Restored original network namespace");
        Ok(())
    }
}

impl<S: NamespaceSwitcher> Drop for NetnsGuard<'_, S> {
    fn drop(&mut self) {
        let Some(original) = self.original.take() else {
            return;
        };
        if let Err(e) = self.switcher.switch_to(&original) {
            error!("Failed to restore network namespace: {}; aborting", e);
            std::process::abort();
        }
        pop_switch();
    }
}

fn reason(e: Error) -> String {
    match e {
        Error::NamespaceSwitch(r) | Error::NamespaceRestore(r) => r,
        other => other.to_string(),
    }
}
