//! MenuContext struct and global state accessor.
//!
//! The context owns every menu (and every menu still being described) created
//! through the C ABI. A single global instance is managed via `menu_init()` /
//! `menu_shutdown()`.

use std::collections::HashMap;
use std::ffi::CString;
use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard, OnceLock};
#[cfg(not(test))]
use std::thread::ThreadId;

use crate::error::{MenuError, Result};
use crate::menu::{MenuBuilder, PopupMenu};

/// A menu whose rows are still being added by the host.
#[derive(Debug, Default)]
pub struct PendingMenu {
    pub builder: MenuBuilder,
    pub controller_height: u16,
}

#[derive(Debug)]
pub struct MenuContext {
    pub menus: HashMap<u32, PopupMenu>,
    pub pending: HashMap<u32, PendingMenu>,
    pub next_handle: u32,
}

impl MenuContext {
    pub fn new() -> Self {
        Self {
            menus: HashMap::new(),
            pending: HashMap::new(),
            next_handle: 1, // Handle(0) is permanently invalid
        }
    }

    /// Allocate a handle. Handles are never recycled.
    pub fn allocate_handle(&mut self) -> u32 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }

    pub fn menu(&self, handle: u32) -> Result<&PopupMenu> {
        self.menus
            .get(&handle)
            .ok_or(MenuError::InvalidHandle(handle))
    }

    pub fn menu_mut(&mut self, handle: u32) -> Result<&mut PopupMenu> {
        self.menus
            .get_mut(&handle)
            .ok_or(MenuError::InvalidHandle(handle))
    }

    pub fn pending_mut(&mut self, handle: u32) -> Result<&mut PendingMenu> {
        self.pending
            .get_mut(&handle)
            .ok_or(MenuError::InvalidHandle(handle))
    }
}

impl Default for MenuContext {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Global State
// ============================================================================

static CONTEXT: OnceLock<Mutex<Option<MenuContext>>> = OnceLock::new();
static LAST_ERROR: OnceLock<Mutex<Option<CString>>> = OnceLock::new();
#[cfg(not(test))]
static OWNER_THREAD: OnceLock<Mutex<Option<ThreadId>>> = OnceLock::new();

fn context_lock() -> &'static Mutex<Option<MenuContext>> {
    CONTEXT.get_or_init(|| Mutex::new(None))
}

fn last_error_lock() -> &'static Mutex<Option<CString>> {
    LAST_ERROR.get_or_init(|| Mutex::new(None))
}

#[cfg(not(test))]
fn owner_thread_lock() -> &'static Mutex<Option<ThreadId>> {
    OWNER_THREAD.get_or_init(|| Mutex::new(None))
}

fn ensure_thread_affinity() -> Result<()> {
    #[cfg(test)]
    {
        return Ok(());
    }

    #[cfg(not(test))]
    {
        let current = std::thread::current().id();
        let owner = owner_thread_lock()
            .lock()
            .map_err(|_| MenuError::LockPoisoned("owner_thread"))?;
        match *owner {
            Some(owner_id) if owner_id != current => Err(MenuError::WrongThread),
            _ => Ok(()),
        }
    }
}

#[cfg(not(test))]
fn bind_owner_thread_current() -> Result<()> {
    let current = std::thread::current().id();
    let mut owner = owner_thread_lock()
        .lock()
        .map_err(|_| MenuError::LockPoisoned("owner_thread"))?;
    if let Some(owner_id) = *owner {
        if owner_id != current {
            return Err(MenuError::WrongThread);
        }
    }
    *owner = Some(current);
    Ok(())
}

#[cfg(test)]
fn bind_owner_thread_current() -> Result<()> {
    Ok(())
}

#[cfg(not(test))]
fn clear_owner_thread() -> Result<()> {
    let mut owner = owner_thread_lock()
        .lock()
        .map_err(|_| MenuError::LockPoisoned("owner_thread"))?;
    *owner = None;
    Ok(())
}

#[cfg(test)]
fn clear_owner_thread() -> Result<()> {
    Ok(())
}

pub struct ContextGuard<'a> {
    guard: MutexGuard<'a, Option<MenuContext>>,
}

impl Deref for ContextGuard<'_> {
    type Target = MenuContext;

    fn deref(&self) -> &Self::Target {
        self.guard
            .as_ref()
            .expect("ContextGuard is only constructed for initialized context")
    }
}

impl DerefMut for ContextGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.guard
            .as_mut()
            .expect("ContextGuard is only constructed for initialized context")
    }
}

/// Lock the global context.
pub fn context() -> Result<ContextGuard<'static>> {
    ensure_thread_affinity()?;
    let guard = context_lock()
        .lock()
        .map_err(|_| MenuError::LockPoisoned("context"))?;
    if guard.is_none() {
        return Err(MenuError::ContextNotInitialized);
    }
    Ok(ContextGuard { guard })
}

/// Initialize the global context.
pub fn init_context() -> Result<()> {
    ensure_thread_affinity()?;
    bind_owner_thread_current()?;

    let mut guard = context_lock()
        .lock()
        .map_err(|_| MenuError::LockPoisoned("context"))?;
    if guard.is_some() {
        return Err(MenuError::ContextAlreadyInitialized);
    }
    *guard = Some(MenuContext::new());
    Ok(())
}

/// Destroy the global context and every menu it owns. Returns how many live
/// menus were dropped.
pub fn destroy_context() -> Result<usize> {
    ensure_thread_affinity()?;
    let mut guard = context_lock()
        .lock()
        .map_err(|_| MenuError::LockPoisoned("context"))?;
    let dropped = guard.take().map_or(0, |ctx| ctx.menus.len());
    drop(guard);
    clear_owner_thread()?;
    Ok(dropped)
}

/// Store an error message (best-effort).
pub fn set_last_error(msg: String) {
    // Interior NULs would truncate the message on the C side anyway.
    let msg = CString::new(msg.replace('\0', " ")).unwrap_or_default();
    if let Ok(mut slot) = last_error_lock().lock() {
        *slot = Some(msg);
    }
}

pub fn clear_last_error() {
    if let Ok(mut slot) = last_error_lock().lock() {
        *slot = None;
    }
}

/// Pointer to the NUL-terminated last error, valid until the next error is
/// stored or cleared. Null when there is none.
pub fn last_error_ptr() -> *const std::os::raw::c_char {
    match last_error_lock().lock() {
        Ok(slot) => slot.as_ref().map_or(std::ptr::null(), |s| s.as_ptr()),
        Err(_) => std::ptr::null(),
    }
}
