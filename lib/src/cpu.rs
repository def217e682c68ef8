//! Interrupt flag management: irqsave/irqrestore.
//!
//! On bare-metal x86_64 the interrupt flag is toggled directly. Every other
//! target gets its masking from the platform, which registers a save/restore
//! pair with [`register_irq_control`]. Until one is registered both calls are
//! no-ops, which is what a single-threaded host simulation wants.

use core::ptr;
use core::sync::atomic::{AtomicPtr, Ordering};

/// Mask interrupts and return an opaque token describing the previous state.
pub type IrqSaveFn = fn() -> usize;

/// Restore the interrupt state captured by an [`IrqSaveFn`].
pub type IrqRestoreFn = fn(usize);

static SAVE_HOOK: AtomicPtr<()> = AtomicPtr::new(ptr::null_mut());
static RESTORE_HOOK: AtomicPtr<()> = AtomicPtr::new(ptr::null_mut());

/// Install the platform's interrupt masking primitives.
///
/// Typically called once by board init, before any driver is constructed.
pub fn register_irq_control(save: IrqSaveFn, restore: IrqRestoreFn) {
    RESTORE_HOOK.store(restore as *mut (), Ordering::Release);
    SAVE_HOOK.store(save as *mut (), Ordering::Release);
}

/// Save the interrupt state and mask interrupts (irqsave pattern).
#[cfg(all(target_arch = "x86_64", target_os = "none"))]
#[inline(always)]
pub fn save_flags_cli() -> usize {
    let enabled = x86_64::instructions::interrupts::are_enabled();
    x86_64::instructions::interrupts::disable();
    enabled as usize
}

/// Restore the interrupt state from a saved token (irqrestore pattern).
/// Only re-enables interrupts if they were enabled when saved.
#[cfg(all(target_arch = "x86_64", target_os = "none"))]
#[inline(always)]
pub fn restore_flags(flags: usize) {
    if flags != 0 {
        x86_64::instructions::interrupts::enable();
    }
}

/// Save the interrupt state and mask interrupts (irqsave pattern).
#[cfg(not(all(target_arch = "x86_64", target_os = "none")))]
#[inline]
pub fn save_flags_cli() -> usize {
    let hook = SAVE_HOOK.load(Ordering::Acquire);
    if hook.is_null() {
        return 0;
    }
    // SAFETY: `register_irq_control` only stores valid `IrqSaveFn` pointers.
    let save: IrqSaveFn = unsafe { core::mem::transmute(hook) };
    save()
}

/// Restore the interrupt state from a saved token (irqrestore pattern).
#[cfg(not(all(target_arch = "x86_64", target_os = "none")))]
#[inline]
pub fn restore_flags(flags: usize) {
    let hook = RESTORE_HOOK.load(Ordering::Acquire);
    if hook.is_null() {
        return;
    }
    // SAFETY: `register_irq_control` only stores valid `IrqRestoreFn` pointers.
    let restore: IrqRestoreFn = unsafe { core::mem::transmute(hook) };
    restore(flags);
}

/// Run `f` with interrupts masked.
#[inline]
pub fn without_interrupts<R>(f: impl FnOnce() -> R) -> R {
    let saved = save_flags_cli();
    let ret = f();
    restore_flags(saved);
    ret
}
