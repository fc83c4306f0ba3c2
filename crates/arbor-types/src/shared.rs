use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

/// Shared, interior-mutable container handle.
///
/// Cloning a `Shared` clones the handle, not the contents. Two handles to the
/// same allocation report the same [`identity`](Shared::identity), which is
/// what cycle guards key on.
///
/// A container that stores a handle to itself forms a reference cycle and is
/// never freed.
pub struct Shared<T>(Rc<RefCell<T>>);

impl<T> Shared<T> {
    /// Wrap a value in a fresh handle.
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    /// Address of the shared allocation. Stable for the lifetime of the
    /// allocation and equal across all clones of this handle.
    pub fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    /// Returns `true` if both handles point to the same allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Immutably borrow the contents.
    ///
    /// # Panics
    ///
    /// Panics if the contents are currently mutably borrowed.
    pub fn borrow(&self) -> Ref<'_, T> {
        self.0.borrow()
    }

    /// Mutably borrow the contents.
    ///
    /// # Panics
    ///
    /// Panics if the contents are currently borrowed.
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.0.borrow_mut()
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shared(0x{:x})", self.identity())
    }
}
