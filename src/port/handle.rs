// Move-only ownership of one boundary handle together with its paired release.
use std::marker::PhantomData;
use std::mem::ManuallyDrop;

/// A kind of boundary resource and the entry point that frees it.
pub(crate) trait Release {
    const KIND: &'static str;
    type Raw;

    /// # Safety
    /// `raw` must be a live handle of this kind that nothing else will release.
    unsafe fn release(raw: Self::Raw);
}

/// Sole owner of one raw handle of kind `K`.
///
/// Not `Clone`: a move transfers ownership and the moved-from binding can no longer release.
/// `Drop` calls `K::release` exactly once unless ownership was given up with `into_raw`.
pub(crate) struct Handle<K: Release> {
    raw: ManuallyDrop<K::Raw>,
    _kind: PhantomData<K>,
}

impl<K: Release> Handle<K> {
    /// # Safety
    /// The caller must own `raw`; the handle becomes its only owner.
    pub(crate) unsafe fn from_raw(raw: K::Raw) -> Self {
        Self {
            raw: ManuallyDrop::new(raw),
            _kind: PhantomData,
        }
    }

    pub(crate) fn as_raw(&self) -> &K::Raw {
        &self.raw
    }

    pub(crate) fn as_raw_mut(&mut self) -> &mut K::Raw {
        &mut self.raw
    }

    pub(crate) fn get(&self) -> K::Raw
    where
        K::Raw: Copy,
    {
        *self.raw
    }

    /// Gives up ownership without releasing; whoever receives `raw` must release it.
    pub(crate) fn into_raw(self) -> K::Raw {
        let mut this = ManuallyDrop::new(self);
        // `this` is never dropped, so `raw` is taken exactly once.
        unsafe { ManuallyDrop::take(&mut this.raw) }
    }
}

impl<K: Release> Drop for Handle<K> {
    fn drop(&mut self) {
        tracing::trace!(kind = K::KIND, "releasing boundary handle");
        unsafe {
            let raw = ManuallyDrop::take(&mut self.raw);
            K::release(raw);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Handle, Release};
    use std::cell::RefCell;

    thread_local! {
        static RELEASED: RefCell<Vec<u32>> = const { RefCell::new(Vec::new()) };
    }

    struct Counted;

    impl Release for Counted {
        const KIND: &'static str = "counted";
        type Raw = u32;

        unsafe fn release(raw: u32) {
            RELEASED.with(|released| released.borrow_mut().push(raw));
        }
    }

    fn reset() {
        RELEASED.with(|released| released.borrow_mut().clear());
    }

    fn released() -> Vec<u32> {
        RELEASED.with(|released| released.borrow().clone())
    }

    fn handle(raw: u32) -> Handle<Counted> {
        unsafe { Handle::from_raw(raw) }
    }

    #[test]
    fn drop_releases_exactly_once() {
        reset();
        let owned = handle(1);
        assert_eq!(owned.get(), 1);
        drop(owned);
        assert_eq!(released(), vec![1]);
    }

    #[test]
    fn moves_transfer_ownership_without_releasing() {
        reset();
        let first = handle(2);
        let second = first;
        let mut holder = Vec::new();
        holder.push(second);
        assert!(released().is_empty());
        drop(holder);
        assert_eq!(released(), vec![2]);
    }

    #[test]
    fn into_raw_relinquishes_release() {
        reset();
        let raw = handle(3).into_raw();
        assert_eq!(raw, 3);
        assert!(released().is_empty());
    }

    #[test]
    fn early_exit_paths_release() {
        fn build(fail_early: bool) -> Option<Handle<Counted>> {
            let owned = handle(4);
            if fail_early {
                return None;
            }
            Some(owned)
        }

        reset();
        assert!(build(true).is_none());
        assert_eq!(released(), vec![4]);

        reset();
        let kept = build(false);
        assert!(released().is_empty());
        drop(kept);
        assert_eq!(released(), vec![4]);
    }
}
