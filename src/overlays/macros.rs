//! Macros to reduce boilerplate in overlay wrappers

/// Implements [`Overlay`](crate::overlays::Overlay) for a wrapper that keeps
/// its identity in `id: Option<OverlayId>` and `tag: Option<Tag>` fields.
macro_rules! impl_overlay {
    ($wrapper:ty) => {
        impl $crate::overlays::Overlay for $wrapper {
            fn id(&self) -> Option<&$crate::core::types::OverlayId> {
                self.id.as_ref()
            }

            fn tag(&self) -> Option<&$crate::core::types::Tag> {
                self.tag.as_ref()
            }

            fn set_tag(&mut self, tag: Option<$crate::core::types::Tag>) {
                self.tag = tag;
            }
        }
    };
}

/// Generates a cached-style setter that only calls into the native engine
/// when the value actually changes. The body receives the wrapper as
/// `$this` and the new value as `$value`, after the cache has been updated.
macro_rules! cached_setter {
    ($(#[$meta:meta])* $name:ident, $field:ident: $ty:ty, |$this:ident, $value:ident| $apply:block) => {
        $(#[$meta])*
        fn $name(&mut self, $value: $ty) {
            if $crate::overlays::replace_if_changed(&mut self.$field, $value.clone()) {
                let $this = &mut *self;
                $apply
            }
        }
    };
}
