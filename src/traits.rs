//! Shared trait abstractions for common patterns

use crate::core::viewport::ViewContext;

/// Anything that keeps derived state in sync with the view transform.
///
/// Implementors are told after every scale, pan, resize or re-configure; they
/// must not assume which of those happened.
pub trait ViewportAware {
    fn on_viewport_changed(&mut self, context: &ViewContext);
}
