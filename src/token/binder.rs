use super::generator::TokenGenerator;
use super::runtime;
use super::spec::TokenFieldSpec;
use crate::lifecycle::{LifecycleCallback, LifecycleEvent, LifecycleHooks};
use crate::record::Record;
use std::sync::Arc;

/// Registers conditional generation of `spec` at its trigger point.
///
/// Generation only happens while the record is new, so instances loaded
/// from storage keep their stored value even when it is blank.
///
/// Returns the event of a previous binding for the same attribute that this
/// one replaced.
pub fn bind_token_field<R, H>(
    hooks: &mut H,
    spec: &TokenFieldSpec,
    generator: Arc<dyn TokenGenerator>,
) -> Option<LifecycleEvent>
where
    R: Record,
    H: LifecycleHooks<R> + ?Sized,
{
    let bound = spec.clone();
    let callback: LifecycleCallback<R> = Arc::new(move |record: &mut R| {
        if !record.is_new_record() {
            return Ok(());
        }
        runtime::maybe_generate(record, &bound, generator.as_ref()).map(|_| ())
    });

    hooks.register_hook(spec.hook_key(), spec.trigger().into(), callback)
}
