use super::generator::TokenGenerator;
use super::spec::TokenFieldSpec;
use crate::core::Result;
use crate::record::{Record, RecordUpdate};
use log::debug;

/// Fills the token attribute of `record` unless it already holds a value.
///
/// Assignment is in memory only. Returns `true` when a token was generated.
pub fn maybe_generate<R: Record>(
    record: &mut R,
    spec: &TokenFieldSpec,
    generator: &dyn TokenGenerator,
) -> Result<bool> {
    if !record.attribute_blank(spec.attribute()) {
        debug!(
            "{}.{} already set, skipping token generation",
            R::type_name(),
            spec.attribute()
        );
        return Ok(false);
    }

    let token = generator.generate(spec.length())?;
    record.write_attribute(spec.attribute(), token)?;
    debug!(
        "generated {}-character token for {}.{}",
        spec.length(),
        R::type_name(),
        spec.attribute()
    );
    Ok(true)
}

/// Replaces the token attribute with a fresh value and persists the record.
///
/// The new value stays in memory even when persisting fails.
pub fn regenerate<R, P>(
    record: &mut R,
    spec: &TokenFieldSpec,
    generator: &dyn TokenGenerator,
    persister: &P,
) -> Result<String>
where
    R: Record,
    P: RecordUpdate<R> + ?Sized,
{
    let token = generator.generate(spec.length())?;
    record.write_attribute(spec.attribute(), token.clone())?;
    persister.update_record(record)?;
    Ok(token)
}
