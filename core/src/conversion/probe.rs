use super::cache::ConversionUnavailable;
use super::registry::Conversion;
use crate::api::ExpressionDefinition;

/// Whether a context-independent conversion from literal text to `def`'s
/// result type exists in its profile.
pub fn validate_conversion(def: &ExpressionDefinition) -> Result<&Conversion, ConversionUnavailable> {
    def.profile()
        .conversions()
        .get(def.result_type())
        .ok_or_else(|| ConversionUnavailable::NotRegistered(def.result_type().clone()))
}
