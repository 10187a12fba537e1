//! Configuration options for the template compiler.

use std::time::Duration;

/// Configuration options for [`TemplateExpressionCompiler`](super::TemplateExpressionCompiler).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use stencil_core::api::CompilerOptions;
///
/// let options = CompilerOptions {
///     conversion_cache_idle: Duration::from_secs(60),
///     ..CompilerOptions::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct CompilerOptions {
    /// How long a conversion cache entry survives without being looked up.
    ///
    /// `Duration::ZERO` makes every lookup a miss.
    ///
    /// Default: 10 minutes
    pub conversion_cache_idle: Duration,

    /// When false, every request goes straight to the backend.
    ///
    /// Default: true
    pub optimize_templates: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            conversion_cache_idle: Duration::from_secs(10 * 60),
            optimize_templates: true,
        }
    }
}
