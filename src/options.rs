//! Configuration for the QSON codec.
//!
//! All knobs live in an explicit [`QsonOptions`] value threaded through
//! every call. There is no process-wide mutable state, so two callers with
//! different settings never interfere.
//!
//! ```rust
//! use qson::QsonOptions;
//!
//! let options = QsonOptions::new()
//!     .with_param_name("q")
//!     .with_unicode_escaping(true)
//!     .with_max_depth(32);
//! assert_eq!(options.param_name, "q");
//! ```

/// Configuration for parsing, serialization, and the query-string layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QsonOptions {
    /// Parameter name used when a value cannot be spread over individual
    /// query parameters. Default `_`.
    pub param_name: String,
    /// Accept any non-empty string as a bare query parameter name instead of
    /// requiring word characters only.
    pub allow_any_param_name: bool,
    /// Escape control characters and non-ASCII code points with `!`-escapes,
    /// producing a pure-ASCII payload.
    pub escape_unicode: bool,
    /// Maximum nesting depth accepted by the parser and producible by the
    /// serializer.
    pub max_depth: usize,
}

impl Default for QsonOptions {
    fn default() -> Self {
        QsonOptions {
            param_name: "_".to_string(),
            allow_any_param_name: false,
            escape_unicode: false,
            max_depth: 128,
        }
    }
}

impl QsonOptions {
    /// Creates the default options: parameter name `_`, word-character
    /// parameter names only, raw Unicode output, depth limit 128.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default parameter name for the query-string layer.
    #[must_use]
    pub fn with_param_name(mut self, name: impl Into<String>) -> Self {
        self.param_name = name.into();
        self
    }

    /// Accept any non-empty string as a bare query parameter name.
    #[must_use]
    pub fn with_any_param_name(mut self, allow: bool) -> Self {
        self.allow_any_param_name = allow;
        self
    }

    /// Escape control characters and non-ASCII code points in serialized
    /// output.
    #[must_use]
    pub fn with_unicode_escaping(mut self, escape: bool) -> Self {
        self.escape_unicode = escape;
        self
    }

    /// Sets the maximum nesting depth.
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}
