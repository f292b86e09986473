//! §6 "Configuration". A plain `Config` struct with a `Default` impl and a
//! builder, constructed per analysis run rather than gated behind cargo
//! features: an annotation source may legitimately run `nilcheck` in both
//! `NoInfer` and `FullInfer` mode within the same process, so the choice has
//! to be a runtime value, not a compile-time capability toggle.

/// Whether the inference engine treats unannotated sites as observations
/// to verify or as unknowns to solve for (§6). Defined in `nilcheck-infer`,
/// since that's the crate whose engine actually branches on it; re-exported
/// here so a driver can set it alongside the rest of `Config`.
pub use nilcheck_infer::InferMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// §6: enables depth-one field tracking and field-producer propagation
    /// (§4.2, §4.5, §4.6).
    pub enable_struct_init_check: bool,
    /// §6: reserved — when false, anonymous function bodies are treated as
    /// opaque (`unknown ⇒ non-nil`) rather than analyzed.
    pub enable_anonymous_func: bool,
    pub mode: InferMode,
    /// Whether reading a nilable map is itself a consumption requiring
    /// non-nil.
    pub error_on_nilable_map_read: bool,
    /// Fixed-point iteration tolerance, forwarded to
    /// `nilcheck_propagate::PropagateConfig::stable_round_limit`.
    pub stable_round_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            enable_struct_init_check: false,
            enable_anonymous_func: false,
            mode: InferMode::default(),
            error_on_nilable_map_read: false,
            stable_round_limit: 3,
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub fn with_mode(mut self, mode: InferMode) -> Self {
        self.mode = mode;
        self
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn enable_struct_init_check(mut self, on: bool) -> Self {
        self.config.enable_struct_init_check = on;
        self
    }

    pub fn enable_anonymous_func(mut self, on: bool) -> Self {
        self.config.enable_anonymous_func = on;
        self
    }

    pub fn mode(mut self, mode: InferMode) -> Self {
        self.config.mode = mode;
        self
    }

    pub fn error_on_nilable_map_read(mut self, on: bool) -> Self {
        self.config.error_on_nilable_map_read = on;
        self
    }

    pub fn stable_round_limit(mut self, limit: u32) -> Self {
        self.config.stable_round_limit = limit;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

/// §6 "A per-file docstring marker overrides to `NoInfer`". A pure function
/// the driver calls per file before invoking `nilcheck-core`; `nilcheck-core`
/// itself remains a pure function of [`Config`] and never scans source text.
pub const STRICT_MODE_MARKER: &str = "nilcheck:strict";

pub fn is_nilcheck_strict_mode(file_docstring: &str) -> bool {
    file_docstring.contains(STRICT_MODE_MARKER)
}

/// Applies the per-file docstring override on top of a base config.
pub fn config_for_file(base: Config, file_docstring: &str) -> Config {
    if is_nilcheck_strict_mode(file_docstring) {
        base.with_mode(InferMode::NoInfer)
    } else {
        base
    }
}
