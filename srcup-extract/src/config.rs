use serde::{Deserialize, Serialize};

/// The tag attached to every bytecode and IR record when nothing else is configured
pub const DEFAULT_ORIGIN: &str = "watchdog";

/// Controls what the [`BundleBuilder`](crate::BundleBuilder) emits.
///
/// Missing fields take their default when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtractorConfig {
    /// Tag identifying where the bytecode came from
    pub origin: String,
    /// Whether to emit optimized Yul IR records
    pub include_ir: bool,
    /// Whether to attach function debug data to contract records
    pub include_debug_info: bool,
    /// Whether to attach immutable reference tables to contract records
    pub include_immutable_references: bool,
    /// Process the contracts of a compilation unit on the rayon thread pool
    pub parallel: bool,
}

impl ExtractorConfig {
    /// Returns a builder starting from the default configuration
    pub fn builder() -> ExtractorConfigBuilder {
        ExtractorConfigBuilder::default()
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            include_ir: false,
            include_debug_info: true,
            include_immutable_references: true,
            parallel: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
#[must_use]
pub struct ExtractorConfigBuilder {
    origin: Option<String>,
    include_ir: Option<bool>,
    include_debug_info: Option<bool>,
    include_immutable_references: Option<bool>,
    parallel: Option<bool>,
}

impl ExtractorConfigBuilder {
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn include_ir(mut self, include_ir: bool) -> Self {
        self.include_ir = Some(include_ir);
        self
    }

    pub fn include_debug_info(mut self, include_debug_info: bool) -> Self {
        self.include_debug_info = Some(include_debug_info);
        self
    }

    pub fn include_immutable_references(mut self, include: bool) -> Self {
        self.include_immutable_references = Some(include);
        self
    }

    /// Leaves out debug info and immutable references
    pub fn without_aux(self) -> Self {
        self.include_debug_info(false).include_immutable_references(false)
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = Some(parallel);
        self
    }

    pub fn build(self) -> ExtractorConfig {
        let Self {
            origin,
            include_ir,
            include_debug_info,
            include_immutable_references,
            parallel,
        } = self;
        let defaults = ExtractorConfig::default();
        ExtractorConfig {
            origin: origin.unwrap_or(defaults.origin),
            include_ir: include_ir.unwrap_or(defaults.include_ir),
            include_debug_info: include_debug_info.unwrap_or(defaults.include_debug_info),
            include_immutable_references: include_immutable_references
                .unwrap_or(defaults.include_immutable_references),
            parallel: parallel.unwrap_or(defaults.parallel),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_starts_from_defaults() {
        assert_eq!(ExtractorConfig::builder().build(), ExtractorConfig::default());

        let config = ExtractorConfig::builder().origin("ci").include_ir(true).without_aux().build();
        assert_eq!(config.origin, "ci");
        assert!(config.include_ir);
        assert!(!config.include_debug_info);
        assert!(!config.include_immutable_references);
        assert!(!config.parallel);
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: ExtractorConfig = serde_json::from_str(r#"{"includeIr": true}"#).unwrap();
        assert!(config.include_ir);
        assert_eq!(config.origin, DEFAULT_ORIGIN);
        assert!(config.include_debug_info);
    }
}
