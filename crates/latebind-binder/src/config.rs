//! Binder configuration.

use latebind_registry::LookupOptions;

use crate::NarrowingLevel;

/// Settings shared by every request a [`Binder`](crate::Binder) serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinderConfig {
    /// Make non-public members selectable (reached through reflection).
    pub private_binding: bool,
    /// Narrowing tier overload resolution starts at.
    pub min_narrowing: NarrowingLevel,
    /// Narrowing tier overload resolution gives up after.
    pub max_narrowing: NarrowingLevel,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            private_binding: false,
            min_narrowing: NarrowingLevel::None,
            max_narrowing: NarrowingLevel::All,
        }
    }
}

impl BinderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_private_binding(mut self, enabled: bool) -> Self {
        self.private_binding = enabled;
        self
    }

    /// Restrict overload resolution to tiers `min..=max`.
    pub fn with_narrowing(mut self, min: NarrowingLevel, max: NarrowingLevel) -> Self {
        self.min_narrowing = min;
        self.max_narrowing = max.max(min);
        self
    }

    /// What the member catalog sees.
    pub fn lookup_options(&self) -> LookupOptions {
        LookupOptions::new().with_private_binding(self.private_binding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder() {
        let config = BinderConfig::new()
            .with_private_binding(true)
            .with_narrowing(NarrowingLevel::One, NarrowingLevel::None);
        assert!(config.lookup_options().private_binding);
        assert_eq!(config.min_narrowing, NarrowingLevel::One);
        assert_eq!(config.max_narrowing, NarrowingLevel::One);
    }

    #[test]
    fn defaults_are_public_only() {
        let config = BinderConfig::default();
        assert!(!config.private_binding);
        assert_eq!(config.max_narrowing, NarrowingLevel::All);
    }
}
