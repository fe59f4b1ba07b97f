//! Batch dispatch configuration.

/// Configuration for batch evaluation.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Minimum member count to use parallel dispatch (below this,
    /// sequential is faster).
    pub min_members_for_parallel: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { min_members_for_parallel: 4 }
    }
}

impl BatchConfig {
    /// Set the minimum member count for parallel dispatch.
    pub fn with_min_parallel(mut self, min: usize) -> Self {
        self.min_members_for_parallel = min;
        self
    }

    /// Force sequential dispatch regardless of batch size.
    pub fn sequential() -> Self {
        Self { min_members_for_parallel: usize::MAX }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_threshold() {
        assert_eq!(BatchConfig::default().min_members_for_parallel, 4);
    }

    #[test]
    fn test_builder() {
        let config = BatchConfig::default().with_min_parallel(16);
        assert_eq!(config.min_members_for_parallel, 16);
    }
}
