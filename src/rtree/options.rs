use serde::{Deserialize, Serialize};

use crate::error::{PackedRTreeError, Result};

/// The default minimum number of entries in a non-root node.
pub const DEFAULT_MIN_ENTRIES: usize = 8;

/// The default maximum number of entries in any node.
pub const DEFAULT_MAX_ENTRIES: usize = 20;

/// Node capacity bounds used when bulk loading a tree.
///
/// Every non-root node receives between `min_entries` and `max_entries` entries. Packing can
/// only guarantee this when `max_entries >= 2 * min_entries - 1`.
///
/// ```
/// use packed_rtree::rtree::RTreeOptions;
///
/// let options = RTreeOptions::new(2, 4).unwrap();
/// assert_eq!(options.max_entries(), 4);
/// assert!(RTreeOptions::new(8, 10).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RTreeOptions {
    min_entries: usize,
    max_entries: usize,
}

impl RTreeOptions {
    /// Create validated node capacity bounds.
    pub fn new(min_entries: usize, max_entries: usize) -> Result<Self> {
        let options = Self {
            min_entries,
            max_entries,
        };
        options.validate()?;
        Ok(options)
    }

    /// Check the capacity bounds. Options obtained through deserialization have not been
    /// checked yet, so the builder calls this again before packing.
    pub fn validate(&self) -> Result<()> {
        let packable = self.min_entries >= 1
            && self.max_entries >= 2
            && self.max_entries + 1 >= 2 * self.min_entries;
        if !packable {
            return Err(PackedRTreeError::InvalidNodeCapacity {
                min_entries: self.min_entries,
                max_entries: self.max_entries,
            });
        }
        Ok(())
    }

    pub fn min_entries(&self) -> usize {
        self.min_entries
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }
}

impl Default for RTreeOptions {
    fn default() -> Self {
        Self {
            min_entries: DEFAULT_MIN_ENTRIES,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn capacity_bounds() {
        assert!(RTreeOptions::default().validate().is_ok());
        assert!(RTreeOptions::new(2, 4).is_ok());
        assert!(RTreeOptions::new(2, 3).is_ok());
        assert!(RTreeOptions::new(1, 2).is_ok());
        assert!(RTreeOptions::new(3, 4).is_err());
        assert!(RTreeOptions::new(0, 4).is_err());
        assert!(RTreeOptions::new(1, 1).is_err());
    }

    #[test]
    fn deserialized_options_are_checked() {
        let options: RTreeOptions =
            serde_json::from_str(r#"{"min_entries": 10, "max_entries": 12}"#).unwrap();
        assert!(matches!(
            options.validate(),
            Err(PackedRTreeError::InvalidNodeCapacity {
                min_entries: 10,
                max_entries: 12
            })
        ));
    }
}
