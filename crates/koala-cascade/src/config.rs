//! Cascade configuration.

use serde::{Deserialize, Serialize};

use crate::properties::AggregateSet;

/// Knobs a host can set when creating a [`Declarations`](crate::Declarations) store.
///
/// ```
/// use koala_cascade::{AggregateSet, AggregateTag, CascadeConfig};
///
/// let config = CascadeConfig {
///     all_exempt: AggregateSet::from_tags(&[AggregateTag::TextDirection]),
///     ..CascadeConfig::default()
/// };
/// assert!(config.all_exempt.contains(AggregateTag::TextDirection));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeConfig {
    /// Maximum number of declaration blocks a store hands out.
    pub max_blocks: u32,
    /// [§ 3.2 The all property](https://www.w3.org/TR/css-cascade-4/#all-shorthand)
    ///
    /// Property groups the `all` shorthand leaves alone. Empty by default, so
    /// `all` resets every group; CSS itself excludes `direction` and
    /// `unicode-bidi`, which a host can opt into with [`AggregateTag::TextDirection`](crate::AggregateTag::TextDirection).
    pub all_exempt: AggregateSet,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            max_blocks: u32::MAX,
            all_exempt: AggregateSet::EMPTY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::AggregateTag;

    #[test]
    fn test_config_from_json_uses_defaults() {
        let config: CascadeConfig = serde_json::from_str(r#"{ "max_blocks": 8 }"#).unwrap();
        assert_eq!(config.max_blocks, 8);
        assert!(config.all_exempt.is_empty());
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = CascadeConfig {
            max_blocks: 100,
            all_exempt: AggregateSet::from_tags(&[AggregateTag::TextDirection, AggregateTag::Font]),
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: CascadeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
