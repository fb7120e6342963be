use serde::Deserialize;

use crate::vfs::Visibility;

/// Per-call settings for `write()` and `update()`.
///
/// Unset fields fall back to the store defaults: `write()` creates public files and both
/// operations stamp the current time.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WriteOptions {
    pub visibility: Option<Visibility>,
    /// Seconds since the Unix epoch.
    pub timestamp: Option<i64>,
}

impl WriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let options = WriteOptions::new()
            .with_visibility(Visibility::Private)
            .with_timestamp(42);
        assert_eq!(options.visibility, Some(Visibility::Private));
        assert_eq!(options.timestamp, Some(42));

        assert_eq!(WriteOptions::new(), WriteOptions::default());
    }

    #[test]
    fn test_deserialize_from_config() {
        let options: WriteOptions =
            serde_json::from_str(r#"{"visibility": "private", "timestamp": 1700000000}"#).unwrap();
        assert_eq!(options.visibility, Some(Visibility::Private));
        assert_eq!(options.timestamp, Some(1_700_000_000));

        let options: WriteOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, WriteOptions::default());
    }

    #[test]
    fn test_deserialize_rejects_unknown() {
        assert!(serde_json::from_str::<WriteOptions>(r#"{"visibility": "hidden"}"#).is_err());
        assert!(serde_json::from_str::<WriteOptions>(r#"{"mode": 420}"#).is_err());
    }
}
