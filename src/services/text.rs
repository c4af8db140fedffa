//! Localised text the adapters show to users

use crate::prelude::HashMap;
use once_cell::sync::Lazy;

/// Keys the adapters look up
pub mod keys {
    pub const MAP_LOAD_FAILED: &str = "mapLoadFailed";
    pub const MAP_OFFLINE: &str = "mapOffline";
    pub const HIGH_CONTRAST_MAP_NAME: &str = "highContrastMapName";
}

/// Supplies display strings by key. Returning `None` falls back to
/// [`DefaultStrings`].
pub trait Localiser: Send + Sync {
    fn text(&self, key: &str) -> Option<String>;
}

static ENGLISH: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut strings = HashMap::default();
    strings.insert(keys::MAP_LOAD_FAILED, "The map could not be loaded");
    strings.insert(
        keys::MAP_OFFLINE,
        "The map could not be loaded because the browser is offline",
    );
    strings.insert(keys::HIGH_CONTRAST_MAP_NAME, "High Contrast");
    strings
});

/// Built-in English strings
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultStrings;

impl Localiser for DefaultStrings {
    fn text(&self, key: &str) -> Option<String> {
        ENGLISH.get(key).map(|s| s.to_string())
    }
}

/// Looks `key` up, falling back to the built-in strings and then the key
pub(crate) fn localise(localiser: &dyn Localiser, key: &str) -> String {
    localiser
        .text(key)
        .or_else(|| DefaultStrings.text(key))
        .unwrap_or_else(|| key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct French;

    impl Localiser for French {
        fn text(&self, key: &str) -> Option<String> {
            (key == keys::MAP_LOAD_FAILED).then(|| "La carte n'a pas pu être chargée".to_string())
        }
    }

    #[test]
    fn test_fallback_chain() {
        assert_eq!(
            localise(&French, keys::MAP_LOAD_FAILED),
            "La carte n'a pas pu être chargée"
        );
        assert_eq!(localise(&French, keys::HIGH_CONTRAST_MAP_NAME), "High Contrast");
        assert_eq!(localise(&French, "unknownKey"), "unknownKey");
    }
}
