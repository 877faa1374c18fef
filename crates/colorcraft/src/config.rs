//! The ambient configuration object: a light/dark theme selector, a
//! system-color table, and the default gamut-fit method.
//!
//! This is deliberately thin compared to the teacher crate's `Theme`, which
//! carries 18 ANSI-terminal color slots and the terminal-query machinery
//! (`Theme::query`, `ThemeEntry::request`) needed to populate them. None of
//! that is in scope here: `<system-color>` and `light-dark()` only need to
//! know which of two precomputed colors is active, not how a terminal
//! reports its own palette.

use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

/// Which half of a light/dark pair is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Theme {
    Light,
    Dark,
}

impl Default for Theme {
    fn default() -> Self {
        Self::Light
    }
}

impl Theme {
    /// Index into a `[light, dark]` pair.
    pub(crate) fn index(&self) -> usize {
        match self {
            Self::Light => 0,
            Self::Dark => 1,
        }
    }
}

/// The default gamut-fit method and any other engine-wide defaults.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Defaults {
    pub fit: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            fit: "css-gamut-map".to_owned(),
        }
    }
}

/// The active theme, system-color table, and defaults, read by
/// `<system-color>`, `light-dark()`, and `to`/`to_string`'s default fit.
///
/// Reachable through [`configuration`]; mutated only through [`configure`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Configuration {
    pub theme: Theme,
    pub system_colors: HashMap<String, [[u8; 3]; 2]>,
    pub defaults: Defaults,
}

/// A partial [`Configuration`], applied to the active one by [`configure`].
///
/// Every field is optional; a `None` field is left untouched, mirroring
/// `undefined` being ignored in a recursive object merge. `system_colors`
/// replaces the whole map rather than merging key by key, matching "arrays
/// are replaced, not merged" — a color's `[light, dark]` pair is the array
/// in question here.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigPatch {
    pub theme: Option<Theme>,
    pub system_colors: Option<HashMap<String, [[u8; 3]; 2]>>,
    pub defaults: Option<DefaultsPatch>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DefaultsPatch {
    pub fit: Option<String>,
}

static CONFIGURATION: OnceLock<RwLock<Configuration>> = OnceLock::new();

fn storage() -> &'static RwLock<Configuration> {
    CONFIGURATION.get_or_init(|| RwLock::new(Configuration::default()))
}

/// A clone of the active configuration.
pub fn configuration() -> Configuration {
    storage().read().unwrap_or_else(|e| e.into_inner()).clone()
}

/// Recursively merge `patch` into the active configuration.
///
/// `theme` and `defaults.fit` are replaced individually when present;
/// `system_colors`, being keyed data rather than a scalar, replaces the
/// whole table rather than merging entry by entry, per the "arrays are
/// replaced, not merged" rule.
pub fn configure(patch: ConfigPatch) {
    let mut config = storage().write().unwrap_or_else(|e| e.into_inner());
    if let Some(theme) = patch.theme {
        config.theme = theme;
    }
    if let Some(system_colors) = patch.system_colors {
        config.system_colors = system_colors;
    }
    if let Some(defaults) = patch.defaults {
        if let Some(fit) = defaults.fit {
            config.defaults.fit = fit;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn configure_merges_without_clobbering_untouched_fields() {
        let storage = storage();
        *storage.write().unwrap() = Configuration::default();

        configure(ConfigPatch {
            theme: Some(Theme::Dark),
            system_colors: Some(HashMap::from([("canvas".to_owned(), [[255, 255, 255], [0, 0, 0]])])),
            ..Default::default()
        });
        configure(ConfigPatch {
            defaults: Some(DefaultsPatch {
                fit: Some("clip".to_owned()),
            }),
            ..Default::default()
        });

        let config = configuration();
        assert_eq!(config.theme, Theme::Dark);
        assert_eq!(config.defaults.fit, "clip");
        assert_eq!(config.system_colors.get("canvas"), Some(&[[255, 255, 255], [0, 0, 0]]));
    }
}
