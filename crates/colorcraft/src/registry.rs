//! The process-wide, mutable tables of color types, color bases, color
//! models (installed by both `register_color_function` and
//! `register_color_space`), named colors, and fit methods.
//!
//! [`Registry`] has no analog in the teacher crate, whose model set is a
//! closed compile-time enum; it is the direct generalization the teacher's
//! own `core::conversion::convert` would need if its `ColorSpace` enum were
//! opened up to runtime registration. Every table lives behind its own
//! `RwLock` so reads (conversions, parsing) never block each other, and
//! mutations (registration) take an exclusive lock only on the table, and
//! the graph caches, they touch.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use crate::error::{Error, RegistrationError, ValidationError};
use crate::model::{ColorConverter, ColorModelConverter, ColorSpaceConverter};
use crate::Float;

/// A user- or built-in-registered strategy for bringing out-of-gamut
/// coordinates into range.
///
/// Receives the registry (to resolve the target model/gamut), the name of
/// the model the coordinates are expressed in, and the coordinates
/// themselves; returns adjusted in-gamut coordinates.
pub type FitFn = Arc<dyn Fn(&Registry, &str, [Float; 3]) -> Result<[Float; 3], Error> + Send + Sync>;

/// Lower-case, hyphenate interior whitespace runs. Used for color-type,
/// color-base, and fit-method names.
fn normalize_hyphenated(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

/// Lower-case, strip all whitespace. Used for color-function/color-space
/// (model) names.
fn normalize_compact(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// Strip everything but ASCII letters, lower-case. Used for named-color
/// names.
fn normalize_named_color(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_lowercase()
}

// --------------------------------------------------------------------------------------------------------------------

#[derive(Default)]
struct Tables {
    color_types: HashMap<String, ColorConverter>,
    color_type_order: Vec<String>,
    color_bases: HashMap<String, ColorConverter>,
    models: HashMap<String, ColorModelConverter>,
    named_colors: HashMap<String, [u8; 3]>,
    fit_methods: HashMap<String, FitFn>,
}

/// The adjacency list and memoized shortest paths of the model-conversion
/// graph, invalidated on every registry mutation.
#[derive(Default)]
pub(crate) struct GraphCache {
    pub(crate) adjacency: Option<HashMap<String, Vec<String>>>,
    pub(crate) paths: HashMap<String, Vec<String>>,
}

/// The process-wide registry of everything `Color` can parse, convert
/// between, and format.
///
/// Reachable through [`registry()`]. Every mutating method takes `&self`
/// (interior mutability via `RwLock`) so the single global instance can be
/// shared across threads; see spec §5 for the concurrency contract.
pub struct Registry {
    tables: RwLock<Tables>,
    pub(crate) graph: RwLock<GraphCache>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            graph: RwLock::new(GraphCache::default()),
        }
    }

    fn invalidate(&self) {
        let mut graph = self.graph.write().unwrap_or_else(|e| e.into_inner());
        graph.adjacency = None;
        graph.paths.clear();
    }

    // -- color types ----------------------------------------------------

    pub fn register_color_type(&self, name: &str, converter: ColorConverter) -> Result<(), Error> {
        let key = normalize_hyphenated(name);
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        if tables.color_types.contains_key(&key) {
            return Err(RegistrationError::NameAlreadyUsed(key).into());
        }
        tables.color_type_order.push(key.clone());
        tables.color_types.insert(key, converter);
        drop(tables);
        self.invalidate();
        Ok(())
    }

    pub fn register_color_base(&self, name: &str, converter: ColorConverter) -> Result<(), Error> {
        let key = normalize_hyphenated(name);
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        if tables.color_bases.contains_key(&key) {
            return Err(RegistrationError::NameAlreadyUsed(key).into());
        }
        tables.color_bases.insert(key, converter);
        drop(tables);
        self.invalidate();
        Ok(())
    }

    pub fn color_type(&self, name: &str) -> Option<ColorConverter> {
        let key = normalize_hyphenated(name);
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        tables.color_types.get(&key).cloned()
    }

    /// Every registered color type, in registration order, for
    /// `Color::from`'s first-match scan.
    pub fn color_types_in_order(&self) -> Vec<(String, ColorConverter)> {
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        tables
            .color_type_order
            .iter()
            .filter_map(|name| tables.color_types.get(name).map(|c| (name.clone(), c.clone())))
            .collect()
    }

    // -- models (color-functions and color-spaces) -----------------------

    /// Install a model under `name`, synthesizing and installing the
    /// `ColorConverter` the parser dispatches on, and registering it as
    /// both a color-type and a color-base (every color-function is also a
    /// color-base, per spec §6).
    pub fn register_color_function(&self, name: &str, model: ColorModelConverter) -> Result<(), Error> {
        self.install_model(name, model, true)
    }

    /// Compose a color space's matrices and transfer functions into a
    /// [`ColorModelConverter`] and install it exactly like
    /// [`Self::register_color_function`].
    ///
    /// Unlike `register_color_function`, this does not require `bridge` to
    /// already be registered: `xyz-d65` and `xyz-d50` bridge to each other,
    /// and one of the pair must register first. The registered graph is
    /// still checked for connectivity lazily, at conversion time, per the
    /// "missing path is a runtime error, not a registration error" rule.
    pub fn register_color_space(&self, name: &str, space: ColorSpaceConverter) -> Result<(), Error> {
        let key = normalize_compact(name);
        let model = space.into_model_converter(&key)?;
        self.install_model(name, model, false)
    }

    /// Install an already-built [`ColorModelConverter`] without requiring its
    /// `bridge` to already be registered. Used for `xyz-d65`/`xyz-d50`,
    /// which bridge to each other and therefore cannot both satisfy
    /// [`Self::register_color_function`]'s stricter contract.
    pub(crate) fn register_bridging_pair(&self, name: &str, model: ColorModelConverter) -> Result<(), Error> {
        self.install_model(name, model, false)
    }

    fn install_model(
        &self,
        name: &str,
        model: ColorModelConverter,
        enforce_bridge_exists: bool,
    ) -> Result<(), Error> {
        model.validate()?;
        let key = normalize_compact(name);

        {
            let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
            if model.bridge == key {
                return Err(ValidationError::SelfBridge(key).into());
            }
            if enforce_bridge_exists && !tables.models.contains_key(&model.bridge) {
                return Err(ValidationError::UnresolvedBridge(model.bridge.clone()).into());
            }
            if tables.models.contains_key(&key) {
                return Err(RegistrationError::NameAlreadyUsed(key).into());
            }
        }

        let converter = crate::parse::build_converter(&key, &model);

        {
            let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
            tables.models.insert(key.clone(), model);
            tables.color_type_order.push(key.clone());
            tables.color_types.insert(key.clone(), converter.clone());
            tables.color_bases.insert(key.clone(), converter);
        }
        self.invalidate();
        Ok(())
    }

    pub fn model(&self, name: &str) -> Result<ColorModelConverter, Error> {
        let key = normalize_compact(name);
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        tables
            .models
            .get(&key)
            .cloned()
            .ok_or_else(|| crate::error::LookupError::UnknownName(key).into())
    }

    pub fn has_model(&self, name: &str) -> bool {
        let key = normalize_compact(name);
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        tables.models.contains_key(&key)
    }

    pub fn model_names(&self) -> Vec<String> {
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        tables.models.keys().cloned().collect()
    }

    // -- named colors -----------------------------------------------------

    /// Register `name` for `rgb`. Both the name and the RGB triple must be
    /// unique: a name already claimed is rejected as [`RegistrationError::NameAlreadyUsed`],
    /// and an RGB triple already claimed by a different name is rejected as
    /// [`RegistrationError::RgbAlreadyNamed`].
    pub fn register_named_color(&self, name: &str, rgb: [u8; 3]) -> Result<(), Error> {
        let key = normalize_named_color(name);
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        if tables.named_colors.contains_key(&key) {
            return Err(RegistrationError::NameAlreadyUsed(key).into());
        }
        if let Some((existing, _)) = tables.named_colors.iter().find(|(_, v)| **v == rgb) {
            return Err(RegistrationError::RgbAlreadyNamed(existing.clone()).into());
        }
        tables.named_colors.insert(key, rgb);
        Ok(())
    }

    pub fn named_color_rgb(&self, name: &str) -> Option<[u8; 3]> {
        let key = normalize_named_color(name);
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        tables.named_colors.get(&key).copied()
    }

    pub fn name_for_rgb(&self, rgb: [u8; 3]) -> Option<String> {
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        tables
            .named_colors
            .iter()
            .find(|(_, v)| **v == rgb)
            .map(|(name, _)| name.clone())
    }

    // -- fit methods -------------------------------------------------------

    pub fn register_fit_method(&self, name: &str, f: FitFn) -> Result<(), Error> {
        let key = normalize_hyphenated(name);
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        if tables.fit_methods.contains_key(&key) {
            return Err(RegistrationError::NameAlreadyUsed(key).into());
        }
        tables.fit_methods.insert(key, f);
        Ok(())
    }

    pub fn fit_method(&self, name: &str) -> Option<FitFn> {
        let key = normalize_hyphenated(name);
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        tables.fit_methods.get(&key).cloned()
    }

    // -- unregistration ----------------------------------------------------

    /// Remove every given name from every table it appears in (tried under
    /// all three normalizations, since a caller may not know which table(s)
    /// a name lives in), invalidating the conversion-graph caches.
    pub fn unregister(&self, names: &[&str]) {
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        for name in names {
            let hyphenated = normalize_hyphenated(name);
            let compact = normalize_compact(name);
            let letters = normalize_named_color(name);

            tables.color_types.remove(&hyphenated);
            tables.color_types.remove(&compact);
            tables.color_type_order.retain(|n| n != &hyphenated && n != &compact);
            tables.color_bases.remove(&hyphenated);
            tables.color_bases.remove(&compact);
            tables.models.remove(&compact);
            tables.named_colors.remove(&letters);
            tables.fit_methods.remove(&hyphenated);
        }
        drop(tables);
        self.invalidate();
    }
}

static REGISTRY: OnceLock<Registry> = OnceLock::new();

/// The single process-wide [`Registry`], pre-populated with every built-in
/// model, color space, color base, named color, and fit method on first
/// access.
pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(|| {
        let registry = Registry::new();
        crate::builtins::install(&registry);
        registry
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn normalization_rules_match_spec() {
        assert_eq!(normalize_hyphenated("Hex Color"), "hex-color");
        assert_eq!(normalize_compact("Display P3"), "displayp3");
        assert_eq!(normalize_named_color("Rebecca Purple!"), "rebeccapurple");
    }

    #[test]
    fn unregister_removes_from_every_table() {
        let registry = Registry::new();
        registry.register_named_color("dusk mint", [1, 2, 3]).unwrap();
        assert_eq!(registry.named_color_rgb("dusk mint"), Some([1, 2, 3]));
        registry.unregister(&["dusk mint"]);
        assert_eq!(registry.named_color_rgb("dusk mint"), None);
    }

    #[test]
    fn a_second_name_for_an_already_named_rgb_value_is_rejected() {
        let registry = Registry::new();
        registry.register_named_color("dusk mint", [1, 2, 3]).unwrap();
        let err = registry.register_named_color("duskmint-alias", [1, 2, 3]).unwrap_err();
        assert!(matches!(
            err,
            Error::Registration(RegistrationError::RgbAlreadyNamed(_))
        ));
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let registry = Registry::new();
        registry.register_named_color("dusk mint", [1, 2, 3]).unwrap();
        let err = registry.register_named_color("Dusk Mint", [4, 5, 6]).unwrap_err();
        assert!(matches!(
            err,
            Error::Registration(RegistrationError::NameAlreadyUsed(_))
        ));
    }
}
