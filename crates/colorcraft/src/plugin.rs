//! Applying a batch of extension plugins to a registry.
//!
//! A plugin is a free function (or closure) that receives a [`Registry`]
//! reference and registers whatever color functions, spaces, bases, or fit
//! methods it contributes through the public registration API — it never
//! mutates a color value directly. This mirrors the teacher's preference for
//! small functions operating on state passed by reference over methods on a
//! god object.

use crate::error::{Error, RegistrationError};
use crate::registry::Registry;

/// Apply every plugin in `plugins` to `registry`, in order.
///
/// A plugin that tries to register a name already claimed by an earlier
/// plugin (or by the built-ins) is treated as a harmless duplicate and
/// skipped without comment. Any other failure is logged and the batch
/// continues with the next plugin — one broken plugin must not keep the
/// rest from installing.
///
/// # Panics
///
/// Panics if `plugins` is empty; at least one plugin is required.
pub fn apply_plugins(registry: &Registry, plugins: &[&dyn Fn(&Registry) -> Result<(), Error>]) {
    assert!(!plugins.is_empty(), "apply_plugins requires at least one plugin");

    for (index, plugin) in plugins.iter().enumerate() {
        match plugin(registry) {
            Ok(()) => {}
            Err(Error::Registration(RegistrationError::NameAlreadyUsed(_))) => {}
            Err(error) => {
                log::warn!("plugin #{index} failed: {error}");
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::{ColorSpaceConverter, TargetGamut};

    fn install_dummy_space(registry: &Registry) -> Result<(), Error> {
        registry.register_color_space(
            "dummy-space",
            ColorSpaceConverter {
                bridge: "xyz-d65".to_owned(),
                to_bridge_matrix: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
                from_bridge_matrix: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
                to_linear: None,
                from_linear: None,
                target_gamut: TargetGamut::named("dummy-space"),
            },
        )
    }

    fn always_fails(_registry: &Registry) -> Result<(), Error> {
        Err(Error::Parse(crate::error::ParseError::UnsupportedFormat))
    }

    #[test]
    fn duplicate_registrations_are_skipped_without_aborting_the_batch() {
        let registry = Registry::new();
        let first: &dyn Fn(&Registry) -> Result<(), Error> = &install_dummy_space;
        let second: &dyn Fn(&Registry) -> Result<(), Error> = &install_dummy_space;
        apply_plugins(&registry, &[first, second]);
        assert!(registry.has_model("dummy-space"));
    }

    #[test]
    fn a_failing_plugin_does_not_block_the_next_one() {
        let registry = Registry::new();
        let failing: &dyn Fn(&Registry) -> Result<(), Error> = &always_fails;
        let installing: &dyn Fn(&Registry) -> Result<(), Error> = &install_dummy_space;
        apply_plugins(&registry, &[failing, installing]);
        assert!(registry.has_model("dummy-space"));
    }

    #[test]
    #[should_panic]
    fn an_empty_plugin_list_panics() {
        apply_plugins(&Registry::new(), &[]);
    }
}
