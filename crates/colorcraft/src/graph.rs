//! The shortest-path model-conversion graph.
//!
//! Generalizes the teacher's `core::conversion::convert`, a hand-written
//! match over a closed 12-variant `ColorSpace` enum with hard-coded one/two/
//! three-hop special cases, into a breadth-first search over whatever
//! models happen to be registered. The adjacency and per-pair paths are
//! memoized on [`crate::Registry`] and invalidated on every mutation.

use std::collections::{HashMap, VecDeque};

use crate::error::{Error, LookupError};
use crate::registry::Registry;
use crate::Float;

fn build_adjacency(registry: &Registry) -> HashMap<String, Vec<String>> {
    let mut adjacency: HashMap<String, Vec<String>> = HashMap::new();
    for name in registry.model_names() {
        if let Ok(model) = registry.model(&name) {
            adjacency.entry(name.clone()).or_default().push(model.bridge.clone());
            adjacency.entry(model.bridge.clone()).or_default().push(name);
        }
    }
    for neighbors in adjacency.values_mut() {
        neighbors.sort();
        neighbors.dedup();
    }
    adjacency
}

fn shortest_path(adjacency: &HashMap<String, Vec<String>>, from: &str, to: &str) -> Option<Vec<String>> {
    if from == to {
        return Some(vec![from.to_owned()]);
    }
    if !adjacency.contains_key(from) {
        return None;
    }

    let mut visited = std::collections::HashSet::new();
    let mut predecessor: HashMap<String, String> = HashMap::new();
    let mut queue = VecDeque::new();
    queue.push_back(from.to_owned());
    visited.insert(from.to_owned());

    while let Some(current) = queue.pop_front() {
        if current == to {
            let mut path = vec![current.clone()];
            let mut node = current;
            while let Some(prev) = predecessor.get(&node) {
                path.push(prev.clone());
                node = prev.clone();
            }
            path.reverse();
            return Some(path);
        }

        if let Some(neighbors) = adjacency.get(&current) {
            for neighbor in neighbors {
                if visited.insert(neighbor.clone()) {
                    predecessor.insert(neighbor.clone(), current.clone());
                    queue.push_back(neighbor.clone());
                }
            }
        }
    }

    None
}

/// The ordered sequence of model names from `from` to `to`, inclusive,
/// built fresh on first request and memoized under `"from-to"` thereafter.
pub fn path(registry: &Registry, from: &str, to: &str) -> Result<Vec<String>, Error> {
    if !registry.has_model(from) {
        return Err(LookupError::UnknownName(from.to_owned()).into());
    }
    if !registry.has_model(to) {
        return Err(LookupError::UnknownName(to.to_owned()).into());
    }

    let key = format!("{from}-{to}");
    {
        let cache = registry.graph.read().unwrap_or_else(|e| e.into_inner());
        if let Some(found) = cache.paths.get(&key) {
            return Ok(found.clone());
        }
    }

    let mut cache = registry.graph.write().unwrap_or_else(|e| e.into_inner());
    if cache.adjacency.is_none() {
        cache.adjacency = Some(build_adjacency(registry));
    }
    let adjacency = cache.adjacency.as_ref().expect("just populated above");

    let found = shortest_path(adjacency, from, to).ok_or_else(|| LookupError::NoPathFound {
        from: from.to_owned(),
        to: to.to_owned(),
    })?;
    cache.paths.insert(key, found.clone());
    Ok(found)
}

/// Convert `coords` (the first three components; alpha is the caller's
/// concern) from model `from` to model `to`, executing each edge of the
/// shortest path via `to_bridge` or `from_bridge`.
pub fn convert(registry: &Registry, from: &str, to: &str, coords: [Float; 3]) -> Result<[Float; 3], Error> {
    let nodes = path(registry, from, to)?;
    if nodes.len() == 1 {
        return Ok(coords);
    }

    let mut current = coords;
    for pair in nodes.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let model_a = registry.model(a)?;
        let model_b = registry.model(b)?;

        current = if model_a.bridge == *b {
            model_a.to_bridge.as_ref()(&current)
        } else if model_b.bridge == *a {
            model_b.from_bridge.as_ref()(&current)
        } else {
            return Err(LookupError::NoPathFound {
                from: a.clone(),
                to: b.clone(),
            }
            .into());
        };
    }

    Ok(current)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::TargetGamut;

    /// Two mutually-bridging color spaces, the same bootstrap shape
    /// `xyz-d65`/`xyz-d50` use in `builtins`.
    #[test]
    fn identity_path_is_trivial() {
        let registry = Registry::new();
        registry
            .register_color_space(
                "base-x",
                crate::model::ColorSpaceConverter {
                    bridge: "base-y".to_owned(),
                    to_bridge_matrix: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
                    from_bridge_matrix: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
                    to_linear: None,
                    from_linear: None,
                    target_gamut: TargetGamut::Unbounded,
                },
            )
            .unwrap();
        registry
            .register_color_space(
                "base-y",
                crate::model::ColorSpaceConverter {
                    bridge: "base-x".to_owned(),
                    to_bridge_matrix: [[2.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 2.0]],
                    from_bridge_matrix: [[0.5, 0.0, 0.0], [0.0, 0.5, 0.0], [0.0, 0.0, 0.5]],
                    to_linear: None,
                    from_linear: None,
                    target_gamut: TargetGamut::Unbounded,
                },
            )
            .unwrap();

        assert_eq!(path(&registry, "base-x", "base-x").unwrap(), vec!["base-x".to_owned()]);
        let converted = convert(&registry, "base-x", "base-y", [1.0, 1.0, 1.0]).unwrap();
        assert_eq!(converted, [2.0, 2.0, 2.0]);
        let back = convert(&registry, "base-y", "base-x", converted).unwrap();
        assert_eq!(back, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn unknown_model_is_reported() {
        let registry = Registry::new();
        assert!(matches!(
            path(&registry, "nope", "also-nope"),
            Err(Error::Lookup(LookupError::UnknownName(_)))
        ));
    }
}
