// src/depmap/mod.rs

//! Dependency map
//!
//! Translates artifact identities to the identities they were installed
//! as. The map is a directed graph whose edges carry a namespace; a
//! translation walks the graph transitively, so `foo -> bar -> baz`
//! translates `foo` to both `bar` and `baz`. Versions never take part in
//! the mapping.

mod reader;

pub use reader::{parse_fragment, read_fragment, Mapping};

use crate::artifact::ArtifactId;
use crate::config::ResolverSettings;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Edge {
    target: usize,
    namespace: String,
}

/// Artifact translation graph
///
/// Nodes live in an arena indexed by versionless artifact identity, edges
/// refer to nodes by index.
#[derive(Debug, Clone, Default)]
pub struct DependencyMap {
    nodes: Vec<ArtifactId>,
    index: HashMap<ArtifactId, usize>,
    forward: Vec<Vec<Edge>>,
    reverse: Vec<Vec<Edge>>,
}

/// Whether an edge namespace satisfies a query namespace
///
/// No query namespace (or an empty one) accepts every edge; otherwise the
/// edge must carry the same namespace or none at all.
fn namespace_matches(query: Option<&str>, edge: &str) -> bool {
    match query {
        None | Some("") => true,
        Some(query) => edge.is_empty() || edge == query,
    }
}

impl DependencyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from fragment files, in the given order
    ///
    /// Fragments are parsed in parallel but folded in order, so the result
    /// only depends on the order of `paths`.
    pub fn load<P: AsRef<Path> + Sync>(paths: &[P]) -> Self {
        let fragments: Vec<Vec<Mapping>> = paths
            .par_iter()
            .map(|path| read_fragment(path.as_ref()))
            .collect();

        let mut map = Self::new();
        for mapping in fragments.into_iter().flatten() {
            map.add_mapping(&mapping.from, &mapping.to, &mapping.namespace);
        }

        info!(
            "Loaded dependency map with {} artifacts from {} fragments",
            map.nodes.len(),
            paths.len()
        );
        map
    }

    /// Build a map from the metadata repositories named in resolver settings
    pub fn from_settings(settings: &ResolverSettings) -> Self {
        Self::load(&fragment_locations(settings))
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node(&mut self, artifact: &ArtifactId) -> usize {
        let key = artifact.identity().without_version();
        if let Some(&index) = self.index.get(&key) {
            return index;
        }

        let index = self.nodes.len();
        self.nodes.push(key.clone());
        self.index.insert(key, index);
        self.forward.push(Vec::new());
        self.reverse.push(Vec::new());
        index
    }

    /// Record that `from` was installed as `to` in `namespace`
    ///
    /// Versions of both artifacts are dropped.
    pub fn add_mapping(&mut self, from: &ArtifactId, to: &ArtifactId, namespace: &str) {
        let source = self.node(from);
        let target = self.node(to);

        let edge = Edge {
            target,
            namespace: namespace.to_string(),
        };
        if self.forward[source].contains(&edge) {
            return;
        }

        debug!("Added mapping {} -> {} [{}]", from, to, namespace);
        self.forward[source].push(edge);
        self.reverse[target].push(Edge {
            target: source,
            namespace: namespace.to_string(),
        });
    }

    fn walk(
        &self,
        start: usize,
        namespace: Option<&str>,
        edges: &[Vec<Edge>],
        visited: &mut HashSet<usize>,
        found: &mut Vec<(usize, String)>,
    ) {
        let mut queue = VecDeque::from([start]);
        visited.insert(start);

        while let Some(node) = queue.pop_front() {
            for edge in &edges[node] {
                if !namespace_matches(namespace, &edge.namespace) {
                    continue;
                }
                if visited.insert(edge.target) {
                    found.push((edge.target, edge.namespace.clone()));
                    queue.push_back(edge.target);
                }
            }
        }
    }

    /// Every artifact reachable from `artifact`, in discovery order
    ///
    /// Results are versionless and tagged with the namespace of the edge
    /// that reached them. Cycles are walked at most once.
    pub fn translate(&self, artifact: &ArtifactId, namespace: Option<&str>) -> Vec<ArtifactId> {
        let key = artifact.identity().without_version();
        let Some(&start) = self.index.get(&key) else {
            return Vec::new();
        };

        let mut visited = HashSet::new();
        let mut found = Vec::new();
        self.walk(start, namespace, &self.forward, &mut visited, &mut found);

        found
            .into_iter()
            .map(|(node, ns)| self.nodes[node].with_namespace(&ns))
            .collect()
    }

    /// Artifacts sharing an origin with `artifact`
    ///
    /// Collects everything that maps onto `artifact` (transitively) and
    /// everything reachable from any of those, excluding `artifact` itself.
    pub fn relatives_of(&self, artifact: &ArtifactId) -> Vec<ArtifactId> {
        let key = artifact.identity().without_version();
        let Some(&start) = self.index.get(&key) else {
            return Vec::new();
        };

        let mut ancestors = Vec::new();
        self.walk(start, None, &self.reverse, &mut HashSet::new(), &mut ancestors);

        let mut visited = HashSet::new();
        let mut found = Vec::new();
        self.walk(start, None, &self.forward, &mut visited, &mut found);

        for (ancestor, ns) in ancestors {
            if visited.insert(ancestor) {
                found.push((ancestor, ns));
            }
            let mut reached = Vec::new();
            self.walk(ancestor, None, &self.forward, &mut HashSet::new(), &mut reached);
            for (node, ns) in reached {
                if visited.insert(node) {
                    found.push((node, ns));
                }
            }
        }

        found
            .into_iter()
            .map(|(node, ns)| self.nodes[node].with_namespace(&ns))
            .collect()
    }
}

/// Fragment files named by resolver settings
///
/// Every `prefix / metadataRepository` pair whose prefix directory exists
/// is considered; a location that is a directory contributes its entries
/// in sorted order.
pub fn fragment_locations(settings: &ResolverSettings) -> Vec<PathBuf> {
    let mut locations = Vec::new();

    for prefix in &settings.prefixes {
        let prefix = Path::new(prefix);
        if !prefix.is_dir() {
            debug!("Skipping metadata prefix {}: not a directory", prefix.display());
            continue;
        }

        for repository in &settings.metadata_repositories {
            let location = prefix.join(repository.trim_start_matches('/'));

            if location.is_dir() {
                match fs::read_dir(&location) {
                    Ok(entries) => {
                        let mut files: Vec<PathBuf> = entries
                            .filter_map(|e| e.ok())
                            .map(|e| e.path())
                            .filter(|p| p.is_file())
                            .collect();
                        files.sort();
                        locations.extend(files);
                    }
                    Err(e) => debug!(
                        "Skipping metadata repository {}: {}",
                        location.display(),
                        e
                    ),
                }
            } else if location.is_file() {
                locations.push(location);
            } else {
                debug!(
                    "Skipping metadata repository {}: no such file or directory",
                    location.display()
                );
            }
        }
    }

    locations
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn a(coordinates: &str) -> ArtifactId {
        ArtifactId::of(coordinates).unwrap()
    }

    fn ids(artifacts: &[ArtifactId]) -> Vec<String> {
        artifacts.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn test_empty_map_translates_nothing() {
        let map = DependencyMap::new();
        assert!(map.is_empty());
        assert!(map.translate(&a("g:foo"), None).is_empty());
    }

    #[test]
    fn test_transitive_translation() {
        let mut map = DependencyMap::new();
        map.add_mapping(&a("g:foo"), &a("g:bar"), "");
        map.add_mapping(&a("g:bar"), &a("g:baz"), "");

        let result = map.translate(&a("g:foo:1.0"), None);
        assert_eq!(ids(&result), ["g:bar:jar:SYSTEM", "g:baz:jar:SYSTEM"]);
    }

    #[test]
    fn test_cycle_terminates() {
        let mut map = DependencyMap::new();
        map.add_mapping(&a("g:foo"), &a("g:bar"), "");
        map.add_mapping(&a("g:bar"), &a("g:foo"), "");

        let result = map.translate(&a("g:foo"), None);
        assert_eq!(ids(&result), ["g:bar:jar:SYSTEM"]);
    }

    #[test]
    fn test_namespace_filtering() {
        let mut map = DependencyMap::new();
        map.add_mapping(&a("g:foo"), &a("g:any"), "");
        map.add_mapping(&a("g:foo"), &a("g:one"), "ns1");
        map.add_mapping(&a("g:foo"), &a("g:two"), "ns2");

        assert_eq!(map.translate(&a("g:foo"), None).len(), 3);
        assert_eq!(map.translate(&a("g:foo"), Some("")).len(), 3);

        let result = map.translate(&a("g:foo"), Some("ns1"));
        assert_eq!(ids(&result), ["g:any:jar:SYSTEM", "g:one:jar:SYSTEM"]);
        assert_eq!(result[1].namespace(), Some("ns1"));
        assert_eq!(result[0].namespace(), None);
    }

    #[test]
    fn test_duplicate_mappings_are_merged() {
        let mut map = DependencyMap::new();
        map.add_mapping(&a("g:foo:1"), &a("g:bar"), "");
        map.add_mapping(&a("g:foo:2"), &a("g:bar"), "");

        assert_eq!(map.translate(&a("g:foo"), None).len(), 1);
    }

    #[test]
    fn test_relatives() {
        let mut map = DependencyMap::new();
        map.add_mapping(&a("g:origin"), &a("g:first"), "");
        map.add_mapping(&a("g:origin"), &a("g:second"), "");
        map.add_mapping(&a("g:second"), &a("g:third"), "");

        let relatives = ids(&map.relatives_of(&a("g:first")));
        assert_eq!(relatives.len(), 3);
        assert!(relatives.contains(&"g:origin:jar:SYSTEM".to_string()));
        assert!(relatives.contains(&"g:second:jar:SYSTEM".to_string()));
        assert!(relatives.contains(&"g:third:jar:SYSTEM".to_string()));
    }

    #[test]
    fn test_load_from_settings() {
        let temp = TempDir::new().unwrap();
        let metadata = temp.path().join("usr/share/maven-metadata");
        fs::create_dir_all(&metadata).unwrap();

        fs::write(
            metadata.join("a.xml"),
            "<dependency><maven><groupId>g</groupId><artifactId>foo</artifactId></maven>\
             <jpp><groupId>JPP</groupId><artifactId>foo</artifactId></jpp></dependency>",
        )
        .unwrap();
        fs::write(metadata.join("b.xml"), "not xml at all <").unwrap();

        let settings = ResolverSettings {
            prefixes: vec![
                temp.path().to_string_lossy().into_owned(),
                "/nonexistent-prefix".to_string(),
            ],
            metadata_repositories: vec!["usr/share/maven-metadata".to_string()],
            ..Default::default()
        };

        let locations = fragment_locations(&settings);
        assert_eq!(locations, [metadata.join("a.xml"), metadata.join("b.xml")]);

        let map = DependencyMap::from_settings(&settings);
        assert_eq!(ids(&map.translate(&a("g:foo"), None)), ["JPP:foo:jar:SYSTEM"]);
    }
}
