//! Grouping of discovered patterns into families of similar patterns.
//!
//! Patterns are nodes of a similarity graph; an edge joins two patterns
//! whose core similarity reaches the threshold. Families are its connected
//! components (single linkage).

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::alphabet::Symbol;
use crate::config::{ClusterBy, ClusterConfig};
use crate::pattern::Pattern;

/// A family of similar patterns. The first member is its representative.
#[derive(Debug, Clone)]
pub struct Family {
    pub id: usize,
    pub patterns: Vec<Pattern>,
}

impl Family {
    pub fn representative(&self) -> Option<&Pattern> {
        self.patterns.first()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Length of the longest common subsequence of two symbol runs.
pub fn lcs_length(a: &[Symbol], b: &[Symbol]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let mut previous = vec![0usize; b.len() + 1];
    let mut current = vec![0usize; b.len() + 1];
    for &x in a {
        for (j, &y) in b.iter().enumerate() {
            current[j + 1] = if x == y {
                previous[j] + 1
            } else {
                current[j].max(previous[j + 1])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

/// `LCS(a, b) / min(|a|, |b|)`, 0 when either side is empty.
pub fn similarity(a: &[Symbol], b: &[Symbol]) -> f64 {
    let shorter = a.len().min(b.len());
    if shorter == 0 {
        return 0.0;
    }
    lcs_length(a, b) as f64 / shorter as f64
}

/// Adjacency of patterns (by position) whose cores are similar enough.
pub fn build_similarity_graph(cores: &[Vec<Symbol>], threshold: f64) -> BTreeMap<usize, BTreeSet<usize>> {
    let mut graph: BTreeMap<usize, BTreeSet<usize>> = (0..cores.len()).map(|i| (i, BTreeSet::new())).collect();
    for i in 0..cores.len() {
        for j in (i + 1)..cores.len() {
            if similarity(&cores[i], &cores[j]) >= threshold {
                graph.entry(i).or_default().insert(j);
                graph.entry(j).or_default().insert(i);
            }
        }
    }
    graph
}

/// Connected components by BFS, each sorted, ordered by smallest member.
pub fn find_connected_components(graph: &BTreeMap<usize, BTreeSet<usize>>) -> Vec<Vec<usize>> {
    let mut visited: BTreeSet<usize> = BTreeSet::new();
    let mut components = Vec::new();

    for &start in graph.keys() {
        if !visited.insert(start) {
            continue;
        }
        let mut component = Vec::new();
        let mut queue = VecDeque::from([start]);
        while let Some(node) = queue.pop_front() {
            component.push(node);
            if let Some(neighbors) = graph.get(&node) {
                for &neighbor in neighbors {
                    if visited.insert(neighbor) {
                        queue.push_back(neighbor);
                    }
                }
            }
        }
        component.sort_unstable();
        components.push(component);
    }

    components
}

/// Criterion order: best first, then more instances, then input position.
fn rank(cluster_by: ClusterBy, a: (usize, &Pattern), b: (usize, &Pattern)) -> Ordering {
    let primary = match cluster_by {
        ClusterBy::Length => b.1.len().cmp(&a.1.len()),
        ClusterBy::Score => b.1.score().total_cmp(&a.1.score()),
    };
    primary
        .then_with(|| b.1.instance_count().cmp(&a.1.instance_count()))
        .then_with(|| a.0.cmp(&b.0))
}

/// Partition `patterns` into families. Every pattern lands in exactly one
/// family and carries its family id afterwards.
pub fn cluster(patterns: Vec<Pattern>, config: &ClusterConfig) -> Vec<Family> {
    let cores: Vec<Vec<Symbol>> = patterns.iter().map(Pattern::core).collect();
    let graph = build_similarity_graph(&cores, config.threshold);
    let mut components = find_connected_components(&graph);

    for component in &mut components {
        component.sort_by(|&a, &b| rank(config.cluster_by, (a, &patterns[a]), (b, &patterns[b])));
    }
    components.sort_by(|a, b| {
        rank(
            config.cluster_by,
            (a[0], &patterns[a[0]]),
            (b[0], &patterns[b[0]]),
        )
    });

    let mut slots: Vec<Option<Pattern>> = patterns.into_iter().map(Some).collect();
    let families: Vec<Family> = components
        .into_iter()
        .enumerate()
        .map(|(id, members)| {
            let patterns = members
                .into_iter()
                .filter_map(|index| slots[index].take())
                .map(|mut pattern| {
                    pattern.family_id = Some(id);
                    pattern
                })
                .collect();
            Family { id, patterns }
        })
        .collect();

    log::info!("Clustered patterns into {} families.", families.len());
    families
}
