//! Similarity graph and logo groups.
//!
//! Domains are nodes; an edge joins two domains whose fingerprints are at
//! most `threshold` bits apart. Groups are the connected components of that
//! graph, so similarity is closed transitively: A~B and B~C put A, B and C
//! in one group even when A and C are far apart.
//!
//! Nodes are always inserted in domain order and groups are sorted, so the
//! output does not depend on how the fingerprints were collected.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::unionfind::UnionFind;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::Domain;
use crate::error::{LogoMatchError, Result};
use crate::fingerprint::{Fingerprint, FingerprintSet, HashAlgorithm, SkippedAsset};
use crate::index::BandIndex;

/// Default maximum Hamming distance for two logos to be linked.
pub const DEFAULT_THRESHOLD: u32 = 5;

/// How candidate pairs are enumerated. Both produce the same edge set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphStrategy {
    /// Compare every unordered pair once.
    #[default]
    Exhaustive,
    /// Compare only pairs sharing a band in a [`BandIndex`].
    Bucketed,
}

impl fmt::Display for GraphStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhaustive => f.write_str("exhaustive"),
            Self::Bucketed => f.write_str("bucketed"),
        }
    }
}

impl FromStr for GraphStrategy {
    type Err = LogoMatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "exhaustive" => Ok(Self::Exhaustive),
            "bucketed" => Ok(Self::Bucketed),
            other => Err(LogoMatchError::Config(format!(
                "Unknown graph strategy: {other}"
            ))),
        }
    }
}

/// A set of domains considered to share a logo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoGroup {
    pub members: Vec<Domain>,
}

impl LogoGroup {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_singleton(&self) -> bool {
        self.members.len() == 1
    }

    pub fn contains(&self, domain: &Domain) -> bool {
        self.members.binary_search(domain).is_ok()
    }
}

/// Undirected graph of domains with edges weighted by fingerprint distance.
#[derive(Debug, Clone)]
pub struct SimilarityGraph {
    graph: UnGraph<Domain, u32>,
    threshold: u32,
}

impl SimilarityGraph {
    /// Build the graph for the given fingerprints.
    ///
    /// If a domain appears more than once the last fingerprint wins.
    pub fn build<I>(fingerprints: I, threshold: u32, strategy: GraphStrategy) -> Self
    where
        I: IntoIterator<Item = (Domain, Fingerprint)>,
    {
        let ordered: BTreeMap<Domain, Fingerprint> = fingerprints.into_iter().collect();

        let mut graph = UnGraph::with_capacity(ordered.len(), 0);
        let mut bits = Vec::with_capacity(ordered.len());
        let mut nodes: Vec<(NodeIndex, Fingerprint)> = Vec::with_capacity(ordered.len());

        for (domain, fingerprint) in ordered {
            bits.push(fingerprint.bits);
            nodes.push((graph.add_node(domain), fingerprint));
        }

        let mut link = |i: usize, j: usize| {
            let (a, fa) = nodes[i];
            let (b, fb) = nodes[j];
            let distance = fa.distance(&fb);
            if distance <= threshold {
                graph.add_edge(a, b, distance);
            }
        };

        let index = match strategy {
            GraphStrategy::Bucketed => BandIndex::build(&bits, threshold),
            GraphStrategy::Exhaustive => None,
        };

        match index {
            Some(index) => {
                debug!(bands = index.band_count(), "Using band index");
                for (i, j) in index.candidate_pairs() {
                    link(i, j);
                }
            }
            None => {
                for i in 0..nodes.len() {
                    for j in (i + 1)..nodes.len() {
                        link(i, j);
                    }
                }
            }
        }

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            threshold,
            %strategy,
            "Built similarity graph"
        );

        Self { graph, threshold }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All edges as `(lower domain, higher domain, distance)`, sorted.
    pub fn edges(&self) -> Vec<(Domain, Domain, u32)> {
        let mut edges: Vec<_> = self
            .graph
            .edge_indices()
            .filter_map(|e| {
                let (a, b) = self.graph.edge_endpoints(e)?;
                let (a, b) = (&self.graph[a], &self.graph[b]);
                let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
                Some((lo.clone(), hi.clone(), self.graph[e]))
            })
            .collect();
        edges.sort();
        edges
    }

    /// Connected components, members sorted, groups ordered by first member.
    pub fn groups(&self) -> Vec<LogoGroup> {
        let mut components = UnionFind::<usize>::new(self.graph.node_count());
        for e in self.graph.edge_indices() {
            if let Some((a, b)) = self.graph.edge_endpoints(e) {
                components.union(a.index(), b.index());
            }
        }

        let mut by_root: BTreeMap<usize, Vec<Domain>> = BTreeMap::new();
        for (node, root) in components.into_labeling().into_iter().enumerate() {
            by_root
                .entry(root)
                .or_default()
                .push(self.graph[NodeIndex::new(node)].clone());
        }

        let mut groups: Vec<LogoGroup> = by_root
            .into_values()
            .map(|mut members| {
                members.sort();
                LogoGroup { members }
            })
            .collect();
        groups.sort_by(|a, b| a.members.cmp(&b.members));
        groups
    }
}

/// Parameters of a clustering run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterOptions {
    pub threshold: u32,
    pub algorithm: HashAlgorithm,
    pub strategy: GraphStrategy,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            algorithm: HashAlgorithm::default(),
            strategy: GraphStrategy::default(),
        }
    }
}

/// Observable result of a clustering run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterReport {
    pub algorithm: HashAlgorithm,
    pub threshold: u32,
    pub strategy: GraphStrategy,
    pub fingerprint_count: usize,
    pub node_count: usize,
    pub edge_count: usize,
    pub groups: Vec<LogoGroup>,
    pub skipped: Vec<SkippedAsset>,
}

impl ClusterReport {
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Groups with more than one member.
    pub fn shared_groups(&self) -> impl Iterator<Item = &LogoGroup> {
        self.groups.iter().filter(|g| !g.is_singleton())
    }

    pub fn group_of(&self, domain: &Domain) -> Option<&LogoGroup> {
        self.groups.iter().find(|g| g.contains(domain))
    }
}

/// Build the similarity graph for a fingerprint set and extract its groups.
pub fn cluster_fingerprints(set: &FingerprintSet, options: &ClusterOptions) -> ClusterReport {
    let graph = SimilarityGraph::build(
        set.fingerprints.iter().map(|(d, f)| (d.clone(), *f)),
        options.threshold,
        options.strategy,
    );
    let groups = graph.groups();

    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        groups = groups.len(),
        "Clustered logos"
    );

    ClusterReport {
        algorithm: set.algorithm,
        threshold: options.threshold,
        strategy: options.strategy,
        fingerprint_count: set.len(),
        node_count: graph.node_count(),
        edge_count: graph.edge_count(),
        groups,
        skipped: set.skipped.clone(),
    }
}
