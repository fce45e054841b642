//! Generalized suffix tree over every replicon of every genome.
//!
//! The tree is an arena of nodes addressed by [`NodeId`]. Edge labels are
//! half-open ranges into one concatenated text in which each inserted
//! replicon is followed by its own end token, so suffixes of different
//! replicons never merge past their end. Construction is Ukkonen's online
//! algorithm run once per replicon against the shared tree.
//!
//! Occurrences are not copied into every node. A leaf index (leaves in DFS
//! order plus a leaf range per node) is computed on first query and cached;
//! any later [`GeneralizedSuffixTree::insert`] drops the cache.

use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::OnceLock;

use serde::Serialize;

use crate::alphabet::Symbol;
use crate::genome::{GenomeId, GenomeStore, RepliconKey};

/// Index of a node in the tree arena.
pub type NodeId = usize;

/// The root node.
pub const ROOT: NodeId = 0;

const OPEN_END: usize = usize::MAX;

/// Element of the concatenated text: a genome symbol or the end marker of
/// one inserted replicon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum Token {
    Sym(Symbol),
    End(u32),
}

impl Token {
    #[inline]
    fn symbol(self) -> Option<Symbol> {
        match self {
            Self::Sym(symbol) => Some(symbol),
            Self::End(_) => None,
        }
    }
}

/// One occurrence of a substring: replicon, start offset and span length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Occurrence {
    pub genome: GenomeId,
    pub replicon: RepliconKey,
    pub start: usize,
    pub length: usize,
}

/// A position inside the tree: exactly on a node, or `offset` symbols down
/// the edge entering `dest` (`0 < offset < edge length`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Locus {
    Node(NodeId),
    Edge { dest: NodeId, offset: usize },
}

impl Locus {
    pub const ROOT: Locus = Locus::Node(ROOT);

    /// Node whose subtree holds every occurrence of this locus.
    pub fn subtree(self) -> NodeId {
        match self {
            Self::Node(node) => node,
            Self::Edge { dest, .. } => dest,
        }
    }
}

/// Edge between a node and one of its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub source: NodeId,
    pub dest: NodeId,
}

#[derive(Debug, Clone, Copy)]
struct StringRecord {
    genome: GenomeId,
    replicon: RepliconKey,
    len: usize,
}

#[derive(Debug, Clone, Copy)]
struct LeafLabel {
    string: u32,
    start: usize,
}

#[derive(Debug, Clone)]
struct Node {
    /// Label of the incoming edge: `text[start..end]`.
    start: usize,
    end: usize,
    parent: NodeId,
    link: NodeId,
    /// Number of tokens from the root to the lower end of this node.
    depth: usize,
    children: BTreeMap<Token, NodeId>,
    leaf: Option<LeafLabel>,
}

impl Node {
    fn internal(start: usize, end: usize, parent: NodeId, depth: usize) -> Self {
        Self {
            start,
            end,
            parent,
            link: ROOT,
            depth,
            children: BTreeMap::new(),
            leaf: None,
        }
    }
}

#[derive(Debug, Default)]
struct LeafIndex {
    order: Vec<LeafLabel>,
    ranges: Vec<Range<usize>>,
}

#[derive(Debug)]
pub struct GeneralizedSuffixTree {
    text: Vec<Token>,
    strings: Vec<StringRecord>,
    nodes: Vec<Node>,
    index: OnceLock<LeafIndex>,
}

impl Default for GeneralizedSuffixTree {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneralizedSuffixTree {
    pub fn new() -> Self {
        Self {
            text: Vec::new(),
            strings: Vec::new(),
            nodes: vec![Node::internal(0, 0, ROOT, 0)],
            index: OnceLock::new(),
        }
    }

    /// Insert every replicon of every genome in store order.
    pub fn build(store: &GenomeStore) -> Self {
        let mut tree = Self::new();
        for genome in store.iter() {
            for replicon in &genome.replicons {
                tree.insert(genome.id, replicon.key, &replicon.symbols);
            }
        }
        log::info!(
            "Suffix tree built over {} replicons ({} symbols, {} nodes).",
            tree.strings.len(),
            tree.total_length(),
            tree.nodes.len()
        );
        tree
    }

    /// Extend the tree with every suffix of `sequence`. Empty sequences are
    /// ignored.
    pub fn insert(&mut self, genome: GenomeId, replicon: RepliconKey, sequence: &[Symbol]) {
        if sequence.is_empty() {
            return;
        }
        self.index = OnceLock::new();

        let string_id = self.strings.len() as u32;
        let base = self.text.len();
        self.text.extend(sequence.iter().map(|&s| Token::Sym(s)));
        self.text.push(Token::End(string_id));
        self.strings.push(StringRecord {
            genome,
            replicon,
            len: sequence.len(),
        });

        let mut active_node = ROOT;
        let mut active_edge = base;
        let mut active_len = 0usize;
        let mut remainder = 0usize;
        let mut open_leaves: Vec<NodeId> = Vec::with_capacity(sequence.len() + 1);

        for pos in base..self.text.len() {
            remainder += 1;
            let mut pending_link: Option<NodeId> = None;

            while remainder > 0 {
                if active_len == 0 {
                    active_edge = pos;
                }
                let edge_token = self.text[active_edge];
                let suffix_start = pos + 1 - remainder - base;

                match self.nodes[active_node].children.get(&edge_token).copied() {
                    None => {
                        let leaf = self.push_leaf(active_node, pos, string_id, suffix_start);
                        self.nodes[active_node].children.insert(edge_token, leaf);
                        open_leaves.push(leaf);
                        if let Some(node) = pending_link.take() {
                            self.nodes[node].link = active_node;
                        }
                    }
                    Some(next) => {
                        let edge_len = self.edge_len_at(next, pos);
                        if active_len >= edge_len {
                            // skip/count down to the next node
                            active_edge += edge_len;
                            active_len -= edge_len;
                            active_node = next;
                            continue;
                        }
                        if self.text[self.nodes[next].start + active_len] == self.text[pos] {
                            if let Some(node) = pending_link.take() {
                                self.nodes[node].link = active_node;
                            }
                            active_len += 1;
                            break;
                        }

                        let split_start = self.nodes[next].start;
                        let split_depth = self.nodes[active_node].depth + active_len;
                        let split = self.nodes.len();
                        self.nodes.push(Node::internal(
                            split_start,
                            split_start + active_len,
                            active_node,
                            split_depth,
                        ));
                        self.nodes[active_node].children.insert(edge_token, split);

                        let leaf = self.push_leaf(split, pos, string_id, suffix_start);
                        let leaf_token = self.text[pos];
                        self.nodes[split].children.insert(leaf_token, leaf);
                        open_leaves.push(leaf);

                        self.nodes[next].start += active_len;
                        self.nodes[next].parent = split;
                        let next_token = self.text[self.nodes[next].start];
                        self.nodes[split].children.insert(next_token, next);

                        if let Some(node) = pending_link.replace(split) {
                            self.nodes[node].link = split;
                        }
                    }
                }

                remainder -= 1;
                if active_node == ROOT && active_len > 0 {
                    active_len -= 1;
                    active_edge = pos + 1 - remainder;
                } else if active_node != ROOT {
                    active_node = self.nodes[active_node].link;
                }
            }
        }

        // close this replicon's leaves at its end token
        let end = self.text.len();
        for leaf in open_leaves {
            let node = &mut self.nodes[leaf];
            node.end = end;
            if let Some(label) = node.leaf {
                node.depth = self.strings[label.string as usize].len - label.start + 1;
            }
        }
    }

    fn push_leaf(&mut self, parent: NodeId, start: usize, string: u32, suffix_start: usize) -> NodeId {
        let id = self.nodes.len();
        let mut node = Node::internal(start, OPEN_END, parent, 0);
        node.leaf = Some(LeafLabel {
            string,
            start: suffix_start,
        });
        self.nodes.push(node);
        id
    }

    #[inline]
    fn edge_len_at(&self, node: NodeId, pos: usize) -> usize {
        let node = &self.nodes[node];
        let end = if node.end == OPEN_END { pos + 1 } else { node.end };
        end - node.start
    }

    #[inline]
    fn edge_len(&self, node: NodeId) -> usize {
        let node = &self.nodes[node];
        node.end - node.start
    }

    fn index(&self) -> &LeafIndex {
        self.index.get_or_init(|| self.compute_index())
    }

    fn compute_index(&self) -> LeafIndex {
        let mut order = Vec::new();
        let mut ranges = vec![0..0; self.nodes.len()];
        let mut stack: Vec<(NodeId, bool)> = vec![(ROOT, false)];

        while let Some((node_id, expanded)) = stack.pop() {
            let node = &self.nodes[node_id];
            if expanded {
                ranges[node_id].end = order.len();
                continue;
            }
            ranges[node_id].start = order.len();
            if let Some(label) = node.leaf {
                order.push(label);
            }
            stack.push((node_id, true));
            for &child in node.children.values().rev() {
                stack.push((child, false));
            }
        }

        LeafIndex { order, ranges }
    }

    /// Advance one symbol from `locus`, matching exactly.
    pub fn step(&self, locus: Locus, symbol: Symbol) -> Option<Locus> {
        let token = Token::Sym(symbol);
        match locus {
            Locus::Node(node) => {
                let child = *self.nodes[node].children.get(&token)?;
                Some(self.advance_into(child, 1))
            }
            Locus::Edge { dest, offset } => {
                if self.text[self.nodes[dest].start + offset] == token {
                    Some(self.advance_into(dest, offset + 1))
                } else {
                    None
                }
            }
        }
    }

    #[inline]
    fn advance_into(&self, dest: NodeId, consumed: usize) -> Locus {
        if consumed == self.edge_len(dest) {
            Locus::Node(dest)
        } else {
            Locus::Edge {
                dest,
                offset: consumed,
            }
        }
    }

    /// Every one-symbol continuation of `locus`, in symbol order. End tokens
    /// are never continued through.
    pub fn continuations(&self, locus: Locus) -> Vec<(Symbol, Locus)> {
        match locus {
            Locus::Node(node) => self.nodes[node]
                .children
                .iter()
                .filter_map(|(token, &child)| {
                    token
                        .symbol()
                        .map(|symbol| (symbol, self.advance_into(child, 1)))
                })
                .collect(),
            Locus::Edge { dest, offset } => {
                let token = self.text[self.nodes[dest].start + offset];
                token
                    .symbol()
                    .map(|symbol| vec![(symbol, self.advance_into(dest, offset + 1))])
                    .unwrap_or_default()
            }
        }
    }

    /// Number of symbols spelled from the root to `locus`.
    pub fn locus_depth(&self, locus: Locus) -> usize {
        match locus {
            Locus::Node(node) => self.nodes[node].depth,
            Locus::Edge { dest, offset } => self.nodes[self.nodes[dest].parent].depth + offset,
        }
    }

    /// Symbols spelled from the root to `locus`.
    pub fn spell(&self, locus: Locus) -> Vec<Symbol> {
        let mut path = Vec::new();
        let (mut node, take) = match locus {
            Locus::Node(node) => (node, None),
            Locus::Edge { dest, offset } => (dest, Some(offset)),
        };
        let mut limit = take;
        while node != ROOT {
            let n = &self.nodes[node];
            let len = limit.take().unwrap_or(n.end - n.start);
            let mut label: Vec<Symbol> = self.text[n.start..n.start + len]
                .iter()
                .filter_map(|t| t.symbol())
                .collect();
            label.reverse();
            path.extend(label);
            node = n.parent;
        }
        path.reverse();
        path
    }

    /// All occurrences of the substring spelled by `locus`.
    pub fn occurrences(&self, locus: Locus) -> Vec<Occurrence> {
        let depth = self.locus_depth(locus);
        if depth == 0 {
            return Vec::new();
        }
        let index = self.index();
        let range = index.ranges[locus.subtree()].clone();
        index.order[range]
            .iter()
            .filter_map(|label| {
                let record = self.strings[label.string as usize];
                (label.start + depth <= record.len).then_some(Occurrence {
                    genome: record.genome,
                    replicon: record.replicon,
                    start: label.start,
                    length: depth,
                })
            })
            .collect()
    }

    /// Results table of a node: `genome -> occurrences`, sorted.
    pub fn results(&self, node: NodeId) -> BTreeMap<GenomeId, Vec<Occurrence>> {
        group_by_genome(self.occurrences(Locus::Node(node)))
    }

    /// Exact lookup: descend from the root matching `symbols`.
    pub fn occurrences_of(&self, symbols: &[Symbol]) -> BTreeMap<GenomeId, Vec<Occurrence>> {
        if symbols.is_empty() {
            return BTreeMap::new();
        }
        let mut locus = Locus::ROOT;
        for &symbol in symbols {
            match self.step(locus, symbol) {
                Some(next) => locus = next,
                None => return BTreeMap::new(),
            }
        }
        group_by_genome(self.occurrences(locus))
    }

    /// Edge entering `dest`.
    pub fn edge(&self, dest: NodeId) -> Option<Edge> {
        (dest != ROOT && dest < self.nodes.len()).then(|| Edge {
            source: self.nodes[dest].parent,
            dest,
        })
    }

    /// Symbols labelling the edge entering `dest` (end token omitted).
    pub fn edge_label(&self, dest: NodeId) -> Vec<Symbol> {
        let node = &self.nodes[dest];
        self.text[node.start..node.end]
            .iter()
            .filter_map(|t| t.symbol())
            .collect()
    }

    /// Suffix link of an internal node.
    pub fn suffix_link(&self, node: NodeId) -> Option<NodeId> {
        let n = self.nodes.get(node)?;
        (node != ROOT && n.leaf.is_none()).then_some(n.link)
    }

    pub fn depth(&self, node: NodeId) -> usize {
        self.nodes[node].depth
    }

    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.nodes[node].leaf.is_some()
    }

    pub fn children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes[node].children.values().copied()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of non-empty replicons inserted.
    pub fn string_count(&self) -> usize {
        self.strings.len()
    }

    /// Total symbols inserted, end tokens excluded.
    pub fn total_length(&self) -> usize {
        self.strings.iter().map(|s| s.len).sum()
    }
}

fn group_by_genome(occurrences: Vec<Occurrence>) -> BTreeMap<GenomeId, Vec<Occurrence>> {
    let mut table: BTreeMap<GenomeId, Vec<Occurrence>> = BTreeMap::new();
    for occurrence in occurrences {
        table.entry(occurrence.genome).or_default().push(occurrence);
    }
    for list in table.values_mut() {
        list.sort_unstable();
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::{Alphabet, Strand};

    fn symbols(alphabet: &mut Alphabet, text: &str) -> Vec<Symbol> {
        text.chars()
            .map(|c| alphabet.intern(&c.to_string(), Strand::Unknown))
            .collect()
    }

    fn build(texts: &[&str]) -> (Alphabet, GeneralizedSuffixTree, Vec<Vec<Symbol>>) {
        let mut alphabet = Alphabet::new();
        let mut tree = GeneralizedSuffixTree::new();
        let mut sequences = Vec::new();
        for (idx, text) in texts.iter().enumerate() {
            let seq = symbols(&mut alphabet, text);
            tree.insert(GenomeId(idx as u32), RepliconKey(0), &seq);
            sequences.push(seq);
        }
        (alphabet, tree, sequences)
    }

    fn brute_force(sequences: &[Vec<Symbol>], pattern: &[Symbol]) -> Vec<Occurrence> {
        let mut found = Vec::new();
        for (genome, seq) in sequences.iter().enumerate() {
            if pattern.len() > seq.len() {
                continue;
            }
            for start in 0..=seq.len() - pattern.len() {
                if &seq[start..start + pattern.len()] == pattern {
                    found.push(Occurrence {
                        genome: GenomeId(genome as u32),
                        replicon: RepliconKey(0),
                        start,
                        length: pattern.len(),
                    });
                }
            }
        }
        found.sort_unstable();
        found
    }

    #[test]
    fn matches_brute_force_on_repetitive_inputs() {
        let (_, tree, sequences) = build(&["ABABAB", "AAAA", "BABCAB", "ABCABD", "A"]);

        for seq in &sequences {
            for start in 0..seq.len() {
                for end in start + 1..=seq.len() {
                    let pattern = &seq[start..end];
                    let mut found: Vec<Occurrence> =
                        tree.occurrences_of(pattern).into_values().flatten().collect();
                    found.sort_unstable();
                    assert_eq!(found, brute_force(&sequences, pattern));
                }
            }
        }
    }

    #[test]
    fn absent_paths_return_empty() {
        let (mut alphabet, tree, _) = build(&["ABCDE", "XBCDY"]);
        let missing = symbols(&mut alphabet, "BCE");
        assert!(tree.occurrences_of(&missing).is_empty());
        assert!(tree.occurrences_of(&[]).is_empty());
        assert!(tree.occurrences_of(&[Symbol::WILDCARD]).is_empty());
    }

    #[test]
    fn shared_substrings_merge_into_shared_nodes() {
        let (mut alphabet, tree, _) = build(&["ABCDE", "XBCDY", "ABCDZ"]);
        let bcd = symbols(&mut alphabet, "BCD");
        let table = tree.occurrences_of(&bcd);
        assert_eq!(table.len(), 3);
        assert!(table.values().all(|list| list.len() == 1 && list[0].start == 1));

        let abc = symbols(&mut alphabet, "ABC");
        let genomes: Vec<GenomeId> = tree.occurrences_of(&abc).into_keys().collect();
        assert_eq!(genomes, vec![GenomeId(0), GenomeId(2)]);
    }

    #[test]
    fn suffix_links_drop_one_symbol() {
        let (_, tree, _) = build(&["ABABAB", "BABCAB", "ABCABD"]);
        for node in 1..tree.node_count() {
            if let Some(link) = tree.suffix_link(node) {
                assert_eq!(tree.depth(link) + 1, tree.depth(node), "node {node}");
                let spelled = tree.spell(Locus::Node(node));
                assert_eq!(tree.spell(Locus::Node(link)), spelled[1..].to_vec());
            }
        }
    }

    #[test]
    fn step_and_continuations_agree() {
        let (mut alphabet, tree, _) = build(&["ABCD", "ABCE"]);
        let a = alphabet.intern("A", Strand::Unknown);
        let b = alphabet.intern("B", Strand::Unknown);

        let after_a = tree.step(Locus::ROOT, a).unwrap();
        assert_eq!(tree.locus_depth(after_a), 1);
        let nexts = tree.continuations(after_a);
        assert_eq!(nexts.len(), 1);
        assert_eq!(nexts[0].0, b);
        assert_eq!(tree.step(after_a, b), Some(nexts[0].1));

        let after_abc = tree.step(nexts[0].1, alphabet.intern("C", Strand::Unknown)).unwrap();
        assert_eq!(tree.continuations(after_abc).len(), 2);
        assert_eq!(tree.occurrences(after_abc).len(), 2);
        assert!(tree.occurrences(Locus::ROOT).is_empty());
    }

    #[test]
    fn edges_expose_labels_and_sources() {
        let (_, tree, _) = build(&["ABC", "ABD"]);
        let internal = (1..tree.node_count())
            .find(|&n| !tree.is_leaf(n) && tree.depth(n) == 2)
            .expect("AB node");
        let edge = tree.edge(internal).unwrap();
        assert_eq!(edge.source, ROOT);
        assert_eq!(tree.edge_label(internal).len(), 2);
        assert_eq!(tree.results(internal).len(), 2);
        assert!(tree.edge(ROOT).is_none());
    }

    #[test]
    fn insert_invalidates_cached_index() {
        let mut alphabet = Alphabet::new();
        let mut tree = GeneralizedSuffixTree::new();
        let ab = symbols(&mut alphabet, "AB");
        tree.insert(GenomeId(0), RepliconKey(0), &ab);
        assert_eq!(tree.occurrences_of(&ab).len(), 1);

        tree.insert(GenomeId(1), RepliconKey(0), &symbols(&mut alphabet, "XAB"));
        assert_eq!(tree.occurrences_of(&ab).len(), 2);
        assert_eq!(tree.string_count(), 2);
        assert_eq!(tree.total_length(), 5);
    }

    #[test]
    fn build_covers_every_replicon() {
        let mut store = GenomeStore::default();
        let first = symbols(store.alphabet_mut(), "ABC");
        let second = symbols(store.alphabet_mut(), "CAB");
        store.add_genome(
            "g1",
            vec![("r1".into(), first), ("r2".into(), second)],
            crate::genome::OrientationMode::Unstranded,
        )
        .unwrap();
        let tree = GeneralizedSuffixTree::build(&store);
        let ab = store.alphabet().get("A", Strand::Unknown).unwrap();
        let b = store.alphabet().get("B", Strand::Unknown).unwrap();
        let table = tree.occurrences_of(&[ab, b]);
        let replicons: Vec<RepliconKey> = table[&GenomeId(0)].iter().map(|o| o.replicon).collect();
        assert_eq!(replicons, vec![RepliconKey(0), RepliconKey(1)]);
    }
}
