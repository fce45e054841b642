//! Static prefix tree over a user-supplied pattern list.
//!
//! When present, discovery only spells paths of this trie and reports only
//! patterns ending at a terminal node.

use std::collections::{BTreeMap, BTreeSet};

use crate::alphabet::Symbol;

/// Index of a node in the trie arena.
pub type TrieNodeId = usize;

pub const TRIE_ROOT: TrieNodeId = 0;

#[derive(Debug, Clone, Default)]
struct TrieNode {
    children: BTreeMap<Symbol, TrieNodeId>,
    /// Index of the first supplied pattern ending here.
    terminal: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct PatternTrie {
    nodes: Vec<TrieNode>,
}

impl PatternTrie {
    /// Build from an ordered pattern list. Leading gaps are dropped, since a
    /// gap consumes nothing before the first matched symbol. Patterns left
    /// empty are ignored; duplicates share one terminal carrying the first
    /// index.
    pub fn build(patterns: &[Vec<Symbol>]) -> Self {
        let mut trie = Self {
            nodes: vec![TrieNode::default()],
        };

        for (index, pattern) in patterns.iter().enumerate() {
            let body = match pattern.iter().position(|s| !s.is_gap()) {
                Some(first) => &pattern[first..],
                None => {
                    log::debug!("Skipping empty input pattern #{index}");
                    continue;
                }
            };
            let mut node = TRIE_ROOT;
            for &symbol in body {
                node = match trie.nodes[node].children.get(&symbol) {
                    Some(&child) => child,
                    None => {
                        let child = trie.nodes.len();
                        trie.nodes.push(TrieNode::default());
                        trie.nodes[node].children.insert(symbol, child);
                        child
                    }
                };
            }
            if trie.nodes[node].terminal.is_none() {
                trie.nodes[node].terminal = Some(index);
            }
        }

        trie
    }

    /// Outgoing symbols of `node` in symbol order.
    pub fn children(&self, node: TrieNodeId) -> impl Iterator<Item = (Symbol, TrieNodeId)> + '_ {
        self.nodes[node].children.iter().map(|(&s, &n)| (s, n))
    }

    pub fn terminal(&self, node: TrieNodeId) -> Option<usize> {
        self.nodes[node].terminal
    }

    /// Number of distinct non-empty patterns.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.terminal.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every `(pattern_index, start)` occurrence of a supplied pattern in
    /// `sequence`. Wildcards match any symbol; gaps consume nothing.
    pub fn match_sequence(&self, sequence: &[Symbol]) -> BTreeSet<(usize, usize)> {
        let mut found = BTreeSet::new();
        for start in 0..sequence.len() {
            let mut stack: Vec<(TrieNodeId, usize)> = vec![(TRIE_ROOT, start)];
            while let Some((node, pos)) = stack.pop() {
                if node != TRIE_ROOT {
                    if let Some(index) = self.nodes[node].terminal {
                        found.insert((index, start));
                    }
                }
                for (&symbol, &child) in &self.nodes[node].children {
                    if symbol.is_gap() {
                        stack.push((child, pos));
                    } else if pos < sequence.len()
                        && (symbol.is_wildcard() || symbol == sequence[pos])
                    {
                        stack.push((child, pos + 1));
                    }
                }
            }
        }
        found
    }
}
