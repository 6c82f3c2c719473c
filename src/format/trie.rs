use std::collections::HashMap;

use crate::error::TrieError;

#[derive(Debug, Clone)]
struct Node<T> {
    children: HashMap<u8, Node<T>>,
    value: Option<T>,
}

impl<T> Default for Node<T> {
    fn default() -> Self {
        Self {
            children: HashMap::new(),
            value: None,
        }
    }
}

/// Prefix lookup over byte sequences.
///
/// [`find`](Self::find) returns the value attached to the longest inserted
/// path that prefixes the input, or the default value when none does.
#[derive(Debug, Clone)]
pub struct ByteTrie<T> {
    root: Node<T>,
    max_depth: usize,
}

impl<T> Default for ByteTrie<T> {
    fn default() -> Self {
        Self {
            root: Node::default(),
            max_depth: 0,
        }
    }
}

impl<T> ByteTrie<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `value` to the path formed by concatenating `parts`.
    ///
    /// Fails if that exact path already carries a value. An empty path
    /// targets the root, the same slot as [`set_default`](Self::set_default).
    pub fn insert(&mut self, value: T, parts: &[&[u8]]) -> Result<(), TrieError> {
        let mut node = &mut self.root;
        let mut depth = 0;
        for &b in parts.iter().flat_map(|part| part.iter()) {
            node = node.children.entry(b).or_default();
            depth += 1;
        }
        if node.value.is_some() {
            return Err(TrieError::ValueAlreadySet);
        }
        node.value = Some(value);
        self.max_depth = self.max_depth.max(depth);
        Ok(())
    }

    /// Value returned when no inserted path prefixes the input.
    pub fn set_default(&mut self, value: T) {
        self.root.value = Some(value);
    }

    /// Deepest value along the path described by `bytes`.
    pub fn find(&self, bytes: &[u8]) -> Option<&T> {
        let mut node = &self.root;
        let mut found = node.value.as_ref();
        for b in bytes {
            match node.children.get(b) {
                Some(child) => {
                    node = child;
                    if child.value.is_some() {
                        found = child.value.as_ref();
                    }
                }
                None => break,
            }
        }
        found
    }

    /// Length of the longest inserted path.
    ///
    /// Reading this many bytes is always enough for [`find`](Self::find).
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}
