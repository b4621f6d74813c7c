//! The tree of seeded random streams.

use crate::error::Result;
use crate::murmur::{Murmur2, SeedHash};
use crate::path::{SeedPath, Segment};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// One node in a tree of deterministic random streams.
///
/// A node is reached from the root by a path of string keys and integer
/// indices. Every node can hand out a conventional generator whose seed
/// depends only on the root seed and that path, so separate threads or
/// processes that build the same path get the same stream.
///
/// Nodes are immutable. Cloning is an `Arc` bump, and children keep their
/// parent alive through a shared reference.
///
/// # Example
/// ```
/// use nested_random::NestedRandom;
/// use rand::Rng;
///
/// let root = NestedRandom::root(0);
/// let name = root.key("user").index(5).key("name");
/// let email = root.key("user").index(5).key("email");
/// assert_ne!(name.derive_seed(), email.derive_seed());
///
/// // Rebuilding the same path gives the same stream.
/// let again = NestedRandom::root(0).key("user").index(5).key("name");
/// let a: u64 = name.random_generator().gen();
/// let b: u64 = again.random_generator().gen();
/// assert_eq!(a, b);
/// ```
#[derive(Clone)]
pub struct NestedRandom {
    inner: Arc<Node>,
}

struct Node {
    parent: Option<NestedRandom>,
    /// Segment that reached this node. The root holds its seed as an index.
    segment: Segment,
}

impl Drop for Node {
    fn drop(&mut self) {
        // Unlink uniquely owned ancestors one at a time so long chains do not
        // recurse through `Arc::drop` once per level.
        let mut next = self.parent.take();
        while let Some(node) = next {
            next = match Arc::try_unwrap(node.inner) {
                Ok(mut parent) => parent.parent.take(),
                Err(_) => None,
            };
        }
    }
}

impl NestedRandom {
    /// Root node with the default seed of 0.
    pub fn new() -> Self {
        Self::root(0)
    }

    /// Root node with an explicit seed.
    pub fn root(seed: i32) -> Self {
        Self {
            inner: Arc::new(Node {
                parent: None,
                segment: Segment::Index(seed),
            }),
        }
    }

    /// Root node followed by every segment of `path`.
    pub fn from_path(seed: i32, path: &SeedPath) -> Self {
        Self::root(seed).descend(path)
    }

    /// Child reached by a key or index.
    pub fn child(&self, segment: impl Into<Segment>) -> Self {
        Self {
            inner: Arc::new(Node {
                parent: Some(self.clone()),
                segment: segment.into(),
            }),
        }
    }

    /// Child reached by a string key.
    pub fn key(&self, key: &str) -> Self {
        self.child(key)
    }

    /// Child at position `index` in the notional array below this node.
    pub fn index(&self, index: i32) -> Self {
        self.child(index)
    }

    /// Child reached by a key given as raw bytes.
    ///
    /// Keys must be UTF-8; anything else is rejected here rather than when a
    /// seed is derived.
    pub fn try_key_bytes(&self, key: &[u8]) -> Result<Self> {
        let key = std::str::from_utf8(key)?;
        Ok(self.key(key))
    }

    /// Follow every segment of `path` from this node.
    pub fn descend(&self, path: &SeedPath) -> Self {
        self.descend_segments(path.iter().cloned())
    }

    pub fn descend_segments<I, S>(&self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Segment>,
    {
        segments
            .into_iter()
            .fold(self.clone(), |node, segment| node.child(segment))
    }

    /// The segment that produced this node; for a root, its seed.
    pub fn segment(&self) -> &Segment {
        &self.inner.segment
    }

    /// Bytes this node contributes to seed derivation.
    pub fn content(&self) -> Cow<'_, [u8]> {
        self.inner.segment.content()
    }

    pub fn parent(&self) -> Option<&NestedRandom> {
        self.inner.parent.as_ref()
    }

    pub fn is_root(&self) -> bool {
        self.inner.parent.is_none()
    }

    /// Number of segments between the root and this node.
    pub fn depth(&self) -> usize {
        self.ancestors().count() - 1
    }

    /// Seed of the root this node descends from.
    pub fn root_seed(&self) -> i32 {
        let root = self.ancestors().last().unwrap_or(self);
        match root.inner.segment {
            Segment::Index(seed) => seed,
            // Roots are only ever built by `root`.
            Segment::Key(_) => unreachable!("root node holds a key segment"),
        }
    }

    /// Segments from the root down to this node, excluding the root seed.
    pub fn path(&self) -> SeedPath {
        let mut segments: Vec<Segment> = self
            .ancestors()
            .filter(|node| !node.is_root())
            .map(|node| node.inner.segment.clone())
            .collect();
        segments.reverse();
        segments.into()
    }

    /// This node followed by its parent, grandparent and so on up to the root.
    fn ancestors(&self) -> impl Iterator<Item = &NestedRandom> {
        std::iter::successors(Some(self), |node| node.parent())
    }

    /// The 64-bit seed for this node's stream.
    pub fn derive_seed(&self) -> i64 {
        self.fold_seed(0)
    }

    /// Fold `seed` through this node and all of its ancestors.
    pub fn fold_seed(&self, seed: i64) -> i64 {
        self.fold_seed_with(&Murmur2, seed)
    }

    /// Like [`derive_seed`](Self::derive_seed) with a different hash.
    pub fn derive_seed_with<H: SeedHash + ?Sized>(&self, hasher: &H) -> i64 {
        self.fold_seed_with(hasher, 0)
    }

    fn fold_seed_with<H: SeedHash + ?Sized>(&self, hasher: &H, seed: i64) -> i64 {
        // Leaf first, root last: each level's result salts the next level up.
        self.ancestors()
            .fold(seed, |seed, node| mix(hasher, &node.content(), seed))
    }

    /// A ChaCha8 generator seeded from this node's path.
    pub fn random_generator(&self) -> ChaCha8Rng {
        self.rng()
    }

    /// Any `rand` generator seeded from this node's path.
    pub fn rng<R: SeedableRng>(&self) -> R {
        let seed = self.derive_seed();
        tracing::trace!(node = %self, seed, "seeding generator");
        R::seed_from_u64(seed as u64)
    }

    /// Endless sequence of the children at indices 0, 1, 2, ...
    ///
    /// Each call starts again at index 0; iterators share no state.
    pub fn children(&self) -> Children {
        Children {
            parent: self.clone(),
            next: 0,
        }
    }
}

/// One derivation step: hash `content` salted with each half of `seed`.
fn mix<H: SeedHash + ?Sized>(hasher: &H, content: &[u8], seed: i64) -> i64 {
    let low = hasher.hash(content, seed as i32);
    let high = hasher.hash(content, (seed >> 32) as i32);
    // `low` is sign-extended before the add, matching the reference packing.
    (low as i64).wrapping_add((high as i64) << 32)
}

impl Default for NestedRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NestedRandom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "root({}){}", self.root_seed(), self.path())
    }
}

impl fmt::Debug for NestedRandom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NestedRandom")
            .field(&format_args!("{self}"))
            .finish()
    }
}

/// Iterator returned by [`NestedRandom::children`]. Never ends.
#[derive(Debug, Clone)]
pub struct Children {
    parent: NestedRandom,
    next: i32,
}

impl Iterator for Children {
    type Item = NestedRandom;

    fn next(&mut self) -> Option<NestedRandom> {
        let child = self.parent.index(self.next);
        self.next = self.next.wrapping_add(1);
        Some(child)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

impl<'a> IntoIterator for &'a NestedRandom {
    type Item = NestedRandom;
    type IntoIter = Children;

    fn into_iter(self) -> Children {
        self.children()
    }
}
