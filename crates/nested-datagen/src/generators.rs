//! Built-in generators for common types.

use crate::gen::Gen;
use anyhow::{anyhow, ensure, Result};
use nested_random::NestedRandom;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use std::ops::Range;
use uuid::Uuid;

/// Generate a value uniformly distributed in the given range.
pub struct Uniform<T> {
    range: Range<T>,
}

impl<T> Uniform<T> {
    pub fn new(range: Range<T>) -> Self {
        Self { range }
    }
}

macro_rules! impl_uniform {
    ($($t:ty),*) => {
        $(
            impl Gen<$t> for Uniform<$t> {
                fn generate(&self, node: &NestedRandom) -> $t {
                    node.random_generator().gen_range(self.range.clone())
                }
            }
        )*
    };
}

impl_uniform!(i32, i64, u32, u64, usize, f64);

/// Convenience function to create a uniform generator.
pub fn uniform<T>(range: Range<T>) -> Uniform<T> {
    Uniform::new(range)
}

/// Generate a value selected from weighted choices.
pub struct WeightedChoice<T> {
    items: Vec<T>,
    weights: WeightedIndex<f64>,
}

impl<T: Clone> WeightedChoice<T> {
    pub fn new(items: Vec<(T, f64)>) -> Result<Self> {
        let (items, weights): (Vec<_>, Vec<_>) = items.into_iter().unzip();
        let weights =
            WeightedIndex::new(&weights).map_err(|e| anyhow!("Invalid choice weights: {}", e))?;
        Ok(Self { items, weights })
    }
}

impl<T: Clone> Gen<T> for WeightedChoice<T> {
    fn generate(&self, node: &NestedRandom) -> T {
        let idx = self.weights.sample(&mut node.random_generator());
        self.items[idx].clone()
    }
}

/// Convenience function to create a weighted choice generator.
pub fn weighted_choice<T: Clone>(items: Vec<(T, f64)>) -> Result<WeightedChoice<T>> {
    WeightedChoice::new(items)
}

/// Generate a value uniformly selected from a list.
pub struct OneOf<T> {
    items: Vec<T>,
}

impl<T: Clone> OneOf<T> {
    pub fn new(items: Vec<T>) -> Result<Self> {
        ensure!(!items.is_empty(), "one_of needs at least one item");
        Ok(Self { items })
    }
}

impl<T: Clone> Gen<T> for OneOf<T> {
    fn generate(&self, node: &NestedRandom) -> T {
        let idx = node.random_generator().gen_range(0..self.items.len());
        self.items[idx].clone()
    }
}

/// Convenience function to create a one-of generator.
pub fn one_of<T: Clone>(items: Vec<T>) -> Result<OneOf<T>> {
    OneOf::new(items)
}

/// Generate a deterministic UUID from random bytes.
pub struct UuidGen;

impl Gen<Uuid> for UuidGen {
    fn generate(&self, node: &NestedRandom) -> Uuid {
        let mut bytes = [0u8; 16];
        node.random_generator().fill(&mut bytes);
        // Set version 4 (random) bits
        bytes[6] = (bytes[6] & 0x0f) | 0x40;
        // Set variant bits
        bytes[8] = (bytes[8] & 0x3f) | 0x80;
        Uuid::from_bytes(bytes)
    }
}

/// Convenience function to create a UUID generator.
pub fn uuid_gen() -> UuidGen {
    UuidGen
}

/// Generate a boolean with the given probability of being true.
pub struct BoolWithProb {
    prob: f64,
}

impl BoolWithProb {
    pub fn new(prob: f64) -> Self {
        Self {
            prob: prob.clamp(0.0, 1.0),
        }
    }
}

impl Gen<bool> for BoolWithProb {
    fn generate(&self, node: &NestedRandom) -> bool {
        node.random_generator().gen_bool(self.prob)
    }
}

/// Convenience function to create a boolean generator with given probability.
pub fn bool_with_prob(prob: f64) -> BoolWithProb {
    BoolWithProb::new(prob)
}

/// Generate a constant value.
pub struct Constant<T> {
    value: T,
}

impl<T: Clone> Constant<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T: Clone> Gen<T> for Constant<T> {
    fn generate(&self, _node: &NestedRandom) -> T {
        self.value.clone()
    }
}

/// Convenience function to create a constant generator.
pub fn constant<T: Clone>(value: T) -> Constant<T> {
    Constant::new(value)
}

/// Generate an optional value with the given probability of being Some.
///
/// The presence flag and the value come from separate children, so the
/// value is the same whenever it is present.
pub struct Optional<G, T> {
    gen: G,
    some: BoolWithProb,
    _phantom: std::marker::PhantomData<T>,
}

impl<T, G: Gen<T>> Optional<G, T> {
    pub fn new(gen: G, some_prob: f64) -> Self {
        Self {
            gen,
            some: BoolWithProb::new(some_prob),
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T, G: Gen<T>> Gen<Option<T>> for Optional<G, T> {
    fn generate(&self, node: &NestedRandom) -> Option<T> {
        if self.some.generate(&node.key("present")) {
            Some(self.gen.generate(&node.key("value")))
        } else {
            None
        }
    }
}

/// Convenience function to create an optional generator.
pub fn optional<T, G: Gen<T>>(gen: G, some_prob: f64) -> Optional<G, T> {
    Optional::new(gen, some_prob)
}

/// Generate a log-normal distributed integer.
/// Useful for things like counts, amounts, durations, etc.
pub struct LogNormal {
    dist: rand_distr::LogNormal<f64>,
    max: i32,
}

impl LogNormal {
    pub fn new(median: f64, sigma: f64, max: i32) -> Result<Self> {
        // For log-normal, median = e^mu, so mu = ln(median)
        let mu = median.ln();
        let dist = rand_distr::LogNormal::new(mu, sigma)
            .map_err(|e| anyhow!("Invalid log-normal parameters: {}", e))?;
        Ok(Self { dist, max })
    }
}

impl Gen<i32> for LogNormal {
    fn generate(&self, node: &NestedRandom) -> i32 {
        let value = self.dist.sample(&mut node.random_generator()) as i32;
        value.min(self.max)
    }
}

/// Convenience function to create a log-normal generator.
pub fn log_normal(median: f64, sigma: f64, max: i32) -> Result<LogNormal> {
    LogNormal::new(median, sigma, max)
}

/// Generate values from a geometric distribution.
/// Useful for counts that follow "number of tries until success" pattern.
pub struct Geometric {
    dist: rand_distr::Geometric,
}

impl Geometric {
    pub fn new(p: f64) -> Result<Self> {
        let dist = rand_distr::Geometric::new(p)
            .map_err(|e| anyhow!("Invalid geometric parameter: {}", e))?;
        Ok(Self { dist })
    }
}

impl Gen<usize> for Geometric {
    fn generate(&self, node: &NestedRandom) -> usize {
        self.dist.sample(&mut node.random_generator()) as usize
    }
}

/// Convenience function to create a geometric generator.
pub fn geometric(p: f64) -> Result<Geometric> {
    Geometric::new(p)
}

/// Generate a variable-length array.
///
/// The length comes from the `len` child and element `i` from child `i` of
/// the `items` child, so element values do not depend on the length.
pub struct ArrayOf<L, G, T> {
    len: L,
    item: G,
    _phantom: std::marker::PhantomData<T>,
}

impl<T, L: Gen<usize>, G: Gen<T>> ArrayOf<L, G, T> {
    pub fn new(len: L, item: G) -> Self {
        Self {
            len,
            item,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T, L: Gen<usize>, G: Gen<T>> Gen<Vec<T>> for ArrayOf<L, G, T> {
    fn generate(&self, node: &NestedRandom) -> Vec<T> {
        let len = self.len.generate(&node.key("len"));
        node.key("items")
            .children()
            .take(len)
            .map(|item| self.item.generate(&item))
            .collect()
    }
}

/// Convenience function to create an array generator.
pub fn array_of<T, L: Gen<usize>, G: Gen<T>>(len: L, item: G) -> ArrayOf<L, G, T> {
    ArrayOf::new(len, item)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes(n: usize) -> impl Iterator<Item = NestedRandom> {
        NestedRandom::root(12).key("samples").children().take(n)
    }

    #[test]
    fn test_uniform_in_range() {
        let gen = uniform(10..20i64);
        for node in nodes(200) {
            let value = gen.generate(&node);
            assert!((10..20).contains(&value));
        }
        let gen = uniform(0.0..1.0f64);
        for node in nodes(200) {
            let value = gen.generate(&node);
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    fn test_weighted_choice_respects_zero_weight() {
        let gen = weighted_choice(vec![("a", 1.0), ("b", 0.0)]).unwrap();
        assert!(nodes(200).all(|node| gen.generate(&node) == "a"));
    }

    #[test]
    fn test_weighted_choice_rejects_bad_weights() {
        assert!(weighted_choice::<&str>(vec![]).is_err());
        assert!(weighted_choice(vec![("a", -1.0)]).is_err());
    }

    #[test]
    fn test_one_of() {
        assert!(one_of::<i32>(vec![]).is_err());
        let gen = one_of(vec!["x", "y", "z"]).unwrap();
        let seen: std::collections::HashSet<_> = nodes(100).map(|n| gen.generate(&n)).collect();
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_uuid_version_bits() {
        let id = uuid_gen().generate(&NestedRandom::root(1));
        assert_eq!(id.get_version_num(), 4);
        assert_eq!(id, uuid_gen().generate(&NestedRandom::root(1)));
        assert_ne!(id, uuid_gen().generate(&NestedRandom::root(2)));
    }

    #[test]
    fn test_bool_extremes() {
        assert!(nodes(50).all(|n| bool_with_prob(1.0).generate(&n)));
        assert!(nodes(50).all(|n| !bool_with_prob(0.0).generate(&n)));
    }

    #[test]
    fn test_optional_value_is_stable() {
        let always = optional(uniform(0..1000u32), 1.0);
        let sometimes = optional(uniform(0..1000u32), 0.5);
        for node in nodes(100) {
            if let Some(value) = sometimes.generate(&node) {
                assert_eq!(Some(value), always.generate(&node));
            }
        }
    }

    #[test]
    fn test_log_normal_capped() {
        let gen = log_normal(5.0, 2.0, 20).unwrap();
        assert!(nodes(200).all(|n| gen.generate(&n) <= 20));
        assert!(log_normal(5.0, -1.0, 20).is_err());
    }

    #[test]
    fn test_geometric_rejects_bad_probability() {
        assert!(geometric(1.5).is_err());
        let gen = geometric(1.0).unwrap();
        assert!(nodes(20).all(|n| gen.generate(&n) == 0));
    }

    #[test]
    fn test_array_prefix_is_stable() {
        let short = array_of(constant(3usize), uniform(0..u64::MAX));
        let long = array_of(constant(10usize), uniform(0..u64::MAX));
        let node = NestedRandom::root(4).key("list");
        let a = short.generate(&node);
        let b = long.generate(&node);
        assert_eq!(a.len(), 3);
        assert_eq!(b.len(), 10);
        assert_eq!(a[..], b[..3]);
    }
}
