//! Core generator trait and combinators.
//!
//! Generators read their randomness from a [`NestedRandom`] node instead of a
//! shared `RngCore`. A composite generator hands each part its own child
//! node, so the value of one part never depends on how much randomness
//! another part consumed.

use nested_random::NestedRandom;

/// A generator that produces values of type `T` from a node in the random tree.
///
/// Generators are composable using methods like `map`, `flat_map`, and `filter`.
pub trait Gen<T> {
    /// Generate the value addressed by `node`.
    fn generate(&self, node: &NestedRandom) -> T;

    /// Transform the generated value using a function.
    fn map<U, F>(self, f: F) -> Mapped<Self, F, T>
    where
        Self: Sized,
        F: Fn(T) -> U,
    {
        Mapped {
            gen: self,
            f,
            _phantom: std::marker::PhantomData,
        }
    }

    /// Generate a value, then use it to pick a generator for the `then` child.
    fn flat_map<U, G, F>(self, f: F) -> FlatMapped<Self, F, T, G>
    where
        Self: Sized,
        G: Gen<U>,
        F: Fn(T) -> G,
    {
        FlatMapped {
            gen: self,
            f,
            _phantom: std::marker::PhantomData,
        }
    }

    /// Filter generated values. Attempt `k` draws from child index `k`.
    fn filter<F>(self, predicate: F) -> Filtered<Self, F>
    where
        Self: Sized,
        F: Fn(&T) -> bool,
    {
        Filtered {
            gen: self,
            predicate,
        }
    }
}

impl<T, G: Gen<T> + ?Sized> Gen<T> for &G {
    fn generate(&self, node: &NestedRandom) -> T {
        (**self).generate(node)
    }
}

impl<T, G: Gen<T> + ?Sized> Gen<T> for Box<G> {
    fn generate(&self, node: &NestedRandom) -> T {
        (**self).generate(node)
    }
}

/// A generator that applies a function to transform generated values.
pub struct Mapped<G, F, T> {
    gen: G,
    f: F,
    _phantom: std::marker::PhantomData<T>,
}

impl<T, U, G, F> Gen<U> for Mapped<G, F, T>
where
    G: Gen<T>,
    F: Fn(T) -> U,
{
    fn generate(&self, node: &NestedRandom) -> U {
        (self.f)(self.gen.generate(node))
    }
}

/// A generator that chains generators based on generated values.
pub struct FlatMapped<G, F, T, H> {
    gen: G,
    f: F,
    _phantom: std::marker::PhantomData<(T, H)>,
}

impl<T, U, G, H, F> Gen<U> for FlatMapped<G, F, T, H>
where
    G: Gen<T>,
    H: Gen<U>,
    F: Fn(T) -> H,
{
    fn generate(&self, node: &NestedRandom) -> U {
        let inner = (self.f)(self.gen.generate(node));
        inner.generate(&node.key("then"))
    }
}

/// A generator that filters values based on a predicate.
pub struct Filtered<G, F> {
    gen: G,
    predicate: F,
}

impl<T, G, F> Gen<T> for Filtered<G, F>
where
    G: Gen<T>,
    F: Fn(&T) -> bool,
{
    fn generate(&self, node: &NestedRandom) -> T {
        let mut attempt = 0i32;
        loop {
            let value = self.gen.generate(&node.index(attempt));
            if (self.predicate)(&value) {
                return value;
            }
            attempt = attempt.wrapping_add(1);
        }
    }
}
