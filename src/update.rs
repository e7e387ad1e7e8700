//! Source dispatch for [`crate::Counter::update`].
//!
//! `update` accepts several shapes of input (another counter, a mapping,
//! an iterable of bare keys, an iterable of key/delta pairs). Rust has
//! no way to give `IntoIterator<Item = &str>` and `IntoIterator<Item =
//! (&str, i64)>` overlapping blanket impls without running into
//! coherence conflicts, so the shapes are modeled as a small tagged sum
//! instead, with one constructor per shape.

use crate::Counter;

/// One of the source shapes accepted by [`crate::Counter::update`].
pub enum UpdateSource<'a> {
    /// Every occupied cell of another counter, applied as `(key, count)`
    /// pairs — equivalent to calling `increment(key, count)` for each.
    Counter(&'a Counter),
    /// Bare keys, each incremented by 1.
    Strings(Box<dyn Iterator<Item = &'a str> + 'a>),
    /// `(key, delta)` pairs, each applied via `increment(key, delta)`.
    /// A mapping (e.g. a `HashMap<String, i64>`) is update's source via
    /// this variant too: iterate its entries into pairs first.
    Pairs(Box<dyn Iterator<Item = (&'a str, i64)> + 'a>),
}

impl<'a> UpdateSource<'a> {
    /// Builds a `Strings` source from any iterable of string-likes.
    pub fn strings<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
        I::IntoIter: 'a,
    {
        UpdateSource::Strings(Box::new(iter.into_iter()))
    }

    /// Builds a `Pairs` source from any iterable of key/delta pairs,
    /// including a mapping's `.iter()`.
    pub fn pairs<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, i64)>,
        I::IntoIter: 'a,
    {
        UpdateSource::Pairs(Box::new(iter.into_iter()))
    }
}
