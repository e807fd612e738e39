//! Pull-based lazy sequences.
//!
//! A [`Lazy`] is built from an index-driven generator and refined with
//! `filter`/`map` stages that run only when an element is pulled. Each pull
//! yields a [`Step`]: an element, a skip, or the end of the source. Skips are
//! how stages drop elements (a rejected filter, a failed fallible map), and a
//! pull tolerates at most [`MAX_SKIPS`] consecutive skips before it treats
//! the source as exhausted. That bound keeps a chain whose stages reject
//! almost everything from spinning.
//!
//! # Examples
//!
//! ```
//! use jsonq::lazy::Lazy;
//!
//! let words = ["alpha", "beta", "gamma"];
//! let first_long = Lazy::generate(|i| words.get(i).copied())
//!     .filter(|w| w.len() > 4)
//!     .first();
//! assert_eq!(first_long, Some("alpha"));
//! ```

use std::fmt::Display;

use tracing::debug;

/// Consecutive skipped elements a single pull retries before giving up.
pub const MAX_SKIPS: usize = 10;

/// Outcome of pulling one element through a pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Step<T> {
    Emit(T),
    Skip,
    End,
}

/// A lazily evaluated, pull-based sequence.
pub struct Lazy<'a, T> {
    pull: Box<dyn FnMut() -> Step<T> + 'a>,
}

impl<'a, T: 'a> Lazy<'a, T> {
    /// Builds a sequence from an index generator; `None` ends the sequence.
    pub fn generate<F>(mut generator: F) -> Self
    where
        F: FnMut(usize) -> Option<T> + 'a,
    {
        let mut index = 0;
        Lazy {
            pull: Box::new(move || {
                let step = match generator(index) {
                    Some(item) => Step::Emit(item),
                    None => Step::End,
                };
                index += 1;
                step
            }),
        }
    }

    /// Builds a sequence over any iterator.
    pub fn from_iter<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'a,
    {
        let mut items = items.into_iter();
        Lazy::generate(move |_| items.next())
    }

    /// Keeps the elements `predicate` accepts.
    pub fn filter<P>(self, mut predicate: P) -> Self
    where
        P: FnMut(&T) -> bool + 'a,
    {
        let mut pull = self.pull;
        Lazy {
            pull: Box::new(move || match pull() {
                Step::Emit(item) if predicate(&item) => Step::Emit(item),
                Step::Emit(_) | Step::Skip => Step::Skip,
                Step::End => Step::End,
            }),
        }
    }

    /// Transforms each element; a `None` result skips the element.
    pub fn map<S: 'a, F>(self, mut f: F) -> Lazy<'a, S>
    where
        F: FnMut(T) -> Option<S> + 'a,
    {
        let mut pull = self.pull;
        Lazy {
            pull: Box::new(move || match pull() {
                Step::Emit(item) => f(item).map_or(Step::Skip, Step::Emit),
                Step::Skip => Step::Skip,
                Step::End => Step::End,
            }),
        }
    }

    /// Transforms each element with a fallible step; errors skip the element
    /// and are logged.
    pub fn try_map<S: 'a, E: Display, F>(self, mut f: F) -> Lazy<'a, S>
    where
        F: FnMut(T) -> Result<S, E> + 'a,
    {
        self.map(move |item| match f(item) {
            Ok(mapped) => Some(mapped),
            Err(e) => {
                debug!(error = %e, "lazy pipeline skipped an element");
                None
            }
        })
    }

    /// The first element the pipeline produces.
    pub fn first(mut self) -> Option<T> {
        self.next()
    }
}

impl<T> Iterator for Lazy<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        for _ in 0..=MAX_SKIPS {
            match (self.pull)() {
                Step::Emit(item) => return Some(item),
                Step::Skip => continue,
                Step::End => return None,
            }
        }
        None
    }
}

/// `lower..upper` as a lazy sequence.
pub fn range<'a>(lower: usize, upper: usize) -> Lazy<'a, usize> {
    Lazy::generate(move |i| {
        let n = lower + i;
        (n < upper).then_some(n)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_stops_at_none() {
        let squares: Vec<usize> = Lazy::generate(|i| (i < 4).then_some(i * i)).collect();
        assert_eq!(squares, vec![0, 1, 4, 9]);
    }

    #[test]
    fn test_stages_run_lazily_in_order() {
        let mut pulled = Vec::new();
        let first = Lazy::generate(|i| {
            pulled.push(i);
            Some(i)
        })
        .filter(|n| n % 3 == 2)
        .map(|n| Some(n * 10))
        .first();

        assert_eq!(first, Some(20));
        assert_eq!(pulled, vec![0, 1, 2]);
    }

    #[test]
    fn test_try_map_skips_errors() {
        let parsed: Vec<i32> = Lazy::from_iter(vec!["1", "x", "3"])
            .try_map(|s| s.parse::<i32>())
            .collect();
        assert_eq!(parsed, vec![1, 3]);
    }

    #[test]
    fn test_skip_bound_ends_a_pull() {
        // Ten rejections in a row are tolerated, eleven end the pull.
        let within: Vec<usize> = range(0, 20).filter(|n| *n == 10).collect();
        assert_eq!(within, vec![10]);

        let beyond = range(0, 20).filter(|n| *n == 11).first();
        assert_eq!(beyond, None);
    }

    #[test]
    fn test_range() {
        assert_eq!(range(3, 6).collect::<Vec<_>>(), vec![3, 4, 5]);
        assert_eq!(range(5, 5).first(), None);
    }
}
