//! Input adapter turning eager collections and async streams into one lazy stream.

use futures::stream::{self, BoxStream, Stream, StreamExt};
use std::collections::VecDeque;

/// Items fed to a [`TaskPool`](super::TaskPool)
///
/// Either an eagerly available iterator or an asynchronously produced stream.
/// [`Items::into_stream`] yields every item exactly once, in source order.
pub enum Items<'a, U> {
    /// Synchronous source
    Iter(Box<dyn Iterator<Item = U> + Send + 'a>),
    /// Asynchronous source
    Stream(BoxStream<'a, U>),
}

impl<'a, U: Send + 'a> Items<'a, U> {
    /// Wrap anything iterable
    pub fn from_iterable<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = U>,
        I::IntoIter: Send + 'a,
    {
        Items::Iter(Box::new(iter.into_iter()))
    }

    /// Wrap an async stream
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = U> + Send + 'a,
    {
        Items::Stream(stream.boxed())
    }

    /// Single-pass lazy stream over the items
    pub fn into_stream(self) -> BoxStream<'a, U> {
        match self {
            Items::Iter(iter) => stream::iter(iter).boxed(),
            Items::Stream(stream) => stream,
        }
    }
}

impl<'a, U: Send + 'a> From<Vec<U>> for Items<'a, U> {
    fn from(items: Vec<U>) -> Self {
        Items::from_iterable(items)
    }
}

impl<'a, U: Send + 'a> From<VecDeque<U>> for Items<'a, U> {
    fn from(items: VecDeque<U>) -> Self {
        Items::from_iterable(items)
    }
}

impl<'a, U: Send + 'a, const N: usize> From<[U; N]> for Items<'a, U> {
    fn from(items: [U; N]) -> Self {
        Items::from_iterable(items)
    }
}

impl<'a, U: Send + 'a> From<std::ops::RangeInclusive<U>> for Items<'a, U>
where
    std::ops::RangeInclusive<U>: Iterator<Item = U>,
{
    fn from(range: std::ops::RangeInclusive<U>) -> Self {
        Items::from_iterable(range)
    }
}

impl<'a, U: Send + 'a> From<BoxStream<'a, U>> for Items<'a, U> {
    fn from(stream: BoxStream<'a, U>) -> Self {
        Items::Stream(stream)
    }
}
