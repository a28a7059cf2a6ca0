use crate::{error::Error, record::UserRecord};

/// Groups a record stream into batches of `batch_size`.
///
/// Every batch is full except possibly the last, which holds the non-empty remainder and
/// is always emitted. Composed over a cursor iterator this keeps one statement open for
/// the whole traversal instead of issuing repeated offset-limited queries.
///
/// Panics if `batch_size` is zero.
pub fn batches<I>(records: I, batch_size: usize) -> Batched<I::IntoIter>
where
    I: IntoIterator<Item = std::result::Result<UserRecord, Error>>,
{
    assert!(batch_size != 0, "batch_size must be non-zero");
    Batched {
        records: records.into_iter(),
        batch_size,
        done: false,
    }
}

pub struct Batched<I> {
    records: I,
    batch_size: usize,
    done: bool,
}

impl<I: Iterator<Item = std::result::Result<UserRecord, Error>>> Iterator for Batched<I> {
    type Item = std::result::Result<Vec<UserRecord>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut batch = Vec::with_capacity(self.batch_size);
        loop {
            match self.records.next() {
                Some(Ok(record)) => {
                    batch.push(record);
                    if batch.len() == self.batch_size {
                        return Some(Ok(batch));
                    }
                }
                // An error discards the partial batch and ends the stream.
                Some(Err(err)) => {
                    self.done = true;
                    return Some(Err(err));
                }
                None => {
                    self.done = true;
                    return if batch.is_empty() { None } else { Some(Ok(batch)) };
                }
            }
        }
    }
}

/// Flattens a batch stream back into records, keeping only those with `age > min_age`.
///
/// Order-preserving, and pulls a batch only once the previous one is drained.
pub fn older_than<B>(batches: B, min_age: i64) -> OlderThan<B::IntoIter>
where
    B: IntoIterator<Item = std::result::Result<Vec<UserRecord>, Error>>,
{
    OlderThan {
        batches: batches.into_iter(),
        current: Vec::new().into_iter(),
        min_age,
        done: false,
    }
}

pub struct OlderThan<B> {
    batches: B,
    current: std::vec::IntoIter<UserRecord>,
    min_age: i64,
    done: bool,
}

impl<B: Iterator<Item = std::result::Result<Vec<UserRecord>, Error>>> Iterator for OlderThan<B> {
    type Item = std::result::Result<UserRecord, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            for record in self.current.by_ref() {
                if record.age > self.min_age {
                    return Some(Ok(record));
                }
            }
            match self.batches.next() {
                Some(Ok(batch)) => self.current = batch.into_iter(),
                Some(Err(err)) => {
                    self.done = true;
                    return Some(Err(err));
                }
                None => {
                    self.done = true;
                    return None;
                }
            }
        }
    }
}
