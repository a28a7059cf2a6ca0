use crate::error::Error;

/// Computes the average of an age stream in a single pass.
///
/// Holds only a `(sum, count)` pair of integer accumulators; the division happens once
/// at the end, and an empty stream yields exactly `0.0`. The first `Err` in the stream
/// aborts the fold and propagates.
pub fn average_age<I>(ages: I) -> std::result::Result<f64, Error>
where
    I: IntoIterator<Item = std::result::Result<i64, Error>>,
{
    let mut sum = 0i64;
    let mut count = 0i64;
    for age in ages {
        sum += age?;
        count += 1;
    }
    if count == 0 {
        return Ok(0.0);
    }
    Ok(sum as f64 / count as f64)
}
