use crate::{error::Error, stats::average_age};

#[test]
fn test_average_of_empty_stream_is_zero() {
    assert_eq!(average_age(vec![]).unwrap(), 0.0);
}

#[test]
fn test_average_of_two_ages() {
    assert_eq!(average_age(vec![Ok(20), Ok(30)]).unwrap(), 25.0);
}

#[test]
fn test_average_equals_sum_over_len() {
    let ages = [23i64, 41, 19, 67, 30, 30, 52];
    let expected = ages.iter().sum::<i64>() as f64 / ages.len() as f64;
    assert_eq!(average_age(ages.iter().map(|age| Ok(*age))).unwrap(), expected);
}

#[test]
fn test_average_propagates_the_first_error() {
    let ages = vec![
        Ok(20),
        Err(Error::OtherError {
            message: "cursor failed".to_owned(),
        }),
        Ok(30),
    ];
    assert!(average_age(ages).unwrap_err().to_string().contains("cursor failed"));
}
