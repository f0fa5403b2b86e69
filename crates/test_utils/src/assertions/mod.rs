//! Assertion utilities for testing

/// Assert that a result is OK and unwrap it
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(val) => val,
            Err(err) => panic!("Expected Ok, got Err: {:?}", err),
        }
    };
    ($expr:expr, $($arg:tt)+) => {
        match $expr {
            Ok(val) => val,
            Err(err) => panic!("Expected Ok, got Err: {:?} ({})", err, format!($($arg)+)),
        }
    };
}

/// Assert that a registry call failed with the given `ErrorKind` and return the error
#[macro_export]
macro_rules! assert_err_kind {
    ($expr:expr, $kind:expr) => {
        match $expr {
            Ok(val) => panic!("Expected Err({:?}), got Ok: {:?}", $kind, val),
            Err(err) => {
                assert_eq!(err.kind(), $kind, "unexpected error: {}", err);
                err
            }
        }
    };
}
