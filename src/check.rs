/// Asserts a caller precondition of the unchecked API.
///
/// Active with `debug_assertions` or the `checked` feature; compiled to
/// nothing otherwise.
macro_rules! precondition {
  ($cond:expr, $($arg:tt)+) => {
    if cfg!(any(debug_assertions, feature = "checked")) {
      assert!($cond, $($arg)+);
    }
  };
}

pub(crate) use precondition;
