/// Rounds an alignment (or any size) up to the next multiple of the machine
/// word.
///
/// `posix_memalign(3)` only accepts alignments that are a power of two *and*
/// a multiple of `size_of::<*mut c_void>()`, so every element alignment is
/// passed through this macro before it reaches the C allocator.
///
/// # Examples
///
/// ```rust
/// use rvector::align;
///
/// match std::mem::size_of::<usize>() {
///     8 => {
///         assert_eq!(align!(1), 8);   // u8 elements still get a word.
///         assert_eq!(align!(16), 16); // already a multiple, unchanged.
///     }
///     4 => assert_eq!(align!(2), 4),
///     _ => {},
/// };
/// ```
#[macro_export]
macro_rules! align {
  ($value:expr) => {
    ($value + ::core::mem::size_of::<usize>() - 1) & !(::core::mem::size_of::<usize>() - 1)
  };
}

#[cfg(test)]
mod tests {
  use std::mem;

  #[test]
  fn test_align_rounds_to_word() {
    let word = mem::size_of::<usize>();

    for i in 0..10 {
      let expected = word * (i + 1);

      for value in (word * i + 1)..=(word * (i + 1)) {
        assert_eq!(expected, align!(value));
      }
    }
  }

  #[test]
  fn test_align_keeps_power_of_two_element_alignments_valid() {
    let word = mem::size_of::<usize>();

    for shift in 0..13 {
      let element_align: usize = 1 << shift;
      let aligned = align!(element_align);

      assert!(aligned.is_power_of_two());
      assert_eq!(aligned % word, 0);
      assert_eq!(aligned % element_align, 0);
    }
  }
}
