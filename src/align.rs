/// Machine word size in bytes. Every chunk size handed out is a multiple of it.
pub const WORD: usize = ::core::mem::size_of::<usize>();

/// Rounds `value` up to the next multiple of the machine word.
///
/// The caller guarantees `value + WORD - 1` does not overflow.
///
/// # Examples
///
/// ```rust
/// use rmalloc::{align, align::WORD};
///
/// match WORD {
///     8 => assert_eq!(align!(13), 16), // 64 bit machine.
///     4 => assert_eq!(align!(11), 12), // 32 bit machine.
///     _ => {},
/// };
/// assert_eq!(align!(0), 0);
/// ```
#[macro_export]
macro_rules! align {
  ($value:expr) => {
    ($value + $crate::align::WORD - 1) & !($crate::align::WORD - 1)
  };
}

#[cfg(test)]
mod tests {
  use super::WORD;

  #[test]
  fn test_align_rounds_up_to_next_word() {
    assert_eq!(align!(0), 0);
    assert_eq!(align!(1), WORD);
    assert_eq!(align!(WORD - 1), WORD);
    assert_eq!(align!(WORD + 1), 2 * WORD);
    assert_eq!(align!(4), WORD);
  }

  #[test]
  fn test_align_keeps_multiples() {
    for i in 0..10 {
      assert_eq!(WORD * i, align!(WORD * i));
      assert_eq!(WORD * (i + 1), align!(WORD * i + 1));
    }
  }

  #[test]
  fn test_align_near_capacity() {
    assert_eq!(align!(4096 - 1), 4096);
    assert_eq!(align!(4096), 4096);
  }
}
