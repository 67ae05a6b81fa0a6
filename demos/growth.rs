use std::{
  io::Read,
  panic::{self, AssertUnwindSafe},
};

use rvector::{DynamicArray, Storage};

/// Waits until the user presses ENTER.
/// Useful when you want to inspect the process with tools like `pmap` or
/// `gdb` between steps.
fn block_until_enter_pressed() {
  println!("\n>>> Press ENTER to continue...");
  let _ = std::io::stdin().bytes().next();
}

/// Prints length, capacity and block address of an array.
fn print_array<T: std::fmt::Debug>(
  label: &str,
  array: &DynamicArray<T>,
) {
  println!(
    "[{}] len = {}, capacity = {}, block = {:?}, contents = {:?}",
    label,
    array.len(),
    array.capacity(),
    array.as_ptr(),
    array,
  );
}

fn main() {
  // --------------------------------------------------------------------
  // 1) A bare Storage: raw slots, no values.
  // --------------------------------------------------------------------
  let mut storage = Storage::<u64>::allocate(4);
  println!("[1] Storage with capacity {} at {:?}", storage.capacity(), storage.as_ptr());
  storage.slot_mut(0).write(0xDEADBEEF);
  println!("[1] Slot 0 = 0x{:X}", unsafe { storage.slot(0).assume_init_read() });
  drop(storage);

  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 2) Push into an empty array and watch the capacity double.
  //    The block address changes every time the array grows.
  // --------------------------------------------------------------------
  let mut array = DynamicArray::new();
  print_array("2", &array);
  for i in 1..=5 {
    array.push_back(i);
    print_array("2", &array);
  }

  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 3) Insert into the middle with spare capacity: same block.
  // --------------------------------------------------------------------
  array.insert(2, 42);
  print_array("3", &array);

  // --------------------------------------------------------------------
  // 4) Erase shifts the tail down but never shrinks the block.
  // --------------------------------------------------------------------
  array.erase(0);
  print_array("4", &array);

  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 5) A constructor that panics while the array has to grow.
  //    Nothing has moved yet, so the array is untouched.
  // --------------------------------------------------------------------
  array.resize(array.capacity());
  print_array("5 before", &array);
  let result = panic::catch_unwind(AssertUnwindSafe(|| {
    array.emplace_back(|| panic!("constructor failed"));
  }));
  println!("[5] emplace_back panicked: {}", result.is_err());
  print_array("5 after", &array);

  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 6) Copies get their own block; moves take the block along.
  // --------------------------------------------------------------------
  let copy = array.clone();
  print_array("6 copy", &copy);
  let moved = std::mem::take(&mut array);
  print_array("6 moved", &moved);
  print_array("6 source", &array);

  println!("\n[7] End of example. Dropping the arrays frees their blocks.");
}
