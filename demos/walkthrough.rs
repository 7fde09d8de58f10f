use rmalloc::{HEADER_SIZE, Heap, HeapError};
use tracing_subscriber::EnvFilter;

/// Prints every chunk in list order, plus where the reservoir boundary sits.
fn print_layout(
  label: &str,
  heap: &Heap,
) {
  println!("\n\t------------------------------------");
  println!("\t[{label}] Heap Memory Layout");
  println!("\t------------------------------------");
  for chunk in heap.dump_state() {
    println!("\t{chunk}");
  }
  println!(
    "\tboundary = {} / {} bytes, header size = {HEADER_SIZE}",
    heap.reservoir().boundary(),
    heap.reservoir().capacity(),
  );
}

fn main() -> Result<(), HeapError> {
  // RUST_LOG=trace also shows every reservoir growth.
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
    .init();

  // 4096-byte reservoir, carved as a single slab on the first allocation.
  let mut heap = Heap::default();
  print_layout("start", &heap);

  // --------------------------------------------------------------------
  // 1) Four allocations. Each one splits the tail chunk.
  // --------------------------------------------------------------------
  let first = heap.allocate(4)?;
  let second = heap.allocate(8)?;
  let third = heap.allocate(16)?;
  let fourth = heap.allocate(32)?;
  println!("\n[1] Allocated {first}, {second}, {third}, {fourth}");

  if let Some(payload) = heap.payload_mut(first) {
    payload[..4].copy_from_slice(&0xDEAD_BEEFu32.to_ne_bytes());
  }
  if let Some(payload) = heap.payload_mut(third) {
    payload.fill(0xAB);
  }
  print_layout("after allocations", &heap);

  // --------------------------------------------------------------------
  // 2) Release the 4- and 8-byte chunks. Only their flags change.
  // --------------------------------------------------------------------
  heap.release(first)?;
  heap.release(second)?;
  print_layout("after releases", &heap);

  // --------------------------------------------------------------------
  // 3) Ask for 16 bytes. The two free chunks merge on the way, but the
  //    merged chunk is bigger than 16 and is not split in the same call.
  // --------------------------------------------------------------------
  let fifth = heap.allocate(16)?;
  println!(
    "\n[3] 16 bytes at {fifth}, reused a freed chunk? {}",
    if fifth == first { "yes" } else { "no, the tail was split" }
  );
  print_layout("after re-allocation", &heap);

  // --------------------------------------------------------------------
  // 4) Ask for 16 bytes again. This time the merged chunk is split.
  // --------------------------------------------------------------------
  match heap.allocate(16) {
    Ok(sixth) => println!("\n[4] 16 bytes at {sixth}, reused a freed chunk? {}", sixth == first),
    Err(err) => println!("\n[4] {err}"),
  }
  print_layout("after second re-allocation", &heap);

  // --------------------------------------------------------------------
  // 5) Failure modes: an address nothing handed out, and a request larger
  //    than what is left in the slab.
  // --------------------------------------------------------------------
  if let Err(err) = heap.release(rmalloc::Address::new(1)) {
    println!("\n[5] {err}");
  }
  if let Err(err) = heap.allocate(4096) {
    println!("[5] {err}");
  }

  println!("\n[6] End of walkthrough.");
  Ok(())
}
