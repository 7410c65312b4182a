use bounded_bitset::{BitSet, BitSetError};

fn main() -> Result<(), BitSetError> {
    println!("--- bounded_bitset set algebra ---");

    let mut a = BitSet::new(5)?;
    let mut b = BitSet::new(5)?;
    for e in [1, 2, 3] {
        a.add(e)?;
    }
    for e in [2, 3, 4] {
        b.add(e)?;
    }
    println!("A:            {a}");
    println!("B:            {b}");
    println!("A | B:        {}", a.union(&b)?);
    println!("A & B:        {}", a.intersection(&b)?);
    println!("A - B:        {}", a.difference(&b)?);

    // Errors are plain values; nothing is modified when a call is rejected.
    if let Err(e) = a.add(5) {
        println!("add(5):       {e}");
    }
    let wider = BitSet::new(6)?;
    if let Err(e) = a.union(&wider) {
        println!("A | wider:    {e}");
    }
    println!("A unchanged:  {a}");

    Ok(())
}
