//! Modulo folding of the hash space into a fixed-length bit vector.

/// Fold hashes into a `length`-long 0/1 vector.
///
/// Returns the vector and the folded position of each hash, in input order.
/// Colliding hashes set the same position; the vector keeps presence only.
/// A zero `length` yields empty outputs.
pub fn fold(hashes: &[u32], length: usize) -> (Vec<u8>, Vec<usize>) {
    if length == 0 {
        return (Vec::new(), Vec::new());
    }
    let mut bits = vec![0u8; length];
    let on_bits: Vec<usize> = hashes.iter().map(|&h| h as usize % length).collect();
    for &pos in &on_bits {
        bits[pos] = 1;
    }
    (bits, on_bits)
}
