/// Split `items` into exactly `workers` contiguous shards.
///
/// Shard `i` covers `[i*L/W, (i+1)*L/W)`, so sizes differ by at most one and
/// shards are empty when there are fewer items than workers. A worker count
/// of zero is treated as one.
pub fn partition<T>(items: &[T], workers: usize) -> Vec<&[T]> {
    let w = workers.max(1);
    (0..w)
        .map(|i| &items[bound(i, items.len(), w)..bound(i + 1, items.len(), w)])
        .collect()
}

/// `i * len / w` without overflowing the product.
fn bound(i: usize, len: usize, w: usize) -> usize {
    (i as u128 * len as u128 / w as u128) as usize
}
