/// Depth sorting shared by passes that need an explicit draw order.
///
/// Indices are sorted by a per-index depth with a radix sort over 64-bit
/// keys: the upper half holds the order-preserving bit pattern of the depth,
/// the lower half the original position. Equal depths therefore keep their
/// insertion order in both directions.

use rdst::RadixSort;

/// Draw order along the view direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    /// Nearest first (opaque geometry, early depth rejection)
    FrontToBack,
    /// Farthest first (blended geometry)
    BackToFront,
}

/// Sort `indices` by `depth(index)` in `order`
pub fn sort_by_depth(indices: &mut Vec<usize>, depth: impl Fn(usize) -> f32, order: SortOrder) {
    if indices.len() < 2 {
        return;
    }

    let mut keys: Vec<u64> = indices
        .iter()
        .enumerate()
        .map(|(position, &index)| {
            let bits = sortable_bits(depth(index));
            let bits = match order {
                SortOrder::FrontToBack => bits,
                SortOrder::BackToFront => !bits,
            };
            ((bits as u64) << 32) | position as u64
        })
        .collect();
    keys.radix_sort_unstable();

    let sorted: Vec<usize> = keys.iter().map(|key| indices[(key & 0xFFFF_FFFF) as usize]).collect();
    *indices = sorted;
}

/// Map an f32 to a u32 whose unsigned order matches the float order
fn sortable_bits(value: f32) -> u32 {
    let bits = value.to_bits();
    if bits & 0x8000_0000 != 0 {
        !bits
    } else {
        bits | 0x8000_0000
    }
}

#[cfg(test)]
#[path = "sorting_tests.rs"]
mod tests;
