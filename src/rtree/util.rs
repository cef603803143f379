//! Utilities for packing RTree levels.

use std::ops::Range;

/// Partition `num_entries` consecutive entries into node-sized chunks.
///
/// Chunks take `max_entries` entries each while that leaves enough behind. When the last chunk
/// would fall below `min_entries`, the chunk before it gives up exactly enough entries for the
/// last one to reach `min_entries`; if the remainder fits in a single node it is not split at
/// all. Every chunk therefore holds between `min_entries` and `max_entries` entries, except
/// for a lone chunk when `num_entries < min_entries`, which can only become the root.
///
/// Requires `max_entries >= 2 * min_entries - 1`, as checked by
/// [`RTreeOptions`][crate::rtree::RTreeOptions].
pub(crate) fn pack_chunks(
    num_entries: usize,
    min_entries: usize,
    max_entries: usize,
) -> Vec<Range<usize>> {
    debug_assert!(max_entries + 1 >= 2 * min_entries);

    let mut chunks = Vec::with_capacity(num_entries.div_ceil(max_entries));
    let mut start = 0;
    while start < num_entries {
        let remaining = num_entries - start;
        let take = if remaining <= max_entries {
            remaining
        } else if remaining - max_entries < min_entries {
            remaining - min_entries
        } else {
            max_entries
        };
        chunks.push(start..start + take);
        start += take;
    }
    chunks
}
