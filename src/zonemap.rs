// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Per-chunk `(min, max)` indices enabling whole-chunk predicate skipping.

use crate::predicate::ScalarConst;

/// One chunk's summary: `None` when every value in the chunk is null
/// (spec §3's "present bit" per chunk, modeled here as an `Option`).
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkSummary {
    pub min: ScalarConst,
    pub max: ScalarConst,
}

/// A zone map for one column: `chunk_size` rows per chunk, one
/// `Option<ChunkSummary>` per chunk. Invariant: for every row `r` in
/// chunk `k`, `min[k] <= value(r) <= max[k]` whenever `chunks[k].is_some()`.
#[derive(Debug, Clone)]
pub struct ZoneMap {
    pub chunk_size: usize,
    pub chunks: Vec<Option<ChunkSummary>>,
    pub total_rows: usize,
}

impl ZoneMap {
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn chunk_range(&self, chunk_idx: usize) -> (usize, usize) {
        let start = chunk_idx * self.chunk_size;
        let end = (start + self.chunk_size).min(self.total_rows);
        (start, end)
    }

    /// Clears every bit belonging to a chunk that `can_match` reports as
    /// impossible to satisfy, given that chunk's `(min, max)`. All-null
    /// chunks (`None`) are cleared unconditionally unless the caller is
    /// evaluating `IsNull`, which never calls this path (see
    /// `Predicate::is_zone_map_evaluable`).
    pub fn clear_non_overlapping_chunks(
        &self,
        bitmap: &mut crate::bitmap::SelectionBitmap,
        can_match: impl Fn(&ScalarConst, &ScalarConst) -> bool,
    ) {
        let mut chunks_scanned = 0usize;
        for (idx, summary) in self.chunks.iter().enumerate() {
            let (start, end) = self.chunk_range(idx);
            match summary {
                None => bitmap.clear_range(start, end),
                Some(ChunkSummary { min, max }) => {
                    if can_match(min, max) {
                        chunks_scanned += 1;
                    } else {
                        bitmap.clear_range(start, end);
                    }
                }
            }
        }
        log::trace!(
            "zone map skip: scanned {chunks_scanned}/{} chunks",
            self.chunk_count()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::SelectionBitmap;
    use std::cmp::Ordering;

    fn overlaps_range(target_lo: i64, target_hi: i64) -> impl Fn(&ScalarConst, &ScalarConst) -> bool {
        move |min, max| {
            let min = min.as_f64().unwrap() as i64;
            let max = max.as_f64().unwrap() as i64;
            min <= target_hi && max >= target_lo
        }
    }

    #[test]
    fn skip_clears_only_non_overlapping_chunks_and_never_an_overlapping_one() {
        // Three chunks of 10 rows: [0..10) = 0..9, [10..20) = 10..19, [20..30) = 20..29
        let chunks = vec![
            Some(ChunkSummary { min: ScalarConst::Int64(0), max: ScalarConst::Int64(9) }),
            Some(ChunkSummary { min: ScalarConst::Int64(10), max: ScalarConst::Int64(19) }),
            Some(ChunkSummary { min: ScalarConst::Int64(20), max: ScalarConst::Int64(29) }),
        ];
        let zm = ZoneMap { chunk_size: 10, chunks, total_rows: 30 };
        let mut bm = SelectionBitmap::new_set(30);
        // Looking for values in [15, 22]: only chunk 1 and 2 can overlap.
        zm.clear_non_overlapping_chunks(&mut bm, overlaps_range(15, 22));
        assert!(bm.iterate_set().iter().all(|&i| i >= 10));
        // chunk 1 and 2 must remain fully candidate (not pre-emptively cleared)
        assert_eq!(bm.count_set(), 20);
    }

    #[test]
    fn all_null_chunk_is_cleared_unconditionally() {
        let chunks = vec![None, Some(ChunkSummary { min: ScalarConst::Int64(0), max: ScalarConst::Int64(9) })];
        let zm = ZoneMap { chunk_size: 10, chunks, total_rows: 20 };
        let mut bm = SelectionBitmap::new_set(20);
        zm.clear_non_overlapping_chunks(&mut bm, |_, _| true);
        assert!(bm.iterate_set().iter().all(|&i| i >= 10));
    }

    #[test]
    fn invariant_never_excludes_a_row_that_could_match() {
        // chunk 0: min=5 max=15; predicate value=10 (equality) must keep the chunk.
        let chunks = vec![Some(ChunkSummary { min: ScalarConst::Int64(5), max: ScalarConst::Int64(15) })];
        let zm = ZoneMap { chunk_size: 100, chunks, total_rows: 50 };
        let mut bm = SelectionBitmap::new_set(50);
        let target = ScalarConst::Int64(10);
        zm.clear_non_overlapping_chunks(&mut bm, |min, max| {
            matches!(target.partial_compare(min), Some(Ordering::Greater | Ordering::Equal))
                && matches!(target.partial_compare(max), Some(Ordering::Less | Ordering::Equal))
        });
        assert_eq!(bm.count_set(), 50);
    }
}
