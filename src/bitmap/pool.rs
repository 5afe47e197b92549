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

//! A thread-safe free list of [`SelectionBitmap`]s, keyed by length, so
//! operators don't pay an allocation on every invocation. Modeled on the
//! teacher's memory-pool style (see `GreedyMemoryPool`/`FairSpillPool`):
//! a small struct guarding shared state behind a `parking_lot::Mutex`.

use super::SelectionBitmap;
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Default)]
pub struct BitmapPool {
    free: Mutex<HashMap<usize, Vec<SelectionBitmap>>>,
}

/// An owned bitmap borrowed from a [`BitmapPool`]. Returns to the pool's
/// free list on drop rather than being deallocated.
pub struct PooledBitmap<'a> {
    pool: &'a BitmapPool,
    bitmap: Option<SelectionBitmap>,
}

impl BitmapPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks out a cleared bitmap of length `len`, reusing a pooled
    /// allocation of the same length if one is available.
    pub fn acquire_cleared(&self, len: usize) -> PooledBitmap<'_> {
        let mut reused = self.free.lock().get_mut(&len).and_then(|v| v.pop());
        if let Some(bm) = reused.as_mut() {
            bm.clear_all();
        }
        PooledBitmap {
            pool: self,
            bitmap: Some(reused.unwrap_or_else(|| SelectionBitmap::new_cleared(len))),
        }
    }

    /// Checks out a fully-set bitmap of length `len` (the common case for
    /// a `Scan` operator, which starts with every row selected).
    pub fn acquire_set(&self, len: usize) -> PooledBitmap<'_> {
        let mut reused = self.free.lock().get_mut(&len).and_then(|v| v.pop());
        if let Some(bm) = reused.as_mut() {
            bm.set_all();
        }
        PooledBitmap {
            pool: self,
            bitmap: Some(reused.unwrap_or_else(|| SelectionBitmap::new_set(len))),
        }
    }

    fn release(&self, bm: SelectionBitmap) {
        self.free.lock().entry(bm.len()).or_default().push(bm);
    }
}

impl std::ops::Deref for PooledBitmap<'_> {
    type Target = SelectionBitmap;
    fn deref(&self) -> &SelectionBitmap {
        self.bitmap.as_ref().expect("bitmap taken before drop")
    }
}

impl std::ops::DerefMut for PooledBitmap<'_> {
    fn deref_mut(&mut self) -> &mut SelectionBitmap {
        self.bitmap.as_mut().expect("bitmap taken before drop")
    }
}

impl Drop for PooledBitmap<'_> {
    fn drop(&mut self) {
        if let Some(bm) = self.bitmap.take() {
            self.pool.release(bm);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reuses_released_allocations() {
        let pool = BitmapPool::new();
        {
            let mut bm = pool.acquire_cleared(128);
            bm.set(5);
        }
        // second acquire should reuse the freed allocation, cleared
        let bm2 = pool.acquire_cleared(128);
        assert_eq!(bm2.count_set(), 0);
    }

    #[test]
    fn acquire_set_starts_fully_selected() {
        let pool = BitmapPool::new();
        let bm = pool.acquire_set(37);
        assert_eq!(bm.count_set(), 37);
    }
}
