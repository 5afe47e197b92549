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

//! Chunked fan-out over `[0, total)`. Behind the `parallel` feature this
//! dispatches chunks to `rayon`'s global thread pool (sized to hardware
//! parallelism by default, per spec §5's bounded worker pool); built
//! without the feature, every chunk runs on the calling thread in order.
//! Either way, results come back in ascending chunk-index order, which is
//! what makes floating-point sum/avg reduction reproducible (spec §5).

/// Splits `[0, total)` into chunks of `chunk_size` rows and invokes `f`
/// once per chunk, returning one result per chunk in ascending order.
#[cfg(feature = "parallel")]
pub fn map_chunks<T, F>(total: usize, chunk_size: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize, usize) -> T + Sync,
{
    use rayon::prelude::*;
    let ranges = chunk_ranges(total, chunk_size);
    ranges.into_par_iter().map(|(start, end)| f(start, end)).collect()
}

#[cfg(not(feature = "parallel"))]
pub fn map_chunks<T, F>(total: usize, chunk_size: usize, f: F) -> Vec<T>
where
    F: Fn(usize, usize) -> T,
{
    chunk_ranges(total, chunk_size)
        .into_iter()
        .map(|(start, end)| f(start, end))
        .collect()
}

pub fn chunk_ranges(total: usize, chunk_size: usize) -> Vec<(usize, usize)> {
    let chunk_size = chunk_size.max(1);
    if total == 0 {
        return Vec::new();
    }
    let n_chunks = (total + chunk_size - 1) / chunk_size;
    (0..n_chunks)
        .map(|c| {
            let start = c * chunk_size;
            let end = (start + chunk_size).min(total);
            (start, end)
        })
        .collect()
}

/// Effective parallelism the cost model and the worker pool both use:
/// hardware thread count, or 1 if undetectable.
pub fn effective_parallelism() -> usize {
    num_cpus::get().max(1)
}
