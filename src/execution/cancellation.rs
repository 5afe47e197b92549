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

//! A cancellation token checked at chunk and operator boundaries (spec
//! §5). A query is cancelled either explicitly, via [`CancellationToken::cancel`],
//! or implicitly once its configured deadline has passed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::error::{GlacierError, Result};

#[derive(Debug)]
pub struct CancellationToken {
    cancelled: AtomicBool,
    deadline: Option<Instant>,
}

impl CancellationToken {
    pub fn new(deadline: Option<Instant>) -> Self {
        Self {
            cancelled: AtomicBool::new(false),
            deadline,
        }
    }

    pub fn none() -> Self {
        Self::new(None)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        if self.cancelled.load(Ordering::SeqCst) {
            return true;
        }
        matches!(self.deadline, Some(d) if Instant::now() >= d)
    }

    /// Checked between chunks and at operator boundaries; aborts the
    /// whole query with `GlacierError::Cancelled` once tripped.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(GlacierError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn explicit_cancel_trips_check() {
        let token = CancellationToken::none();
        assert!(token.check().is_ok());
        token.cancel();
        assert!(matches!(token.check(), Err(GlacierError::Cancelled)));
    }

    #[test]
    fn past_deadline_trips_check() {
        let token = CancellationToken::new(Some(Instant::now() - Duration::from_secs(1)));
        assert!(matches!(token.check(), Err(GlacierError::Cancelled)));
    }

    #[test]
    fn future_deadline_does_not_trip() {
        let token = CancellationToken::new(Some(Instant::now() + Duration::from_secs(60)));
        assert!(token.check().is_ok());
    }
}
