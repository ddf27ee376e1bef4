/*
 * Copyright (c) 2024, United States Government, as represented by the
 * Administrator of the National Aeronautics and Space Administration.
 * All rights reserved.
 *
 * The ODIN - Open Data Integration Framework is licensed under the
 * Apache License, Version 2.0 (the "License"); you may not use this file
 * except in compliance with the License. You may obtain a copy of the
 * License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! Bounded exponential-backoff retry, ported from the original `retry_with_exponential_backoff`
//! decorator. Only transient failures (`Network`, `Timeout`) are retried; retries are invisible
//! to callers above — only the final failure, if any, is ever reported.

use std::{future::Future, time::Duration};

use crate::errors::{AcquisitionError, Result};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);
pub const MAX_DELAY: Duration = Duration::from_secs(60);

pub async fn retry_with_backoff<F, Fut, T>(max_attempts: u32, base_delay: Duration, mut f: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match f().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_attempts && e.kind.is_retryable() => {
                let delay = base_delay.saturating_mul(1 << (attempt - 1)).min(MAX_DELAY);
                tracing::debug!(attempt, ?delay, error = %e, "retrying transient failure");
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

pub async fn retry_default<F, Fut, T>(f: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    retry_with_backoff(DEFAULT_MAX_ATTEMPTS, DEFAULT_BASE_DELAY, f).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retries_transient_failures_until_success() {
        let attempts = AtomicU32::new(0);
        let result = retry_with_backoff(3, Duration::from_millis(1), || async {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(AcquisitionError::new(ErrorKind::Network, "transient"))
            } else {
                Ok(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn never_retries_auth_failures() {
        let attempts = AtomicU32::new(0);
        let result: Result<()> = retry_with_backoff(3, Duration::from_millis(1), || async {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err(AcquisitionError::new(ErrorKind::Auth, "bad credentials"))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
