use std::time::Duration;

use tokio::sync::OwnedSemaphorePermit;

/// One occupied slot on an endpoint.
///
/// Dropping the lease releases the slot after the settle delay, whether the
/// call succeeded, failed, or the dispatch future itself was dropped. Outside
/// a tokio runtime the slot is released at once.
#[derive(Debug)]
pub struct EndpointLease {
    permit: Option<OwnedSemaphorePermit>,
    release_delay: Duration,
}

impl EndpointLease {
    pub(crate) fn new(permit: OwnedSemaphorePermit, release_delay: Duration) -> Self {
        Self { permit: Some(permit), release_delay }
    }
}

impl Drop for EndpointLease {
    fn drop(&mut self) {
        let Some(permit) = self.permit.take() else {
            return;
        };
        if self.release_delay.is_zero() {
            return;
        }

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let delay = self.release_delay;
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    drop(permit);
                });
            }
            Err(_) => drop(permit),
        }
    }
}
