//! End-to-end lookup flow: clean scanner input, validate it, then fetch the
//! product through the executor while the store is flaky.
//!
//! Run with: `cargo run --example lookup_flow`

use scanguard::barcode::{inspect, sanitize};
use scanguard::retry::{Executor, RetryEvent, RetryPolicy, StoreError, StoreErrorCode};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

struct FlakyStore {
    calls: AtomicU32,
}

impl FlakyStore {
    async fn fetch_product(&self, code: &str) -> Result<String, StoreError> {
        match self.calls.fetch_add(1, Ordering::SeqCst) {
            0 => Err(StoreError::new(StoreErrorCode::Unavailable, "connection reset")),
            1 => Err(StoreError::new(StoreErrorCode::DeadlineExceeded, "read timeout")),
            _ if code == "4006381333931" => Ok("Textmarker, yellow".to_string()),
            _ => Err(StoreError::new(
                StoreErrorCode::NotFound,
                format!("products/{}", code),
            )),
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_target(false)
        .init();

    let executor = Executor::for_store().with_policy(
        RetryPolicy::default()
            .with_max_attempts(4)
            .with_initial_delay(Duration::from_millis(50)),
    );

    for raw in ["4006-3813-3393-1", "4006381333930", "96385074"] {
        println!("\n=== scanned {:?} ===", raw);

        let code = match inspect(&sanitize(raw)) {
            Ok(code) => code,
            Err(e) => {
                println!("rejected before lookup: {}", e);
                continue;
            }
        };
        println!("{} code {}", code.symbology(), code);

        let store = FlakyStore {
            calls: AtomicU32::new(0),
        };
        let digits = code.digits();

        let raw_attempt = executor
            .with_retry_hooks(
                || store.fetch_product(digits),
                executor.policy(),
                |event: &RetryEvent<'_, StoreError>| {
                    println!(
                        "  attempt {} failed ({}), retrying in {:?}",
                        event.attempt, event.classification, event.next_delay
                    );
                },
            )
            .await;
        println!("  layer A result: {:?}", raw_attempt.map_err(|f| f.classification));

        let store = FlakyStore {
            calls: AtomicU32::new(0),
        };
        match executor
            .execute(|| store.fetch_product(digits), Some("products.lookup"))
            .await
        {
            Ok(name) => println!("  found: {}", name),
            Err(e) => println!("  shown to user: {}", e),
        }
    }
}
