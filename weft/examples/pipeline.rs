//! Example: a small fetch-then-report pipeline.
//!
//! Two downloads run in parallel; the report runs only if both succeed.
//! Run with `RUST_LOG=weft=debug` to watch the tasks start and complete.

use std::thread;
use std::time::Duration;

use tracing_subscriber::EnvFilter;
use weft::{queue, task, try_task, weave};

fn fetch(source: &'static str, delay_ms: u64) -> Result<usize, String> {
    thread::sleep(Duration::from_millis(delay_ms));

    if source.is_empty() {
        return Err("empty source name".to_owned());
    }

    Ok(source.len() * 100)
}

#[weft::main(worker_threads = 4)]
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let alpha = try_task(|| fetch("alpha", 40))
        .on_done(|bytes| println!("alpha: {bytes} bytes"))
        .on_error(|e| eprintln!("alpha failed: {e}"));

    let beta = try_task(|| fetch("beta", 10))
        .on_done(|bytes| println!("beta: {bytes} bytes"))
        .on_error(|e| eprintln!("beta failed: {e}"));

    let report = task(|| "all sources fetched").on_done(|summary| println!("{summary}"));

    queue([weave([alpha.get(), beta.get()]), report.get()])
        .on_complete(|ok| println!("pipeline succeeded: {ok}"))
        .start();
}
