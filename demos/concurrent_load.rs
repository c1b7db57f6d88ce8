use std::sync::Arc;
use std::thread;
use std::time::Instant;

use capturing_log::{LogStore, Logger, LoggerExt, LoggerProvider, MemoryLogStore, SharedLogStore};

fn main() {
    let store: SharedLogStore = Arc::new(MemoryLogStore::new());
    let provider = LoggerProvider::with_shared_store(Arc::clone(&store));

    let threads = 8;
    let per_thread: u64 = 25_000;
    let start = Instant::now();

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let logger = provider.create_logger(&format!("worker-{}", t));
            thread::spawn(move || {
                for i in 0..per_thread {
                    let _scope = (i % 1_000 == 0).then(|| logger.begin_scope(i));
                    logger.information(format!("iteration {}", i));
                }
            })
        })
        .collect();
    for handle in handles {
        if handle.join().is_err() {
            eprintln!("worker panicked");
        }
    }

    let elapsed = start.elapsed();
    let n = store.count();
    println!(
        "shared store: captured {} records from {} threads in {:?} (~{:.0} rec/s)",
        n,
        threads,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );
}
