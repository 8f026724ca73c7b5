use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of the unique `key` of each emitted command.
pub trait CommandKeyGenerator: Debug + Send + Sync {
    fn next_key(&self) -> String;
}

/// Random v4 uuids, the default.
#[derive(Debug, Default)]
pub struct UuidKeyGenerator;

impl CommandKeyGenerator for UuidKeyGenerator {
    fn next_key(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// `command-1`, `command-2`, ... for reproducible output.
#[derive(Debug, Default)]
pub struct SequentialKeyGenerator {
    counter: AtomicU64,
}

impl CommandKeyGenerator for SequentialKeyGenerator {
    fn next_key(&self) -> String {
        let index = self
            .counter
            .fetch_add(1, Ordering::Relaxed)
            + 1;
        format!("command-{}", index)
    }
}
