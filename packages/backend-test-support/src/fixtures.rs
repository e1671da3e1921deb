//! Seating fixtures as plain `(id, nickname)` pairs.
//!
//! Kept independent of the backend's types so this crate can be a
//! dev-dependency without a cycle.

/// `n` seats with ids `p1..pN` and nicknames `Player 1..N`.
pub fn seats(n: usize) -> Vec<(String, String)> {
    (1..=n)
        .map(|i| (format!("p{i}"), format!("Player {i}")))
        .collect()
}

/// Ids only, in seat order.
pub fn seat_ids(n: usize) -> Vec<String> {
    seats(n).into_iter().map(|(id, _)| id).collect()
}

/// A room id unique within this test process.
pub fn room(prefix: &str) -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    static NEXT: AtomicU64 = AtomicU64::new(1);
    format!("{prefix}-{}", NEXT.fetch_add(1, Ordering::Relaxed))
}
