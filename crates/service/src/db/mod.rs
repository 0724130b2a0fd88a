//! Query functions over the `models` entities, generic over the connection so
//! they run the same on a pooled connection or inside a transaction.

pub mod reservation_queries;
