//! # Batching core
//!
//! The scheduling machinery between callers and the model, independent of
//! what the model computes.
//!
//! ## Module Structure
//!
//! * [`queue`] - The unbounded FIFO shared by every producer and the single
//!   consumer, with blocking and deadline-bounded dequeue.
//!
//! * [`batch`] - The batching loop: forms batches bounded by size and wait
//!   time, runs each one through a [`BatchHandler`](handler::BatchHandler)
//!   inside a failure boundary, and never lets a failed batch stop the loop.
//!
//! * [`handler`] - The `BatchHandler` trait, the model-specific half of a
//!   batch round: build input, run the model, distribute outputs.
//!
//! * [`worker`] - Spawning and graceful shutdown of the background task.
pub mod batch;
pub mod handler;
pub mod queue;
pub mod worker;
