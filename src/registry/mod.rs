//! Client registry for broadcast fan-out
//!
//! The registry is the single source of truth for who is currently connected
//! and the only component permitted to mutate the connection set. Each
//! connection is represented by a [`ClientHandle`] whose sender feeds a writer
//! task owning the WebSocket sink, so a broadcast is a series of non-blocking
//! channel pushes: one slow socket can never stall delivery to the rest.
//!
//! # Architecture
//!
//! ```text
//!                     Arc<ClientRegistry>
//!                ┌───────────────────────────┐
//!                │ clients: RwLock<HashMap<  │
//!                │   ClientId, ClientHandle  │
//!                │ >>                        │
//!                └─────────────┬─────────────┘
//!                              │ broadcast(msg)
//!            ┌─────────────────┼─────────────────┐
//!            ▼                 ▼                 ▼
//!       handle.send()     handle.send()     handle.send()
//!            │                 │                 │
//!            ▼                 ▼                 ▼
//!       [writer task]     [writer task]     [writer task]
//! ```
//!
//! A send failure means the writer task has died; the failed handle is marked
//! during the pass and deregistered exactly once after all sends were
//! attempted.

pub mod client;
pub mod store;

pub use client::{ClientHandle, ClientId, SendError};
pub use store::ClientRegistry;
