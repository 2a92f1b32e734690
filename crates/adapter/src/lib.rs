//! Remote pad - drive the game from another device over TCP
//!
//! The gift app's phone-style pad (arrows plus A/B) talks to the game through
//! a **line-delimited JSON protocol**. Every press becomes an engine command,
//! so remote input is serialized with keyboard input and gravity.
//!
//! # Protocol Overview
//!
//! 1. **Connection**: Client connects to the TCP socket (default: 127.0.0.1:7878)
//! 2. **Handshake**: Client sends `hello`, server responds with `welcome`
//! 3. **Commanding**: Client sends `button`, `action`, `start` or `reset`;
//!    each is answered with an `ack` or an `error` carrying the same `seq`
//! 4. **Streaming**: With `"stream": true` in `hello`, the server pushes a
//!    `snapshot` after every state change
//! 5. **Game over**: Every handshaken client receives an `over` message with
//!    the final score and the closing message
//!
//! `seq` must be strictly increasing per connection. Commands that arrive
//! while the engine queue is full are rejected with `backpressure`.
//!
//! # Environment Variables
//!
//! - `GIFT_PAD_HOST`: Bind address or host name (default: "127.0.0.1")
//! - `GIFT_PAD_PORT`: Port number (default: 7878)
//! - `GIFT_PAD_DISABLED`: Set to "1" or "true" to disable the pad server
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"client":"phone","stream":false}
//! Server -> Client: {"type":"welcome","seq":1,"protocol_version":"1.0.0","board":{"width":10,"height":18}}
//! Client -> Server: {"type":"start","seq":2,"name":"Nadia"}
//! Server -> Client: {"type":"ack","seq":2,"status":"ok"}
//! Client -> Server: {"type":"button","seq":3,"button":"left"}
//! Server -> Client: {"type":"ack","seq":3,"status":"ok"}
//! ```
//!
//! # Testing
//!
//! ```bash
//! nc 127.0.0.1 7878
//! {"type":"hello","seq":1,"stream":true}
//! ```

pub mod protocol;
pub mod server;

pub use gift_tetris_core as core;
pub use gift_tetris_engine as engine;
pub use gift_tetris_input as input;
pub use gift_tetris_types as types;

pub use protocol::*;
pub use server::{map_message, run_server, ClientSession, PadStatus, ServerConfig};
