/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint:

- `chat`     — Interactive inquiry conversation
- `sessions` — Stored session management

These handlers are intentionally small and use the library components:
the inquiry client, the session store, and the markdown utilities.
*/

pub mod chat;
pub mod sessions;
