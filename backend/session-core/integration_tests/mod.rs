// Integration tests for the public session-core API.
// Unit tests for module internals live in src/tests/.

mod errors;
mod liveness;
mod session;
mod support;
