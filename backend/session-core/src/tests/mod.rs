mod config;
mod registry;
mod solve;
mod streamer;
