mod console;
mod error;
mod settings;
