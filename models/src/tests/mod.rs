mod face;
mod phase;
