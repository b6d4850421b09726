// Purpose: voice management and polyphony for the built-in synth sink

pub mod message;
pub mod poly;
pub mod voice;
