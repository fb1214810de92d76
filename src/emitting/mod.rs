// Emission of the generated parser source

mod emitter;

pub use emitter::emit;
