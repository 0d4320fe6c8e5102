//! Turning decrypted injectables into side effects.

pub mod fs;
pub mod processor;
