pub mod beautify;

pub use beautify::{Beautify, BeautifyOptions};
