pub mod framing;
pub mod mime;
