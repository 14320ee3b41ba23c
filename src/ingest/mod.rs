/// Station data retrieval and decoding.
///
/// `http` fetches the raw status document, `status` turns it into a
/// `FlatReading`. Nothing here knows about canonical field names.
pub mod http;
pub mod status;

#[cfg(test)]
pub(crate) mod fixtures;

pub use http::{HttpStation, StationSource, get_data};
pub use status::parse_status;
