pub mod raw_http;
pub mod socket_guard;
