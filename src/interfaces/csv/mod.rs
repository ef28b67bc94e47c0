pub mod notification_writer;
pub mod request_reader;
