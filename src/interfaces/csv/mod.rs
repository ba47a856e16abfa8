pub mod invocation_reader;
pub mod response_writer;
