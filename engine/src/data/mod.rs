// Reading uploads and keeping the resulting tables
pub mod csv_parser;
pub mod ingest;
pub mod table_store;
pub mod workbook_reader;
