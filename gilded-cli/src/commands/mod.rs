pub mod check_version;
pub mod checksum;
pub mod lint;
pub mod scan;
pub mod stamp;
