mod credentials;
mod drive_file;
mod token;

pub use credentials::{Credentials, InstalledApp};
pub use drive_file::DriveFile;
pub use token::{Token, TokenResponse};

