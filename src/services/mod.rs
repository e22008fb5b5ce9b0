//! Producer APIs and ports to external collaborators.
//!
//! The notification, media and export services are the write-side entry
//! points consumed by the CRUD layer; everything else here is a port
//! (directory, roster, transport, scanner, fetcher, audit sink) with a
//! production implementation and a mock for tests.

mod audit;
pub use audit::*;

mod directory;
pub use directory::*;

mod export;
pub use export::*;

mod media;
pub use media::*;

mod notification;
pub use notification::*;

mod roster;
pub use roster::*;

mod scanner;
pub use scanner::*;

mod storage;
pub use storage::*;

mod transport;
pub use transport::*;
