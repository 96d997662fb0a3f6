pub mod remote;
pub mod session;

pub use remote::ProfileRemote;
pub use session::SessionStore;
