mod account;
mod bill;
mod credential;
mod entry;

pub use account::*;
pub use bill::*;
pub use credential::*;
pub use entry::*;
