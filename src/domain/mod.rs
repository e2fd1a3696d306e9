mod currency;
mod entry;
mod ledger;
mod money;

pub use currency::*;
pub use entry::*;
pub use ledger::*;
pub use money::*;
