// Command execution - batch transitions and the suspended confirmation flow

pub mod executor;
pub mod session;


pub use executor::{BatchCommandExecutor, BatchOutcome, CompletionToken, ItemOutcome};
pub use session::{ConfirmationResult, PendingConfirmation};
