//! Repository abstractions for data access.

pub mod alert;
pub mod challenge;
pub mod flow;
pub mod journal;
pub mod preference;
pub mod trading_account;
pub mod trophy;
pub mod user;

pub use alert::AlertRepository;
pub use challenge::ChallengeRepository;
pub use flow::FlowRepository;
pub use journal::JournalRepository;
pub use preference::PreferenceRepository;
pub use trading_account::TradingAccountRepository;
pub use trophy::TrophyRepository;
pub use user::UserRepository;
