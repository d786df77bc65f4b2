pub mod kickoff;
pub mod retry;
