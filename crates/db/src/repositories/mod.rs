//! Repositories: all SQL for the finsight schema lives here.

pub mod analysis_repo;
pub mod owner_repo;

pub use analysis_repo::AnalysisRepo;
pub use owner_repo::OwnerRepo;
