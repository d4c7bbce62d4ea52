pub mod batches;
pub mod enrollment;
pub mod provisioning;
pub mod users;

pub use batches::BatchBoard;
pub use enrollment::{EnrollmentReconciler, KeyMatch, match_by_key};
pub use provisioning::ProvisioningCoordinator;
pub use users::{AlwaysConfirm, ConfirmDelete, UserDraft, UserHierarchyManager};
