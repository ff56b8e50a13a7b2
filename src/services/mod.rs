pub mod account_service;
pub mod aggregation;
pub mod capacity;
pub mod error;
pub mod graph;
pub mod ownership;
pub mod reports;
pub mod staffing_service;
pub mod workload;

pub use account_service::{AccountService, LoginInput, RegisterInput, Session};
pub use capacity::{AttachOutcome, CapacityValidator};
pub use error::{StaffingError, StaffingResult};
pub use graph::TenantGraph;
pub use ownership::Caller;
pub use staffing_service::{
    LinkOutcome, SectionInput, StaffingService, SubjectInput, TeacherInput, TeacherWorkload, TemplateInput,
};
