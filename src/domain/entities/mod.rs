pub mod course;
pub mod diet_plan;
pub mod member;
pub mod product;
pub mod queued_operation;
pub mod sale;
pub mod sync_report;

pub use course::{Course, CourseSchedule};
pub use diet_plan::{DietPlan, Meal, NutritionTargets};
pub use member::{Member, MemberProfile, Membership};
pub use product::{Product, ProductPricing};
pub use queued_operation::{OperationDraft, QueuedOperation};
pub use sale::{Sale, SaleItem, SaleTotals};
pub use sync_report::{DrainReport, DrainTrigger, SyncStatusSnapshot};
