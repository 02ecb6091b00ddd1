mod quota;

pub use quota::{QuotaGuard, period_start};
