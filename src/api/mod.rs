// ==========================================
// 地点风险评分引擎 - API 层
// ==========================================
// 职责: 面向调用方的门面,错误统一为 ApiError
// ==========================================

pub mod error;
pub mod risk_api;

pub use error::{ApiError, ApiResult};
pub use risk_api::{HealthStatus, RiskApi};
