//! Shared Kernel - Domain-crossing minimal core
//!
//! ドメインをまたいで意味が変わらない最小限の語彙だけを置きます。
//! - エラー分類 ([`error::kind::ErrorKind`]) と統一エラー型 ([`error::app_error::AppError`])
//! - Problem Details レスポンス
//! - 型付き ID ([`id::Id`])

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
    pub mod problem;
}
pub mod id;
