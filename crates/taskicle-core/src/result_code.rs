use std::fmt;

use serde::{Deserialize, Serialize};

/// Result code carried in the `r` field of every backend response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum ApiResultCode {
    Ok,
    Unknown,
    BadPayload,
    RequiredFieldMissing,
    TypeMismatch,
    NoField,
    InvalidEnum,
    Database,
    NoEffect,
    File,
    NotFound,
    Crypt,
    AccessDenied,
    InvalidPassword,
    /// Code not known to this client
    Other(i64),
}

impl ApiResultCode {
    /// Numeric wire value
    pub const fn code(self) -> i64 {
        match self {
            Self::Ok => 0,
            Self::Unknown => 1,
            Self::BadPayload => 2,
            Self::RequiredFieldMissing => 3,
            Self::TypeMismatch => 4,
            Self::NoField => 5,
            Self::InvalidEnum => 6,
            Self::Database => 7,
            Self::NoEffect => 8,
            Self::File => 9,
            Self::NotFound => 10,
            Self::Crypt => 11,
            Self::AccessDenied => 12,
            Self::InvalidPassword => 13,
            Self::Other(code) => code,
        }
    }

    pub const fn is_success(self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Human-readable message for this code
    pub const fn message(self) -> &'static str {
        match self {
            Self::Ok => "操作成功",
            Self::Unknown => "未知错误",
            Self::BadPayload => "携带的数据格式错误",
            Self::RequiredFieldMissing => "缺少必要字段",
            Self::TypeMismatch => "数据类型不匹配",
            Self::NoField => "至少需要一个字段",
            Self::InvalidEnum => "枚举值无效",
            Self::Database => "数据库错误",
            Self::NoEffect => "操作无影响",
            Self::File => "文件操作失败",
            Self::NotFound => "找不到目标实体",
            Self::Crypt => "加解密失败",
            Self::AccessDenied => "访问被拒绝",
            Self::InvalidPassword => "密码错误",
            Self::Other(_) => "未知错误代码",
        }
    }
}

impl From<i64> for ApiResultCode {
    fn from(code: i64) -> Self {
        match code {
            0 => Self::Ok,
            1 => Self::Unknown,
            2 => Self::BadPayload,
            3 => Self::RequiredFieldMissing,
            4 => Self::TypeMismatch,
            5 => Self::NoField,
            6 => Self::InvalidEnum,
            7 => Self::Database,
            8 => Self::NoEffect,
            9 => Self::File,
            10 => Self::NotFound,
            11 => Self::Crypt,
            12 => Self::AccessDenied,
            13 => Self::InvalidPassword,
            other => Self::Other(other),
        }
    }
}

impl From<ApiResultCode> for i64 {
    fn from(code: ApiResultCode) -> Self {
        code.code()
    }
}

impl fmt::Display for ApiResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Translate a numeric result code into its message
pub fn translate(code: i64) -> &'static str {
    ApiResultCode::from(code).message()
}
