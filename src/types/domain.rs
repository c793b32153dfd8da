//! # 领域标识与状态枚举
//!
//! 状态在数据库中以 `i16` 状态码保存，对外序列化为小写字符串

use std::fmt;
use std::str::FromStr;

pub type CredentialId = i32;
pub type AlertId = i32;
pub type CycleId = i32;

/// 定义一个与状态码双向映射的枚举，附带 Display/FromStr/serde
macro_rules! coded_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($(#[$vmeta:meta])* $variant:ident = $code:literal => $label:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
        }

        impl $name {
            /// 全部取值
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            /// 数据库状态码
            #[must_use]
            pub const fn code(self) -> i16 {
                match self {
                    $(Self::$variant => $code,)+
                }
            }

            /// 从数据库状态码还原
            #[must_use]
            pub const fn from_code(code: i16) -> Option<Self> {
                match code {
                    $($code => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// 转换为字符串
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl TryFrom<i16> for $name {
            type Error = String;

            fn try_from(code: i16) -> Result<Self, Self::Error> {
                Self::from_code(code).ok_or_else(|| format!("Invalid {} code: {code}", $kind))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {s}", $kind)),
                }
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

coded_enum! {
    /// 凭证状态
    CredentialStatus, "credential status" {
        /// 可出借
        Available = 0 => "available",
        /// 已出借
        InUse = 1 => "in_use",
        /// 校验失败
        Invalid = 2 => "invalid",
        /// 人工拉黑
        Blacklisted = 3 => "blacklisted",
    }
}

coded_enum! {
    /// 告警级别，数值越大越严重
    AlertLevel, "alert level" {
        Low = 1 => "low",
        Medium = 2 => "medium",
        High = 3 => "high",
    }
}

coded_enum! {
    /// 告警处理状态
    AlertStatus, "alert status" {
        Unresolved = 0 => "unresolved",
        Resolved = 1 => "resolved",
    }
}

coded_enum! {
    /// 使用周期状态
    CycleStatus, "cycle status" {
        Running = 0 => "running",
        Completed = 1 => "completed",
    }
}

impl CredentialStatus {
    /// 该状态下 `in_use` 列应有的取值
    #[must_use]
    pub const fn occupies(self) -> bool {
        matches!(self, Self::InUse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_status_codes() {
        assert_eq!(CredentialStatus::Available.code(), 0);
        assert_eq!(CredentialStatus::InUse.code(), 1);
        assert_eq!(CredentialStatus::Invalid.code(), 2);
        assert_eq!(CredentialStatus::Blacklisted.code(), 3);
        assert_eq!(
            CredentialStatus::try_from(3),
            Ok(CredentialStatus::Blacklisted)
        );
        assert!(CredentialStatus::try_from(4).is_err());
        assert!(CredentialStatus::try_from(-1).is_err());
    }

    #[test]
    fn test_only_in_use_occupies() {
        let occupied: Vec<_> = CredentialStatus::ALL
            .iter()
            .filter(|s| s.occupies())
            .collect();
        assert_eq!(occupied, vec![&CredentialStatus::InUse]);
    }

    #[test]
    fn test_alert_level_ordering() {
        assert!(AlertLevel::High > AlertLevel::Medium);
        assert!(AlertLevel::Medium > AlertLevel::Low);
        assert_eq!(AlertLevel::from_code(2), Some(AlertLevel::Medium));
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(
            "in_use".parse::<CredentialStatus>(),
            Ok(CredentialStatus::InUse)
        );
        assert_eq!("resolved".parse::<AlertStatus>(), Ok(AlertStatus::Resolved));
        assert!("busy".parse::<CredentialStatus>().is_err());
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&CredentialStatus::Blacklisted).unwrap();
        assert_eq!(json, "\"blacklisted\"");

        let level: AlertLevel = serde_json::from_str("\"high\"").unwrap();
        assert_eq!(level, AlertLevel::High);

        let result: Result<CycleStatus, _> = serde_json::from_str("\"paused\"");
        assert!(result.is_err());
    }
}
