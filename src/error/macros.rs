//! # 错误处理宏
//!
//! `error!(Kind, msg[, source])` 构造错误，`bail!` 直接返回，`ensure!` 条件不满足时返回

/// 按种类构造 `PoolError`
#[macro_export]
macro_rules! error {
    (Validation, $msg:expr) => {
        $crate::error::PoolError::validation($msg)
    };
    (Storage, $msg:expr) => {
        $crate::error::PoolError::storage($msg)
    };
    (Storage, $msg:expr, $source:expr) => {
        $crate::error::PoolError::storage_with_source($msg, $source)
    };
    (External, $msg:expr) => {
        $crate::error::PoolError::external($msg)
    };
    (External, $msg:expr, $source:expr) => {
        $crate::error::PoolError::external_with_source($msg, $source)
    };
    (Config, $msg:expr) => {
        $crate::error::PoolError::config($msg)
    };
    (Config, $msg:expr, $source:expr) => {
        $crate::error::PoolError::config_with_source($msg, $source)
    };
    (Internal, $msg:expr) => {
        $crate::error::PoolError::internal($msg)
    };
    (Internal, $msg:expr, $source:expr) => {
        $crate::error::PoolError::internal_with_source($msg, $source)
    };
}

/// 立即返回指定种类的错误
#[macro_export]
macro_rules! bail {
    ($kind:ident, $msg:expr) => {
        return Err($crate::error!($kind, $msg))
    };
    ($kind:ident, $msg:expr, $source:expr) => {
        return Err($crate::error!($kind, $msg, $source))
    };
}

/// 确保条件成立，否则返回指定种类的错误（缺省为校验错误）
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $kind:ident, $msg:expr) => {
        if !($cond) {
            $crate::bail!($kind, $msg);
        }
    };
    ($cond:expr, $msg:expr) => {
        if !($cond) {
            $crate::bail!(Validation, $msg);
        }
    };
}
