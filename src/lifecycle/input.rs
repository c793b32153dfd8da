//! # 输入检查辅助函数
//!
//! 供调用方在提交前自检使用，导入本身只要求 ip 与 secret 非空

use std::collections::BTreeMap;

/// 点分十进制 IPv4，每段 1 到 3 位数字且不超过 255
#[must_use]
pub fn validate_ip_format(ip: &str) -> bool {
    let parts: Vec<&str> = ip.split('.').collect();
    parts.len() == 4
        && parts.iter().all(|part| {
            (1..=3).contains(&part.len())
                && part.bytes().all(|b| b.is_ascii_digit())
                && part.parse::<u16>().is_ok_and(|n| n <= 255)
        })
}

/// 非空白且至少包含一个 `key=value`
#[must_use]
pub fn validate_secret_format(secret: &str) -> bool {
    !secret.trim().is_empty() && secret.contains('=')
}

/// 把 Cookie 串拆成键值表，空键丢弃，值里的 `=` 保留
#[must_use]
pub fn parse_cookie(secret: &str) -> BTreeMap<String, String> {
    secret
        .split(';')
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = key.trim();
            (!key.is_empty()).then(|| (key.to_string(), value.trim().to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("192.168.1.1", true)]
    #[case("0.0.0.0", true)]
    #[case("255.255.255.255", true)]
    #[case("010.001.1.1", true)]
    #[case("256.1.1.1", false)]
    #[case("1.1.1", false)]
    #[case("1.1.1.1.1", false)]
    #[case("a.b.c.d", false)]
    #[case("1..1.1", false)]
    #[case("1234.1.1.1", false)]
    #[case("", false)]
    fn test_validate_ip_format(#[case] ip: &str, #[case] expected: bool) {
        assert_eq!(validate_ip_format(ip), expected);
    }

    #[rstest]
    #[case("a=1", true)]
    #[case("web_session=abc; a1=x", true)]
    #[case("   ", false)]
    #[case("no-pairs", false)]
    fn test_validate_secret_format(#[case] secret: &str, #[case] expected: bool) {
        assert_eq!(validate_secret_format(secret), expected);
    }

    #[test]
    fn test_parse_cookie() {
        let parsed = parse_cookie("a1=18c; web_session=04=00;  flag ; =orphan");
        assert_eq!(parsed.get("a1").map(String::as_str), Some("18c"));
        assert_eq!(parsed.get("web_session").map(String::as_str), Some("04=00"));
        assert_eq!(parsed.get("flag").map(String::as_str), Some(""));
        assert_eq!(parsed.len(), 3);
        assert!(parse_cookie("").is_empty());
    }
}
