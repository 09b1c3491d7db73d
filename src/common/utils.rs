use chrono::{DateTime, Local, TimeZone, Timelike};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::time::Duration;

/// # HMAC-SHA256 签名生成器
///
/// 使用 HMAC-SHA256 算法为给定的载荷生成一个签名。
///
/// ## 返回
///
/// 返回一个十六进制编码的签名字符串。
pub fn generate_hmac_signature(payload: &str, secret_key: &str) -> String {
    type HmacSha256 = Hmac<Sha256>;

    let mut mac =
        HmacSha256::new_from_slice(secret_key.as_bytes()).expect("HMAC can take a key of any size");

    mac.update(payload.as_bytes());

    hex::encode(mac.finalize().into_bytes())
}

/// 计算 SHA-256 十六进制摘要（用于密码比对）
pub fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

/// 常量时间比较，避免计时攻击
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// 当前分钟内的秒位（0..=59）
#[inline]
pub fn second_of_minute<Tz: TimeZone>(at: &DateTime<Tz>) -> u32 {
    // 闰秒时 chrono 给出 59 + 纳秒溢出，这里统一截到 59
    at.second().min(59)
}

/// 距离下一个整秒的时长，用于让采样对齐到墙钟秒
pub fn until_next_second(now: &DateTime<Local>) -> Duration {
    let nanos = now.timestamp_subsec_nanos().min(999_999_999);
    Duration::from_nanos(1_000_000_000 - nanos as u64)
}

/// 消息中的时刻格式
pub fn format_clock(at: &DateTime<Local>) -> String {
    at.format("%H:%M:%S").to_string()
}

/// 文本日志中的完整时间格式
pub fn format_timestamp(at: &DateTime<Local>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hmac_signature_is_stable() {
        let a = generate_hmac_signature("admin.1700000000", "secret");
        let b = generate_hmac_signature("admin.1700000000", "secret");
        let c = generate_hmac_signature("admin.1700000000", "other");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_sha256_hex() {
        // echo -n "abc" | sha256sum
        assert_eq!(
            sha256_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"token", b"token"));
        assert!(!constant_time_eq(b"token", b"tokem"));
        assert!(!constant_time_eq(b"token", b"token2"));
    }

    #[test]
    fn test_second_of_minute_and_formats() {
        let at = Local.with_ymd_and_hms(2025, 3, 1, 14, 7, 53).unwrap();
        assert_eq!(second_of_minute(&at), 53);
        assert_eq!(format_clock(&at), "14:07:53");
        assert_eq!(format_timestamp(&at), "2025-03-01 14:07:53");
    }

    #[test]
    fn test_until_next_second() {
        let at = Local.with_ymd_and_hms(2025, 3, 1, 14, 7, 53).unwrap();
        assert_eq!(until_next_second(&at), Duration::from_secs(1));

        let later = at + chrono::Duration::milliseconds(250);
        assert_eq!(until_next_second(&later), Duration::from_millis(750));
    }
}
