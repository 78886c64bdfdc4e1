//! Lenient extraction of skill arguments from LLM-produced JSON.
//!
//! Models sometimes emit numbers as strings ("5000" instead of 5000);
//! accept both rather than failing a whole decision on a formatting slip.

use serde_json::Value;
use wingman_core::skill::SkillResult;

pub(crate) fn str_arg(args: &Value, key: &str) -> Option<String> {
    args.get(key).and_then(|v| v.as_str()).and_then(|s| {
        let s = s.trim();
        if s.is_empty() { None } else { Some(s.to_string()) }
    })
}

pub(crate) fn f64_arg(args: &Value, key: &str) -> Option<f64> {
    match args.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn u32_arg(args: &Value, key: &str) -> Option<u32> {
    match args.get(key)? {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn require_str(args: &Value, key: &str) -> Result<String, SkillResult> {
    str_arg(args, key).ok_or_else(|| SkillResult::failure(format!("缺少参数: {key}")))
}

pub(crate) fn require_f64(args: &Value, key: &str) -> Result<f64, SkillResult> {
    f64_arg(args, key).ok_or_else(|| SkillResult::failure(format!("缺少参数: {key}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_as_strings_are_accepted() {
        let args = json!({"target_altitude": "5000", "target_speed": 300.5});
        assert_eq!(f64_arg(&args, "target_altitude"), Some(5000.0));
        assert_eq!(f64_arg(&args, "target_speed"), Some(300.5));
        assert_eq!(f64_arg(&args, "missing"), None);
    }

    #[test]
    fn blank_strings_do_not_count() {
        let args = json!({"unit_name": "  "});
        assert!(str_arg(&args, "unit_name").is_none());
        let failure = require_str(&args, "unit_name").unwrap_err();
        assert!(!failure.success);
        assert!(failure.description.contains("unit_name"));
    }

    #[test]
    fn launch_num_parses_from_either_form() {
        assert_eq!(u32_arg(&json!({"launch_num": 2}), "launch_num"), Some(2));
        assert_eq!(u32_arg(&json!({"launch_num": "2"}), "launch_num"), Some(2));
        assert_eq!(u32_arg(&json!({"launch_num": -1}), "launch_num"), None);
    }
}
