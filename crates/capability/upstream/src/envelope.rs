//! 上游响应包络解析。

use serde_json::Value;

/// 依次从 `token`、`data.token`、`result.token` 读取登录 token。
pub fn extract_token(body: &Value) -> Option<String> {
    let candidates = [
        body.get("token"),
        body.get("data").and_then(|data| data.get("token")),
        body.get("result").and_then(|result| result.get("token")),
    ];
    candidates
        .into_iter()
        .flatten()
        .filter_map(|value| value.as_str())
        .map(str::trim)
        .find(|token| !token.is_empty())
        .map(str::to_string)
}

/// 读取分页行：优先 `data`，其次 `result`，最后根节点；
/// 选中的节点为对象时取其 `data` 数组。
pub fn extract_rows(body: Value) -> Vec<Value> {
    let list = match body {
        Value::Object(mut map) => {
            let picked = ["data", "result"]
                .into_iter()
                .find_map(|key| map.remove(key).filter(is_present));
            match picked {
                Some(value) => value,
                None => Value::Object(map),
            }
        }
        other => other,
    };
    match list {
        Value::Array(rows) => rows,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(rows)) => rows,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(text) => !text.is_empty(),
        _ => true,
    }
}
