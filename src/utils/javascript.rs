/// JavaScript string literal for `value`
pub fn quote(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}
