//! Rendering of values as python source literals.
//!
//! Every python fragment emitted by a command creator formats its literals with the functions in this module so that
//! escaping, special numbers and dict layout are identical everywhere.

use indexmap::IndexMap;

pub const INDENT: &str = "    ";

/// The name of the `ProtocolContext` argument of the generated `run` function.
pub const PROTOCOL_CONTEXT_NAME: &str = "protocol";

/// The imported `opentrons.protocol_api` module, for constants such as `OFF_DECK`.
pub const PROTOCOL_API_NAME: &str = "protocol_api";

/// A python value, dict keys are kept in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub enum PyValue {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<PyValue>),
    Dict(IndexMap<String, PyValue>),
}

impl From<bool> for PyValue {
    fn from(value: bool) -> Self {
        PyValue::Bool(value)
    }
}

impl From<i64> for PyValue {
    fn from(value: i64) -> Self {
        PyValue::Int(value)
    }
}

impl From<u32> for PyValue {
    fn from(value: u32) -> Self {
        PyValue::Int(value as i64)
    }
}

impl From<f64> for PyValue {
    fn from(value: f64) -> Self {
        PyValue::Float(value)
    }
}

impl From<&str> for PyValue {
    fn from(value: &str) -> Self {
        PyValue::Str(value.to_string())
    }
}

impl From<String> for PyValue {
    fn from(value: String) -> Self {
        PyValue::Str(value)
    }
}

impl<T: Into<PyValue>> From<Vec<T>> for PyValue {
    fn from(value: Vec<T>) -> Self {
        PyValue::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<PyValue>> From<Option<T>> for PyValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => PyValue::None,
        }
    }
}

impl<T: Into<PyValue>> From<IndexMap<String, T>> for PyValue {
    fn from(value: IndexMap<String, T>) -> Self {
        PyValue::Dict(
            value
                .into_iter()
                .map(|(key, value)| (key, value.into()))
                .collect(),
        )
    }
}

/// Indent every non-empty line by one level.
pub fn indent_py_lines(lines: &str) -> String {
    lines
        .split('\n')
        .map(|line| match line.is_empty() {
            true => line.to_string(),
            false => format!("{}{}", INDENT, line),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// JSON string escaping produces a valid, properly escaped python string literal.
pub fn format_py_str(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

pub fn format_py_float(value: f64) -> String {
    if value.is_nan() {
        "float(\"NaN\")".to_string()
    } else if value.is_infinite() {
        match value.is_sign_positive() {
            true => "float(\"Infinity\")".to_string(),
            false => "float(\"-Infinity\")".to_string(),
        }
    } else {
        format!("{}", value)
    }
}

pub fn format_py_value(value: &PyValue) -> String {
    match value {
        PyValue::None => "None".to_string(),
        PyValue::Bool(true) => "True".to_string(),
        PyValue::Bool(false) => "False".to_string(),
        PyValue::Int(value) => value.to_string(),
        PyValue::Float(value) => format_py_float(*value),
        PyValue::Str(value) => format_py_str(value),
        PyValue::List(values) => format_py_list(values),
        PyValue::Dict(entries) => format_py_dict(entries),
    }
}

pub fn format_py_list(values: &[PyValue]) -> String {
    format!(
        "[{}]",
        values
            .iter()
            .map(format_py_value)
            .collect::<Vec<_>>()
            .join(", ")
    )
}

/// Non-empty dicts are rendered one entry per line, with a trailing comma.
pub fn format_py_dict(entries: &IndexMap<String, PyValue>) -> String {
    if entries.is_empty() {
        return "{}".to_string();
    }

    let lines = entries
        .iter()
        .map(|(key, value)| indent_py_lines(&format!("{}: {},", format_py_str(key), format_py_value(value))))
        .collect::<Vec<_>>();

    format!("{{\n{}\n}}", lines.join("\n"))
}

/// `labware["A1"]`
pub fn format_py_well(labware_python_name: &str, well_name: &str) -> String {
    format!("{}[{}]", labware_python_name, format_py_str(well_name))
}

/// A single-line call, positional arguments have no name.
pub fn format_py_call(callee: &str, args: &[(Option<&str>, String)]) -> String {
    let args = args
        .iter()
        .map(|(name, value)| match name {
            Some(name) => format!("{}={}", name, value),
            None => value.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ");

    format!("{}({})", callee, args)
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(PyValue::None, "None")]
    #[case(PyValue::Bool(true), "True")]
    #[case(PyValue::Bool(false), "False")]
    #[case(PyValue::Int(-3), "-3")]
    #[case(PyValue::Float(95.5), "95.5")]
    #[case(PyValue::Float(10.0), "10")]
    #[case(PyValue::Float(f64::INFINITY), "float(\"Infinity\")")]
    #[case(PyValue::Float(f64::NEG_INFINITY), "float(\"-Infinity\")")]
    #[case(PyValue::Float(f64::NAN), "float(\"NaN\")")]
    #[case(PyValue::Str("hello".to_string()), "\"hello\"")]
    #[case(PyValue::List(vec![]), "[]")]
    #[case(PyValue::List(vec![1.0.into(), "a".into(), true.into()]), "[1, \"a\", True]")]
    #[case(PyValue::Dict(IndexMap::new()), "{}")]
    fn format_values(#[case] value: PyValue, #[case] expected: &str) {
        assert_eq!(format_py_value(&value), expected);
    }

    #[rstest]
    #[case("say \"hi\"", r#""say \"hi\"""#)]
    #[case(r"back\slash", r#""back\\slash""#)]
    #[case("two\nlines", r#""two\nlines""#)]
    #[case("tab\there", r#""tab\there""#)]
    #[case("unit\u{1f}separator", r#""unit\u001fseparator""#)]
    #[case("caf\u{e9} \u{1f9ea}", "\"caf\u{e9} \u{1f9ea}\"")]
    fn format_strings(#[case] value: &str, #[case] expected: &str) {
        assert_eq!(format_py_str(value), expected);
    }

    #[test]
    fn format_dict() {
        // given
        let mut dict = IndexMap::new();
        dict.insert("yes".to_string(), PyValue::Bool(true));
        dict.insert("no".to_string(), PyValue::Bool(false));

        // when
        let result = format_py_value(&PyValue::Dict(dict));

        // then
        assert_eq!(result, "{\n    \"yes\": True,\n    \"no\": False,\n}");
    }

    #[test]
    fn format_nested_dict() {
        // given
        let mut inner = IndexMap::new();
        inner.insert("b".to_string(), PyValue::List(vec![PyValue::Int(1), PyValue::Int(2)]));
        let mut outer = IndexMap::new();
        outer.insert("a".to_string(), PyValue::Dict(inner));
        outer.insert("c".to_string(), PyValue::Str("d".to_string()));

        // when
        let result = format_py_dict(&outer);

        // then
        assert_eq!(
            result,
            "{\n    \"a\": {\n        \"b\": [1, 2],\n    },\n    \"c\": \"d\",\n}"
        );
    }

    #[test]
    fn dict_key_order_is_insertion_order() {
        // given
        let mut dict = IndexMap::new();
        dict.insert("zebra".to_string(), PyValue::Int(1));
        dict.insert("apple".to_string(), PyValue::Int(2));

        // then
        assert_eq!(format_py_dict(&dict), "{\n    \"zebra\": 1,\n    \"apple\": 2,\n}");
    }

    #[test]
    fn indent_skips_empty_lines() {
        assert_eq!(indent_py_lines("a\n\nb"), "    a\n\n    b");
    }

    #[test]
    fn call_formatting() {
        assert_eq!(
            format_py_call("pipette.blow_out", &[
                (None, format_py_well("plate", "A1")),
                (Some("volume"), format_py_float(10.0)),
            ]),
            "pipette.blow_out(plate[\"A1\"], volume=10)"
        );
    }
}
