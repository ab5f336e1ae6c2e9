//! Conversion tables from Go built-ins and standard library symbols to Java.

use std::collections::HashMap;
use std::sync::LazyLock;

/// A Java class that must be imported when a conversion is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JavaImport {
    pub name: &'static str,
    pub qualified: &'static str,
}

pub const DATE: JavaImport = JavaImport {
    name: "Date",
    qualified: "java.util.Date",
};
pub const ARRAY_UTIL: JavaImport = JavaImport {
    name: "ArrayUtil",
    qualified: "org.go2j.util.ArrayUtil",
};
pub const MAP: JavaImport = JavaImport {
    name: "Map",
    qualified: "java.util.Map",
};
pub const HASH_MAP: JavaImport = JavaImport {
    name: "HashMap",
    qualified: "java.util.HashMap",
};
pub const ARRAYS: JavaImport = JavaImport {
    name: "Arrays",
    qualified: "java.util.Arrays",
};
pub const FUNCTION: JavaImport = JavaImport {
    name: "Function",
    qualified: "java.util.function.Function",
};

/// Replacement for a call to a Go function.
#[derive(Debug, Clone, Copy)]
pub struct ApiConv {
    /// Java callee written in place of the Go one.
    pub method: &'static str,
    pub import: Option<JavaImport>,
    /// Separator between arguments, `", "` when absent.
    pub separator: Option<&'static str>,
    /// Go result type, for calls whose package sources are unavailable.
    pub result: Option<&'static str>,
}

impl ApiConv {
    const fn new(method: &'static str) -> Self {
        Self {
            method,
            import: None,
            separator: None,
            result: None,
        }
    }

    const fn import(mut self, import: JavaImport) -> Self {
        self.import = Some(import);
        self
    }

    const fn separator(mut self, separator: &'static str) -> Self {
        self.separator = Some(separator);
        self
    }

    const fn result(mut self, result: &'static str) -> Self {
        self.result = Some(result);
        self
    }
}

/// Go calls keyed by their qualified name (`fmt.Println`, `append`).
pub static API_CONVS: LazyLock<HashMap<&'static str, ApiConv>> = LazyLock::new(|| {
    HashMap::from([
        (
            "fmt.Println",
            ApiConv::new("System.out.println").separator(" + \" \" + "),
        ),
        ("fmt.Print", ApiConv::new("System.out.print").separator(" + ")),
        ("fmt.Printf", ApiConv::new("System.out.printf")),
        ("fmt.Sprintf", ApiConv::new("String.format").result("string")),
        ("fmt.Sprint", ApiConv::new("String.valueOf").result("string")),
        ("time.Now", ApiConv::new("new Date").import(DATE).result("time.Time")),
        ("append", ApiConv::new("ArrayUtil.append").import(ARRAY_UTIL)),
        ("errors.New", ApiConv::new("new Exception").result("error")),
        ("strconv.Itoa", ApiConv::new("String.valueOf").result("string")),
        ("println", ApiConv::new("System.err.println").separator(" + \" \" + ")),
    ])
});

/// Replacement for a qualified Go type.
#[derive(Debug, Clone, Copy)]
pub struct TypeConv {
    pub name: &'static str,
    pub import: Option<JavaImport>,
}

pub static TYPE_CONVS: LazyLock<HashMap<&'static str, TypeConv>> = LazyLock::new(|| {
    HashMap::from([
        (
            "time.Time",
            TypeConv {
                name: "Date",
                import: Some(DATE),
            },
        ),
        (
            "time.Duration",
            TypeConv {
                name: "long",
                import: None,
            },
        ),
    ])
});

/// Java form of a one-argument conversion `T(x)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueConv {
    /// `x` followed by the text.
    Suffix(&'static str),
    /// `x` between prefix and suffix.
    Wrap(&'static str, &'static str),
}

/// Conversions keyed by `"<argument type>-><target type>"` in Java spelling.
pub static VALUE_CONVS: LazyLock<HashMap<&'static str, ValueConv>> = LazyLock::new(|| {
    HashMap::from([
        ("String->byte[]", ValueConv::Suffix(".getBytes()")),
        ("String->char[]", ValueConv::Suffix(".toCharArray()")),
        ("byte[]->String", ValueConv::Wrap("new String(", ")")),
        ("char[]->String", ValueConv::Wrap("new String(", ")")),
        ("char->String", ValueConv::Wrap("String.valueOf(", ")")),
        ("int->String", ValueConv::Wrap("String.valueOf((char) ", ")")),
    ])
});

struct Primitive {
    plain: &'static str,
    boxed: &'static str,
    zero: Option<&'static str>,
}

static PRIMITIVES: LazyLock<HashMap<&'static str, Primitive>> = LazyLock::new(|| {
    let entries = [
        ("string", "String", "String", Some("\"\"")),
        ("bool", "boolean", "Boolean", Some("false")),
        ("byte", "byte", "Byte", Some("0")),
        ("int8", "byte", "Byte", Some("0")),
        ("uint8", "byte", "Byte", Some("0")),
        ("int16", "short", "Short", Some("0")),
        ("uint16", "int", "Integer", Some("0")),
        ("rune", "char", "Character", Some("0")),
        ("int", "int", "Integer", Some("0")),
        ("int32", "int", "Integer", Some("0")),
        ("uint", "int", "Integer", Some("0")),
        ("int64", "long", "Long", Some("0")),
        ("uint32", "long", "Long", Some("0")),
        ("uint64", "long", "Long", Some("0")),
        ("uintptr", "long", "Long", Some("0")),
        ("float32", "float", "Float", Some("0")),
        ("float64", "double", "Double", Some("0")),
        ("error", "Exception", "Exception", None),
        ("any", "Object", "Object", None),
    ];
    entries
        .into_iter()
        .map(|(go, plain, boxed, zero)| (go, Primitive { plain, boxed, zero }))
        .collect()
});

/// Java spelling of a predeclared Go type, boxed inside generic arguments.
pub fn java_type(go_name: &str, boxed: bool) -> Option<&'static str> {
    PRIMITIVES
        .get(go_name)
        .map(|p| if boxed { p.boxed } else { p.plain })
}

pub fn is_builtin_type(go_name: &str) -> bool {
    PRIMITIVES.contains_key(go_name)
}

/// Initializer for a local of a predeclared type, matching Go's zero value.
pub fn zero_value(go_name: &str) -> Option<&'static str> {
    PRIMITIVES.get(go_name).and_then(|p| p.zero)
}

/// Identifiers with a different Java spelling.
pub fn java_ident(name: &str) -> &str {
    match name {
        "nil" => "null",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_println_joins_with_space() {
        let conv = API_CONVS.get("fmt.Println").unwrap();
        assert_eq!(conv.method, "System.out.println");
        assert_eq!(conv.separator, Some(" + \" \" + "));
        assert!(conv.import.is_none());
    }

    #[test]
    fn test_time_now_imports_date() {
        let conv = API_CONVS.get("time.Now").unwrap();
        assert_eq!(conv.import, Some(DATE));
        assert_eq!(TYPE_CONVS.get("time.Time").unwrap().name, "Date");
    }

    #[test]
    fn test_primitive_names() {
        assert_eq!(java_type("int", false), Some("int"));
        assert_eq!(java_type("int", true), Some("Integer"));
        assert_eq!(java_type("float64", false), Some("double"));
        assert_eq!(java_type("int64", true), Some("Long"));
        assert_eq!(java_type("Circle", false), None);
    }

    #[test]
    fn test_value_conversion_keys() {
        assert_eq!(
            VALUE_CONVS.get("String->byte[]"),
            Some(&ValueConv::Suffix(".getBytes()"))
        );
    }
}
