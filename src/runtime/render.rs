use std::fmt::Write;

use crate::runtime::{FluxRuntime, builtins, gc::HeapObject, value::Value};

impl FluxRuntime {
    /// Source-like rendering: strings are quoted.
    pub fn repr(&self, value: Value) -> String {
        let mut out = String::new();
        self.write_value(&mut out, value, false);
        out
    }

    /// Rendering used by `println` and `string`: strings are raw.
    pub fn display(&self, value: Value) -> String {
        let mut out = String::new();
        self.write_value(&mut out, value, true);
        out
    }

    fn write_value(&self, out: &mut String, value: Value, raw: bool) {
        match value {
            Value::Int(v) => {
                let _ = write!(out, "{}", v);
            }
            Value::Float(v) => out.push_str(&format_float(v)),
            Value::Bool(v) => {
                let _ = write!(out, "{}", v);
            }
            Value::Nothing => out.push_str("nothing"),
            Value::Type(id) => out.push_str(self.types.name(id)),
            Value::Builtin(id) => out.push_str(builtins::get(id).map_or("?", |b| b.name)),
            Value::Gc(handle) => match self.heap.get(handle) {
                None => out.push_str("<freed>"),
                Some(HeapObject::Str(text)) if raw => out.push_str(text),
                Some(HeapObject::Str(text)) => {
                    let _ = write!(out, "{:?}", &**text);
                }
                Some(HeapObject::Array { data, dims, .. }) if dims.len() == 1 => {
                    self.write_seq(out, "[", data, "]");
                }
                Some(HeapObject::Array { elem, dims, .. }) => {
                    let extents: Vec<String> = dims.iter().map(usize::to_string).collect();
                    let _ = write!(
                        out,
                        "{} Array{{{},{}}}",
                        extents.join("×"),
                        self.types.name(*elem),
                        dims.len()
                    );
                }
                Some(HeapObject::Tuple(items)) if items.len() == 1 => {
                    out.push('(');
                    self.write_value(out, items[0], false);
                    out.push_str(",)");
                }
                Some(HeapObject::Tuple(items)) => self.write_seq(out, "(", items, ")"),
                Some(HeapObject::Struct { ty, fields }) => {
                    out.push_str(self.types.name(*ty));
                    self.write_seq(out, "(", fields, ")");
                }
                Some(HeapObject::Module { name, .. }) => out.push_str(name),
                Some(HeapObject::Function { name, params, .. }) => {
                    let _ = write!(out, "{}/{}", name, params.len());
                }
                Some(HeapObject::Code(program)) => {
                    let _ = write!(out, "Code({} statements)", program.statements.len());
                }
            },
        }
    }

    fn write_seq(&self, out: &mut String, open: &str, items: &[Value], close: &str) {
        out.push_str(open);
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write_value(out, *item, false);
        }
        out.push_str(close);
    }
}

fn format_float(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        if v > 0.0 { "Inf" } else { "-Inf" }.to_string()
    } else {
        format!("{:?}", v)
    }
}
