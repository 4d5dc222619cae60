//! Scripted runtime for exercising the boundary without the interpreter.

use crate::embed::{BoundaryView, ManagedError, ManagedResult, ManagedRuntime, RuntimeConfig};

#[derive(Debug, Clone, PartialEq)]
pub(super) enum Mock {
    Int(i64),
    Text(String),
    Func(&'static str),
    Type(&'static str),
    Record(Vec<Mock>),
    Exception(String),
}

const RECORD_FIELDS: [&str; 2] = ["left", "right"];

#[derive(Debug, Default)]
pub(super) struct ScriptedRuntime {
    pub bootstraps: u32,
    pub fail_bootstrap: bool,
    pub has_yield: bool,
    /// Source text whose evaluation raises.
    pub fail_on: Option<&'static str>,
    pub evaluated: Vec<String>,
    /// Rooted handles seen at each `apply`.
    pub roots_at_apply: Vec<Vec<Mock>>,
    pub roots_at_collect: Vec<Mock>,
    pub yields: u32,
}

fn raise<T>(msg: &str) -> Result<T, ManagedError<Mock>> {
    Err(ManagedError::new(Mock::Exception(msg.to_string())))
}

fn rooted(boundary: &BoundaryView<'_, Mock>) -> Vec<Mock> {
    let mut seen = Vec::new();
    boundary.visit_roots(&mut |value: &Mock| seen.push(value.clone()));
    seen
}

impl ManagedRuntime for ScriptedRuntime {
    type Value = Mock;

    fn bootstrap(
        &mut self,
        _boundary: &BoundaryView<'_, Mock>,
        _config: &RuntimeConfig,
    ) -> Result<(), String> {
        if self.fail_bootstrap {
            return Err("image is corrupt".to_string());
        }
        self.bootstraps += 1;
        Ok(())
    }

    fn parse(&mut self, _boundary: &BoundaryView<'_, Mock>, source: &str) -> ManagedResult<Mock> {
        if source.contains('!') {
            return raise("parse");
        }
        Ok(Mock::Text(source.to_string()))
    }

    fn eval_toplevel(&mut self, boundary: &BoundaryView<'_, Mock>, form: &Mock) -> ManagedResult<Mock> {
        let Mock::Text(source) = form else {
            return raise("not a form");
        };
        self.evaluated.push(source.clone());
        self.roots_at_apply.push(rooted(boundary));
        if self.fail_on == Some(source.as_str()) {
            return raise("request failed");
        }
        match source.as_str() {
            "boom" => raise("boom"),
            "record" => Ok(Mock::Record(vec![Mock::Int(1), Mock::Int(2)])),
            text => Ok(text.parse().map(Mock::Int).unwrap_or_else(|_| form.clone())),
        }
    }

    fn apply(
        &mut self,
        boundary: &BoundaryView<'_, Mock>,
        target: &Mock,
        args: &[Mock],
    ) -> ManagedResult<Mock> {
        self.roots_at_apply.push(rooted(boundary));
        match target {
            Mock::Func("add") => {
                let mut total = 0;
                for arg in args {
                    match arg {
                        Mock::Int(v) => total += v,
                        _ => return raise("add expects integers"),
                    }
                }
                Ok(Mock::Int(total))
            }
            Mock::Func("yield") => {
                self.yields += 1;
                Ok(Mock::Int(0))
            }
            Mock::Func("fail") => raise("fail"),
            _ => raise("not callable"),
        }
    }

    fn resolve_field(
        &mut self,
        _boundary: &BoundaryView<'_, Mock>,
        ty: &Mock,
        name: &str,
    ) -> Result<usize, ManagedError<Mock>> {
        match ty {
            Mock::Type("Record") => match RECORD_FIELDS.iter().position(|f| *f == name) {
                Some(index) => Ok(index),
                None => raise("no such field"),
            },
            _ => raise("no fields"),
        }
    }

    fn get_nth_field(
        &mut self,
        boundary: &BoundaryView<'_, Mock>,
        value: &Mock,
        index: usize,
    ) -> ManagedResult<Mock> {
        self.roots_at_apply.push(rooted(boundary));
        match value {
            Mock::Record(fields) => match fields.get(index) {
                Some(field) => Ok(field.clone()),
                None => raise("bounds"),
            },
            _ => raise("no fields"),
        }
    }

    fn type_of(&mut self, value: &Mock) -> Mock {
        Mock::Type(match value {
            Mock::Int(_) => "Int",
            Mock::Text(_) => "Text",
            Mock::Func(_) => "Function",
            Mock::Type(_) => "Type",
            Mock::Record(_) => "Record",
            Mock::Exception(_) => "Exception",
        })
    }

    fn type_name(&self, ty: &Mock) -> Option<String> {
        match ty {
            Mock::Type(name) => Some(name.to_string()),
            _ => None,
        }
    }

    fn array_eltype(&self, _array: &Mock) -> Option<Mock> {
        None
    }

    fn array_rank(&self, _array: &Mock) -> Option<usize> {
        None
    }

    fn array_dim(&self, _array: &Mock, _axis: usize) -> Option<usize> {
        None
    }

    fn string_data(&self, value: &Mock) -> Option<&str> {
        match value {
            Mock::Text(text) => Some(text),
            _ => None,
        }
    }

    fn lookup_global(&self, module: &str, name: &str) -> Option<Mock> {
        match (module, name) {
            ("Base", "yield") if self.has_yield => Some(Mock::Func("yield")),
            ("Base", "add") => Some(Mock::Func("add")),
            _ => None,
        }
    }

    fn is_callable(&self, value: &Mock) -> bool {
        matches!(value, Mock::Func(_))
    }

    fn render(&self, value: &Mock) -> String {
        format!("{:?}", value)
    }

    fn collect_garbage(&mut self, boundary: &BoundaryView<'_, Mock>) {
        self.roots_at_collect = rooted(boundary);
    }
}
