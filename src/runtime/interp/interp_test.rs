use crate::{
    embed::{BoundaryView, ExceptionChannel, ManagedRuntime, RootStack, RuntimeConfig, SignalGate},
    runtime::{FluxRuntime, interp::MAX_CALL_DEPTH, types::builtin, value::Value},
};

struct Harness {
    roots: RootStack<Value>,
    exception: ExceptionChannel<Value>,
    signals: SignalGate,
    rt: FluxRuntime,
}

impl Harness {
    fn new() -> Self {
        let mut harness = Self {
            roots: RootStack::new(),
            exception: ExceptionChannel::new(),
            signals: SignalGate::new(),
            rt: FluxRuntime::new(),
        };
        let boundary = BoundaryView::new(&harness.roots, &harness.exception, &harness.signals);
        let config = RuntimeConfig::new("/nonexistent/flux").with_args(["--bind-to", "10.1.1.1"]);
        harness.rt.bootstrap(&boundary, &config).unwrap();
        harness
    }

    fn eval(&mut self, source: &str) -> Result<Value, Value> {
        let boundary = BoundaryView::new(&self.roots, &self.exception, &self.signals);
        let form = self.rt.parse(&boundary, source).map_err(|e| e.exception)?;
        self.rt
            .eval_toplevel(&boundary, &form)
            .map_err(|e| e.exception)
    }

    fn eval_repr(&mut self, source: &str) -> String {
        match self.eval(source) {
            Ok(value) => self.rt.repr(value),
            Err(exception) => format!("raised {}", self.rt.repr(exception)),
        }
    }
}

#[test]
fn arithmetic_follows_precedence() {
    let mut h = Harness::new();
    assert_eq!(h.eval("1 + 2 * 3"), Ok(Value::Int(7)));
    assert_eq!(h.eval("(1 + 2) * 3"), Ok(Value::Int(9)));
    assert_eq!(h.eval("7 / 2"), Ok(Value::Float(3.5)));
    assert_eq!(h.eval("-2 + 0.5"), Ok(Value::Float(-1.5)));
    assert_eq!(h.eval("1 < 2"), Ok(Value::Bool(true)));
    assert_eq!(h.eval("!(1 == 2)"), Ok(Value::Bool(true)));
}

#[test]
fn globals_functions_and_recursion() {
    let mut h = Harness::new();
    assert_eq!(h.eval("x = 40; x + 2"), Ok(Value::Int(42)));
    assert_eq!(h.eval("add(a, b) = a + b; add(x, 1)"), Ok(Value::Int(41)));
    assert_eq!(h.eval_repr("\"ab\" * \"cd\""), "\"abcd\"");
}

#[test]
fn structs_construct_and_expose_fields() {
    let mut h = Harness::new();
    assert_eq!(
        h.eval_repr("struct Point { x, y }\np = Point(1, 2.5)"),
        "Point(1, 2.5)"
    );
    assert_eq!(h.eval("p.y"), Ok(Value::Float(2.5)));
    assert_eq!(h.eval_repr("p.z"), "raised FieldError(Point, \"z\")");
    assert_eq!(
        h.eval_repr("Point(1)"),
        "raised MethodError(\"no method matching Point(::Int64)\")"
    );
}

#[test]
fn arrays_and_tuples_index_from_one() {
    let mut h = Harness::new();
    assert_eq!(h.eval("[10, 20, 30][2]"), Ok(Value::Int(20)));
    assert_eq!(h.eval("(1, \"a\")[1]"), Ok(Value::Int(1)));
    assert_eq!(h.eval_repr("[1, 2][0]"), "raised BoundsError(0)");
    assert_eq!(h.eval_repr("[1, 2][3]"), "raised BoundsError(3)");
    assert_eq!(h.eval_repr("typeof([1, 2.0])"), "Array{Any,1}");
    assert_eq!(h.eval_repr("typeof((1, \"a\"))"), "Tuple{Int64,String}");
    assert_eq!(h.eval_repr("(1,)"), "(1,)");
}

#[test]
fn undefined_names_raise_undef_var_error() {
    let mut h = Harness::new();
    assert_eq!(
        h.eval_repr("undefinedSymbolXYZ"),
        "raised UndefVarError(\"undefinedSymbolXYZ\")"
    );
    assert_eq!(h.eval_repr("Base.nope"), "raised UndefVarError(\"nope\")");
}

#[test]
fn parse_errors_are_managed_exceptions() {
    let mut h = Harness::new();
    assert_eq!(
        h.eval_repr("f(1,"),
        "raised ParseError(\"1:5: expected an expression, found end of input\")"
    );
}

#[test]
fn unbounded_recursion_overflows() {
    let mut h = Harness::new();
    h.eval("f(n) = f(n + 1)").unwrap();
    assert_eq!(h.eval_repr("f(0)"), "raised ErrorException(\"stack overflow\")");
    assert_eq!(h.rt.depth, 0);
    assert!(h.rt.stack.is_empty());
    assert!(MAX_CALL_DEPTH > 0);
}

#[test]
fn thrown_values_pass_through_unchanged() {
    let mut h = Harness::new();
    assert_eq!(h.eval("throw(42)"), Err(Value::Int(42)));
    assert_eq!(
        h.eval_repr("error(\"bad \", 1)"),
        "raised ErrorException(\"bad 1\")"
    );
    assert_eq!(h.eval_repr("div(1, 0)"), "raised DivideError()");
}

#[test]
fn pending_interrupt_raises_at_next_call() {
    let mut h = Harness::new();
    h.signals.interrupt_handle().request();
    assert_eq!(h.eval_repr("length([1])"), "raised InterruptException()");
    assert_eq!(h.eval("length([1])"), Ok(Value::Int(1)));
}

#[test]
fn interrupt_waits_for_sigatomic_region() {
    let mut h = Harness::new();
    h.signals.begin();
    h.signals.interrupt_handle().request();
    assert_eq!(h.eval("length([1])"), Ok(Value::Int(1)));
    h.signals.end();
    assert_eq!(h.eval_repr("length([1])"), "raised InterruptException()");
}

#[test]
fn bootstrap_binds_args_and_types() {
    let mut h = Harness::new();
    assert_eq!(h.eval_repr("ARGS"), r#"["--bind-to", "10.1.1.1"]"#);
    assert_eq!(h.eval("Int64"), Ok(Value::Type(builtin::INT64)));
    assert_eq!(h.eval_repr("Base.init_bind_addr(ARGS)"), "\"10.1.1.1\"");
    assert_eq!(h.rt.scheduler().bind_addr(), Some("10.1.1.1"));
}

#[test]
fn collection_keeps_globals_and_boundary_roots() {
    let mut h = Harness::new();
    h.eval("keep = [1, 2, 3]").unwrap();
    let rooted = h.eval("\"rooted\"").unwrap();
    let dropped = h.eval("\"dropped\"").unwrap();

    let frame = h.roots.push_frame(1);
    frame.write(0, rooted);
    let boundary = BoundaryView::new(&h.roots, &h.exception, &h.signals);
    h.rt.collect_garbage(&boundary);
    drop(frame);

    assert_eq!(h.rt.string_data(&rooted), Some("rooted"));
    assert_eq!(h.rt.string_data(&dropped), None);
    assert_eq!(h.eval("length(keep)"), Ok(Value::Int(3)));
}
