use flux_embed::{FluxEmbedding, FluxRuntime, RuntimeConfig, Value};

fn embedding() -> FluxEmbedding {
    let embedding = FluxEmbedding::new(FluxRuntime::new());
    embedding
        .initialize_with_config(RuntimeConfig::new("/nonexistent/flux"))
        .unwrap();
    embedding
}

fn exception_text(embedding: &FluxEmbedding) -> String {
    let exception = embedding
        .exception_occurred()
        .expect("an exception should be in transit");
    embedding.render(&exception)
}

#[test]
fn get_field_reads_struct_fields_by_name() {
    let embedding = embedding();
    let point = embedding
        .evaluate("struct Point { x, y }\nPoint(3, 4.5)")
        .unwrap();

    assert_eq!(embedding.get_field(&point, "x"), Some(Value::Int(3)));
    assert_eq!(embedding.get_field(&point, "y"), Some(Value::Float(4.5)));
    assert_eq!(embedding.roots().depth(), 0);
}

#[test]
fn get_field_reports_unknown_fields() {
    let embedding = embedding();
    let point = embedding
        .evaluate("struct Point { x, y }\nPoint(3, 4)")
        .unwrap();

    assert_eq!(embedding.get_field(&point, "z"), None);
    insta::assert_snapshot!(exception_text(&embedding), @r#"FieldError(Point, "z")"#);

    assert_eq!(embedding.get_field(&Value::Int(1), "re"), None);
    insta::assert_snapshot!(exception_text(&embedding), @r#"FieldError(Int64, "re")"#);
}

#[test]
fn exception_fields_are_readable() {
    let embedding = embedding();
    embedding.evaluate("div(1, 0)");
    embedding.evaluate("[1, 2][5]");
    let exception = embedding.exception_occurred().unwrap();
    assert_eq!(embedding.typeof_name(&exception).as_deref(), Some("BoundsError"));
    assert_eq!(embedding.get_field(&exception, "index"), Some(Value::Int(5)));
}

#[test]
fn type_names_use_the_base_name() {
    let embedding = embedding();
    let int_type = embedding.evaluate("Int64").unwrap();
    assert_eq!(embedding.type_name(&int_type).as_deref(), Some("Int64"));

    let array = embedding.evaluate("[1, 2, 3]").unwrap();
    assert_eq!(embedding.typeof_name(&array).as_deref(), Some("Array"));
    let array_type = embedding.type_of(&array);
    assert_eq!(embedding.render(&array_type), "Array{Int64,1}");

    let tuple = embedding.evaluate("(1, \"a\")").unwrap();
    assert_eq!(embedding.type_name(&tuple).as_deref(), Some("Tuple"));
    assert_eq!(embedding.typeof_name(&tuple).as_deref(), Some("Tuple"));

    assert_eq!(embedding.type_name(&Value::Int(1)), None);
    assert_eq!(embedding.typeof_name(&Value::Bool(true)).as_deref(), Some("Bool"));
}

#[test]
fn array_queries_on_a_matrix() {
    let embedding = embedding();
    let matrix = embedding.evaluate("zeros(2, 3)").unwrap();

    assert_eq!(embedding.array_rank(&matrix), Some(2));
    assert_eq!(embedding.array_dimension(&matrix, 0), Some(2));
    assert_eq!(embedding.array_dimension(&matrix, 1), Some(3));
    assert_eq!(embedding.array_dimension(&matrix, 2), None);

    let eltype = embedding.array_eltype(&matrix).unwrap();
    assert_eq!(embedding.type_name(&eltype).as_deref(), Some("Float64"));
    insta::assert_snapshot!(embedding.render(&matrix), @"2×3 Array{Float64,2}");
}

#[test]
fn array_queries_reject_non_arrays() {
    let embedding = embedding();
    let text = embedding.evaluate("\"abc\"").unwrap();
    assert_eq!(embedding.array_rank(&text), None);
    assert_eq!(embedding.array_eltype(&Value::Int(1)), None);
    assert_eq!(embedding.array_dimension(&Value::Nothing, 0), None);
}

#[test]
fn heterogeneous_arrays_have_any_eltype() {
    let embedding = embedding();
    let mixed = embedding.evaluate("[1, \"two\", 3.0]").unwrap();
    let eltype = embedding.array_eltype(&mixed).unwrap();
    assert_eq!(embedding.type_name(&eltype).as_deref(), Some("Any"));
    assert_eq!(embedding.array_dimension(&mixed, 0), Some(3));
}

#[test]
fn string_data_reads_managed_strings() {
    let embedding = embedding();
    let greeting = embedding.evaluate("\"héllo, \" * \"wörld\"").unwrap();
    assert_eq!(
        embedding.string_data(&greeting).as_deref(),
        Some("héllo, wörld")
    );
    assert_eq!(embedding.evaluate("length(\"héllo\")"), Some(Value::Int(5)));
    assert_eq!(embedding.string_data(&Value::Int(1)), None);
}

#[test]
fn fieldnames_and_getfield_agree_with_get_field() {
    let embedding = embedding();
    let names = embedding
        .evaluate("struct Pair { left, right }\nfieldnames(Pair)")
        .unwrap();
    insta::assert_snapshot!(embedding.render(&names), @r#"("left", "right")"#);
    assert_eq!(
        embedding.evaluate("getfield(Pair(1, 2), \"right\")"),
        Some(Value::Int(2))
    );
}
