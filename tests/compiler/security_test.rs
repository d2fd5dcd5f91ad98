// tests/compiler/security_test.rs
//
// The allow-list is the boundary between user expressions and the
// database. A rejected function must fail with the security error and
// nothing else, and the rejection must never be wrapped.

use quarry::prelude::*;

struct Model;

impl QueryModel for Model {
    fn find_column(&self, name: &str) -> Option<PhysicalColumn> {
        (name == "x").then(|| PhysicalColumn::new("x", "t0", "x", ColumnType::Integer))
    }
}

fn compile_sql(expression: &str) -> Result<CalculatedColumn<SqlFragment>> {
    let model = Model;
    let mut cx = ExprContext::new(&model);
    FieldCompiler::new(SqlFactory::new(Dialect::Generic))
        .compile_field(&CalculatedFieldDef::new("f", expression), &mut cx)
}

fn compile_document(expression: &str) -> Result<CalculatedColumn<DocumentFragment>> {
    let model = Model;
    let mut cx = ExprContext::new(&model);
    FieldCompiler::new(DocumentFactory::new())
        .compile_field(&CalculatedFieldDef::new("f", expression), &mut cx)
}

#[test]
fn test_unlisted_function_rejected_by_both_backends() {
    for expr in ["DROP_TABLE(x)", "SLEEP(10)", "LOAD_FILE('/etc/passwd')", "exec(x)"] {
        let err = compile_sql(expr).unwrap_err();
        assert_eq!(err, Error::FunctionNotAllowed(expr.split('(').next().unwrap().to_string()));

        let err = compile_document(expr).unwrap_err();
        assert!(err.is_security(), "document backend accepted {expr}");
    }
}

#[test]
fn test_security_error_is_never_wrapped() {
    let err = compile_sql("DROP_TABLE(x)").unwrap_err();
    assert!(err.is_security());
    assert!(!matches!(err, Error::FieldCompile { .. }));
}

#[test]
fn test_rejected_before_arguments_are_compiled() {
    // The argument references a column that does not exist; the
    // security error still wins because the name is checked first.
    let err = compile_sql("DROP_TABLE(no_such_column)").unwrap_err();
    assert_eq!(err, Error::FunctionNotAllowed("DROP_TABLE".to_string()));
}

#[test]
fn test_rejected_function_produces_no_fragment_text() {
    // Compile a batch where the poisoned field comes second; the first
    // field's output must not contain any trace of the rejected call.
    let model = Model;
    let mut cx = ExprContext::new(&model);
    let compiler = FieldCompiler::new(SqlFactory::new(Dialect::Generic));
    let defs = vec![
        CalculatedFieldDef::new("ok", "x + 1"),
        CalculatedFieldDef::new("evil", "DROP_TABLE(x)"),
    ];
    assert!(compiler.process_fields(&defs, &mut cx).is_err());
    assert_eq!(cx.calculated_columns().len(), 1);
    assert!(!cx.calculated_columns()[0].fragment.sql.contains("DROP_TABLE"));
}

#[test]
fn test_case_variants_still_rejected() {
    assert!(compile_sql("drop_table(x)").unwrap_err().is_security());
    assert!(compile_sql("Drop_Table(x)").unwrap_err().is_security());
}

#[test]
fn test_allowed_functions_still_pass() {
    assert!(compile_sql("ROUND(x, 2)").is_ok());
    assert!(compile_sql("SUM(x)").is_ok());
    assert!(compile_document("SUM(x)").is_ok());
}
