use serde_json::json;
use std::collections::HashMap;
use verdict::{EvalError, Filter, Value, parse};

fn inventory() -> Value {
    Value::from(json!([
        {"Name": "web-01", "Env": "prod", "Tags": ["web", "public"], "Replicas": 3},
        {"Name": "web-02", "Env": "staging", "Tags": ["web"], "Replicas": 1},
        {"Name": "db-01", "Env": "prod", "Tags": [], "Replicas": 2},
        {"Name": "cache", "Env": "prod"},
    ]))
}

fn names(filtered: &Value) -> Vec<&str> {
    match filtered {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::Object(map) => map.get("Name").and_then(Value::as_str),
                _ => None,
            })
            .collect(),
        other => panic!("expected an array, got {:?}", other),
    }
}

// ============================================================================
// Filtering
// ============================================================================

#[test]
fn test_filter_array_keeps_order() {
    let filter = Filter::new(r#"Env == "prod" and Tags is not empty"#).unwrap();
    let kept = filter.execute(&inventory()).unwrap();
    assert_eq!(names(&kept), vec!["web-01"]);

    let filter = Filter::new(r#"Env == "prod""#).unwrap();
    let kept = filter.execute(&inventory()).unwrap();
    assert_eq!(names(&kept), vec!["web-01", "db-01", "cache"]);
}

#[test]
fn test_filter_absent_fields() {
    let filter = Filter::new("Tags is empty").unwrap();
    let kept = filter.execute(&inventory()).unwrap();
    assert_eq!(names(&kept), vec!["db-01", "cache"]);

    let filter = Filter::new(r#""web" not in Tags"#).unwrap();
    let kept = filter.execute(&inventory()).unwrap();
    // `cache` has no Tags at all, so the negated membership is false too
    assert_eq!(names(&kept), vec!["db-01"]);
}

#[test]
fn test_filter_object_values() {
    let services = Value::from(json!({
        "web": {"Port": 80},
        "api": {"Port": 8080},
        "tls": {"Port": 443},
    }));
    let filter = Filter::new("Port != 8080").unwrap();
    let kept = filter.execute(&services).unwrap();

    let mut expected = HashMap::new();
    expected.insert("web".to_string(), Value::from(json!({"Port": 80})));
    expected.insert("tls".to_string(), Value::from(json!({"Port": 443})));
    assert_eq!(kept, Value::Object(expected));
}

#[test]
fn test_filter_rejects_scalars() {
    let filter = Filter::new("A == 1").unwrap();
    let err = filter.execute(&Value::Integer(1)).unwrap_err();
    assert!(matches!(err, EvalError::TypeError(_)));
}

#[test]
fn test_filter_propagates_element_errors() {
    let filter = Filter::new("Replicas.Count == 1").unwrap();
    let err = filter.execute(&inventory()).unwrap_err();
    assert!(matches!(err, EvalError::Resolver(_)));
}

#[test]
fn test_filter_select_borrows() {
    let data = inventory();
    let Value::Array(items) = &data else {
        panic!("inventory is an array");
    };
    let filter = Filter::new(r#"Name matches "^web""#).unwrap();
    let selected = filter.select(items).unwrap();
    assert_eq!(selected.len(), 2);
    assert!(std::ptr::eq(selected[0], &items[0]));
}

// ============================================================================
// Expression Reuse
// ============================================================================

#[test]
fn test_evaluator_reuse_across_data() {
    let filter = Filter::new("Replicas == 3 or Replicas == 1").unwrap();
    let evaluator = filter.evaluator();
    let results: Vec<bool> = (0..5)
        .map(|n| evaluator.evaluate(&Value::from(json!({"Replicas": n}))).unwrap())
        .collect();
    assert_eq!(results, vec![false, true, false, true, false]);
}

#[test]
fn test_display_of_compiled_expression() {
    let filter = Filter::new("not (A == 1 or B == 2)").unwrap();
    assert_eq!(filter.evaluator().expression().to_string(), "not (A == 1 or B == 2)");
    assert_eq!(parse("not (A == 1 or B == 2)", 0).unwrap(), *filter.evaluator().expression());
}

// ============================================================================
// CLI
// ============================================================================

#[cfg(feature = "cli")]
mod cli {
    use verdict::cli::{CheckOptions, CheckResult, CliError, execute_check, execute_dump};

    fn options(expression: &str, input: &str) -> CheckOptions {
        CheckOptions {
            expression: expression.to_string(),
            input: Some(input.to_string()),
            ..CheckOptions::default()
        }
    }

    #[test]
    fn test_check_verdicts() {
        let input = r#"{"Tags": ["prod"], "Replicas": 0}"#;
        assert_eq!(
            execute_check(&options(r#""prod" in Tags"#, input)).unwrap(),
            CheckResult::Verdict(true)
        );
        assert_eq!(
            execute_check(&options("Replicas != 0", input)).unwrap(),
            CheckResult::Verdict(false)
        );
    }

    #[test]
    fn test_check_filter_pretty() {
        let mut opts = options("Port == 443", r#"[{"Port": 80}, {"Port": 443}]"#);
        opts.filter = true;
        opts.pretty = true;
        assert_eq!(
            execute_check(&opts).unwrap(),
            CheckResult::Filtered("[\n  {\n    \"Port\": 443\n  }\n]".to_string())
        );
    }

    #[test]
    fn test_check_errors() {
        assert!(matches!(
            execute_check(&options("A ==", "{}")),
            Err(CliError::Parse(_))
        ));
        assert!(matches!(
            execute_check(&options("A == 1", "{not json")),
            Err(CliError::Json(_))
        ));
        assert!(matches!(
            execute_check(&options(r#"A matches "[""#, r#"{"A": "x"}"#)),
            Err(CliError::Eval(_))
        ));
    }

    #[test]
    fn test_dump() {
        let dump = execute_dump("a == 1 or b == 2 and not c is empty", 0).unwrap();
        assert_eq!(dump.canonical, "a == 1 or b == 2 and not c is empty");
        assert_eq!(dump.grouped, "a == 1 or (b == 2 and (not c is empty))");
        assert_eq!(dump.leaves, 3);

        assert!(matches!(execute_dump("a == 1 and b == 2", 1), Err(CliError::Parse(_))));
    }
}
